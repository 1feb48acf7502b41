use std::{fmt, sync::{Arc, MutexGuard}};

use log::debug;

use crate::{
    world::container::{
        error::ContainerError,
        partitions::{NodeKey, Partition, Partitions},
    },
    Alias, Container, Entity, EntityId, Locate, LockToken,
};

// ContainerGuard

/// Exclusive access to one container's partitions. The lock is released when
/// the guard is dropped.
///
/// Every partition change happens through a guard, so all operations on one
/// container are strictly ordered by lock acquisition.
pub struct ContainerGuard<'c> {
    container: &'c Container,
    partitions: MutexGuard<'c, Partitions>,
}

impl<'c> ContainerGuard<'c> {
    pub(crate) fn new(container: &'c Container, partitions: MutexGuard<'c, Partitions>) -> Self {
        Self {
            container,
            partitions,
        }
    }

    pub fn token(&self) -> LockToken {
        self.container.token()
    }

    pub fn container(&self) -> &'c Container {
        self.container
    }

    /// Adds `entity` to the disabled partition and points its location here.
    ///
    /// Only entities carrying a [`Locate`] can be held, since the location
    /// record is what keeps an entity in at most one container.
    pub fn add(&mut self, entity: Arc<Entity>) -> Result<(), ContainerError> {
        let id = entity.id();
        let locate = match entity.attribute::<Locate>() {
            Some(locate) if !locate.is_null() => locate,
            _ => return Err(ContainerError::NotLocatable { entity: id }),
        };
        if self.partitions.contains(&id) {
            return Err(ContainerError::AlreadyMember {
                entity: id,
                token: self.token(),
            });
        }
        locate
            .try_place(self.container.weak())
            .map_err(|holder| ContainerError::HeldElsewhere { entity: id, holder })?;
        self.partitions.insert(entity, Partition::Disabled);
        Ok(())
    }

    /// Removes a member from whichever partition holds it and clears its
    /// location.
    pub fn remove(&mut self, id: &EntityId) -> Option<Arc<Entity>> {
        let (entity, _) = self.partitions.remove(id)?;
        entity.capability::<Locate>().vacate(self.container.weak());
        Some(entity)
    }

    /// Moves a member into the active partition its capabilities call for.
    /// Enabling an active member is a no-op.
    pub fn enable(&mut self, id: &EntityId) -> Result<Partition, ContainerError> {
        let entity = self.get(id).ok_or(ContainerError::NotMember {
            entity: *id,
            token: self.token(),
        })?;
        let current = self.partitions.partition_of(id);
        if let Some(current) = current.filter(Partition::is_active) {
            return Ok(current);
        }
        let partition = Partition::active_for(&entity);
        self.partitions.relink(id, partition);
        Ok(partition)
    }

    /// Takes a member out of play without removing it.
    pub fn disable(&mut self, id: &EntityId) -> Result<(), ContainerError> {
        self.partitions
            .relink(id, Partition::Disabled)
            .map(|_| ())
            .ok_or(ContainerError::NotMember {
                entity: *id,
                token: self.token(),
            })
    }

    /// Enables every disabled member. Returns how many were enabled.
    pub fn enable_all(&mut self) -> usize {
        let disabled: Vec<EntityId> = self
            .partitions
            .iter(Partition::Disabled)
            .map(|entity| entity.id())
            .collect();
        disabled
            .iter()
            .filter(|id| self.enable(id).is_ok())
            .count()
    }

    /// Relinks a member from this container into the same partition of
    /// `destination` and repoints its location, while both locks are held.
    /// Observers see the member wholly here or wholly there.
    pub fn move_to(
        &mut self,
        id: &EntityId,
        destination: &mut ContainerGuard<'_>,
    ) -> Result<Partition, ContainerError> {
        if self.token() == destination.token() {
            return Err(ContainerError::SameContainer {
                token: self.token(),
            });
        }
        if destination.contains(id) {
            return Err(ContainerError::AlreadyMember {
                entity: *id,
                token: destination.token(),
            });
        }
        let (entity, partition) =
            self.partitions
                .remove(id)
                .ok_or(ContainerError::NotMember {
                    entity: *id,
                    token: self.token(),
                })?;
        entity
            .capability::<Locate>()
            .relocate(destination.container.weak());
        destination.partitions.insert(entity, partition);
        debug!(
            "Moved {} from {} to {} ({:?})",
            id,
            self.token(),
            destination.token(),
            partition
        );
        Ok(partition)
    }

    /// The first active member satisfying `predicate`, visiting players, then
    /// others, then fixtures. Disabled members are never matched.
    pub fn search<F>(&self, predicate: F) -> Option<Arc<Entity>>
    where
        F: Fn(&Entity) -> bool,
    {
        Partition::SEARCH_ORDER.iter().find_map(|partition| {
            self.partitions
                .iter(*partition)
                .find(|entity| predicate(entity))
                .cloned()
        })
    }

    pub fn search_alias(&self, alias: &str) -> Option<Arc<Entity>> {
        self.search(|entity| entity.capability::<Alias>().has_alias(alias))
    }

    /// Any member, enabled or not.
    pub fn get(&self, id: &EntityId) -> Option<Arc<Entity>> {
        self.partitions.get(id).cloned()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.partitions.contains(id)
    }

    pub fn partition_of(&self, id: &EntityId) -> Option<Partition> {
        self.partitions.partition_of(id)
    }

    pub fn is_enabled(&self, id: &EntityId) -> bool {
        self.partition_of(id).is_some_and(|p| p.is_active())
    }

    pub fn node_of(&self, id: &EntityId) -> Option<NodeKey> {
        self.partitions.node_of(id)
    }

    pub fn members(&self, partition: Partition) -> Vec<Arc<Entity>> {
        self.partitions.iter(partition).cloned().collect()
    }

    pub fn players(&self) -> Vec<Arc<Entity>> {
        self.members(Partition::Players)
    }

    pub fn others(&self) -> Vec<Arc<Entity>> {
        self.members(Partition::Others)
    }

    pub fn fixtures(&self) -> Vec<Arc<Entity>> {
        self.members(Partition::Fixtures)
    }

    pub fn disabled(&self) -> Vec<Arc<Entity>> {
        self.members(Partition::Disabled)
    }

    /// Every enabled member, in search order.
    pub fn everything(&self) -> Vec<Arc<Entity>> {
        Partition::SEARCH_ORDER
            .iter()
            .flat_map(|partition| self.partitions.iter(*partition).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn partition_len(&self, partition: Partition) -> usize {
        self.partitions.partition_len(partition)
    }

    /// Whether enabled players have reached `limit`.
    pub fn crowded(&self, limit: usize) -> bool {
        self.partition_len(Partition::Players) >= limit
    }

    /// Walks every partition list verifying links, lengths and disjointness.
    pub fn is_consistent(&self) -> bool {
        self.partitions.is_consistent()
    }
}

impl fmt::Debug for ContainerGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerGuard")
            .field("token", &self.token())
            .field("len", &self.len())
            .finish()
    }
}
