use std::{
    fmt,
    sync::{Arc, Mutex, Weak},
};

use log::{debug, warn};

use crate::{
    allocator::next_lock_token,
    world::{
        attribute::error::FieldError,
        container::{
            error::ContainerError,
            guard::ContainerGuard,
            lock_set::LockSet,
            partitions::{Partition, Partitions},
        },
    },
    Attribute, AttributeKind, AttributeOwner, Capability, Entity, EntityId, Locate, LockToken,
    TaggedField,
};

// Container

/// Turns its owning entity into a holder of other entities and a lock domain.
///
/// The lock is a plain, non-reentrant mutex: a task that already holds it and
/// asks again deadlocks. Whenever more than one container must be held at
/// once, acquire them through [`LockSet`], which takes locks in ascending
/// [`LockToken`] order.
///
/// Lock hierarchy: container locks may be held while reading an entity's
/// attribute list or a [`Locate`], never the other way round.
pub struct Container {
    owner: AttributeOwner,
    token: LockToken,
    this: Weak<Container>,
    partitions: Mutex<Partitions>,
}

impl Container {
    pub const TAG: &'static str = "container";

    pub fn new() -> Arc<Self> {
        let container = Arc::new_cyclic(|this| Self {
            owner: AttributeOwner::new(),
            token: next_lock_token(),
            this: this.clone(),
            partitions: Mutex::new(Partitions::new()),
        });
        debug!("Created container {}", container.token);
        container
    }

    /// A container already holding `members`. They start disabled, exactly as
    /// if added one by one.
    pub fn with_members(members: Vec<Arc<Entity>>) -> Result<Arc<Self>, ContainerError> {
        let container = Self::new();
        {
            let mut guard = container.lock()?;
            for member in members {
                guard.add(member)?;
            }
        }
        Ok(container)
    }

    pub fn token(&self) -> LockToken {
        self.token
    }

    pub(crate) fn weak(&self) -> &Weak<Container> {
        &self.this
    }

    /// Blocks until this container's lock is held. Must not be called by a
    /// task already holding it.
    pub fn lock(&self) -> Result<ContainerGuard<'_>, ContainerError> {
        let partitions = self
            .partitions
            .lock()
            .map_err(|_| ContainerError::LockPoisoned { token: self.token })?;
        Ok(ContainerGuard::new(self, partitions))
    }

    // Single-lock conveniences

    pub fn add(&self, entity: Arc<Entity>) -> Result<(), ContainerError> {
        self.lock()?.add(entity)
    }

    pub fn remove(&self, id: &EntityId) -> Result<Option<Arc<Entity>>, ContainerError> {
        Ok(self.lock()?.remove(id))
    }

    pub fn enable(&self, id: &EntityId) -> Result<Partition, ContainerError> {
        self.lock()?.enable(id)
    }

    pub fn disable(&self, id: &EntityId) -> Result<(), ContainerError> {
        self.lock()?.disable(id)
    }

    pub fn contains(&self, id: &EntityId) -> Result<bool, ContainerError> {
        Ok(self.lock()?.contains(id))
    }

    pub fn search_alias(&self, alias: &str) -> Result<Option<Arc<Entity>>, ContainerError> {
        Ok(self.lock()?.search_alias(alias))
    }

    pub fn len(&self) -> Result<usize, ContainerError> {
        Ok(self.lock()?.len())
    }

    /// Moves a member into `destination`, holding both locks in token order
    /// for the duration.
    pub fn move_entity(
        &self,
        id: &EntityId,
        destination: &Container,
    ) -> Result<Partition, ContainerError> {
        if self.token == destination.token {
            return Err(ContainerError::SameContainer { token: self.token });
        }
        let mut locks = LockSet::acquire(&[self, destination])?;
        let (source, destination) = locks.pair_mut(self.token, destination.token)?;
        source.move_to(id, destination)
    }

    fn snapshot(&self) -> Vec<(Arc<Entity>, Partition)> {
        match self.lock() {
            Ok(guard) => Partition::ALL
                .iter()
                .flat_map(|partition| {
                    guard
                        .members(*partition)
                        .into_iter()
                        .map(move |member| (member, *partition))
                })
                .collect(),
            Err(error) => {
                warn!("Copying container without members: {}", error);
                Vec::new()
            }
        }
    }

    pub(crate) fn construct(_: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new())
    }
}

impl Attribute for Container {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    /// Copies every member into a new container with a new lock token,
    /// keeping each copy enabled or disabled as its original was.
    fn copy(&self) -> Arc<dyn Attribute> {
        let members = self.snapshot();
        let copy = Self::new();
        if let Ok(mut guard) = copy.lock() {
            for (member, partition) in members {
                let member = member.copy();
                let id = member.id();
                if let Err(error) = guard.add(member) {
                    warn!("Dropped member from container copy: {}", error);
                    continue;
                }
                if partition.is_active() {
                    if let Err(error) = guard.enable(&id) {
                        warn!("Container copy left {} disabled: {}", id, error);
                    }
                }
            }
        }
        copy
    }

    /// Releases every member, then frees it. Members are freed after the
    /// lock is released, since they may be containers themselves.
    fn free(&self) {
        let members = self
            .partitions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain();
        debug!("Freeing container {} and {} members", self.token, members.len());
        for (member, _) in members {
            member.capability::<Locate>().vacate(&self.this);
            member.free();
        }
    }

    /// Members are listed by identity, in partition order; the serializer
    /// resolves them and adds them back.
    fn describe(&self) -> Option<TaggedField> {
        let members = self.snapshot();
        Some(TaggedField::new(
            Self::TAG,
            members.iter().map(|(member, _)| member.id().to_string()),
        ))
    }
}

impl Capability for Container {
    const KIND: AttributeKind = AttributeKind::new("container");
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Container");
        debug.field("token", &self.token);
        match self.partitions.try_lock() {
            Ok(partitions) => debug.field("len", &partitions.len()),
            Err(_) => debug.field("len", &"<locked>"),
        };
        debug.finish()
    }
}
