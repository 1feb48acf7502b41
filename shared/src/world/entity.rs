use std::{
    fmt,
    sync::{Arc, RwLock},
};

use log::{debug, warn};

use crate::{
    allocator::{next_entity_id, observe_entity_id},
    sync,
    world::attribute::{
        attribute::{downcast, same_attribute},
        error::AttributeError,
    },
    Attribute, AttributeKind, Capability, EntityId, NullCapability, TaggedField,
};

// Entity

/// A uniquely identified object in the world, composed of [`Attribute`]s.
///
/// The attribute list may be read by many tasks at once; mutation is
/// exclusive. Attribute order is preserved so that descriptions round-trip.
pub struct Entity {
    id: EntityId,
    attributes: RwLock<Vec<Arc<dyn Attribute>>>,
}

impl Entity {
    /// Creates an entity with a freshly allocated identity.
    pub fn new(attributes: Vec<Arc<dyn Attribute>>) -> Arc<Self> {
        Self::assemble(next_entity_id(), attributes)
    }

    /// Creates an entity with a restored identity, reserving it with the
    /// allocator so no fresh entity is ever given the same one.
    pub(crate) fn with_id(id: EntityId, attributes: Vec<Arc<dyn Attribute>>) -> Arc<Self> {
        observe_entity_id(id);
        Self::assemble(id, attributes)
    }

    fn assemble(id: EntityId, attributes: Vec<Arc<dyn Attribute>>) -> Arc<Self> {
        let entity = Arc::new(Self {
            id,
            attributes: RwLock::new(Vec::with_capacity(attributes.len())),
        });
        entity.add(attributes);
        entity
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attach attributes, skipping any that another entity still owns.
    pub fn add(self: &Arc<Self>, attributes: Vec<Arc<dyn Attribute>>) {
        for attribute in attributes {
            if let Err(error) = self.try_add(vec![attribute]) {
                warn!("{} skipped attribute: {}", self.id, error);
            }
        }
    }

    /// Attach attributes, all or nothing.
    ///
    /// Returns an error without attaching anything if any attribute is owned
    /// by another entity.
    pub fn try_add(
        self: &Arc<Self>,
        attributes: Vec<Arc<dyn Attribute>>,
    ) -> Result<(), AttributeError> {
        let mut list = sync::write(&self.attributes);
        let mut claimed: Vec<Arc<dyn Attribute>> = Vec::with_capacity(attributes.len());

        for attribute in attributes {
            let present = list
                .iter()
                .chain(claimed.iter())
                .any(|existing| same_attribute(existing, &attribute));
            if present {
                continue;
            }
            if let Err(error) = attribute.owner_slot().claim(attribute.kind(), self) {
                for attribute in claimed {
                    attribute.owner_slot().release();
                }
                return Err(error);
            }
            claimed.push(attribute);
        }

        list.extend(claimed);
        Ok(())
    }

    /// Detach attributes by identity, clearing their owner. Returns how many
    /// were attached.
    pub fn remove(&self, attributes: &[Arc<dyn Attribute>]) -> usize {
        let mut list = sync::write(&self.attributes);
        let before = list.len();
        list.retain(|existing| {
            let matched = attributes
                .iter()
                .any(|attribute| same_attribute(existing, attribute));
            if matched {
                existing.owner_slot().release();
            }
            !matched
        });
        before - list.len()
    }

    /// Detach the first attribute of capability `T` and return it.
    pub fn remove_capability<T: Capability>(&self) -> Option<Arc<T>> {
        let mut list = sync::write(&self.attributes);
        let index = list.iter().position(|a| a.kind() == T::KIND)?;
        let attribute = list.remove(index);
        attribute.owner_slot().release();
        downcast::<T>(attribute)
    }

    /// A snapshot of the attribute list; iterating it holds no lock.
    pub fn attributes(&self) -> Vec<Arc<dyn Attribute>> {
        sync::read(&self.attributes).clone()
    }

    pub fn find_capability<F>(&self, predicate: F) -> Option<Arc<dyn Attribute>>
    where
        F: Fn(&dyn Attribute) -> bool,
    {
        self.attributes()
            .into_iter()
            .find(|attribute| predicate(attribute.as_ref()))
    }

    pub fn find_kind(&self, kind: AttributeKind) -> Option<Arc<dyn Attribute>> {
        sync::read(&self.attributes)
            .iter()
            .find(|attribute| attribute.kind() == kind)
            .cloned()
    }

    pub fn has(&self, kind: AttributeKind) -> bool {
        sync::read(&self.attributes)
            .iter()
            .any(|attribute| attribute.kind() == kind)
    }

    /// The first attribute of capability `T`.
    pub fn attribute<T: Capability>(&self) -> Option<Arc<T>> {
        self.find_kind(T::KIND).and_then(downcast::<T>)
    }

    /// The first attribute of capability `T`, or its null object.
    pub fn capability<T: NullCapability>(&self) -> Arc<T> {
        self.attribute::<T>().unwrap_or_else(T::null)
    }

    /// A new entity with a fresh identity whose attributes are copies of this
    /// entity's, made by each attribute's own [`Attribute::copy`].
    pub fn copy(&self) -> Arc<Entity> {
        let copies = self
            .attributes()
            .iter()
            .map(|attribute| attribute.copy())
            .collect();
        let copy = Self::new(copies);
        debug!("Copied {} to {}", self.id, copy.id);
        copy
    }

    /// Detaches and frees every attribute. Containers free their members in
    /// turn, which breaks the owner/member/location reference web.
    pub fn free(&self) {
        let attributes = std::mem::take(&mut *sync::write(&self.attributes));
        for attribute in &attributes {
            attribute.owner_slot().release();
        }
        for attribute in attributes {
            attribute.free();
        }
    }

    /// Describes each attribute, in order, for an external serializer.
    pub fn describe(&self) -> Vec<TaggedField> {
        self.attributes()
            .iter()
            .filter_map(|attribute| attribute.describe())
            .collect()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<AttributeKind> = sync::read(&self.attributes)
            .iter()
            .map(|attribute| attribute.kind())
            .collect();
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("attributes", &kinds)
            .finish()
    }
}
