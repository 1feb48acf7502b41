use std::{
    any::Any,
    fmt,
    sync::{Arc, RwLock, Weak},
};

use crate::{sync, world::attribute::error::AttributeError, Entity, TaggedField};

// AttributeKind

/// Stable identifier of a capability. Lookups on an [`Entity`] compare kinds
/// rather than inspecting concrete types.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AttributeKind(&'static str);

impl AttributeKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// AsAnyArc
pub trait AsAnyArc {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAnyArc for T {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A capability component. An attribute belongs to at most one [`Entity`] at
/// a time and knows how to duplicate, release and describe itself.
pub trait Attribute: AsAnyArc + fmt::Debug + Send + Sync {
    fn kind(&self) -> AttributeKind;

    fn owner_slot(&self) -> &AttributeOwner;

    /// The entity this attribute is attached to, if any.
    fn owner(&self) -> Option<Arc<Entity>> {
        self.owner_slot().get()
    }

    /// Returns an unowned duplicate. Implementations decide which internal
    /// state is shared and which is recreated; pending work is never copied.
    fn copy(&self) -> Arc<dyn Attribute>;

    /// Releases anything the attribute holds. Called after it has been
    /// detached by [`Entity::free`].
    fn free(&self) {}

    /// Describes the attribute as a tagged field for an external serializer.
    fn describe(&self) -> Option<TaggedField> {
        None
    }
}

/// An [`Attribute`] with a fixed kind, so it can be looked up by type.
pub trait Capability: Attribute + Sized + 'static {
    const KIND: AttributeKind;
}

/// A [`Capability`] offering a safe absent value: every method on the null
/// object behaves as a no-op returning a default.
pub trait NullCapability: Capability {
    fn null() -> Arc<Self>;
}

// AttributeOwner

/// Back-reference slot from an attribute to its owning entity.
#[derive(Default)]
pub struct AttributeOwner {
    owner: RwLock<Weak<Entity>>,
}

impl AttributeOwner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<Entity>> {
        sync::read(&self.owner).upgrade()
    }

    pub fn is_owned(&self) -> bool {
        sync::read(&self.owner).strong_count() > 0
    }

    pub(crate) fn claim(
        &self,
        kind: AttributeKind,
        entity: &Arc<Entity>,
    ) -> Result<(), AttributeError> {
        let mut owner = sync::write(&self.owner);
        if let Some(current) = owner.upgrade() {
            if !Arc::ptr_eq(&current, entity) {
                return Err(AttributeError::AlreadyOwned {
                    kind,
                    owner: current.id(),
                });
            }
        }
        *owner = Arc::downgrade(entity);
        Ok(())
    }

    pub(crate) fn release(&self) {
        *sync::write(&self.owner) = Weak::new();
    }
}

impl fmt::Debug for AttributeOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(entity) => write!(f, "AttributeOwner({})", entity.id()),
            None => f.write_str("AttributeOwner(None)"),
        }
    }
}

pub(crate) fn downcast<T: Capability>(attribute: Arc<dyn Attribute>) -> Option<Arc<T>> {
    <dyn Attribute as AsAnyArc>::as_any_arc(attribute)
        .downcast::<T>()
        .ok()
}

pub(crate) fn same_attribute(a: &Arc<dyn Attribute>, b: &Arc<dyn Attribute>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
