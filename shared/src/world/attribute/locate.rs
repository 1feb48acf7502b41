use std::{
    fmt,
    sync::{Arc, RwLock, Weak},
};

use crate::{
    sync, world::attribute::error::FieldError, Attribute, AttributeKind, AttributeOwner,
    Capability, Container, LockToken, NullCapability, TaggedField,
};

// Locate

/// Records which container currently holds an entity and which one it was
/// first placed in.
///
/// Both references are weak, so a container never keeps itself alive through
/// its members. They are guarded by their own locks: answering "where am I"
/// never waits on a container lock.
pub struct Locate {
    owner: AttributeOwner,
    null: bool,
    location: RwLock<Weak<Container>>,
    origin: RwLock<Weak<Container>>,
}

impl Locate {
    pub const TAG: &'static str = "locate";

    pub fn new() -> Arc<Self> {
        Self::with_origin(Weak::new())
    }

    fn with_origin(origin: Weak<Container>) -> Arc<Self> {
        Arc::new(Self {
            owner: AttributeOwner::new(),
            null: false,
            location: RwLock::new(Weak::new()),
            origin: RwLock::new(origin),
        })
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    /// The container currently holding the owner.
    pub fn location(&self) -> Option<Arc<Container>> {
        sync::read(&self.location).upgrade()
    }

    /// The container the owner was first placed in.
    pub fn origin(&self) -> Option<Arc<Container>> {
        sync::read(&self.origin).upgrade()
    }

    pub fn set_origin(&self, container: &Arc<Container>) {
        if self.null {
            return;
        }
        *sync::write(&self.origin) = Arc::downgrade(container);
    }

    // Containers call these while holding their own lock.

    /// Claims the location for `container` unless another live container
    /// already holds the owner, in which case its token is returned. The check
    /// and the write happen under one lock, so two containers can never both
    /// claim the same entity.
    pub(crate) fn try_place(&self, container: &Weak<Container>) -> Result<(), LockToken> {
        let mut location = sync::write(&self.location);
        if let Some(holder) = location.upgrade() {
            if !location.ptr_eq(container) {
                return Err(holder.token());
            }
        }
        *location = container.clone();
        drop(location);

        let mut origin = sync::write(&self.origin);
        if origin.strong_count() == 0 {
            *origin = container.clone();
        }
        Ok(())
    }

    pub(crate) fn relocate(&self, container: &Weak<Container>) {
        if self.null {
            return;
        }
        *sync::write(&self.location) = container.clone();
    }

    /// Clears the current location if it still points at `container`.
    pub(crate) fn vacate(&self, container: &Weak<Container>) {
        if self.null {
            return;
        }
        let mut location = sync::write(&self.location);
        if Weak::ptr_eq(&location, container) {
            *location = Weak::new();
        }
    }

    pub(crate) fn construct(_: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new())
    }
}

impl Attribute for Locate {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    /// The copy remembers the same origin but is not anywhere yet.
    fn copy(&self) -> Arc<dyn Attribute> {
        Self::with_origin(sync::read(&self.origin).clone())
    }

    fn free(&self) {
        *sync::write(&self.location) = Weak::new();
        *sync::write(&self.origin) = Weak::new();
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(Self::TAG, Vec::<String>::new()))
    }
}

impl Capability for Locate {
    const KIND: AttributeKind = AttributeKind::new("locate");
}

impl NullCapability for Locate {
    fn null() -> Arc<Self> {
        Arc::new(Self {
            owner: AttributeOwner::new(),
            null: true,
            location: RwLock::new(Weak::new()),
            origin: RwLock::new(Weak::new()),
        })
    }
}

impl fmt::Debug for Locate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locate")
            .field("null", &self.null)
            .field("location", &self.location().map(|c| c.token()))
            .field("origin", &self.origin().map(|c| c.token()))
            .finish()
    }
}
