use std::sync::Arc;

use crate::{
    world::attribute::error::FieldError, Attribute, AttributeKind, AttributeOwner, Capability,
    TaggedField,
};

// Player

/// Marks an entity as an actor controlled by a connected user. Enabled
/// players occupy a container's player partition.
#[derive(Debug, Default)]
pub struct Player {
    owner: AttributeOwner,
}

impl Player {
    pub const TAG: &'static str = "player";

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn construct(_: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new())
    }
}

impl Attribute for Player {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    fn copy(&self) -> Arc<dyn Attribute> {
        Self::new()
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(Self::TAG, Vec::<String>::new()))
    }
}

impl Capability for Player {
    const KIND: AttributeKind = AttributeKind::new("player");
}

// Narrative

/// Marks an entity as part of the scenery: it cannot be taken and enabled
/// narratives occupy a container's fixture partition.
#[derive(Debug, Default)]
pub struct Narrative {
    owner: AttributeOwner,
}

impl Narrative {
    pub const TAG: &'static str = "narrative";

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn construct(_: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        Ok(Self::new())
    }
}

impl Attribute for Narrative {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    fn copy(&self) -> Arc<dyn Attribute> {
        Self::new()
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(Self::TAG, Vec::<String>::new()))
    }
}

impl Capability for Narrative {
    const KIND: AttributeKind = AttributeKind::new("narrative");
}
