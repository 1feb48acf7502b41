use thiserror::Error;

use crate::{AttributeKind, EntityId};

/// Errors that can occur while attaching attributes to an entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// Attribute already belongs to a different, still-live entity
    #[error("Attribute `{kind}` is already owned by {owner}; remove it there first")]
    AlreadyOwned {
        kind: AttributeKind,
        owner: EntityId,
    },
}

/// Errors that can occur while constructing attributes from tagged fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// No constructor is registered for the field's tag
    #[error("No attribute constructor registered for tag `{tag}`")]
    UnknownTag { tag: String },

    /// Constructor was found but the field's values were unusable
    #[error("Invalid value for `{tag}` field: {reason}")]
    InvalidValue { tag: String, reason: String },

    /// Constructor tag registered twice
    #[error("Attribute constructor for tag `{tag}` is already registered")]
    DuplicateTag { tag: String },
}
