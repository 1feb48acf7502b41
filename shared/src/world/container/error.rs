use thiserror::Error;

use crate::{EntityId, LockToken};

/// Errors that can occur during container operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// A task panicked while holding the container's lock
    #[error("Lock on container {token} is poisoned - a panic occurred while it was held")]
    LockPoisoned { token: LockToken },

    /// Entity is not a member of the container
    #[error("{entity} is not held by container {token}")]
    NotMember { entity: EntityId, token: LockToken },

    /// Entity is already a member of the container
    #[error("{entity} is already held by container {token}")]
    AlreadyMember { entity: EntityId, token: LockToken },

    /// Entity is still held by another container and must be moved or removed there
    #[error("{entity} is still held by container {holder}")]
    HeldElsewhere { entity: EntityId, holder: LockToken },

    /// Entity has no location record, so no container may hold it
    #[error("{entity} has no Locate attribute and cannot be held by a container")]
    NotLocatable { entity: EntityId },

    /// Operation needs a lock the caller's lock set does not hold
    #[error("Container {token} is not locked by this lock set")]
    NotLocked { token: LockToken },

    /// Source and destination of a move are the same container
    #[error("Cannot move within container {token}")]
    SameContainer { token: LockToken },
}
