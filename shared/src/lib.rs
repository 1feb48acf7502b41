//! # Realm Shared
//! World-state core shared by realm-server and its collaborators: entities
//! composed of attributes, lockable containers with a global lock order, and
//! the process-wide identity and lock-token allocators.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod allocator;
mod sync;
mod types;
mod world;

pub use allocator::{next_entity_id, next_lock_token, observe_entity_id, SequenceAllocator};
pub use types::{EntityId, IdParseError, LockToken};
pub use world::{
    attribute::{
        attribute::{
            AsAnyArc, Attribute, AttributeKind, AttributeOwner, Capability, NullCapability,
        },
        descriptive::{Alias, Description, Name},
        error::{AttributeError, FieldError},
        field::{AttributeConstructor, AttributeRegistry, TaggedField},
        locate::Locate,
        markers::{Narrative, Player},
    },
    container::{
        container::Container,
        error::ContainerError,
        guard::ContainerGuard,
        lock_set::{LockSet, Relock},
        partitions::{NodeKey, Partition},
    },
    entity::Entity,
};
