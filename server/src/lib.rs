//! # Realm Server
//! Runs delayed actions against realm-shared entities on an async runtime,
//! and ties the world model, the attribute registry and the scheduler
//! together behind a [`WorldServer`].

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use realm_shared::{
        Attribute, AttributeRegistry, Container, ContainerGuard, Entity, EntityId, LockSet,
        Partition, TaggedField,
    };
}

mod error;
mod schedule;
mod scheduler;
mod server;

pub use error::{RealmServerError, SchedulerError};
pub use schedule::Schedule;
pub use scheduler::{EventHandle, EventState, Scheduler, Script};
pub use server::{WorldConfig, WorldServer};
