pub mod container;
pub mod error;
pub mod guard;
pub mod lock_set;
pub mod partitions;
