use thiserror::Error;

use realm_shared::ContainerError;

/// Errors that can occur while configuring the delayed-action scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The script callback is bound once per scheduler
    #[error("A script callback is already installed on this scheduler")]
    ScriptAlreadyInstalled,
}

/// Errors surfaced by [`WorldServer`](crate::WorldServer)
#[derive(Debug, Error)]
pub enum RealmServerError {
    /// The async runtime backing the scheduler could not be built
    #[error("Failed to build async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Container(#[from] ContainerError),
}
