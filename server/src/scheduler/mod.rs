mod event_handle;
mod scheduler;
mod script;

pub use event_handle::{EventHandle, EventState};
pub use scheduler::Scheduler;
pub use script::Script;
