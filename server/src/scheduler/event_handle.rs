use std::{
    fmt,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::sync::Notify;

use realm_shared::Entity;

const SCHEDULED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of a delayed action. Both `Fired` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventState {
    Scheduled,
    Fired,
    Cancelled,
}

struct EventData {
    state: AtomicU8,
    cancel: Notify,
    target: Arc<Entity>,
    command: String,
    fire_not_before: Duration,
    fire_not_after: Duration,
}

// EventHandle

/// Handle to one queued delayed action.
///
/// The action's outcome is decided by a single compare-and-swap out of
/// `Scheduled`: whichever of the timer and [`cancel`](Self::cancel) wins,
/// the other becomes a no-op. Cancelling twice, or after the action fired,
/// is safe and returns `false`.
#[derive(Clone)]
pub struct EventHandle {
    data: Arc<EventData>,
}

impl EventHandle {
    pub(crate) fn new(
        target: Arc<Entity>,
        command: String,
        fire_not_before: Duration,
        fire_not_after: Duration,
    ) -> Self {
        Self {
            data: Arc::new(EventData {
                state: AtomicU8::new(SCHEDULED),
                cancel: Notify::new(),
                target,
                command,
                fire_not_before,
                fire_not_after,
            }),
        }
    }

    /// Stops the action if it has not fired yet. Returns whether this call
    /// was the one that cancelled it.
    ///
    /// Cancellation is advisory: it guarantees the script will not run for
    /// this event, not that the background task has already exited.
    pub fn cancel(&self) -> bool {
        if self.transition(CANCELLED) {
            // stores a permit if the task is not yet waiting
            self.data.cancel.notify_one();
            true
        } else {
            false
        }
    }

    pub fn state(&self) -> EventState {
        match self.data.state.load(Ordering::Acquire) {
            SCHEDULED => EventState::Scheduled,
            FIRED => EventState::Fired,
            _ => EventState::Cancelled,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == EventState::Scheduled
    }

    pub fn target(&self) -> &Arc<Entity> {
        &self.data.target
    }

    pub fn command(&self) -> &str {
        &self.data.command
    }

    /// Earliest delay after queueing at which the action may fire.
    pub fn fire_not_before(&self) -> Duration {
        self.data.fire_not_before
    }

    /// Delay after queueing by which the action will have fired, exclusive.
    pub fn fire_not_after(&self) -> Duration {
        self.data.fire_not_after
    }

    pub(crate) fn try_fire(&self) -> bool {
        self.transition(FIRED)
    }

    pub(crate) async fn cancelled(&self) {
        self.data.cancel.notified().await
    }

    fn transition(&self, to: u8) -> bool {
        self.data
            .state
            .compare_exchange(SCHEDULED, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl fmt::Debug for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandle")
            .field("target", &self.data.target.id())
            .field("command", &self.data.command)
            .field("state", &self.state())
            .finish()
    }
}
