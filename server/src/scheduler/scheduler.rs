use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, trace};
use tokio::{runtime::Handle, time::Instant};

use realm_shared::Entity;

use super::{event_handle::EventHandle, script::ScriptSlot};
use crate::error::SchedulerError;

/// Queues delayed actions against entities on an async runtime.
///
/// Each queued action fires once, at a delay drawn uniformly from
/// `[after, after + jitter)`, by handing its target and command to the
/// installed script. Cloning a `Scheduler` shares the script and the pending
/// count.
#[derive(Clone)]
pub struct Scheduler {
    handle: Handle,
    script: ScriptSlot,
    pending: Arc<AtomicUsize>,
}

impl Scheduler {
    /// Creates a scheduler spawning its timers on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            script: ScriptSlot::default(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Binds the callback run when actions fire. May only be done once.
    pub fn install_script<F>(&self, script: F) -> Result<(), SchedulerError>
    where
        F: Fn(&Arc<Entity>, &str) + Send + Sync + 'static,
    {
        self.script.install(script)?;
        debug!("Scheduler script installed");
        Ok(())
    }

    pub fn has_script(&self) -> bool {
        self.script.is_installed()
    }

    /// Queues `command` to run against `target` once the delay elapses.
    pub fn queue(
        &self,
        target: Arc<Entity>,
        command: impl Into<String>,
        after: Duration,
        jitter: Duration,
    ) -> EventHandle {
        let deadline = Instant::now() + delay_of(after, jitter_offset(jitter));
        let event = EventHandle::new(target, command.into(), after, after.saturating_add(jitter));

        trace!(
            "Queued `{}` for {} in [{:?}, {:?})",
            event.command(),
            event.target().id(),
            event.fire_not_before(),
            event.fire_not_after()
        );

        let task_event = event.clone();
        let script = self.script.clone();
        let pending = PendingGuard::enter(&self.pending);

        self.handle.spawn(async move {
            let _pending = pending;
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    if task_event.try_fire() {
                        script.run(task_event.target(), task_event.command());
                    }
                }
                _ = task_event.cancelled() => {
                    trace!(
                        "Cancelled `{}` for {}",
                        task_event.command(),
                        task_event.target().id()
                    );
                }
            }
        });

        event
    }

    /// Number of queued actions whose task has not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

// Keeps the pending count right even if the script panics
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn enter(pending: &Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::AcqRel);
        Self(pending.clone())
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Delays are capped here before they reach the timer; anything longer is
/// indistinguishable from "never" and would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn delay_of(after: Duration, offset: Duration) -> Duration {
    after.saturating_add(offset).min(FAR_FUTURE)
}

/// Draws the random part of a delay from `[0, jitter)`. Whole milliseconds
/// are used when possible so the timer wheel never rounds past the window.
fn jitter_offset(jitter: Duration) -> Duration {
    let millis = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
    if millis > 0 {
        return Duration::from_millis(fastrand::u64(0..millis));
    }
    match u64::from(jitter.subsec_nanos()) {
        0 => Duration::ZERO,
        nanos => Duration::from_nanos(fastrand::u64(0..nanos)),
    }
}
