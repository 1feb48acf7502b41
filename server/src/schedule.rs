use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use log::warn;

use realm_shared::{
    Attribute, AttributeKind, AttributeOwner, Capability, FieldError, NullCapability,
    TaggedField,
};

use crate::scheduler::{EventHandle, Scheduler};

// Schedule

/// Recurring-capable delayed action carried by an entity, such as a respawn
/// or a decay. The template (command and delay window) survives copying; a
/// pending event never does.
#[derive(Debug)]
pub struct Schedule {
    owner: AttributeOwner,
    command: String,
    after: Duration,
    jitter: Duration,
    pending: Mutex<Option<EventHandle>>,
}

impl Schedule {
    pub const TAG: &'static str = "schedule";

    pub fn new(command: impl Into<String>, after: Duration, jitter: Duration) -> Arc<Self> {
        Arc::new(Self {
            owner: AttributeOwner::new(),
            command: command.into(),
            after,
            jitter,
            pending: Mutex::new(None),
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn after(&self) -> Duration {
        self.after
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Queues the action against the owning entity, replacing any event
    /// still pending. Returns `None` if the attribute has no owner.
    pub fn start(&self, scheduler: &Scheduler) -> Option<EventHandle> {
        let Some(owner) = self.owner() else {
            warn!("Schedule `{}` started without an owner", self.command);
            return None;
        };

        let mut pending = self.pending_slot();
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        let event = scheduler.queue(owner, self.command.clone(), self.after, self.jitter);
        *pending = Some(event.clone());
        Some(event)
    }

    /// Cancels the pending event, if any. Returns whether one was stopped.
    pub fn abort(&self) -> bool {
        self.pending_slot()
            .take()
            .map_or(false, |event| event.cancel())
    }

    pub fn is_pending(&self) -> bool {
        self.pending_slot()
            .as_ref()
            .map_or(false, EventHandle::is_pending)
    }

    pub(crate) fn construct(field: &TaggedField) -> Result<Arc<dyn Attribute>, FieldError> {
        let [command, after, jitter] = field.values.as_slice() else {
            return Err(FieldError::InvalidValue {
                tag: field.tag.clone(),
                reason: format!(
                    "expected command, delay and jitter, found {} values",
                    field.values.len()
                ),
            });
        };
        let after = parse_millis(&field.tag, after)?;
        let jitter = parse_millis(&field.tag, jitter)?;
        Ok(Self::new(command.clone(), after, jitter))
    }

    fn pending_slot(&self) -> MutexGuard<'_, Option<EventHandle>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_millis(tag: &str, value: &str) -> Result<Duration, FieldError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|err| FieldError::InvalidValue {
            tag: tag.to_string(),
            reason: format!("`{}` is not a millisecond count: {}", value, err),
        })
}

impl Attribute for Schedule {
    fn kind(&self) -> AttributeKind {
        Self::KIND
    }

    fn owner_slot(&self) -> &AttributeOwner {
        &self.owner
    }

    fn copy(&self) -> Arc<dyn Attribute> {
        Self::new(self.command.clone(), self.after, self.jitter)
    }

    fn free(&self) {
        self.abort();
    }

    fn describe(&self) -> Option<TaggedField> {
        Some(TaggedField::new(
            Self::TAG,
            [
                self.command.clone(),
                self.after.as_millis().to_string(),
                self.jitter.as_millis().to_string(),
            ],
        ))
    }
}

impl Capability for Schedule {
    const KIND: AttributeKind = AttributeKind::new("schedule");
}

impl NullCapability for Schedule {
    fn null() -> Arc<Self> {
        Self::new("", Duration::ZERO, Duration::ZERO)
    }
}
