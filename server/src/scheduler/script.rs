use std::sync::{Arc, OnceLock};

use log::warn;

use realm_shared::Entity;

use crate::error::SchedulerError;

/// Callback run when a delayed action fires, receiving the target entity and
/// the queued command. Installed late so the scheduler never depends on the
/// command-interpretation layer it calls into.
pub type Script = dyn Fn(&Arc<Entity>, &str) + Send + Sync;

// ScriptSlot
#[derive(Clone, Default)]
pub(crate) struct ScriptSlot {
    script: Arc<OnceLock<Box<Script>>>,
}

impl ScriptSlot {
    pub(crate) fn install<F>(&self, script: F) -> Result<(), SchedulerError>
    where
        F: Fn(&Arc<Entity>, &str) + Send + Sync + 'static,
    {
        self.script
            .set(Box::new(script))
            .map_err(|_| SchedulerError::ScriptAlreadyInstalled)
    }

    pub(crate) fn is_installed(&self) -> bool {
        self.script.get().is_some()
    }

    /// Runs the script, returning `false` if none is installed yet.
    pub(crate) fn run(&self, target: &Arc<Entity>, command: &str) -> bool {
        match self.script.get() {
            Some(script) => {
                script(target, command);
                true
            }
            None => {
                warn!(
                    "Dropping `{}` for {}: no script installed",
                    command,
                    target.id()
                );
                false
            }
        }
    }
}
