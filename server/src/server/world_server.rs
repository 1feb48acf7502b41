use std::{fmt, sync::Arc};

use log::{debug, info};
use tokio::runtime::{Builder, Handle, Runtime};

use realm_shared::{
    AttributeRegistry, Container, ContainerError, ContainerGuard, Entity, Partition,
};

use crate::{
    error::{RealmServerError, SchedulerError},
    schedule::Schedule,
    scheduler::{EventHandle, Scheduler},
    WorldConfig,
};

/// Ties the shared world model to a scheduler and the attribute registry
/// used to rebuild entities from stored fields.
pub struct WorldServer {
    config: WorldConfig,
    registry: AttributeRegistry,
    scheduler: Scheduler,
    // Only set when the server built its own runtime
    runtime: Option<Runtime>,
}

impl WorldServer {
    /// Create a new WorldServer running its scheduler on a dedicated
    /// multi-threaded runtime.
    pub fn new(config: WorldConfig) -> Result<Self, RealmServerError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.max(1))
            .thread_name("realm-scheduler")
            .enable_time()
            .build()?;
        info!(
            "World server started with {} scheduler threads",
            config.worker_threads.max(1)
        );

        let mut server = Self::with_handle(config, runtime.handle().clone());
        server.runtime = Some(runtime);
        Ok(server)
    }

    /// Create a new WorldServer scheduling onto an existing runtime.
    pub fn with_handle(config: WorldConfig, handle: Handle) -> Self {
        let mut registry = AttributeRegistry::with_defaults();
        registry.register(Schedule::TAG, Schedule::construct);

        Self {
            config,
            registry,
            scheduler: Scheduler::new(handle),
            runtime: None,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AttributeRegistry {
        &mut self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn install_script<F>(&self, script: F) -> Result<(), SchedulerError>
    where
        F: Fn(&Arc<Entity>, &str) + Send + Sync + 'static,
    {
        self.scheduler.install_script(script)
    }

    /// Queues `command` against `target` using the configured delay window.
    pub fn queue_default(&self, target: Arc<Entity>, command: impl Into<String>) -> EventHandle {
        self.scheduler.queue(
            target,
            command,
            self.config.default_after,
            self.config.default_jitter,
        )
    }

    /// Adds `entity` to `container`, enables it, and starts its schedule if
    /// it carries one.
    pub fn place(
        &self,
        entity: Arc<Entity>,
        container: &Container,
    ) -> Result<Partition, ContainerError> {
        let partition = {
            let mut guard = container.lock()?;
            let id = entity.id();
            guard.add(entity.clone())?;
            guard.enable(&id)?
        };

        if let Some(schedule) = entity.attribute::<Schedule>() {
            schedule.start(&self.scheduler);
        }
        debug!("Placed {} into {} as {:?}", entity.id(), container.token(), partition);
        Ok(partition)
    }

    /// Whether a locked container holds at least `crowd_size` enabled players.
    pub fn is_crowded(&self, guard: &ContainerGuard<'_>) -> bool {
        guard.crowded(self.config.crowd_size)
    }

    /// Stops the owned runtime without waiting for queued actions.
    pub fn shutdown(mut self) {
        self.stop_runtime();
    }

    fn stop_runtime(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            info!(
                "World server stopping with {} pending actions",
                self.scheduler.pending()
            );
            runtime.shutdown_background();
        }
    }
}

impl Drop for WorldServer {
    fn drop(&mut self) {
        // Dropping a Runtime blocks, which panics inside async contexts
        self.stop_runtime();
    }
}

impl fmt::Debug for WorldServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldServer")
            .field("config", &self.config)
            .field("pending", &self.scheduler.pending())
            .field("owns_runtime", &self.runtime.is_some())
            .finish()
    }
}
