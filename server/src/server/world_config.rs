use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the [`WorldServer`](crate::WorldServer)
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Number of enabled players at which a location counts as crowded
    pub crowd_size: usize,
    /// Worker threads for the runtime built by `WorldServer::new`
    pub worker_threads: usize,
    /// Minimum delay used by `WorldServer::queue_default`
    pub default_after: Duration,
    /// Random spread added on top of `default_after`
    pub default_jitter: Duration,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            crowd_size: 10,
            worker_threads: 2,
            default_after: Duration::from_secs(60),
            default_jitter: Duration::from_secs(30),
        }
    }
}
