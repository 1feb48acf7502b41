mod world_config;
mod world_server;

pub use world_config::WorldConfig;
pub use world_server::WorldServer;
