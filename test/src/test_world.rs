use std::sync::Arc;

use log::{debug, warn};
use tokio::runtime::Handle;

use realm_server::{RealmServerError, WorldConfig, WorldServer};
use realm_shared::{Container, ContainerError, Entity, LockSet, Locate};

use crate::helpers::room;

/// Command that sends an entity back to where it was first placed
pub const RESPAWN: &str = "respawn";

// Racing movers can shift an entity between reading its location and locking it
const RESPAWN_ATTEMPTS: usize = 8;

/// A handful of rooms driven by a world server whose script understands
/// [`RESPAWN`]
pub struct TestWorld {
    server: WorldServer,
    rooms: Vec<(Arc<Entity>, Arc<Container>)>,
}

impl TestWorld {
    pub fn new(config: WorldConfig, rooms: usize) -> Result<Self, RealmServerError> {
        Self::from_server(WorldServer::new(config)?, rooms)
    }

    pub fn with_handle(
        config: WorldConfig,
        handle: Handle,
        rooms: usize,
    ) -> Result<Self, RealmServerError> {
        Self::from_server(WorldServer::with_handle(config, handle), rooms)
    }

    fn from_server(server: WorldServer, rooms: usize) -> Result<Self, RealmServerError> {
        server.install_script(respawn)?;
        let rooms = (0..rooms).map(|index| room(&format!("room {}", index))).collect();
        Ok(Self { server, rooms })
    }

    pub fn server(&self) -> &WorldServer {
        &self.server
    }

    pub fn room(&self, index: usize) -> &Arc<Container> {
        &self.rooms[index].1
    }

    pub fn room_entity(&self, index: usize) -> &Arc<Entity> {
        &self.rooms[index].0
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Members across every room, counted under one lock set so no move can
    /// be seen halfway.
    pub fn total_members(&self) -> Result<usize, ContainerError> {
        let containers: Vec<&Container> = self.rooms.iter().map(|(_, c)| c.as_ref()).collect();
        let locks = LockSet::acquire(&containers)?;
        let mut total = 0;
        for (_, container) in &self.rooms {
            total += locks.get(container.token())?.len();
        }
        Ok(total)
    }

    pub fn shutdown(self) {
        self.server.shutdown();
    }
}

/// Script body for [`RESPAWN`]: moves the entity back into its origin.
pub fn respawn(entity: &Arc<Entity>, command: &str) {
    if command != RESPAWN {
        debug!("Ignoring `{}` for {}", command, entity.id());
        return;
    }

    let locate = entity.capability::<Locate>();
    let Some(origin) = locate.origin() else {
        warn!("{} has no origin to respawn into", entity.id());
        return;
    };

    for _ in 0..RESPAWN_ATTEMPTS {
        let Some(location) = locate.location() else {
            warn!("{} is nowhere, not respawning", entity.id());
            return;
        };
        if Arc::ptr_eq(&location, &origin) {
            return;
        }
        match location.move_entity(&entity.id(), &origin) {
            Ok(_) => {
                debug!("Respawned {} into {}", entity.id(), origin.token());
                return;
            }
            Err(ContainerError::NotMember { .. }) => continue,
            Err(error) => {
                warn!("Failed to respawn {}: {}", entity.id(), error);
                return;
            }
        }
    }
    warn!("Gave up respawning {}", entity.id());
}
