pub mod helpers;
pub mod test_world;

pub use helpers::*;
pub use test_world::{TestWorld, RESPAWN};
