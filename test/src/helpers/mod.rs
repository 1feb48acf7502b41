
pub use entity_builder::{fixture, player, room, thing, TestEntityBuilder};
pub use recording_script::RecordingScript;

/// Routes `log` output through the test harness. Safe to call repeatedly.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
