pub mod data;
pub mod reading;
pub mod report;
pub mod setup;
pub mod system;

use crate::cli::registry::{CommandRegistry, Topic};

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(Topic::Contract, setup::definitions());
    registry.register(Topic::Readings, reading::definitions());
    registry.register(Topic::Reports, report::definitions());
    registry.register(Topic::Data, data::definitions());
    registry.register(Topic::Shell, system::definitions());
}
