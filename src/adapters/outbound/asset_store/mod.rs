pub mod file_system;

use crate::adapters::outbound::asset_store::file_system::FileSystem;
use crate::config::Config;

#[must_use]
pub fn init_asset_store(config: &Config) -> FileSystem {
    FileSystem::new(config.data_dir.clone())
}
