// Correspondence settings documents: model and persistence

pub mod store;
pub mod types;

pub use store::{SETTINGS_EXTENSION, has_settings, load_settings, save_settings, settings_path};
pub use types::{RegionRecord, SETTINGS_VERSION, SettingsDocument};
