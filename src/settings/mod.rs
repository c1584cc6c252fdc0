//! Program settings
//!
//! Three layers, later wins:
//! 1. Built-in defaults
//! 2. Settings file (`<config_dir>/keyhint.toml`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{
    bundled_sheets_dir, default_settings_path, default_user_dir, BuiltinDefaults, DEFAULT_FALLBACK,
};
pub use effective::{
    EffectiveSettings, Settings, SettingsError, SettingsOrigin, SettingsOverrides, SettingsSource,
};
pub use merge::{deep_merge, merge_layers};
