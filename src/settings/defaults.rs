//! Built-in settings defaults (lowest layer)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assemble::SortMode;

/// Default fallback cheatsheet id
pub const DEFAULT_FALLBACK: &str = "keyhint";

/// Directory name under the user config dir, also the settings file stem
pub const APP_NAME: &str = "keyhint";

/// Sheets bundled with the program. A packager can point this elsewhere by
/// setting `KEYHINT_BUILTIN_DIR` at build time.
pub fn bundled_sheets_dir() -> PathBuf {
    match option_env!("KEYHINT_BUILTIN_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sheets"),
    }
}

/// Base config directory, `$XDG_CONFIG_HOME` or platform equivalent
pub fn config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `<config_dir>/keyhint.toml`
pub fn default_settings_path() -> PathBuf {
    config_dir().join(format!("{}.toml", APP_NAME))
}

/// `<config_dir>/keyhint/`
pub fn default_user_dir() -> PathBuf {
    config_dir().join(APP_NAME)
}

/// Built-in default values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    pub fallback_cheatsheet: String,
    pub sort_by: SortMode,
    pub builtin_dir: PathBuf,
    pub user_dir: PathBuf,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            fallback_cheatsheet: DEFAULT_FALLBACK.to_string(),
            sort_by: SortMode::default(),
            builtin_dir: bundled_sheets_dir(),
            user_dir: default_user_dir(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a TOML table for merging
    pub fn to_value(&self) -> toml::Value {
        let mut table = toml::Table::new();
        table.insert(
            "fallback_cheatsheet".to_string(),
            toml::Value::String(self.fallback_cheatsheet.clone()),
        );
        table.insert(
            "sort_by".to_string(),
            toml::Value::String(self.sort_by.as_str().to_string()),
        );
        table.insert(
            "builtin_dir".to_string(),
            toml::Value::String(self.builtin_dir.to_string_lossy().into_owned()),
        );
        table.insert(
            "user_dir".to_string(),
            toml::Value::String(self.user_dir.to_string_lossy().into_owned()),
        );
        toml::Value::Table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.fallback_cheatsheet, "keyhint");
        assert_eq!(defaults.sort_by, SortMode::Size);
        assert!(defaults.user_dir.ends_with("keyhint"));
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["fallback_cheatsheet"].as_str(), Some("keyhint"));
        assert_eq!(value["sort_by"].as_str(), Some("size"));
        assert!(value["builtin_dir"].as_str().is_some());
    }

    #[test]
    fn test_settings_file_name() {
        assert!(default_settings_path().ends_with("keyhint.toml"));
    }
}
