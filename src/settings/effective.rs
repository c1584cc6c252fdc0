//! Effective settings with provenance
//!
//! Captures the merged program settings plus where each layer came from.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::assemble::SortMode;

/// Schema version for effective settings output
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "keyhint/effective_settings@1";

/// Origin of a settings layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Typed settings after merge and validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Cheatsheet shown when no match rule matches
    pub fallback_cheatsheet: String,

    /// Default section order
    pub sort_by: SortMode,

    /// Root of the bundled sheets
    pub builtin_dir: PathBuf,

    /// Root of the user override sheets
    pub user_dir: PathBuf,
}

/// Values set on the command line. Unset fields do not override anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_cheatsheet: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_dir: Option<PathBuf>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn to_value(&self) -> Result<toml::Value, SettingsError> {
        toml::Value::try_from(self).map_err(|e| SettingsError::Parse(e.to_string()))
    }
}

/// Merged settings with provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    pub schema_version: u32,
    pub schema_id: String,

    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    pub settings: Settings,

    /// Contributing layers in precedence order
    pub sources: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Build effective settings from defaults, an optional settings file and
    /// CLI overrides. A settings path that does not exist is skipped.
    pub fn build(
        settings_path: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, SettingsError> {
        Self::build_with_defaults(BuiltinDefaults::default(), settings_path, overrides)
    }

    pub fn build_with_defaults(
        defaults: BuiltinDefaults,
        settings_path: Option<&Path>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, SettingsError> {
        let mut layers = vec![defaults.to_value()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = settings_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                tracing::debug!(path = %path.display(), "loaded settings file");
                layers.push(value);
                sources.push(SettingsSource {
                    origin: SettingsOrigin::File,
                    path: Some(path.to_path_buf()),
                    digest: Some(digest),
                });
            } else {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
            }
        }

        if !overrides.is_empty() {
            layers.push(overrides.to_value()?);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let mut merged = merge_layers(layers);
        Self::validate(&mut merged)?;
        let settings =
            Settings::deserialize(merged).map_err(|e| SettingsError::Validation(e.to_string()))?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            settings,
            sources,
        })
    }

    /// Load and parse a TOML file, returning the table and digest
    fn load_toml_file(path: &Path) -> Result<(toml::Value, String), SettingsError> {
        let bytes = fs::read(path).map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| SettingsError::Parse(format!("{}: invalid UTF-8: {}", path.display(), e)))?;
        let table: toml::Table = toml::from_str(&contents)
            .map_err(|e| SettingsError::Parse(format!("{}: {}", path.display(), e)))?;

        Ok((toml::Value::Table(table), digest))
    }

    /// Check the merged layers and rewrite `sort_by` to its canonical name,
    /// so [`SortMode`]'s `FromStr` decides what a settings file may spell.
    fn validate(merged: &mut toml::Value) -> Result<(), SettingsError> {
        match merged.get("fallback_cheatsheet") {
            Some(toml::Value::String(id)) if !id.trim().is_empty() => {}
            _ => {
                return Err(SettingsError::Validation(
                    "fallback_cheatsheet must be a non-empty string".to_string(),
                ))
            }
        }

        match merged.get_mut("sort_by") {
            Some(value) if value.is_str() => {
                let mode = value
                    .as_str()
                    .unwrap_or_default()
                    .parse::<SortMode>()
                    .map_err(|e| SettingsError::Validation(e.to_string()))?;
                *value = toml::Value::String(mode.as_str().to_string());
            }
            _ => {
                return Err(SettingsError::Validation(
                    "sort_by must be one of native, size, title".to_string(),
                ))
            }
        }

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
