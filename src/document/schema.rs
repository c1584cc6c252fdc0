//! Document schema versioning
//!
//! Field names are part of the on-disk contract. Version 1 used
//! `match.regex_process`, `source` and `hints`; version 2 renamed them to
//! `match.regex_wmclass`, `url` and `section`. Version 1 files, and files
//! with no `schema_version`, are migrated in place on load. A file declaring
//! version 2 must use the current names.

use std::path::Path;

use crate::error::SheetError;

/// Current document schema version
pub const SCHEMA_VERSION: u32 = 2;

/// Schema identifier
pub const SCHEMA_ID: &str = "keyhint/sheet@2";

/// Top-level renames from schema 1
const TOP_LEVEL_RENAMES: &[(&str, &str)] = &[("source", "url"), ("hints", "section")];

/// Renames inside the `[match]` table from schema 1
const MATCH_RENAMES: &[(&str, &str)] = &[("regex_process", "regex_wmclass")];

/// A legacy field that was rewritten during load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub from: String,
    pub to: String,
}

/// Check the declared schema version and rewrite legacy field names.
///
/// When both the legacy and the current name are present the current name
/// wins and the legacy value is discarded.
pub fn migrate(table: &mut toml::Table, path: &Path) -> Result<Vec<Migration>, SheetError> {
    let declared = match table.get("schema_version") {
        None => None,
        Some(toml::Value::Integer(v)) if *v >= 1 && *v <= SCHEMA_VERSION as i64 => {
            u32::try_from(*v).ok()
        }
        Some(toml::Value::Integer(v)) if *v > SCHEMA_VERSION as i64 => {
            return Err(SheetError::UnsupportedSchemaVersion {
                path: path.to_path_buf(),
                found: u32::try_from(*v).unwrap_or(u32::MAX),
                supported: SCHEMA_VERSION,
            });
        }
        Some(other) => {
            return Err(SheetError::MalformedDocument {
                path: path.to_path_buf(),
                reason: format!("schema_version must be a positive integer, got {}", other),
            });
        }
    };

    if declared == Some(SCHEMA_VERSION) {
        if let Some((from, to)) = legacy_fields(table).into_iter().next() {
            return Err(SheetError::MalformedDocument {
                path: path.to_path_buf(),
                reason: format!(
                    "field '{}' is not part of schema_version {}, use '{}'",
                    from, SCHEMA_VERSION, to
                ),
            });
        }
        return Ok(Vec::new());
    }

    let mut migrations = rename_keys(table, TOP_LEVEL_RENAMES, "");

    if let Some(toml::Value::Table(match_table)) = table.get_mut("match") {
        migrations.extend(rename_keys(match_table, MATCH_RENAMES, "match."));
    }

    for migration in &migrations {
        tracing::warn!(
            path = %path.display(),
            "legacy field '{}' is deprecated, use '{}'",
            migration.from,
            migration.to
        );
    }

    Ok(migrations)
}

/// Schema 1 names present in `table`, as `(legacy, current)` pairs
fn legacy_fields(table: &toml::Table) -> Vec<(String, String)> {
    let mut found: Vec<(String, String)> = TOP_LEVEL_RENAMES
        .iter()
        .filter(|(from, _)| table.contains_key(*from))
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

    if let Some(toml::Value::Table(match_table)) = table.get("match") {
        found.extend(
            MATCH_RENAMES
                .iter()
                .filter(|(from, _)| match_table.contains_key(*from))
                .map(|(from, to)| (format!("match.{}", from), format!("match.{}", to))),
        );
    }

    found
}

fn rename_keys(
    table: &mut toml::Table,
    renames: &[(&str, &str)],
    prefix: &str,
) -> Vec<Migration> {
    let mut migrations = Vec::new();
    for &(from, to) in renames {
        if let Some(value) = table.remove(from) {
            if !table.contains_key(to) {
                table.insert(to.to_string(), value);
            }
            migrations.push(Migration {
                from: format!("{}{}", prefix, from),
                to: format!("{}{}", prefix, to),
            });
        }
    }
    migrations
}
