//! Settings layer merge
//!
//! - Tables: merged key by key, recursively
//! - Arrays: replaced by the later layer
//! - Scalars: replaced by the later layer

use toml::Value;

/// Merge `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Table(mut table), Value::Table(overlay)) => {
            for (key, value) in overlay {
                let merged = match table.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// Fold layers lowest precedence first
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    layers
        .into_iter()
        .fold(Value::Table(toml::Table::new()), deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        Value::Table(toml::from_str(s).unwrap())
    }

    #[test]
    fn test_later_scalar_wins() {
        let merged = deep_merge(parse("sort_by = \"size\""), parse("sort_by = \"title\""));
        assert_eq!(merged["sort_by"].as_str(), Some("title"));
    }

    #[test]
    fn test_tables_merge_by_key() {
        let merged = deep_merge(
            parse("[paths]\nbuiltin = \"/a\"\nuser = \"/b\""),
            parse("[paths]\nuser = \"/c\""),
        );
        assert_eq!(merged["paths"]["builtin"].as_str(), Some("/a"));
        assert_eq!(merged["paths"]["user"].as_str(), Some("/c"));
    }

    #[test]
    fn test_arrays_replace() {
        let merged = deep_merge(parse("ids = [\"a\", \"b\"]"), parse("ids = [\"c\"]"));
        assert_eq!(merged["ids"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_merge_layers_in_order() {
        let merged = merge_layers(vec![
            parse("fallback_cheatsheet = \"keyhint\"\nsort_by = \"size\""),
            parse("sort_by = \"native\""),
            parse("fallback_cheatsheet = \"vscode\""),
        ]);
        assert_eq!(merged["fallback_cheatsheet"].as_str(), Some("vscode"));
        assert_eq!(merged["sort_by"].as_str(), Some("native"));
    }

    #[test]
    fn test_no_layers_is_empty_table() {
        let merged = merge_layers(Vec::new());
        assert_eq!(merged.as_table().map(|t| t.len()), Some(0));
    }
}
