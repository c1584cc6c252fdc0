//! Key-label presentation helpers
//!
//! A key label such as `Ctrl + Shift + PageUp` is shown as a row of keycaps
//! with dim dividers in between. Labels wrapped in backticks are a single
//! literal keycap.

use serde::{Deserialize, Serialize};

/// Tokens rendered as separators rather than keycaps
pub const KEY_DIVIDERS: &[&str] = &["+", "/", "&", "or"];

/// Key names rewritten to symbols, applied in this order
const KEY_SYMBOLS: &[(&str, &str)] = &[
    ("Down", "↓"),
    ("Up", "↑"),
    ("Left", "←"),
    ("Right", "→"),
    ("Direction", "←↓↑→"),
    ("PlusMinus", "±"),
    ("Plus", "＋"),
    ("Minus", "−"),
    ("Slash", "/"),
];

/// One rendered piece of a key label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum KeyToken {
    Keycap(String),
    Divider(String),
}

impl KeyToken {
    pub fn text(&self) -> &str {
        match self {
            KeyToken::Keycap(text) | KeyToken::Divider(text) => text,
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, KeyToken::Divider(_))
    }
}

/// Replace key names with their symbol.
///
/// `PageUp` and `PageDown` keep the word and gain a space: `Page ↑`.
pub fn replace_key_names(text: &str) -> String {
    let mut text = if text == "PageUp" || text == "PageDown" {
        text.replacen("Page", "Page ", 1)
    } else {
        text.to_string()
    };
    for (name, symbol) in KEY_SYMBOLS {
        text = text.replace(name, symbol);
    }
    text
}

/// Classify one part of a label, unescaping `\/`, `\+` and `\&` in keycaps
pub fn style_key(text: &str) -> KeyToken {
    if KEY_DIVIDERS.contains(&text) {
        return KeyToken::Divider(text.to_string());
    }
    KeyToken::Keycap(
        text.replace("\\/", "/")
            .replace("\\+", "+")
            .replace("\\&", "&"),
    )
}

/// Split a key label into keycaps and dividers
pub fn tokenize(label: &str) -> Vec<KeyToken> {
    let parts: Vec<String> = if label.starts_with('`') {
        vec![label.replace('`', "")]
    } else {
        label.split_whitespace().map(str::to_string).collect()
    };

    parts
        .iter()
        .map(|part| style_key(&replace_key_names(part.trim())))
        .collect()
}

/// Label as plain text with symbols, keycaps separated by single spaces
pub fn display_label(label: &str) -> String {
    tokenize(label)
        .iter()
        .map(KeyToken::text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_replacement() {
        assert_eq!(replace_key_names("Up"), "↑");
        assert_eq!(replace_key_names("Down"), "↓");
        assert_eq!(replace_key_names("Direction"), "←↓↑→");
        assert_eq!(replace_key_names("PlusMinus"), "±");
        assert_eq!(replace_key_names("Plus"), "＋");
        assert_eq!(replace_key_names("Minus"), "−");
        assert_eq!(replace_key_names("Slash"), "/");
        assert_eq!(replace_key_names("Ctrl"), "Ctrl");
    }

    #[test]
    fn test_page_keys_gain_space() {
        assert_eq!(replace_key_names("PageUp"), "Page ↑");
        assert_eq!(replace_key_names("PageDown"), "Page ↓");
    }

    #[test]
    fn test_tokenize_splits_on_whitespace() {
        assert_eq!(
            tokenize("Ctrl + Shift + t"),
            vec![
                KeyToken::Keycap("Ctrl".into()),
                KeyToken::Divider("+".into()),
                KeyToken::Keycap("Shift".into()),
                KeyToken::Divider("+".into()),
                KeyToken::Keycap("t".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_dividers() {
        let tokens = tokenize("j or Down & k / Up");
        let dividers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is_divider())
            .map(KeyToken::text)
            .collect();
        assert_eq!(dividers, vec!["or", "&", "/"]);
        assert_eq!(tokens[2], KeyToken::Keycap("↓".into()));
    }

    #[test]
    fn test_backtick_label_is_literal() {
        assert_eq!(
            tokenize("`Ctrl + x`"),
            vec![KeyToken::Keycap("Ctrl + x".into())]
        );
    }

    #[test]
    fn test_escaped_dividers_become_keycaps() {
        assert_eq!(
            tokenize("Ctrl + \\+"),
            vec![
                KeyToken::Keycap("Ctrl".into()),
                KeyToken::Divider("+".into()),
                KeyToken::Keycap("+".into()),
            ]
        );
        assert_eq!(tokenize("\\/"), vec![KeyToken::Keycap("/".into())]);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("Alt   +  Left"), "Alt + ←");
    }
}
