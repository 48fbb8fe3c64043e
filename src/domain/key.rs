//! Key model: the typed value stored in every tree node.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Numeric keys must lie strictly above this bound.
pub const LOWER_BOUND: i16 = -10000;
/// Numeric keys must lie strictly below this bound.
pub const UPPER_BOUND: i16 = 10000;
/// Maximum number of characters in a text key.
pub const MAX_TEXT_LEN: usize = 4;
/// Token reserved for the sentinel in the stream formats.
pub const NIL_TOKEN: &str = "NIL";

/// The kind of key a tree holds. Fixed for the lifetime of a non-empty tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    #[default]
    #[serde(alias = "n", alias = "N", alias = "int", alias = "integer")]
    Number,
    #[serde(alias = "t", alias = "T")]
    Text,
    #[serde(alias = "c", alias = "C")]
    Char,
}

impl KeyKind {
    /// Single-character tag used by every file format.
    pub fn tag(self) -> char {
        match self {
            KeyKind::Number => 'N',
            KeyKind::Text => 'T',
            KeyKind::Char => 'C',
        }
    }

    /// Parse a tag character, case-insensitively.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag.to_ascii_uppercase() {
            'N' => Some(KeyKind::Number),
            'T' => Some(KeyKind::Text),
            'C' => Some(KeyKind::Char),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::Number => "number",
            KeyKind::Text => "text",
            KeyKind::Char => "char",
        };
        f.write_str(name)
    }
}

impl FromStr for KeyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(kind) = KeyKind::from_tag(c) {
                return Ok(kind);
            }
        }
        match s.to_ascii_lowercase().as_str() {
            "number" | "int" | "integer" => Ok(KeyKind::Number),
            "text" => Ok(KeyKind::Text),
            "char" => Ok(KeyKind::Char),
            _ => Err(DomainError::UnknownKeyKind(s.to_string())),
        }
    }
}

/// A node key: closed sum over the three supported kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Integer(i16),
    Text(String),
    Char(char),
}

impl Key {
    /// Convert raw input into a key of the given kind, enforcing the
    /// kind-specific bounds. Shared by interactive input and every codec.
    pub fn parse(kind: KeyKind, raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: String| DomainError::InvalidKey {
            kind,
            value: raw.to_string(),
            reason,
        };

        match kind {
            KeyKind::Number => {
                let value: i16 = raw.trim().parse().map_err(|_| {
                    invalid(format!(
                        "number must be between {} and {}",
                        LOWER_BOUND, UPPER_BOUND
                    ))
                })?;
                if value <= LOWER_BOUND || value >= UPPER_BOUND {
                    return Err(invalid(format!(
                        "number must be between {} and {}",
                        LOWER_BOUND, UPPER_BOUND
                    )));
                }
                Ok(Key::Integer(value))
            }
            KeyKind::Text => {
                let len = raw.chars().count();
                if len == 0 {
                    return Err(invalid("text must not be empty".into()));
                }
                if len > MAX_TEXT_LEN {
                    return Err(invalid(format!(
                        "text must be less than {} characters",
                        MAX_TEXT_LEN + 1
                    )));
                }
                if raw.chars().any(char::is_whitespace) {
                    return Err(invalid("text must not contain whitespace".into()));
                }
                if raw == NIL_TOKEN {
                    return Err(invalid(format!("'{}' is reserved", NIL_TOKEN)));
                }
                Ok(Key::Text(raw.to_string()))
            }
            KeyKind::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_whitespace() => Ok(Key::Char(c)),
                    (Some(_), None) => Err(invalid("character must not be whitespace".into())),
                    _ => Err(invalid("character length must be 1".into())),
                }
            }
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Integer(_) => KeyKind::Number,
            Key::Text(_) => KeyKind::Text,
            Key::Char(_) => KeyKind::Char,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Integer(_) => 0,
            Key::Text(_) => 1,
            Key::Char(_) => 2,
        }
    }
}

/// Locale-aware ordering for text: case-folded comparison first, exact code
/// points as the tie-break so that only identical strings compare equal.
fn collate<I, J>(a: I, b: J) -> Ordering
where
    I: Iterator<Item = char> + Clone,
    J: Iterator<Item = char> + Clone,
{
    let folded = a
        .clone()
        .flat_map(char::to_lowercase)
        .cmp(b.clone().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Integer(a), Key::Integer(b)) => a.cmp(b),
            (Key::Text(a), Key::Text(b)) => collate(a.chars(), b.chars()),
            (Key::Char(a), Key::Char(b)) => {
                collate(std::iter::once(*a), std::iter::once(*b))
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Integer(v) => write!(f, "{}", v),
            Key::Text(v) => f.write_str(v),
            Key::Char(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Key::Integer(0))]
    #[case("9999", Key::Integer(9999))]
    #[case("-9999", Key::Integer(-9999))]
    #[case(" 42 ", Key::Integer(42))]
    fn given_number_in_range_when_parsing_then_accepts(#[case] raw: &str, #[case] expected: Key) {
        assert_eq!(Key::parse(KeyKind::Number, raw).unwrap(), expected);
    }

    #[rstest]
    #[case("10000")]
    #[case("-10000")]
    #[case("40000")]
    #[case("abc")]
    #[case("")]
    fn given_number_out_of_range_when_parsing_then_rejects(#[case] raw: &str) {
        let err = Key::parse(KeyKind::Number, raw).unwrap_err();
        assert!(err.to_string().contains("between -10000 and 10000"));
    }

    #[rstest]
    #[case(KeyKind::Text, "abcd", true)]
    #[case(KeyKind::Text, "abcde", false)]
    #[case(KeyKind::Text, "", false)]
    #[case(KeyKind::Text, "a b", false)]
    #[case(KeyKind::Text, "NIL", false)]
    #[case(KeyKind::Text, "äöüß", true)]
    #[case(KeyKind::Char, "x", true)]
    #[case(KeyKind::Char, "xy", false)]
    #[case(KeyKind::Char, "", false)]
    #[case(KeyKind::Char, " ", false)]
    fn given_text_input_when_parsing_then_enforces_bounds(
        #[case] kind: KeyKind,
        #[case] raw: &str,
        #[case] ok: bool,
    ) {
        assert_eq!(Key::parse(kind, raw).is_ok(), ok, "{kind} {raw:?}");
    }

    #[test]
    fn given_integers_when_comparing_then_uses_numeric_order() {
        assert!(Key::Integer(-5) < Key::Integer(3));
        assert!(Key::Integer(10) > Key::Integer(9));
    }

    #[test]
    fn given_mixed_case_text_when_comparing_then_folds_case_first() {
        let a = Key::Text("apple".into());
        let b = Key::Text("Banana".into());
        assert!(a < b, "case-folded order puts apple before Banana");
        assert!(Key::Text("B".into()) < Key::Text("b".into()));
        assert_ne!(
            Key::Text("B".into()).cmp(&Key::Text("b".into())),
            Ordering::Equal
        );
    }

    #[test]
    fn given_chars_when_comparing_then_uses_same_collation() {
        assert!(Key::Char('a') < Key::Char('B'));
        assert_eq!(Key::Char('q').cmp(&Key::Char('q')), Ordering::Equal);
    }

    #[rstest]
    #[case("n", KeyKind::Number)]
    #[case("T", KeyKind::Text)]
    #[case("char", KeyKind::Char)]
    #[case("Number", KeyKind::Number)]
    fn given_kind_names_when_parsing_then_resolves(#[case] raw: &str, #[case] kind: KeyKind) {
        assert_eq!(raw.parse::<KeyKind>().unwrap(), kind);
    }

    #[test]
    fn given_unknown_kind_tag_when_parsing_then_fails() {
        assert!("x".parse::<KeyKind>().is_err());
        assert_eq!(KeyKind::from_tag('z'), None);
    }
}
