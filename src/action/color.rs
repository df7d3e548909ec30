use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;

/// Color field of a draw action as stored in the log.
///
/// Anything that is not a string is kept as-is and resolves to black when drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Other(serde_json::Value),
}

impl ColorSpec {
    pub fn hex(s: impl Into<String>) -> Self {
        Self::Hex(s.into())
    }

    /// Resolve to RGB, falling back to black for anything unparseable.
    pub fn resolve(&self) -> Rgb8 {
        match self {
            Self::Hex(s) => parse_hex_lenient(s),
            Self::Other(_) => Rgb8::BLACK,
        }
    }
}

/// Parse `#RGB` / `#RRGGBB` (the `#` is optional).
pub fn parse_hex(s: &str) -> Option<Rgb8> {
    let s = s.trim_start_matches('#');
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&s[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        3 => {
            let r = nibble(0)?;
            let g = nibble(1)?;
            let b = nibble(2)?;
            Some(Rgb8::new(r * 17, g * 17, b * 17))
        }
        6 => Some(Rgb8::new(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

/// Like [`parse_hex`], but malformed input is black instead of an error.
pub fn parse_hex_lenient(s: &str) -> Rgb8 {
    parse_hex(s).unwrap_or(Rgb8::BLACK)
}

#[cfg(test)]
#[path = "../../tests/unit/action/color.rs"]
mod tests;
