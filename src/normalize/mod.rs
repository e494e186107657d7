//! Query text normalization.
//!
//! [`normalize`] is the standard cleanup applied before embedding: trim, collapse
//! whitespace runs to a single ASCII space, drop control characters. It is total and
//! idempotent.
//!
//! [`normalize_aggressive`] additionally lowercases and strips punctuation (except
//! question marks). The two are separate functions; [`NormalizeMode`] picks one.

#[cfg(test)]
mod tests;

use std::str::FromStr;

/// Cleans raw query text.
///
/// Empty and all-whitespace input both normalize to `""`.
pub fn normalize(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let stripped: String = collapsed
        .chars()
        .filter(|c| !is_stripped_control(*c))
        .collect();

    // Removing a control char can leave two spaces adjacent, or one at an edge.
    if stripped.len() == collapsed.len() {
        stripped
    } else {
        collapse_whitespace(&stripped)
    }
}

/// Standard normalization plus lowercasing and punctuation removal.
///
/// Keeps letters, digits, spaces, `?` and the full-width `？`.
pub fn normalize_aggressive(text: &str) -> String {
    let kept: String = collapse_whitespace(text)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '?' || *c == '？')
        .collect();

    collapse_whitespace(&kept)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[inline]
fn is_stripped_control(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

/// Which normalizer the query pipeline applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    #[default]
    Standard,
    Aggressive,
    /// Pass the question through untouched.
    Disabled,
}

impl NormalizeMode {
    pub fn apply(&self, text: &str) -> String {
        match self {
            NormalizeMode::Standard => normalize(text),
            NormalizeMode::Aggressive => normalize_aggressive(text),
            NormalizeMode::Disabled => text.to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizeMode::Standard => "standard",
            NormalizeMode::Aggressive => "aggressive",
            NormalizeMode::Disabled => "off",
        }
    }
}

impl FromStr for NormalizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "on" | "true" | "1" => Ok(Self::Standard),
            "aggressive" => Ok(Self::Aggressive),
            "off" | "disabled" | "false" | "0" => Ok(Self::Disabled),
            _ => Err(format!("Unknown normalize mode: {}", s)),
        }
    }
}
