//! Text to Morse sequence conversion.
//!
//! Encoding is pure: no hardware is touched, so the same functions back the
//! live preview and the transmission engine.

use super::table::{self, WORD_SEPARATOR};
use std::fmt;

/// A single signal element within one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Short pulse, one unit on.
    Dot,
    /// Long pulse, three units on.
    Dash,
}

impl Mark {
    fn symbol(self) -> char {
        match self {
            Mark::Dot => '.',
            Mark::Dash => '-',
        }
    }
}

/// The encoding of one input character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Ordered dots and dashes for a letter, digit or punctuation mark.
    Marks(Vec<Mark>),
    /// Separator between words.
    WordGap,
}

impl Pattern {
    /// Parse a table code string (`.`/`-`, or `/` for the word separator).
    ///
    /// Returns `None` if the string contains anything else.
    pub fn from_code(code: &str) -> Option<Self> {
        if code == WORD_SEPARATOR {
            return Some(Pattern::WordGap);
        }
        let marks = code
            .chars()
            .map(|c| match c {
                '.' => Some(Mark::Dot),
                '-' => Some(Mark::Dash),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        if marks.is_empty() {
            None
        } else {
            Some(Pattern::Marks(marks))
        }
    }

    /// Marks of this pattern (empty for a word gap).
    pub fn marks(&self) -> &[Mark] {
        match self {
            Pattern::Marks(marks) => marks,
            Pattern::WordGap => &[],
        }
    }

    /// True for the word separator.
    pub fn is_word_gap(&self) -> bool {
        matches!(self, Pattern::WordGap)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::WordGap => f.write_str(WORD_SEPARATOR),
            Pattern::Marks(marks) => marks.iter().try_for_each(|m| write!(f, "{}", m.symbol())),
        }
    }
}

/// Ordered patterns produced from one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    patterns: Vec<Pattern>,
}

impl Sequence {
    /// Number of patterns, word gaps included.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no character of the input was recognised.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Iterate patterns in transmission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// Display strings for every pattern, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.patterns.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

/// Encode `text` into a Morse sequence.
///
/// Characters are uppercased before lookup; anything missing from the table
/// is dropped without error. Empty or unsupported input yields an empty
/// sequence.
pub fn encode(text: &str) -> Sequence {
    let patterns = text
        .chars()
        .flat_map(char::to_uppercase)
        .filter_map(table::lookup)
        .filter_map(Pattern::from_code)
        .collect();
    Sequence { patterns }
}

/// Pattern strings for display, e.g. `["...", "---", "..."]` for "sos".
pub fn preview(text: &str) -> Vec<String> {
    encode(text).to_strings()
}

/// Join preview strings the way the transmitter UI shows them.
pub fn format_preview(patterns: &[String]) -> String {
    if patterns.is_empty() {
        "(empty)".to_string()
    } else {
        patterns.join("   ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_for_every_supported_char() {
        for ch in table::supported_chars() {
            let upper: String = ch.to_uppercase().collect();
            let lower: String = ch.to_lowercase().collect();
            assert_eq!(encode(&upper), encode(&lower), "mismatch for {ch:?}");
        }
    }

    #[test]
    fn test_empty_and_unsupported_input() {
        assert!(encode("").is_empty());
        assert!(encode("#%^~<>").is_empty());
        assert!(encode("\u{00e9}\u{4e2d}").is_empty());
    }

    #[test]
    fn test_unsupported_chars_are_skipped_in_order() {
        let seq = encode("s#o~s");
        assert_eq!(seq.to_strings(), vec!["...", "---", "..."]);
    }

    #[test]
    fn test_space_becomes_word_gap() {
        let seq = encode("e e");
        assert_eq!(seq.len(), 3);
        assert!(seq.get(1).is_some_and(Pattern::is_word_gap));
        assert_eq!(seq.get(0).map(|p| p.marks().len()), Some(1));
    }

    #[test]
    fn test_slash_character_is_not_a_word_gap() {
        let seq = encode("/");
        assert_eq!(seq.to_strings(), vec!["-..-."]);
        assert!(!seq.get(0).is_some_and(Pattern::is_word_gap));
    }

    #[test]
    fn test_from_code_rejects_garbage() {
        assert_eq!(Pattern::from_code(""), None);
        assert_eq!(Pattern::from_code(".x-"), None);
        assert_eq!(
            Pattern::from_code("-."),
            Some(Pattern::Marks(vec![Mark::Dash, Mark::Dot]))
        );
    }

    #[test]
    fn test_format_preview() {
        assert_eq!(format_preview(&[]), "(empty)");
        assert_eq!(format_preview(&preview("sos")), "...   ---   ...");
    }
}
