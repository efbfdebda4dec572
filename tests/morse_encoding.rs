//! Integration tests for the public encoding API

use std::time::Duration;
use torch_morse::morse::{encode, format_preview, preview, Mark, MorseTiming, Pattern};

#[test]
fn test_sos() {
    let sequence = encode("sos");
    assert_eq!(sequence.len(), 3);
    assert_eq!(sequence.get(0).unwrap().marks(), &[Mark::Dot; 3]);
    assert_eq!(sequence.get(1).unwrap().marks(), &[Mark::Dash; 3]);
    assert_eq!(sequence.to_strings(), vec!["...", "---", "..."]);
}

#[test]
fn test_unknown_characters_dropped() {
    assert_eq!(preview("A#B"), vec![".-", "-..."]);
    assert!(encode("#%^").is_empty());
    assert!(encode("").is_empty());
}

#[test]
fn test_space_becomes_word_gap() {
    let sequence = encode("A B");
    let kinds: Vec<bool> = sequence.iter().map(Pattern::is_word_gap).collect();
    assert_eq!(kinds, vec![false, true, false]);
}

#[test]
fn test_slash_character_is_not_a_word_gap() {
    let sequence = encode("/");
    assert_eq!(sequence.len(), 1);
    assert!(!sequence.get(0).unwrap().is_word_gap());
    assert_eq!(sequence.to_strings(), vec!["-..-."]);
}

#[test]
fn test_format_preview() {
    assert_eq!(format_preview(&preview("ok")), "---   -.-");
    assert_eq!(format_preview(&preview("")), "(empty)");
}

#[test]
fn test_default_timing_at_180() {
    let timing = MorseTiming::default();
    assert_eq!(timing.mark_on(Mark::Dot), Duration::from_millis(180));
    assert_eq!(timing.mark_on(Mark::Dash), Duration::from_millis(540));
    assert_eq!(timing.intra_gap() + timing.letter_tail(), Duration::from_millis(540));
    assert_eq!(timing.word_gap(), Duration::from_millis(1260));
}
