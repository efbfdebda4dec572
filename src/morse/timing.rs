//! Morse timing derived from a single base unit.
//!
//! | Element            | Length  |
//! |--------------------|---------|
//! | dot                | 1 unit  |
//! | dash               | 3 units |
//! | gap inside letter  | 1 unit  |
//! | gap between letters| 3 units |
//! | gap between words  | 7 units |

use super::encoder::{Mark, Pattern, Sequence};
use crate::error::TransmitError;
use std::time::Duration;

/// Default base unit in milliseconds.
pub const DEFAULT_UNIT_MS: u64 = 180;

const DASH_UNITS: u32 = 3;
const LETTER_GAP_UNITS: u32 = 3;
const WORD_GAP_UNITS: u32 = 7;

/// Interval calculator for one base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorseTiming {
    unit: Duration,
}

impl Default for MorseTiming {
    fn default() -> Self {
        Self {
            unit: Duration::from_millis(DEFAULT_UNIT_MS),
        }
    }
}

impl MorseTiming {
    /// Build timing from a base unit, which must be non-zero.
    pub fn new(unit: Duration) -> Result<Self, TransmitError> {
        if unit.is_zero() {
            return Err(TransmitError::InvalidUnit(unit));
        }
        Ok(Self { unit })
    }

    /// Build timing from a unit in milliseconds.
    pub fn from_millis(unit_ms: u64) -> Result<Self, TransmitError> {
        Self::new(Duration::from_millis(unit_ms))
    }

    /// PARIS timing: one unit is 1.2 s divided by words per minute.
    pub fn from_wpm(wpm: u32) -> Result<Self, TransmitError> {
        if wpm == 0 {
            return Err(TransmitError::InvalidUnit(Duration::ZERO));
        }
        Self::new(Duration::from_micros(1_200_000 / u64::from(wpm)))
    }

    /// Base unit.
    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// On-time of a dot.
    pub fn dot(&self) -> Duration {
        self.unit
    }

    /// On-time of a dash.
    pub fn dash(&self) -> Duration {
        self.unit * DASH_UNITS
    }

    /// Off-time following every mark.
    pub fn intra_gap(&self) -> Duration {
        self.unit
    }

    /// Total off-time between two letters.
    pub fn letter_gap(&self) -> Duration {
        self.unit * LETTER_GAP_UNITS
    }

    /// Off-time for a word separator.
    pub fn word_gap(&self) -> Duration {
        self.unit * WORD_GAP_UNITS
    }

    /// Extra wait after a letter's last mark; its intra gap already covers one unit.
    pub fn letter_tail(&self) -> Duration {
        self.letter_gap() - self.intra_gap()
    }

    /// On-time for a mark.
    pub fn mark_on(&self, mark: Mark) -> Duration {
        match mark {
            Mark::Dot => self.dot(),
            Mark::Dash => self.dash(),
        }
    }

    /// Wall-clock time the engine spends on one pattern.
    pub fn pattern_duration(&self, pattern: &Pattern) -> Duration {
        match pattern {
            Pattern::WordGap => self.word_gap(),
            Pattern::Marks(marks) => {
                let marks: Duration = marks
                    .iter()
                    .map(|m| self.mark_on(*m) + self.intra_gap())
                    .sum();
                marks + self.letter_tail()
            }
        }
    }

    /// Wall-clock time for a whole uncancelled transmission.
    pub fn sequence_duration(&self, sequence: &Sequence) -> Duration {
        sequence.iter().map(|p| self.pattern_duration(p)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::encode;

    #[test]
    fn test_default_unit_intervals() {
        let t = MorseTiming::default();
        assert_eq!(t.dot(), Duration::from_millis(180));
        assert_eq!(t.dash(), Duration::from_millis(540));
        assert_eq!(t.intra_gap(), Duration::from_millis(180));
        assert_eq!(t.letter_gap(), Duration::from_millis(540));
        assert_eq!(t.word_gap(), Duration::from_millis(1260));
    }

    #[test]
    fn test_ratios_hold_for_any_unit() {
        for ms in [1u64, 7, 60, 100, 333, 1000] {
            let t = MorseTiming::from_millis(ms).unwrap();
            assert_eq!(t.dash(), t.dot() * 3);
            assert_eq!(t.intra_gap(), t.dot());
            assert_eq!(t.letter_gap(), t.dot() * 3);
            assert_eq!(t.word_gap(), t.dot() * 7);
        }
    }

    #[test]
    fn test_zero_unit_rejected() {
        assert!(matches!(
            MorseTiming::from_millis(0),
            Err(TransmitError::InvalidUnit(_))
        ));
        assert!(MorseTiming::from_wpm(0).is_err());
    }

    #[test]
    fn test_wpm_paris() {
        let t = MorseTiming::from_wpm(20).unwrap();
        assert_eq!(t.unit(), Duration::from_millis(60));
    }

    #[test]
    fn test_sos_duration() {
        let t = MorseTiming::from_millis(60).unwrap();
        // S = 3 x (1 + 1) + 2 = 8 units, O = 3 x (3 + 1) + 2 = 14 units
        assert_eq!(
            t.sequence_duration(&encode("SOS")),
            Duration::from_millis(30 * 60)
        );
        assert_eq!(
            t.sequence_duration(&encode("SSS")),
            Duration::from_millis(24 * 60)
        );
    }

    #[test]
    fn test_word_gap_duration_has_no_letter_tail() {
        let t = MorseTiming::from_millis(100).unwrap();
        // E (100 on + 100 gap + 200 tail) + word gap 700 + E
        assert_eq!(
            t.sequence_duration(&encode("e e")),
            Duration::from_millis(400 + 700 + 400)
        );
    }
}
