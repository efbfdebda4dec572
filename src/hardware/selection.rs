//! Channel selection policy.
//!
//! Labels are unreliable: they can be empty before permission is granted and
//! their wording varies by vendor. The default policy is a heuristic, kept
//! behind [`ChannelSelector`] so a better one can be swapped in.

use super::capabilities::{ChannelInfo, ChannelKind};

/// Role hints matched (case-insensitively) against channel labels.
pub const DEFAULT_ROLE_HINTS: &[&str] = &["back", "rear", "environment"];

/// Picks the channel to request a session for.
pub trait ChannelSelector: Send + Sync {
    /// Choose among the enumerated channels. Non-video channels may be present.
    fn select<'a>(&self, channels: &'a [ChannelInfo]) -> Option<&'a ChannelInfo>;
}

/// Prefer a rear-facing label, otherwise the last enumerated video input.
#[derive(Debug, Clone)]
pub struct RearFacingSelector {
    hints: Vec<String>,
}

impl Default for RearFacingSelector {
    fn default() -> Self {
        Self::with_hints(DEFAULT_ROLE_HINTS.iter().copied())
    }
}

impl RearFacingSelector {
    /// Selector using custom role hints.
    pub fn with_hints<I, S>(hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hints: hints
                .into_iter()
                .map(|h| h.as_ref().to_lowercase())
                .collect(),
        }
    }

    fn matches_hint(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.hints.iter().any(|hint| label.contains(hint.as_str()))
    }
}

impl ChannelSelector for RearFacingSelector {
    fn select<'a>(&self, channels: &'a [ChannelInfo]) -> Option<&'a ChannelInfo> {
        let mut cameras = channels
            .iter()
            .filter(|c| c.kind == ChannelKind::VideoInput);
        cameras
            .clone()
            .find(|c| self.matches_hint(&c.label))
            .or_else(|| cameras.next_back())
    }
}
