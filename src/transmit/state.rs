//! Transmission lifecycle state.

/// Transmission execution state.
///
/// # State Machine
///
/// ```text
/// Idle ──transmit──> Acquiring ──acquired──> Transmitting ──finished──┐
///                       │                      │        │             │
///                       │ acquire failed       │ error  │ cancel      │
///                       ▼                      ▼        ▼             ▼
///                     Failed <─────────────────┘   Cancelled      Completing ──> Idle
///                       │                               │             ▲
///                       └───────────────────────────────┴─────────────┘
/// ```
///
/// Every path passes through `Completing`, where the emitter is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionState {
    /// Nothing running.
    Idle,
    /// Opening the emitter session.
    Acquiring,
    /// Playing the sequence.
    Transmitting,
    /// Releasing the emitter.
    Completing,
    /// Stop requested, loop exited.
    Cancelled,
    /// Hardware error, loop aborted.
    Failed,
}

impl std::fmt::Display for TransmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransmissionState::Idle => write!(f, "Idle"),
            TransmissionState::Acquiring => write!(f, "Acquiring"),
            TransmissionState::Transmitting => write!(f, "Transmitting"),
            TransmissionState::Completing => write!(f, "Completing"),
            TransmissionState::Cancelled => write!(f, "Cancelled"),
            TransmissionState::Failed => write!(f, "Failed"),
        }
    }
}

impl TransmissionState {
    /// Check if the state allows starting a new transmission.
    pub fn can_begin(&self) -> bool {
        matches!(self, TransmissionState::Idle)
    }

    /// Check if the emitter may be held in this state.
    pub fn is_active(&self) -> bool {
        !matches!(self, TransmissionState::Idle)
    }

    /// Check whether `next` is a legal successor.
    pub fn can_transition_to(&self, next: TransmissionState) -> bool {
        use TransmissionState::*;
        matches!(
            (self, next),
            (Idle, Acquiring)
                | (Acquiring, Transmitting)
                | (Acquiring, Failed)
                | (Transmitting, Completing)
                | (Transmitting, Cancelled)
                | (Transmitting, Failed)
                | (Cancelled, Completing)
                | (Failed, Completing)
                | (Completing, Idle)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransmissionState::*;

    #[test]
    fn test_legal_paths() {
        let happy = [Idle, Acquiring, Transmitting, Completing, Idle];
        let cancelled = [Idle, Acquiring, Transmitting, Cancelled, Completing, Idle];
        let failed_early = [Idle, Acquiring, Failed, Completing, Idle];
        for path in [&happy[..], &cancelled[..], &failed_early[..]] {
            for pair in path.windows(2) {
                assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_illegal_paths() {
        assert!(!Idle.can_transition_to(Transmitting));
        assert!(!Cancelled.can_transition_to(Idle));
        assert!(!Completing.can_transition_to(Transmitting));
    }

    #[test]
    fn test_can_begin() {
        assert!(Idle.can_begin());
        assert!(!Transmitting.can_begin());
        assert!(Failed.is_active());
    }
}
