//! Custom error types for the transmitter.
//!
//! Platform backends report failures as opaque `anyhow::Error` values, the
//! same way hardware capability traits do. This module lifts them into a
//! small taxonomy the transmission engine and presentation code can match on.
//!
//! ## Error Hierarchy
//!
//! - **`EmitterError`**: everything the emitter controller can fail with.
//!   - `Enumeration`, `Acquisition`, `NoControllableChannel` form the
//!     acquisition family: no pulse has been sent yet.
//!   - `Capability`: the torch toggle was rejected by every request shape.
//!     Can occur mid-transmission.
//!   - `NotAcquired`: `set_intensity` was called without a live session. A
//!     contract violation, not reachable through `TransmissionEngine::transmit`.
//! - **`TransmitError`**: engine-level errors, wrapping `EmitterError` via `#[from]`.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias for emitter results.
pub type EmitterResult<T> = std::result::Result<T, EmitterError>;

/// Convenience alias for engine results.
pub type TransmitResult<T> = std::result::Result<T, TransmitError>;

/// Coarse classification used by presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterErrorKind {
    /// No session could be opened.
    Acquisition,
    /// Torch toggle rejected.
    Capability,
    /// Called without a session.
    NotAcquired,
}

impl std::fmt::Display for EmitterErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EmitterErrorKind::Acquisition => "acquisition",
            EmitterErrorKind::Capability => "capability",
            EmitterErrorKind::NotAcquired => "not_acquired",
        };
        write!(f, "{}", label)
    }
}

fn on_off(on: &bool) -> &'static str {
    if *on {
        "on"
    } else {
        "off"
    }
}

/// Errors raised by [`crate::hardware::EmitterController`].
#[derive(Error, Debug)]
pub enum EmitterError {
    #[error("Failed to enumerate video input channels: {0:#}")]
    Enumeration(#[source] anyhow::Error),

    #[error("Camera session rejected by all {attempts} acquisition strategies: {source:#}")]
    Acquisition {
        attempts: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("Camera session exposes no controllable channel")]
    NoControllableChannel,

    #[error("Torch {} rejected by every constraint form: {source:#}", on_off(.on))]
    Capability {
        on: bool,
        #[source]
        source: anyhow::Error,
    },

    #[error("Camera not started")]
    NotAcquired,
}

impl EmitterError {
    /// Which family this error belongs to.
    pub fn kind(&self) -> EmitterErrorKind {
        match self {
            EmitterError::Enumeration(_)
            | EmitterError::Acquisition { .. }
            | EmitterError::NoControllableChannel => EmitterErrorKind::Acquisition,
            EmitterError::Capability { .. } => EmitterErrorKind::Capability,
            EmitterError::NotAcquired => EmitterErrorKind::NotAcquired,
        }
    }

    /// True when the hardware itself refused. `NotAcquired` is a call-order
    /// mistake and goes away after `acquire`.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EmitterError::NotAcquired)
    }
}

/// Errors returned by [`crate::transmit::TransmissionEngine::transmit`].
#[derive(Error, Debug)]
pub enum TransmitError {
    #[error(transparent)]
    Emitter(#[from] EmitterError),

    #[error("Timing unit must be positive, got {0:?}")]
    InvalidUnit(Duration),

    #[error("A transmission is already running")]
    AlreadyRunning,
}

impl TransmitError {
    /// Emitter error kind, if this came from the hardware layer.
    pub fn emitter_kind(&self) -> Option<EmitterErrorKind> {
        match self {
            TransmitError::Emitter(err) => Some(err.kind()),
            _ => None,
        }
    }
}
