//! Transmission engine and its supporting pieces.
//!
//! - [`engine`]: plays a Morse sequence on an emitter
//! - [`events`]: lifecycle events and observers
//! - [`state`]: lifecycle state machine
//! - [`run_state`]: running flag and cancellation

pub mod engine;
pub mod events;
pub mod run_state;
pub mod state;

pub use engine::{TransmissionEngine, TransmissionOutcome};
pub use events::{ChannelObserver, NoopObserver, TransmissionEvent, TransmissionObserver};
pub use run_state::{CancelHandle, RunState, RunToken};
pub use state::TransmissionState;
