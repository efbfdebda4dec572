//! # Torch Morse
//!
//! Sends text as Morse code by switching a camera torch (or any flash LED)
//! on and off with standard ITU timing.
//!
//! ## Crate Structure
//!
//! - **`morse`**: symbol table, text encoder and timing arithmetic. Pure.
//! - **`hardware`**: async capability traits for the platform media layer,
//!   the `EmitterController` that discovers and drives the torch, a mock
//!   backend and a Linux LED class backend.
//! - **`transmit`**: the `TransmissionEngine` that plays a sequence, reports
//!   lifecycle events and honours cancellation.
//! - **`config`**: Figment-based configuration.
//! - **`logging`**: `tracing-subscriber` initialisation.
//! - **`error`**: error taxonomy.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use torch_morse::hardware::{mock::MockMediaBackend, EmitterController};
//! use torch_morse::transmit::{TransmissionEngine, TransmissionEvent};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let emitter = EmitterController::new(Arc::new(MockMediaBackend::new()));
//! let engine = TransmissionEngine::new(emitter);
//! let observer = |event: TransmissionEvent| println!("{:?}", event);
//! engine.transmit("SOS", &observer).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod morse;
pub mod transmit;

pub use error::{EmitterError, EmitterErrorKind, TransmitError};
pub use hardware::EmitterController;
pub use morse::{encode, preview, MorseTiming};
pub use transmit::{TransmissionEngine, TransmissionEvent, TransmissionOutcome};
