//! Transmission Engine
//!
//! Plays an encoded sequence on the emitter using Morse timing:
//!
//! ```text
//! transmit(text) → acquire emitter → encode → for each pattern:
//!     word gap:  wait 7u
//!     letter:    for each mark { on, wait 1u|3u, off, wait 1u }, wait 2u, progress
//! → done | cancelled | error → release emitter
//! ```
//!
//! The running flag is polled before every pulse and every gap, and each
//! wait is raced against it, so a cancel takes effect inside the current
//! letter. The emitter is released on every exit path.

use super::events::{EventSink, TransmissionEvent, TransmissionObserver};
use super::run_state::{CancelHandle, RunState, RunToken};
use super::state::TransmissionState;
use crate::error::{TransmitError, TransmitResult};
use crate::hardware::EmitterController;
use crate::morse::{self, MorseTiming, Pattern};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, info_span, warn, Instrument};

/// How a call to [`TransmissionEngine::transmit`] ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionOutcome {
    /// Blank input, nothing happened.
    Skipped,
    /// Every pattern was sent.
    Completed {
        /// Number of patterns sent.
        length: usize,
    },
    /// Stopped on request.
    Cancelled {
        /// Patterns fully sent before the stop.
        completed: usize,
    },
}

enum LoopExit {
    Finished(usize),
    Stopped(usize),
}

/// Drives one emitter. Share it behind an `Arc` to cancel from another task.
pub struct TransmissionEngine {
    emitter: AsyncMutex<EmitterController>,
    run_state: RunState,
    state: Mutex<TransmissionState>,
    timing: MorseTiming,
}

impl TransmissionEngine {
    /// Engine with the default 180 ms unit.
    pub fn new(emitter: EmitterController) -> Self {
        Self {
            emitter: AsyncMutex::new(emitter),
            run_state: RunState::new(),
            state: Mutex::new(TransmissionState::Idle),
            timing: MorseTiming::default(),
        }
    }

    /// Replace the timing used by [`transmit`](Self::transmit).
    pub fn with_timing(mut self, timing: MorseTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Default timing.
    pub fn timing(&self) -> MorseTiming {
        self.timing
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransmissionState {
        *self.state.lock()
    }

    /// True while a transmission holds the running flag.
    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    /// Ask the running transmission to stop. Safe to call when idle.
    pub fn cancel(&self) {
        if self.run_state.is_running() {
            info!("Transmission stop requested");
        }
        self.run_state.stop();
    }

    /// Cloneable handle equivalent to [`cancel`](Self::cancel).
    pub fn cancel_handle(&self) -> CancelHandle {
        self.run_state.cancel_handle()
    }

    /// Pattern strings for `text`. Pure, never touches the emitter.
    pub fn preview_encode(&self, text: &str) -> Vec<String> {
        morse::preview(text)
    }

    /// Open the emitter ahead of time; the next transmission reuses it.
    pub async fn prepare(&self) -> TransmitResult<()> {
        let mut emitter = self.emitter.lock().await;
        emitter.acquire().await?;
        Ok(())
    }

    /// Release the emitter, waiting for a running transmission to finish first.
    pub async fn release(&self) {
        self.emitter.lock().await.release().await;
    }

    /// Send `text` with the engine's default timing.
    pub async fn transmit(
        &self,
        text: &str,
        observer: &dyn TransmissionObserver,
    ) -> TransmitResult<TransmissionOutcome> {
        self.transmit_with_timing(text, self.timing, observer).await
    }

    /// Send `text` with a specific base unit.
    pub async fn transmit_with_unit(
        &self,
        text: &str,
        unit: Duration,
        observer: &dyn TransmissionObserver,
    ) -> TransmitResult<TransmissionOutcome> {
        if text.trim().is_empty() {
            return Ok(TransmissionOutcome::Skipped);
        }
        let timing = MorseTiming::new(unit)?;
        self.transmit_with_timing(text, timing, observer).await
    }

    /// Send `text` with explicit timing.
    ///
    /// Blank text returns [`TransmissionOutcome::Skipped`] without events.
    /// A second call while one is running fails with
    /// [`TransmitError::AlreadyRunning`] and leaves the first one alone.
    pub async fn transmit_with_timing(
        &self,
        text: &str,
        timing: MorseTiming,
        observer: &dyn TransmissionObserver,
    ) -> TransmitResult<TransmissionOutcome> {
        if text.trim().is_empty() {
            debug!("Blank text, nothing to transmit");
            return Ok(TransmissionOutcome::Skipped);
        }
        let token = self
            .run_state
            .try_start()
            .ok_or(TransmitError::AlreadyRunning)?;

        let span = info_span!("transmit", unit_ms = timing.unit().as_millis() as u64);
        self.run(text, timing, token, observer).instrument(span).await
    }

    async fn run(
        &self,
        text: &str,
        timing: MorseTiming,
        token: RunToken,
        observer: &dyn TransmissionObserver,
    ) -> TransmitResult<TransmissionOutcome> {
        let mut sink = EventSink::new(observer);
        let mut emitter = self.emitter.lock().await;
        self.transition(TransmissionState::Acquiring);

        let result = self.play(&mut emitter, text, timing, token, &mut sink).await;

        let outcome = match result {
            Ok(LoopExit::Finished(length)) => {
                self.transition(TransmissionState::Completing);
                info!(length, "Transmission complete");
                sink.emit(TransmissionEvent::Done);
                Ok(TransmissionOutcome::Completed { length })
            }
            Ok(LoopExit::Stopped(completed)) => {
                self.transition(TransmissionState::Cancelled);
                self.transition(TransmissionState::Completing);
                info!(completed, "Transmission cancelled");
                sink.emit(TransmissionEvent::Cancelled { completed });
                Ok(TransmissionOutcome::Cancelled { completed })
            }
            Err(e) => {
                self.transition(TransmissionState::Failed);
                self.transition(TransmissionState::Completing);
                warn!(error = %e, "Transmission failed");
                sink.emit(TransmissionEvent::Error {
                    error: e.to_string(),
                });
                Err(e)
            }
        };

        emitter.release().await;
        self.run_state.stop();
        self.transition(TransmissionState::Idle);
        outcome
    }

    async fn play(
        &self,
        emitter: &mut EmitterController,
        text: &str,
        timing: MorseTiming,
        mut token: RunToken,
        sink: &mut EventSink<'_>,
    ) -> TransmitResult<LoopExit> {
        emitter.acquire().await?;
        let sequence = morse::encode(text);
        self.transition(TransmissionState::Transmitting);
        info!(
            length = sequence.len(),
            estimated_ms = timing.sequence_duration(&sequence).as_millis() as u64,
            "Transmission started"
        );
        sink.emit(TransmissionEvent::Started {
            length: sequence.len(),
        });

        let mut completed = 0;
        for (i, pattern) in sequence.iter().enumerate() {
            if !token.is_running() {
                return Ok(LoopExit::Stopped(completed));
            }
            match pattern {
                Pattern::WordGap => {
                    if !token.wait(timing.word_gap()).await {
                        return Ok(LoopExit::Stopped(completed));
                    }
                    completed += 1;
                }
                Pattern::Marks(marks) => {
                    for mark in marks {
                        if !token.is_running() {
                            return Ok(LoopExit::Stopped(completed));
                        }
                        emitter.set_intensity(true).await?;
                        if !token.wait(timing.mark_on(*mark)).await {
                            return Ok(LoopExit::Stopped(completed));
                        }
                        emitter.set_intensity(false).await?;
                        if !token.wait(timing.intra_gap()).await {
                            return Ok(LoopExit::Stopped(completed));
                        }
                    }
                    if !token.wait(timing.letter_tail()).await {
                        return Ok(LoopExit::Stopped(completed));
                    }
                    completed += 1;
                    debug!(index = i + 1, pattern = %pattern, "Letter sent");
                    sink.emit(TransmissionEvent::Progress { index: i + 1 });
                }
            }
        }
        Ok(LoopExit::Finished(sequence.len()))
    }

    fn transition(&self, next: TransmissionState) {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            warn!(from = %*state, to = %next, "Unexpected transmission state change");
        }
        debug!(from = %*state, to = %next, "Transmission state");
        *state = next;
    }
}

impl std::fmt::Debug for TransmissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransmissionEngine")
            .field("state", &self.state())
            .field("running", &self.is_running())
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
