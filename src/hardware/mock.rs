//! Mock Media Backend
//!
//! Simulated camera stack for testing without a device. Every rejection the
//! controller has to cope with can be switched on:
//!
//! - by-id or by-role session requests rejected
//! - torch accepted only in the advanced form, only in the flat form, or not at all
//! - torch rejected from the N-th successful toggle onward
//! - sessions without any controllable track
//!
//! All calls are counted and torch transitions are timestamped with
//! `tokio::time::Instant`, so tests running on a paused clock can check
//! pulse lengths exactly.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::capabilities::{
    ChannelConstraint, ChannelInfo, KeepAliveSurface, MediaBackend, MediaSession, SessionRequest,
    TorchConstraints, TorchTrack,
};

/// Which torch request shapes the mock track accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchSupport {
    /// Both shapes work.
    Both,
    /// Only `advanced: [{ torch }]`.
    AdvancedOnly,
    /// Only `{ torch }`.
    DirectOnly,
    /// No torch at all.
    Unsupported,
}

impl TorchSupport {
    fn accepts(self, constraints: &TorchConstraints) -> bool {
        matches!(
            (self, constraints),
            (TorchSupport::Both, _)
                | (TorchSupport::AdvancedOnly, TorchConstraints::Advanced { .. })
                | (TorchSupport::DirectOnly, TorchConstraints::Direct { .. })
        )
    }
}

/// One accepted torch transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TorchToggle {
    /// When the constraint was applied.
    pub at: Instant,
    /// New torch state.
    pub on: bool,
}

struct MockState {
    channels: Mutex<Vec<ChannelInfo>>,
    fail_enumeration: AtomicBool,
    reject_by_id: AtomicBool,
    reject_by_role: AtomicBool,
    track_count: AtomicUsize,
    torch_support: Mutex<TorchSupport>,
    fail_torch_from: Mutex<Option<usize>>,
    open_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    requests: Mutex<Vec<SessionRequest>>,
    attempts: Mutex<Vec<TorchConstraints>>,
    toggles: Mutex<Vec<TorchToggle>>,
    torch_on: AtomicBool,
}

/// In-memory [`MediaBackend`]. Clones share state.
#[derive(Clone)]
pub struct MockMediaBackend {
    state: Arc<MockState>,
}

impl Default for MockMediaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaBackend {
    /// Backend with a front and a back camera, torch accepted in both forms.
    pub fn new() -> Self {
        Self::with_channels(vec![
            ChannelInfo::video("mock-front", "camera2 1, facing front"),
            ChannelInfo::video("mock-back", "camera2 0, facing back"),
        ])
    }

    /// Backend reporting exactly these channels.
    pub fn with_channels(channels: Vec<ChannelInfo>) -> Self {
        Self {
            state: Arc::new(MockState {
                channels: Mutex::new(channels),
                fail_enumeration: AtomicBool::new(false),
                reject_by_id: AtomicBool::new(false),
                reject_by_role: AtomicBool::new(false),
                track_count: AtomicUsize::new(1),
                torch_support: Mutex::new(TorchSupport::Both),
                fail_torch_from: Mutex::new(None),
                open_calls: AtomicUsize::new(0),
                stop_calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                attempts: Mutex::new(Vec::new()),
                toggles: Mutex::new(Vec::new()),
                torch_on: AtomicBool::new(false),
            }),
        }
    }

    /// Make `enumerate_channels` fail.
    pub fn fail_enumeration(self) -> Self {
        self.state.fail_enumeration.store(true, Ordering::SeqCst);
        self
    }

    /// Reject session requests naming an exact channel (or no channel).
    pub fn reject_by_id(self) -> Self {
        self.state.reject_by_id.store(true, Ordering::SeqCst);
        self
    }

    /// Reject session requests using a facing hint.
    pub fn reject_by_role(self) -> Self {
        self.state.reject_by_role.store(true, Ordering::SeqCst);
        self
    }

    /// Number of tracks each session exposes (default 1).
    pub fn with_track_count(self, count: usize) -> Self {
        self.state.track_count.store(count, Ordering::SeqCst);
        self
    }

    /// Which torch shapes are accepted.
    pub fn with_torch_support(self, support: TorchSupport) -> Self {
        *self.state.torch_support.lock() = support;
        self
    }

    /// Reject every torch request once `successes` toggles have been accepted.
    pub fn fail_torch_from(self, successes: usize) -> Self {
        *self.state.fail_torch_from.lock() = Some(successes);
        self
    }

    /// Number of `open_session` calls, failed ones included.
    pub fn open_calls(&self) -> usize {
        self.state.open_calls.load(Ordering::SeqCst)
    }

    /// Number of `stop_all` calls across all sessions.
    pub fn stop_calls(&self) -> usize {
        self.state.stop_calls.load(Ordering::SeqCst)
    }

    /// Every session request received, in order.
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.state.requests.lock().clone()
    }

    /// Every torch constraint attempted, accepted or not.
    pub fn constraint_attempts(&self) -> Vec<TorchConstraints> {
        self.state.attempts.lock().clone()
    }

    /// Accepted torch transitions.
    pub fn toggles(&self) -> Vec<TorchToggle> {
        self.state.toggles.lock().clone()
    }

    /// Current torch state.
    pub fn is_torch_on(&self) -> bool {
        self.state.torch_on.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaBackend for MockMediaBackend {
    async fn enumerate_channels(&self) -> Result<Vec<ChannelInfo>> {
        if self.state.fail_enumeration.load(Ordering::SeqCst) {
            bail!("MockMediaBackend: enumeration not allowed");
        }
        Ok(self.state.channels.lock().clone())
    }

    async fn open_session(&self, request: &SessionRequest) -> Result<Box<dyn MediaSession>> {
        self.state.open_calls.fetch_add(1, Ordering::SeqCst);
        self.state.requests.lock().push(request.clone());

        match &request.channel {
            Some(ChannelConstraint::Facing(facing)) => {
                if self.state.reject_by_role.load(Ordering::SeqCst) {
                    bail!("MockMediaBackend: facingMode {facing} not satisfiable");
                }
            }
            Some(ChannelConstraint::Exact(id)) => {
                if self.state.reject_by_id.load(Ordering::SeqCst) {
                    bail!("MockMediaBackend: deviceId {id} rejected");
                }
                if !self.state.channels.lock().iter().any(|c| &c.id == id) {
                    bail!("MockMediaBackend: unknown deviceId {id}");
                }
            }
            None => {
                if self.state.reject_by_id.load(Ordering::SeqCst) {
                    bail!("MockMediaBackend: unconstrained request rejected");
                }
            }
        }

        let count = self.state.track_count.load(Ordering::SeqCst);
        let tracks = (0..count)
            .map(|i| {
                Arc::new(MockTrack {
                    state: Arc::clone(&self.state),
                    label: format!("mock video track {i}"),
                }) as Arc<dyn TorchTrack>
            })
            .collect();
        info!("MockMediaBackend: session opened ({count} tracks)");
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
            tracks,
        }))
    }
}

struct MockSession {
    state: Arc<MockState>,
    tracks: Vec<Arc<dyn TorchTrack>>,
}

#[async_trait]
impl MediaSession for MockSession {
    fn tracks(&self) -> Vec<Arc<dyn TorchTrack>> {
        self.tracks.clone()
    }

    async fn stop_all(&self) {
        self.state.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.state.torch_on.store(false, Ordering::SeqCst);
        info!("MockMediaBackend: session stopped");
    }
}

struct MockTrack {
    state: Arc<MockState>,
    label: String,
}

#[async_trait]
impl TorchTrack for MockTrack {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn apply_constraints(&self, constraints: &TorchConstraints) -> Result<()> {
        self.state.attempts.lock().push(*constraints);

        let support = *self.state.torch_support.lock();
        if !support.accepts(constraints) {
            return Err(anyhow!(
                "OverconstrainedError: torch ({constraints:?}) not supported"
            ));
        }
        let accepted = self.state.toggles.lock().len();
        if let Some(limit) = *self.state.fail_torch_from.lock() {
            if accepted >= limit {
                return Err(anyhow!("NotReadableError: torch hardware stopped responding"));
            }
        }

        let on = constraints.torch();
        self.state.torch_on.store(on, Ordering::SeqCst);
        self.state.toggles.lock().push(TorchToggle {
            at: Instant::now(),
            on,
        });
        debug!(on, "MockTrack: torch");
        Ok(())
    }
}

/// Keep-alive surface that counts calls and can be told to fail.
#[derive(Default)]
pub struct MockSurface {
    fail_play: AtomicBool,
    fail_detach: AtomicBool,
    play_calls: AtomicUsize,
    detach_calls: AtomicUsize,
    attached: AtomicBool,
}

impl MockSurface {
    /// Surface whose `play` always errors.
    pub fn failing_play() -> Self {
        let surface = Self::default();
        surface.fail_play.store(true, Ordering::SeqCst);
        surface
    }

    /// Surface whose `detach` always errors.
    pub fn failing_detach() -> Self {
        let surface = Self::default();
        surface.fail_detach.store(true, Ordering::SeqCst);
        surface
    }

    /// Number of `play` calls.
    pub fn play_calls(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    /// Number of `detach` calls.
    pub fn detach_calls(&self) -> usize {
        self.detach_calls.load(Ordering::SeqCst)
    }

    /// True between a successful `play` and the next `detach`.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeepAliveSurface for MockSurface {
    async fn play(&self, _session: &dyn MediaSession) -> Result<()> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_play.load(Ordering::SeqCst) {
            bail!("NotAllowedError: play() failed because the user didn't interact");
        }
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn detach(&self) -> Result<()> {
        self.detach_calls.fetch_add(1, Ordering::SeqCst);
        self.attached.store(false, Ordering::SeqCst);
        if self.fail_detach.load(Ordering::SeqCst) {
            bail!("InvalidStateError: surface already torn down");
        }
        Ok(())
    }
}
