//! Emitter Controller
//!
//! Owns discovery and lifecycle of the one light-emitting channel used for
//! transmission:
//!
//! 1. Enumerate video inputs and let the [`ChannelSelector`] pick one.
//! 2. Open a session following [`ACQUISITION_STRATEGIES`]: the selected
//!    channel id at a modest resolution, then an environment-facing role hint.
//! 3. Bind the session to a [`KeepAliveSurface`] (errors ignored).
//! 4. Use the session's first track as the control target.
//!
//! Switching the torch follows [`TORCH_STRATEGIES`], the optional constraint
//! form first and the flat form second. Both tables are explicit so another
//! request shape can be added without touching the call sites.

use super::capabilities::{
    ChannelInfo, FacingMode, KeepAliveSurface, MediaBackend, MediaSession, NullSurface,
    Resolution, SessionRequest, TorchConstraints, TorchTrack,
};
use super::fallback::first_success;
use super::selection::{ChannelSelector, RearFacingSelector};
use crate::error::{EmitterError, EmitterResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// How a session was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStrategy {
    /// Exact channel id picked by the selector.
    ById,
    /// Role hint, letting the platform pick an environment-facing camera.
    ByRole,
}

impl fmt::Display for AcquisitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionStrategy::ById => write!(f, "by-id"),
            AcquisitionStrategy::ByRole => write!(f, "by-role"),
        }
    }
}

/// Session acquisition order. No third fallback.
pub const ACQUISITION_STRATEGIES: &[AcquisitionStrategy] =
    &[AcquisitionStrategy::ById, AcquisitionStrategy::ByRole];

/// Request shape used to switch the torch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchStrategy {
    /// `advanced: [{ torch }]`
    Advanced,
    /// `{ torch }`
    Direct,
}

impl TorchStrategy {
    /// Constraint value for this shape.
    pub fn constraints(self, on: bool) -> TorchConstraints {
        match self {
            TorchStrategy::Advanced => TorchConstraints::Advanced { torch: on },
            TorchStrategy::Direct => TorchConstraints::Direct { torch: on },
        }
    }
}

/// Torch request order.
pub const TORCH_STRATEGIES: &[TorchStrategy] = &[TorchStrategy::Advanced, TorchStrategy::Direct];

/// An acquired, exclusive hardware session.
pub struct EmitterHandle {
    session: Box<dyn MediaSession>,
    track: Arc<dyn TorchTrack>,
    strategy: AcquisitionStrategy,
    channel: Option<ChannelInfo>,
}

impl EmitterHandle {
    /// Strategy that produced the session.
    pub fn strategy(&self) -> AcquisitionStrategy {
        self.strategy
    }

    /// Channel picked by the selector, if enumeration found one.
    pub fn selected_channel(&self) -> Option<&ChannelInfo> {
        self.channel.as_ref()
    }

    /// Active control target.
    pub fn track(&self) -> &Arc<dyn TorchTrack> {
        &self.track
    }
}

impl fmt::Debug for EmitterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterHandle")
            .field("strategy", &self.strategy)
            .field("channel", &self.channel)
            .field("track", &self.track.label())
            .finish()
    }
}

/// Discovers, holds and releases the light-emitting channel.
pub struct EmitterController {
    backend: Arc<dyn MediaBackend>,
    selector: Box<dyn ChannelSelector>,
    surface: Arc<dyn KeepAliveSurface>,
    resolution: Resolution,
    handle: Option<EmitterHandle>,
}

impl EmitterController {
    /// Controller with the rear-facing selector, no keep-alive surface and VGA target size.
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            backend,
            selector: Box::new(RearFacingSelector::default()),
            surface: Arc::new(NullSurface),
            resolution: Resolution::VGA,
            handle: None,
        }
    }

    /// Replace the channel selection policy.
    pub fn with_selector(mut self, selector: impl ChannelSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Bind sessions to this keep-alive surface.
    pub fn with_surface(mut self, surface: Arc<dyn KeepAliveSurface>) -> Self {
        self.surface = surface;
        self
    }

    /// Target resolution for the by-id request.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// True while a session is held.
    pub fn is_acquired(&self) -> bool {
        self.handle.is_some()
    }

    /// Current session, if any.
    pub fn handle(&self) -> Option<&EmitterHandle> {
        self.handle.as_ref()
    }

    /// All channels reported by the backend.
    pub async fn channels(&self) -> EmitterResult<Vec<ChannelInfo>> {
        self.backend
            .enumerate_channels()
            .await
            .map_err(EmitterError::Enumeration)
    }

    /// Channel the selector would pick right now.
    pub async fn preferred_channel(&self) -> EmitterResult<Option<ChannelInfo>> {
        let channels = self.channels().await?;
        Ok(self.selector.select(&channels).cloned())
    }

    /// Open the session, or return the one already held.
    #[instrument(skip_all)]
    pub async fn acquire(&mut self) -> EmitterResult<&EmitterHandle> {
        if self.handle.is_none() {
            let handle = self.open().await?;
            info!(
                strategy = %handle.strategy,
                track = %handle.track.label(),
                "Emitter acquired"
            );
            self.handle = Some(handle);
        } else {
            debug!("Reusing existing emitter session");
        }
        self.handle.as_ref().ok_or(EmitterError::NotAcquired)
    }

    async fn open(&self) -> EmitterResult<EmitterHandle> {
        let channel = self.preferred_channel().await?;
        match &channel {
            Some(c) => debug!(id = %c.id, label = %c.label, "Selected channel"),
            None => debug!("No video input enumerated, letting the platform choose"),
        }

        let backend = Arc::clone(&self.backend);
        let channel_id = channel.as_ref().map(|c| c.id.clone());
        let resolution = self.resolution;
        let (strategy, session) = first_success("Camera session", ACQUISITION_STRATEGIES, |s| {
            let backend = Arc::clone(&backend);
            let request = match s {
                AcquisitionStrategy::ById => SessionRequest::by_id(channel_id.clone(), resolution),
                AcquisitionStrategy::ByRole => SessionRequest::by_role(FacingMode::Environment),
            };
            async move { backend.open_session(&request).await }
        })
        .await
        .map_err(|e| {
            error!(error = %format!("{:#}", e.last), "Both camera methods failed");
            EmitterError::Acquisition {
                attempts: e.attempts,
                source: e.last,
            }
        })?;

        if let Err(e) = self.surface.play(session.as_ref()).await {
            debug!(error = %e, "Keep-alive surface failed to play, ignoring");
        }

        let Some(track) = session.tracks().into_iter().next() else {
            session.stop_all().await;
            self.detach_surface();
            return Err(EmitterError::NoControllableChannel);
        };

        Ok(EmitterHandle {
            session,
            track,
            strategy,
            channel,
        })
    }

    /// Switch the torch on or off, trying each request shape in turn.
    pub async fn set_intensity(&self, on: bool) -> EmitterResult<()> {
        let handle = self.handle.as_ref().ok_or(EmitterError::NotAcquired)?;
        let track = &handle.track;
        first_success("Torch constraint", TORCH_STRATEGIES, |s| {
            let track = Arc::clone(track);
            async move { track.apply_constraints(&s.constraints(on)).await }
        })
        .await
        .map(|(strategy, ())| debug!(on, ?strategy, "Torch set"))
        .map_err(|e| {
            error!(on, error = %format!("{:#}", e.last), "Torch not supported");
            EmitterError::Capability {
                on,
                source: e.last,
            }
        })
    }

    /// Stop every track and forget the session. Safe to call at any time.
    pub async fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.session.stop_all().await;
            info!("Emitter released");
        }
        self.detach_surface();
    }

    fn detach_surface(&self) {
        if let Err(e) = self.surface.detach() {
            debug!(error = %e, "Keep-alive surface detach failed, ignoring");
        }
    }
}

impl fmt::Debug for EmitterController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterController")
            .field("resolution", &self.resolution)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_tables_order() {
        assert_eq!(
            ACQUISITION_STRATEGIES,
            &[AcquisitionStrategy::ById, AcquisitionStrategy::ByRole]
        );
        assert_eq!(
            TORCH_STRATEGIES
                .iter()
                .map(|s| s.constraints(true))
                .collect::<Vec<_>>(),
            vec![
                TorchConstraints::Advanced { torch: true },
                TorchConstraints::Direct { torch: true }
            ]
        );
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(AcquisitionStrategy::ById.to_string(), "by-id");
        assert_eq!(AcquisitionStrategy::ByRole.to_string(), "by-role");
    }
}
