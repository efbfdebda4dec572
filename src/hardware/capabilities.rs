//! Platform Media Capabilities
//!
//! The emitter controller never talks to a camera stack directly. Instead a
//! backend implements a handful of small async traits:
//!
//! - [`MediaBackend`]: enumerate video inputs, open a session
//! - [`MediaSession`]: the open session and its controllable tracks
//! - [`TorchTrack`]: one channel whose torch can be switched by constraints
//! - [`KeepAliveSurface`]: hidden sink some platforms need to keep a session live
//!
//! # Design Philosophy
//!
//! Each capability trait:
//! - Is async (uses #[async_trait])
//! - Is thread-safe (requires Send + Sync)
//! - Uses anyhow::Result for errors
//! - Focuses on ONE thing
//!
//! Rejections are reported as plain errors. Deciding whether to retry with a
//! different request shape is the controller's job, not the backend's.
//!
//! # Example
//!
//! ```rust,ignore
//! let channels = backend.enumerate_channels().await?;
//! let request = SessionRequest::by_id(Some(channels[0].id.clone()), Resolution::VGA);
//! let session = backend.open_session(&request).await?;
//! let track = session.tracks().into_iter().next().context("no track")?;
//! track.apply_constraints(&TorchConstraints::Advanced { torch: true }).await?;
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Media kind reported by enumeration. Only video inputs are candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Camera or other video capture input.
    VideoInput,
    /// Microphone.
    AudioInput,
    /// Speaker or other audio sink.
    AudioOutput,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ChannelKind::VideoInput => "videoinput",
            ChannelKind::AudioInput => "audioinput",
            ChannelKind::AudioOutput => "audiooutput",
        })
    }
}

/// One enumerated device channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Backend-specific stable identifier.
    pub id: String,
    /// Human-readable label. May be empty before the user granted access.
    pub label: String,
    /// Media kind.
    pub kind: ChannelKind,
}

impl ChannelInfo {
    /// Convenience constructor for a video input.
    pub fn video(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: ChannelKind::VideoInput,
        }
    }
}

/// Direction a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Towards the user.
    User,
    /// Away from the user, where the torch normally is.
    Environment,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Requested capture size. Treated as a preference, never a hard limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// 640x480.
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

/// How the session request identifies the wanted channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelConstraint {
    /// Exactly this channel id.
    Exact(String),
    /// Any channel facing this way, preferred but not required.
    Facing(FacingMode),
}

/// Parameters for [`MediaBackend::open_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    /// Channel selection, `None` lets the platform choose.
    pub channel: Option<ChannelConstraint>,
    /// Preferred resolution, if any.
    pub ideal_resolution: Option<Resolution>,
}

impl SessionRequest {
    /// Request a specific channel id (or any channel when `id` is `None`) at a target size.
    pub fn by_id(id: Option<String>, resolution: Resolution) -> Self {
        Self {
            channel: id.map(ChannelConstraint::Exact),
            ideal_resolution: Some(resolution),
        }
    }

    /// Request any channel with the given facing, no size preference.
    pub fn by_role(facing: FacingMode) -> Self {
        Self {
            channel: Some(ChannelConstraint::Facing(facing)),
            ideal_resolution: None,
        }
    }
}

/// The two request shapes under which platforms expose the torch toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorchConstraints {
    /// Optional constraint set (`advanced: [{ torch }]`).
    Advanced {
        /// Desired torch state.
        torch: bool,
    },
    /// Flat, top-level constraint (`{ torch }`).
    Direct {
        /// Desired torch state.
        torch: bool,
    },
}

impl TorchConstraints {
    /// Torch state this request asks for.
    pub fn torch(&self) -> bool {
        match self {
            TorchConstraints::Advanced { torch } | TorchConstraints::Direct { torch } => *torch,
        }
    }
}

/// Capability: Channel Discovery and Session Opening
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// List every channel the platform reports, in platform order.
    async fn enumerate_channels(&self) -> Result<Vec<ChannelInfo>>;

    /// Open an exclusive session. Errors mean the request was rejected.
    async fn open_session(&self, request: &SessionRequest) -> Result<Box<dyn MediaSession>>;
}

/// Capability: Open Media Session
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Controllable tracks, first one is the default control target.
    fn tracks(&self) -> Vec<Arc<dyn TorchTrack>>;

    /// Stop every underlying track. Must tolerate repeated calls.
    async fn stop_all(&self);
}

/// Capability: Torch Toggle
#[async_trait]
pub trait TorchTrack: Send + Sync {
    /// Label of the track, for logging.
    fn label(&self) -> String;

    /// Apply a torch constraint. Errors mean this shape was rejected.
    async fn apply_constraints(&self, constraints: &TorchConstraints) -> Result<()>;
}

/// Capability: Session Keep-Alive Sink
///
/// Some platforms tear a capture session down when nothing consumes it. A
/// surface binds the session to an invisible sink. Errors from `play` and
/// `detach` are never fatal.
#[async_trait]
pub trait KeepAliveSurface: Send + Sync {
    /// Bind the session and start consuming it.
    async fn play(&self, session: &dyn MediaSession) -> Result<()>;

    /// Pause and unbind whatever session is attached.
    fn detach(&self) -> Result<()>;
}

/// Surface for platforms that need no keep-alive sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

#[async_trait]
impl KeepAliveSurface for NullSurface {
    async fn play(&self, _session: &dyn MediaSession) -> Result<()> {
        Ok(())
    }

    fn detach(&self) -> Result<()> {
        Ok(())
    }
}
