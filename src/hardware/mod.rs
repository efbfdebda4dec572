//! Emitter hardware layer.
//!
//! Capability traits for the platform media stack, the channel selection
//! policy, the emitter controller built on top of them, and two backends:
//! an in-memory mock and Linux LED class devices.

pub mod capabilities;
pub mod emitter;
pub mod fallback;
pub mod mock;
pub mod selection;
pub mod sysfs;

pub use capabilities::{
    ChannelConstraint, ChannelInfo, ChannelKind, FacingMode, KeepAliveSurface, MediaBackend,
    MediaSession, NullSurface, Resolution, SessionRequest, TorchConstraints, TorchTrack,
};
pub use emitter::{
    AcquisitionStrategy, EmitterController, EmitterHandle, TorchStrategy, ACQUISITION_STRATEGIES,
    TORCH_STRATEGIES,
};
pub use selection::{ChannelSelector, RearFacingSelector, DEFAULT_ROLE_HINTS};
