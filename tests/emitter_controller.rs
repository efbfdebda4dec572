//! Integration tests for the emitter controller
//!
//! These tests drive `EmitterController` against the mock media backend and
//! check channel selection, the two acquisition strategies, the two torch
//! request shapes and release behavior.

use std::sync::Arc;
use torch_morse::error::{EmitterError, EmitterErrorKind};
use torch_morse::hardware::mock::{MockMediaBackend, MockSurface, TorchSupport};
use torch_morse::hardware::{
    AcquisitionStrategy, ChannelConstraint, ChannelInfo, ChannelKind, EmitterController,
    FacingMode, RearFacingSelector, Resolution, SessionRequest, TorchConstraints,
};
use tracing_test::traced_test;

fn controller(backend: &MockMediaBackend) -> EmitterController {
    EmitterController::new(Arc::new(backend.clone()))
}

// =============================================================================
// Acquisition
// =============================================================================

#[tokio::test]
async fn test_acquire_by_id_selects_back_camera() {
    let backend = MockMediaBackend::new();
    let mut emitter = controller(&backend);

    let handle = emitter.acquire().await.unwrap();
    assert_eq!(handle.strategy(), AcquisitionStrategy::ById);
    assert_eq!(handle.selected_channel().unwrap().id, "mock-back");

    assert_eq!(backend.open_calls(), 1);
    assert_eq!(
        backend.requests(),
        vec![SessionRequest::by_id(
            Some("mock-back".to_string()),
            Resolution::VGA
        )]
    );
    assert!(emitter.is_acquired());
}

#[tokio::test]
#[traced_test]
async fn test_acquire_falls_back_to_role() {
    let backend = MockMediaBackend::new().reject_by_id();
    let mut emitter = controller(&backend);

    let handle = emitter.acquire().await.unwrap();
    assert_eq!(handle.strategy(), AcquisitionStrategy::ByRole);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].channel,
        Some(ChannelConstraint::Facing(FacingMode::Environment))
    );
    assert_eq!(requests[1].ideal_resolution, None);
    assert!(logs_contain("trying next strategy"));
}

#[tokio::test]
#[traced_test]
async fn test_acquire_fails_when_both_strategies_rejected() {
    let backend = MockMediaBackend::new().reject_by_id().reject_by_role();
    let mut emitter = controller(&backend);

    let err = emitter.acquire().await.unwrap_err();
    assert!(
        matches!(err, EmitterError::Acquisition { attempts: 2, .. }),
        "unexpected error: {err}"
    );
    assert_eq!(err.kind(), EmitterErrorKind::Acquisition);
    assert!(err.to_string().contains("facingMode"));
    assert_eq!(backend.open_calls(), 2);
    assert_eq!(backend.stop_calls(), 0);
    assert!(!emitter.is_acquired());
    assert!(logs_contain("Both camera methods failed"));
}

#[tokio::test]
async fn test_enumeration_failure() {
    let backend = MockMediaBackend::new().fail_enumeration();
    let mut emitter = controller(&backend);

    let err = emitter.acquire().await.unwrap_err();
    assert!(matches!(err, EmitterError::Enumeration(_)));
    assert_eq!(err.kind(), EmitterErrorKind::Acquisition);
    assert_eq!(backend.open_calls(), 0);
}

#[tokio::test]
async fn test_no_video_inputs_lets_platform_choose() {
    let backend = MockMediaBackend::with_channels(vec![ChannelInfo {
        id: "mic".to_string(),
        label: "Built-in microphone".to_string(),
        kind: ChannelKind::AudioInput,
    }]);
    let mut emitter = controller(&backend);

    let handle = emitter.acquire().await.unwrap();
    assert_eq!(handle.strategy(), AcquisitionStrategy::ById);
    assert!(handle.selected_channel().is_none());
    assert_eq!(backend.requests()[0].channel, None);
    assert_eq!(backend.requests()[0].ideal_resolution, Some(Resolution::VGA));
}

#[tokio::test]
async fn test_session_without_tracks_is_stopped() {
    let backend = MockMediaBackend::new().with_track_count(0);
    let surface = Arc::new(MockSurface::default());
    let mut emitter = controller(&backend).with_surface(surface.clone());

    let err = emitter.acquire().await.unwrap_err();
    assert!(matches!(err, EmitterError::NoControllableChannel));
    assert_eq!(backend.stop_calls(), 1);
    assert_eq!(surface.detach_calls(), 1);
    assert!(!emitter.is_acquired());
}

#[tokio::test]
async fn test_acquire_is_idempotent() {
    let backend = MockMediaBackend::new();
    let mut emitter = controller(&backend);

    emitter.acquire().await.unwrap();
    emitter.acquire().await.unwrap();
    assert_eq!(backend.open_calls(), 1);
}

#[tokio::test]
async fn test_surface_errors_are_ignored() {
    let backend = MockMediaBackend::new();
    let surface = Arc::new(MockSurface::failing_play());
    let mut emitter = controller(&backend).with_surface(surface.clone());

    emitter.acquire().await.unwrap();
    assert_eq!(surface.play_calls(), 1);
    assert!(!surface.is_attached());

    let backend = MockMediaBackend::new();
    let surface = Arc::new(MockSurface::failing_detach());
    let mut emitter = controller(&backend).with_surface(surface.clone());
    emitter.acquire().await.unwrap();
    assert!(surface.is_attached());
    emitter.release().await;
    assert_eq!(surface.detach_calls(), 1);
    assert_eq!(backend.stop_calls(), 1);
}

#[tokio::test]
async fn test_custom_selector_and_resolution() {
    let backend = MockMediaBackend::new();
    let resolution = Resolution {
        width: 1280,
        height: 720,
    };
    let mut emitter = controller(&backend)
        .with_selector(RearFacingSelector::with_hints(["front"]))
        .with_resolution(resolution);

    assert_eq!(
        emitter.preferred_channel().await.unwrap().unwrap().id,
        "mock-front"
    );
    emitter.acquire().await.unwrap();
    assert_eq!(
        backend.requests(),
        vec![SessionRequest::by_id(
            Some("mock-front".to_string()),
            resolution
        )]
    );
}

#[tokio::test]
async fn test_channels_lists_everything() {
    let backend = MockMediaBackend::new();
    let emitter = controller(&backend);
    let channels = emitter.channels().await.unwrap();
    assert_eq!(channels.len(), 2);
    assert!(channels.iter().all(|c| c.kind == ChannelKind::VideoInput));
    assert_eq!(backend.open_calls(), 0);
}

// =============================================================================
// Torch control
// =============================================================================

#[tokio::test]
async fn test_set_intensity_requires_session() {
    let backend = MockMediaBackend::new();
    let emitter = controller(&backend);

    let err = emitter.set_intensity(true).await.unwrap_err();
    assert!(matches!(err, EmitterError::NotAcquired));
    assert_eq!(err.kind(), EmitterErrorKind::NotAcquired);
    assert!(backend.constraint_attempts().is_empty());
}

#[tokio::test]
async fn test_advanced_form_tried_first() {
    let backend = MockMediaBackend::new().with_torch_support(TorchSupport::AdvancedOnly);
    let mut emitter = controller(&backend);
    emitter.acquire().await.unwrap();

    emitter.set_intensity(true).await.unwrap();
    assert!(backend.is_torch_on());
    assert_eq!(
        backend.constraint_attempts(),
        vec![TorchConstraints::Advanced { torch: true }]
    );
}

#[tokio::test]
#[traced_test]
async fn test_direct_form_fallback() {
    let backend = MockMediaBackend::new().with_torch_support(TorchSupport::DirectOnly);
    let mut emitter = controller(&backend);
    emitter.acquire().await.unwrap();

    emitter.set_intensity(true).await.unwrap();
    emitter.set_intensity(false).await.unwrap();
    assert!(!backend.is_torch_on());
    assert_eq!(
        backend.constraint_attempts(),
        vec![
            TorchConstraints::Advanced { torch: true },
            TorchConstraints::Direct { torch: true },
            TorchConstraints::Advanced { torch: false },
            TorchConstraints::Direct { torch: false },
        ]
    );
    assert!(logs_contain("Torch constraint failed"));
}

#[tokio::test]
async fn test_torch_unsupported() {
    let backend = MockMediaBackend::new().with_torch_support(TorchSupport::Unsupported);
    let mut emitter = controller(&backend);
    emitter.acquire().await.unwrap();

    let err = emitter.set_intensity(true).await.unwrap_err();
    assert!(matches!(err, EmitterError::Capability { on: true, .. }));
    assert_eq!(err.kind(), EmitterErrorKind::Capability);
    assert_eq!(backend.constraint_attempts().len(), 2);
    assert!(emitter.is_acquired());
}

// =============================================================================
// Release
// =============================================================================

#[tokio::test]
async fn test_release_is_idempotent() {
    let backend = MockMediaBackend::new();
    let surface = Arc::new(MockSurface::default());
    let mut emitter = controller(&backend).with_surface(surface.clone());

    emitter.release().await;
    assert_eq!(backend.stop_calls(), 0);

    emitter.acquire().await.unwrap();
    emitter.set_intensity(true).await.unwrap();
    emitter.release().await;
    emitter.release().await;

    assert_eq!(backend.stop_calls(), 1);
    assert!(!backend.is_torch_on());
    assert!(!surface.is_attached());
    assert!(!emitter.is_acquired());
    assert!(matches!(
        emitter.set_intensity(false).await,
        Err(EmitterError::NotAcquired)
    ));
}

#[tokio::test]
async fn test_reacquire_after_release() {
    let backend = MockMediaBackend::new();
    let mut emitter = controller(&backend);

    emitter.acquire().await.unwrap();
    emitter.release().await;
    emitter.acquire().await.unwrap();
    assert_eq!(backend.open_calls(), 2);
    assert_eq!(backend.stop_calls(), 1);
}
