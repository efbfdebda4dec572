//! Integration tests for the LED class backend
//!
//! Each test builds a fake `/sys/class/leds` tree in a temporary directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use torch_morse::error::EmitterError;
use torch_morse::hardware::sysfs::SysfsLedBackend;
use torch_morse::hardware::{
    AcquisitionStrategy, EmitterController, FacingMode, MediaBackend, Resolution, SessionRequest,
    TorchConstraints,
};
use torch_morse::transmit::{NoopObserver, TransmissionEngine, TransmissionOutcome};

fn add_led(root: &Path, name: &str, max_brightness: Option<u32>) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("brightness"), "0").unwrap();
    if let Some(max) = max_brightness {
        fs::write(dir.join("max_brightness"), format!("{max}\n")).unwrap();
    }
}

fn brightness(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name).join("brightness"))
        .unwrap()
        .trim()
        .to_string()
}

fn led_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    add_led(tmp.path(), "green:status", Some(1));
    add_led(tmp.path(), "white:flash", Some(255));
    // no brightness attribute, not an LED
    fs::create_dir_all(tmp.path().join("junk")).unwrap();
    tmp
}

#[tokio::test]
async fn test_enumerates_led_directories() {
    let tmp = led_tree();
    let backend = SysfsLedBackend::new(tmp.path());

    let names: Vec<String> = backend
        .enumerate_channels()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(names, vec!["green:status", "white:flash"]);
}

#[tokio::test]
async fn test_controller_drives_flash_led() {
    let tmp = led_tree();
    let mut emitter = EmitterController::new(Arc::new(SysfsLedBackend::new(tmp.path())));

    let handle = emitter.acquire().await.unwrap();
    assert_eq!(handle.strategy(), AcquisitionStrategy::ById);
    assert_eq!(handle.selected_channel().unwrap().id, "white:flash");

    emitter.set_intensity(true).await.unwrap();
    assert_eq!(brightness(tmp.path(), "white:flash"), "255");
    emitter.set_intensity(false).await.unwrap();
    assert_eq!(brightness(tmp.path(), "white:flash"), "0");

    emitter.set_intensity(true).await.unwrap();
    emitter.release().await;
    assert_eq!(brightness(tmp.path(), "white:flash"), "0");
    assert_eq!(brightness(tmp.path(), "green:status"), "0");
}

#[tokio::test]
async fn test_direct_form_without_max_brightness() {
    let tmp = TempDir::new().unwrap();
    add_led(tmp.path(), "torch-led", None);
    let backend = SysfsLedBackend::new(tmp.path());

    let session = backend
        .open_session(&SessionRequest::by_role(FacingMode::Environment))
        .await
        .unwrap();
    let track = session.tracks().remove(0);
    assert!(track
        .apply_constraints(&TorchConstraints::Advanced { torch: true })
        .await
        .is_err());
    track
        .apply_constraints(&TorchConstraints::Direct { torch: true })
        .await
        .unwrap();
    assert_eq!(brightness(tmp.path(), "torch-led"), "1");

    let mut emitter = EmitterController::new(Arc::new(backend));
    emitter.acquire().await.unwrap();
    emitter.set_intensity(false).await.unwrap();
    assert_eq!(brightness(tmp.path(), "torch-led"), "0");
}

#[tokio::test]
async fn test_session_request_matching() {
    let tmp = led_tree();
    let backend = SysfsLedBackend::new(tmp.path());

    let missing = SessionRequest::by_id(Some("red:alarm".to_string()), Resolution::VGA);
    assert!(backend.open_session(&missing).await.is_err());
    assert!(backend
        .open_session(&SessionRequest::by_role(FacingMode::User))
        .await
        .is_err());

    let session = backend
        .open_session(&SessionRequest::by_role(FacingMode::Environment))
        .await
        .unwrap();
    assert_eq!(session.tracks()[0].label(), "white:flash");

    let session = backend
        .open_session(&SessionRequest::by_id(None, Resolution::VGA))
        .await
        .unwrap();
    assert_eq!(session.tracks()[0].label(), "green:status");
}

#[tokio::test]
async fn test_missing_root_fails_enumeration() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("does-not-exist");
    let mut emitter = EmitterController::new(Arc::new(SysfsLedBackend::new(root)));

    let err = emitter.acquire().await.unwrap_err();
    assert!(matches!(err, EmitterError::Enumeration(_)));
}

#[tokio::test]
async fn test_transmit_on_led() {
    let tmp = led_tree();
    let emitter = EmitterController::new(Arc::new(SysfsLedBackend::new(tmp.path())));
    let engine = TransmissionEngine::new(emitter);

    let outcome = engine
        .transmit_with_unit("e", Duration::from_millis(1), &NoopObserver)
        .await
        .unwrap();
    assert_eq!(outcome, TransmissionOutcome::Completed { length: 1 });
    assert_eq!(brightness(tmp.path(), "white:flash"), "0");
}
