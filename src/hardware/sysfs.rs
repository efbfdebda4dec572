//! Linux LED-class backend.
//!
//! Phones and dev boards running mainline Linux expose the camera flash as an
//! LED class device, e.g. `/sys/class/leds/white:flash`. Each directory with
//! a `brightness` attribute is reported as a channel whose label is the
//! directory name, so the rear-facing selector and the by-role fallback work
//! the same way they do for real cameras.
//!
//! Torch request shapes map onto the attributes as follows:
//!
//! | Shape      | Write to `brightness`            |
//! |------------|----------------------------------|
//! | `Advanced` | value of `max_brightness` or `0` |
//! | `Direct`   | `1` or `0`                       |
//!
//! A device without a readable `max_brightness` rejects the advanced shape.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use super::capabilities::{
    ChannelConstraint, ChannelInfo, FacingMode, MediaBackend, MediaSession, SessionRequest,
    TorchConstraints, TorchTrack,
};

/// Default LED class directory.
pub const DEFAULT_LED_ROOT: &str = "/sys/class/leds";

/// Substrings identifying a camera flash LED.
const FLASH_HINTS: &[&str] = &["flash", "torch"];

const BRIGHTNESS: &str = "brightness";
const MAX_BRIGHTNESS: &str = "max_brightness";

/// [`MediaBackend`] over `/sys/class/leds`.
#[derive(Debug, Clone)]
pub struct SysfsLedBackend {
    root: PathBuf,
}

impl Default for SysfsLedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_LED_ROOT)
    }
}

impl SysfsLedBackend {
    /// Backend scanning `root` for LED devices.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn led_names(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .with_context(|| format!("cannot read {}", self.root.display()))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if fs::try_exists(entry.path().join(BRIGHTNESS))
                .await
                .unwrap_or(false)
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn open_track(&self, name: &str) -> Box<dyn MediaSession> {
        debug!(led = name, "SysfsLedBackend: session opened");
        Box::new(SysfsSession {
            track: Arc::new(SysfsTrack {
                name: name.to_string(),
                dir: self.root.join(name),
            }),
        })
    }
}

fn is_flash(name: &str) -> bool {
    let name = name.to_lowercase();
    FLASH_HINTS.iter().any(|hint| name.contains(hint))
}

#[async_trait]
impl MediaBackend for SysfsLedBackend {
    async fn enumerate_channels(&self) -> Result<Vec<ChannelInfo>> {
        Ok(self
            .led_names()
            .await?
            .into_iter()
            .map(|name| ChannelInfo::video(name.clone(), name))
            .collect())
    }

    async fn open_session(&self, request: &SessionRequest) -> Result<Box<dyn MediaSession>> {
        let names = self.led_names().await?;
        let name = match &request.channel {
            Some(ChannelConstraint::Exact(id)) => names
                .iter()
                .find(|n| *n == id)
                .ok_or_else(|| anyhow!("LED device '{id}' not found"))?,
            Some(ChannelConstraint::Facing(FacingMode::Environment)) => names
                .iter()
                .find(|n| is_flash(n))
                .ok_or_else(|| anyhow!("no flash LED under {}", self.root.display()))?,
            Some(ChannelConstraint::Facing(FacingMode::User)) => {
                bail!("front-facing LEDs are not supported")
            }
            None => names
                .first()
                .ok_or_else(|| anyhow!("no LED devices under {}", self.root.display()))?,
        };
        Ok(self.open_track(name))
    }
}

struct SysfsSession {
    track: Arc<SysfsTrack>,
}

#[async_trait]
impl MediaSession for SysfsSession {
    fn tracks(&self) -> Vec<Arc<dyn TorchTrack>> {
        vec![Arc::clone(&self.track) as Arc<dyn TorchTrack>]
    }

    async fn stop_all(&self) {
        if let Err(e) = self.track.write_brightness(0).await {
            debug!(led = %self.track.name, error = %e, "SysfsLedBackend: could not switch LED off");
        }
    }
}

struct SysfsTrack {
    name: String,
    dir: PathBuf,
}

impl SysfsTrack {
    async fn max_brightness(&self) -> Result<u32> {
        let raw = fs::read_to_string(self.dir.join(MAX_BRIGHTNESS))
            .await
            .with_context(|| format!("{}: no {MAX_BRIGHTNESS}", self.name))?;
        raw.trim()
            .parse()
            .with_context(|| format!("{}: bad {MAX_BRIGHTNESS} '{}'", self.name, raw.trim()))
    }

    async fn write_brightness(&self, value: u32) -> Result<()> {
        fs::write(self.dir.join(BRIGHTNESS), value.to_string())
            .await
            .with_context(|| format!("{}: cannot write {BRIGHTNESS}", self.name))
    }
}

#[async_trait]
impl TorchTrack for SysfsTrack {
    fn label(&self) -> String {
        self.name.clone()
    }

    async fn apply_constraints(&self, constraints: &TorchConstraints) -> Result<()> {
        let value = match constraints {
            TorchConstraints::Advanced { torch } => {
                let max = self.max_brightness().await?;
                if *torch {
                    max
                } else {
                    0
                }
            }
            TorchConstraints::Direct { torch } => u32::from(*torch),
        };
        self.write_brightness(value).await
    }
}
