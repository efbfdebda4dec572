//! CLI Entry Point for torch-morse
//!
//! Provides command-line interface for:
//! - Sending text as Morse code on a torch LED
//! - Previewing the encoding without touching hardware
//! - Listing the channels a backend reports
//!
//! # Usage
//!
//! ```bash
//! torch-morse send "SOS" --wpm 12 --backend sysfs
//! torch-morse preview "Hello world"
//! torch-morse devices --backend sysfs
//! torch-morse config > config/torch_morse.toml
//! ```
//!
//! Ctrl+C stops a running `send`; the torch is switched off and released.

// Global allocator (Microsoft Rust Guidelines: M-MIMALLOC-APPS)
#[cfg(not(test))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use torch_morse::config::{BackendKind, TorchMorseConfig, DEFAULT_CONFIG_PATH};
use torch_morse::hardware::{
    mock::MockMediaBackend, sysfs::SysfsLedBackend, EmitterController, MediaBackend,
    RearFacingSelector,
};
use torch_morse::logging::{self, OutputFormat, TracingConfig};
use torch_morse::morse::{self, format_preview, MorseTiming};
use torch_morse::transmit::{
    ChannelObserver, TransmissionEngine, TransmissionEvent, TransmissionOutcome,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "torch-morse")]
#[command(about = "Send Morse code with a camera torch", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true, default_value = "compact")]
    log_format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    /// In-memory backend, no hardware
    Mock,
    /// Linux LED class devices
    Sysfs,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Mock => BackendKind::Mock,
            BackendArg::Sysfs => BackendKind::Sysfs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Transmit text on the torch
    Send {
        /// Text to send
        text: String,

        /// Base unit in milliseconds
        #[arg(long, conflicts_with = "wpm")]
        unit: Option<u64>,

        /// Speed in words per minute (PARIS timing)
        #[arg(long)]
        wpm: Option<u32>,

        /// Emitter backend, overrides the configuration
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,
    },

    /// Show the Morse patterns for text
    Preview {
        /// Text to encode
        text: String,
    },

    /// List channels and mark the one that would be used
    Devices {
        /// Emitter backend, overrides the configuration
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TorchMorseConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    config.validate().map_err(|e| anyhow!(e))?;

    let level = logging::parse_log_level(&config.application.log_level).map_err(|e| anyhow!(e))?;
    logging::init(TracingConfig::new(level).with_format(cli.log_format)).map_err(|e| anyhow!(e))?;

    match cli.command {
        Commands::Send {
            text,
            unit,
            wpm,
            backend,
        } => send(config, text, unit, wpm, backend).await,
        Commands::Preview { text } => {
            println!("{}", format_preview(&morse::preview(&text)));
            Ok(())
        }
        Commands::Devices { backend } => devices(config, backend).await,
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn build_backend(config: &TorchMorseConfig, kind: BackendKind) -> Arc<dyn MediaBackend> {
    match kind {
        BackendKind::Mock => Arc::new(MockMediaBackend::new()),
        BackendKind::Sysfs => Arc::new(SysfsLedBackend::new(config.emitter.sysfs_root.clone())),
    }
}

fn build_controller(config: &TorchMorseConfig, backend: Option<BackendArg>) -> EmitterController {
    let kind = backend.map(BackendKind::from).unwrap_or(config.emitter.backend);
    info!(backend = %kind, "Using emitter backend");
    EmitterController::new(build_backend(config, kind))
        .with_selector(RearFacingSelector::with_hints(&config.emitter.role_hints))
        .with_resolution(config.emitter.resolution())
}

fn resolve_timing(
    config: &TorchMorseConfig,
    unit: Option<u64>,
    wpm: Option<u32>,
) -> Result<MorseTiming> {
    let timing = match (unit, wpm) {
        (Some(ms), _) => MorseTiming::from_millis(ms)?,
        (None, Some(wpm)) => MorseTiming::from_wpm(wpm)?,
        (None, None) => config.timing().map_err(|e| anyhow!(e))?,
    };
    Ok(timing)
}

async fn send(
    config: TorchMorseConfig,
    text: String,
    unit: Option<u64>,
    wpm: Option<u32>,
    backend: Option<BackendArg>,
) -> Result<()> {
    let timing = resolve_timing(&config, unit, wpm)?;
    let sequence = morse::encode(&text);
    println!("{}", format_preview(&sequence.to_strings()));
    println!(
        "{} patterns, {} ms unit, about {:.1} s",
        sequence.len(),
        timing.unit().as_millis(),
        timing.sequence_duration(&sequence).as_secs_f64()
    );

    let engine = Arc::new(TransmissionEngine::new(build_controller(&config, backend)));

    let cancel = engine.cancel_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping transmission");
            cancel.cancel();
        }
    });

    let (observer, mut events) = ChannelObserver::channel();
    let total = sequence.len();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                TransmissionEvent::Started { length } => println!("started ({} patterns)", length),
                TransmissionEvent::Progress { index } => println!("  {}/{}", index, total),
                TransmissionEvent::Error { error } => eprintln!("error: {}", error),
                TransmissionEvent::Cancelled { completed } => {
                    println!("cancelled after {} patterns", completed)
                }
                TransmissionEvent::Done => println!("done"),
            }
        }
    });

    let result = engine.transmit_with_timing(&text, timing, &observer).await;
    drop(observer);
    printer.await?;

    match result? {
        TransmissionOutcome::Skipped => println!("nothing to send"),
        TransmissionOutcome::Completed { .. } | TransmissionOutcome::Cancelled { .. } => {}
    }
    Ok(())
}

async fn devices(config: TorchMorseConfig, backend: Option<BackendArg>) -> Result<()> {
    let controller = build_controller(&config, backend);
    let channels = controller.channels().await?;
    let preferred = controller.preferred_channel().await?;

    if channels.is_empty() {
        println!("no channels found");
        return Ok(());
    }
    for channel in &channels {
        let marker = if preferred.as_ref().map(|p| &p.id) == Some(&channel.id) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<24} {:<10} {}",
            marker, channel.id, channel.kind, channel.label
        );
    }
    Ok(())
}
