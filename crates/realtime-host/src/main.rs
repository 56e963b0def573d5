//! Reference host for the real-time system.
//!
//! Wires the core to in-memory variable and switch stores, a map loaded
//! from the configured note, and the operating system clock. It then runs
//! the sampling timer and a frame loop that logs the screen tone and a
//! sample dialogue line.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `REALTIME_CONFIG` (must exist) or
//!    `realtime-config.yaml` (defaults when absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the in-memory host stores and load the configured map
//! 4. Build and validate the real-time system
//! 5. Start the one-second sampling timer
//! 6. Run the frame loop until Ctrl-C or `host.max_frames`
//! 7. Stop the timer and log the result

mod error;
mod frame;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use realtime_core::clock::SystemClock;
use realtime_core::config::RealTimeConfig;
use realtime_core::host::{MemoryMap, MemorySwitches, MemoryVariables};
use realtime_core::system::{HostHandles, RealTimeSystem};
use realtime_core::timer::SamplingTimer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::HostError;
use crate::frame::LogSink;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "realtime-config.yaml";

/// Application entry point for the reference host.
///
/// Runs on a current-thread runtime: sampling, frames and text expansion
/// share one logical thread.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the timer cannot start.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path, from_file) = load_config(
        std::env::var_os("REALTIME_CONFIG").map(PathBuf::from),
        Path::new(DEFAULT_CONFIG_PATH),
    )?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("realtime-host starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        warn!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Host stores.
    let variables = Arc::new(MemoryVariables::new());
    let switches = Arc::new(MemorySwitches::new());
    let map = Arc::new(MemoryMap::with_note(config.host.map_note.clone()));
    let host = HostHandles {
        variables: variables.clone(),
        switches,
        map,
        clock: Arc::new(SystemClock),
    };

    // 4. Real-time system.
    let system = Arc::new(RealTimeSystem::new(&config, host).map_err(HostError::from)?);

    // 5. Sampling timer.
    let mut timer = SamplingTimer::new(config.timer.sample_interval()).map_err(HostError::from)?;
    timer.start(system.clone()).map_err(HostError::from)?;
    info!(
        period_ms = u64::try_from(timer.period().as_millis()).unwrap_or(u64::MAX),
        "Sampling timer configured"
    );

    // 6. Frame loop.
    let mut sink = LogSink::default();
    let frames = tokio::select! {
        frames = frame::run_frames(
            &system,
            &config.host.sample_text,
            Duration::from_millis(config.host.frame_interval_ms),
            config.host.max_frames,
            &mut sink,
        ) => frames,
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| HostError::Signal { message: format!("{e}") })?;
            info!("Ctrl-C received, shutting down");
            0
        }
    };

    // 7. Shutdown.
    if let Err(err) = timer.stop().await {
        warn!(error = %err, "Sampling ended abnormally");
    }
    let snapshot = system.latest_snapshot();
    info!(
        frames,
        samples = timer.ticks(),
        variables_written = variables.snapshot().len(),
        last_sample = %format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            snapshot.year, snapshot.month, snapshot.day,
            snapshot.hour, snapshot.minute, snapshot.second
        ),
        "realtime-host stopped"
    );
    if !system.clock_state().has_sample() {
        warn!("No clock sample was ever recorded");
    }

    Ok(())
}

/// Load configuration.
///
/// An `explicit` path (from `REALTIME_CONFIG`) must exist; a missing file
/// there is an error. Only the implicit `fallback` path may be absent, in
/// which case the defaults are used. Returns the config, the path that
/// was consulted and whether a file was read.
fn load_config(
    explicit: Option<PathBuf>,
    fallback: &Path,
) -> Result<(RealTimeConfig, PathBuf, bool), HostError> {
    let config_path = match explicit {
        Some(path) => path,
        None if !fallback.exists() => {
            return Ok((RealTimeConfig::default(), fallback.to_path_buf(), false));
        }
        None => fallback.to_path_buf(),
    };

    let config = RealTimeConfig::from_file(&config_path)?;
    config.validate()?;
    Ok((config, config_path, true))
}
