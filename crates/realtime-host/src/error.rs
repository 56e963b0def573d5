//! Error types for the reference host binary.
//!
//! [`HostError`] is the top-level error type that wraps every failure mode
//! during startup and the frame loop.

/// Top-level error for the reference host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: realtime_core::config::ConfigError,
    },

    /// The sampling timer could not be started.
    #[error("timer error: {source}")]
    Timer {
        /// The underlying timer error.
        #[from]
        source: realtime_core::timer::TimerError,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal error: {message}")]
    Signal {
        /// Description of the signal failure.
        message: String,
    },
}
