//! Configuration loading and typed config structures.
//!
//! The configuration lives in `realtime-config.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure, and a loader
//! that reads the file. Every section is optional; missing sections fall
//! back to the stock values (all slots unbound, the default day/night
//! tones, English vocabulary).
//!
//! Parsing only checks YAML shape. Entry counts (24 tones, 12 months,
//! 7 weekdays) are checked by [`RealTimeConfig::validate`], which the
//! tone table and vocabulary builders also enforce.

use std::path::Path;
use std::time::Duration;

use realtime_types::{SwitchId, Tone, VariableId};
use serde::Deserialize;

/// Number of hourly tone keyframes.
pub const HOURS_PER_DAY: usize = 24;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but its contents are unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RealTimeConfig {
    /// Switch bindings (time freeze, anti-tint).
    #[serde(default)]
    pub switches: SwitchBindings,

    /// Variable bindings for each published clock field.
    #[serde(default)]
    pub variables: VariableBindings,

    /// One tone per hour, hour 0 first.
    #[serde(default = "default_tones")]
    pub tones: Vec<Tone>,

    /// Localized labels used by the escape codes.
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    /// Escape-code settings.
    #[serde(default)]
    pub text: TextConfig,

    /// Sampling timer settings.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Settings for the reference host binary.
    #[serde(default)]
    pub host: HostConfig,
}

impl RealTimeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check entry counts and timer settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        expect_len("tones", self.tones.len(), HOURS_PER_DAY)?;
        expect_len("vocabulary.months", self.vocabulary.months.len(), 12)?;
        expect_len("vocabulary.week_days", self.vocabulary.week_days.len(), 7)?;
        if self.timer.sample_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "timer.sample_interval_ms must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for RealTimeConfig {
    fn default() -> Self {
        Self {
            switches: SwitchBindings::default(),
            variables: VariableBindings::default(),
            tones: default_tones(),
            vocabulary: VocabularyConfig::default(),
            text: TextConfig::default(),
            timer: TimerConfig::default(),
            logging: LoggingConfig::default(),
            host: HostConfig::default(),
        }
    }
}

/// Fail with [`ConfigError::Invalid`] unless `actual == expected`.
pub(crate) fn expect_len(field: &str, actual: usize, expected: usize) -> Result<(), ConfigError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{field} must have exactly {expected} entries, found {actual}"),
        })
    }
}

/// Switches the core reads. `0` leaves the feature disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SwitchBindings {
    /// While on, variables are not updated.
    #[serde(default)]
    pub time_freeze: SwitchId,

    /// While on, the tone is neutral even on tinted maps.
    #[serde(default)]
    pub anti_tint: SwitchId,
}

/// Variables the publisher writes. `0` leaves the field unpublished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VariableBindings {
    /// Full year.
    #[serde(default)]
    pub year: VariableId,

    /// Month, 1-12.
    #[serde(default)]
    pub month: VariableId,

    /// Day of month.
    #[serde(default)]
    pub date: VariableId,

    /// Day of week, 1 = Monday .. 7 = Sunday.
    #[serde(default)]
    pub week_day: VariableId,

    /// Hour, 0-23.
    #[serde(default)]
    pub hour: VariableId,

    /// Minute, 0-59.
    #[serde(default)]
    pub minute: VariableId,

    /// Second, 0-59.
    #[serde(default)]
    pub second: VariableId,
}

/// Localized labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VocabularyConfig {
    /// Month names, January first.
    #[serde(default = "default_months")]
    pub months: Vec<String>,

    /// Weekday names, Monday first.
    #[serde(default = "default_week_days")]
    pub week_days: Vec<String>,

    /// Label for hours before noon.
    #[serde(default = "default_am")]
    pub am: String,

    /// Label for hours from noon on.
    #[serde(default = "default_pm")]
    pub pm: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            months: default_months(),
            week_days: default_week_days(),
            am: default_am(),
            pm: default_pm(),
        }
    }
}

/// Escape-code settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TextConfig {
    /// Character that introduces an escape code.
    ///
    /// Hosts that convert `\` to `\x1b` before running their own codes
    /// should set this to `"\x1b"`.
    #[serde(default = "default_escape_prefix")]
    pub escape_prefix: char,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            escape_prefix: default_escape_prefix(),
        }
    }
}

/// Sampling timer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimerConfig {
    /// Milliseconds between clock samples.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl TimerConfig {
    /// The sampling period as a [`Duration`].
    pub const fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Settings for the reference host binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Note text of the map the reference host loads at start.
    #[serde(default = "default_map_note")]
    pub map_note: String,

    /// Milliseconds between rendered frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many frames (0 = run until Ctrl-C).
    #[serde(default)]
    pub max_frames: u64,

    /// Dialogue line expanded and logged every frame.
    #[serde(default = "default_sample_text")]
    pub sample_text: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            map_note: default_map_note(),
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: 0,
            sample_text: default_sample_text(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Stock day/night cycle: deep blue night, warming dawn, clear day, red dusk.
const DEFAULT_TONES: [[i32; 4]; HOURS_PER_DAY] = [
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
    [-51, -51, 0, 68],
    [-34, -34, 0, 68],
    [-17, -17, 0, 68],
    [0, 0, 0, 51],
    [0, 0, 0, 34],
    [0, 0, 0, 17],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
    [0, 0, 0, 0],
    [34, -17, -17, 0],
    [68, -34, -34, 0],
    [0, -51, -17, 34],
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
    [-68, -68, 0, 68],
];

const DEFAULT_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DEFAULT_WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn default_tones() -> Vec<Tone> {
    DEFAULT_TONES.iter().copied().map(Tone::from).collect()
}

fn default_months() -> Vec<String> {
    DEFAULT_MONTHS.iter().map(|&name| name.to_owned()).collect()
}

fn default_week_days() -> Vec<String> {
    DEFAULT_WEEK_DAYS.iter().map(|&name| name.to_owned()).collect()
}

fn default_am() -> String {
    "AM".to_owned()
}

fn default_pm() -> String {
    "PM".to_owned()
}

const fn default_escape_prefix() -> char {
    '\\'
}

const fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_map_note() -> String {
    "<Real Time Tint>".to_owned()
}

const fn default_frame_interval_ms() -> u64 {
    1000
}

fn default_sample_text() -> String {
    r"It is \WeekDay, \Month \Date, \Year. The time is \Hour12:\Minute \Meridiem.".to_owned()
}
