//! Clock sampling, tone interpolation and time escape codes.
//!
//! This crate owns the three pieces of the real-time system that carry
//! logic: the once-per-second clock sample that is mirrored into host
//! variables, the per-frame day/night tone blended from hourly keyframes,
//! and the expansion of time escape codes in dialogue text.
//!
//! Everything the host owns (variables, switches, map metadata, the
//! wall clock) is reached through the traits in [`host`] and [`clock`].
//!
//! # Modules
//!
//! - [`clock`] -- Host clock trait, shared [`ClockState`] and the sampler.
//! - [`config`] -- Configuration loading from `realtime-config.yaml`.
//! - [`escape`] -- Escape-code tokenizer and expander.
//! - [`host`] -- Host store traits and in-memory implementations.
//! - [`publisher`] -- Writes clock snapshots into bound variables.
//! - [`system`] -- [`RealTimeSystem`] facade wiring everything together.
//! - [`timer`] -- Self-rescheduling sampling timer.
//! - [`tone`] -- Tone table, blending and tint gating.
//! - [`vocabulary`] -- Localized month, weekday and meridiem labels.
//!
//! [`ClockState`]: clock::ClockState
//! [`RealTimeSystem`]: system::RealTimeSystem

pub mod clock;
pub mod config;
pub mod escape;
pub mod host;
pub mod publisher;
pub mod system;
pub mod timer;
pub mod tone;
pub mod vocabulary;
