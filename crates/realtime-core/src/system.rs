//! The assembled real-time system.
//!
//! [`RealTimeSystem`] wires one sampler, publisher, tone interpolator and
//! escape-code expander to a single set of host handles. The host calls
//! [`tick`](RealTimeSystem::tick) once per second (usually through a
//! [`SamplingTimer`](crate::timer::SamplingTimer)),
//! [`current_tone`](RealTimeSystem::current_tone) once per rendered frame,
//! and [`expand`](RealTimeSystem::expand) whenever it formats text.

use std::sync::Arc;

use realtime_types::{ClockSnapshot, TintMode, Tone};
use tracing::info;

use crate::clock::{ClockSampler, ClockState, HostClock};
use crate::config::{ConfigError, RealTimeConfig, SwitchBindings};
use crate::escape::EscapeCodeExpander;
use crate::host::{MapMetadata, SwitchStore, VariableStore, read_switch};
use crate::publisher::VariablePublisher;
use crate::timer::SampleTick;
use crate::tone::{BlendedTone, ToneInterpolator, ToneTable};
use crate::vocabulary::Vocabulary;

/// Everything the core needs from the host.
#[derive(Clone)]
pub struct HostHandles {
    /// Variable storage; the publisher writes here and readers read here.
    pub variables: Arc<dyn VariableStore>,
    /// Switch storage (freeze and anti-tint).
    pub switches: Arc<dyn SwitchStore>,
    /// Metadata of the loaded map.
    pub map: Arc<dyn MapMetadata>,
    /// Wall clock.
    pub clock: Arc<dyn HostClock>,
}

impl core::fmt::Debug for HostHandles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostHandles").finish_non_exhaustive()
    }
}

/// Sampler, publisher, tone and text expansion bound to one host.
pub struct RealTimeSystem {
    sampler: ClockSampler,
    publisher: VariablePublisher,
    interpolator: ToneInterpolator,
    expander: EscapeCodeExpander,
    switches: Arc<dyn SwitchStore>,
    switch_bindings: SwitchBindings,
}

impl RealTimeSystem {
    /// Validate `config` and build the system.
    ///
    /// This is the one place configuration problems surface; once built,
    /// every operation is infallible.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the tone table, vocabulary or
    /// timer settings are unusable.
    pub fn new(config: &RealTimeConfig, host: HostHandles) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = ToneTable::from_config(config)?;
        let vocabulary = Vocabulary::from_config(&config.vocabulary)?;

        let sampler = ClockSampler::new(host.clock, Arc::new(ClockState::new()));
        let publisher = VariablePublisher::new(Arc::clone(&host.variables), config.variables);
        let interpolator = ToneInterpolator::new(
            table,
            Arc::clone(&host.variables),
            Arc::clone(&host.switches),
            host.map,
            config.variables.hour,
            config.variables.minute,
            config.switches.anti_tint,
        );
        let expander = EscapeCodeExpander::new(
            host.variables,
            config.variables,
            vocabulary,
            config.text.escape_prefix,
        );

        info!(
            time_freeze = %config.switches.time_freeze,
            anti_tint = %config.switches.anti_tint,
            hour_variable = %config.variables.hour,
            minute_variable = %config.variables.minute,
            escape_prefix = ?expander.prefix(),
            "Real-time system initialized"
        );

        Ok(Self {
            sampler,
            publisher,
            interpolator,
            expander,
            switches: host.switches,
            switch_bindings: config.switches,
        })
    }

    /// Sample the clock and publish the snapshot unless time is frozen.
    ///
    /// Freezing only suppresses the write; the sample is always taken, so
    /// unfreezing publishes fresh values on the next tick.
    pub fn tick(&self) -> ClockSnapshot {
        let snapshot = self.sampler.sample();
        self.publisher.publish(&snapshot, self.is_time_frozen());
        snapshot
    }

    /// Whether the time-freeze switch is on.
    pub fn is_time_frozen(&self) -> bool {
        read_switch(self.switches.as_ref(), self.switch_bindings.time_freeze)
    }

    /// The tone to apply this frame.
    pub fn current_tone(&self) -> Tone {
        self.interpolator.current_tone()
    }

    /// The unrounded blend for this frame, if tinting is active.
    pub fn current_blend(&self) -> Option<BlendedTone> {
        self.interpolator.current_blend()
    }

    /// Which tone mode this frame resolves to.
    pub fn tint_mode(&self) -> TintMode {
        self.interpolator.tint_mode()
    }

    /// Replace time escape codes in `text`.
    pub fn expand(&self, text: &str) -> String {
        self.expander.expand(text)
    }

    /// The last good clock sample.
    pub fn latest_snapshot(&self) -> ClockSnapshot {
        self.sampler.state().latest()
    }

    /// Shared handle to the clock state.
    pub const fn clock_state(&self) -> &Arc<ClockState> {
        self.sampler.state()
    }
}

impl SampleTick for RealTimeSystem {
    fn on_sample(&self) {
        self.tick();
    }
}

impl core::fmt::Debug for RealTimeSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RealTimeSystem")
            .field("sampler", &self.sampler)
            .field("publisher", &self.publisher)
            .field("interpolator", &self.interpolator)
            .field("expander", &self.expander)
            .field("switch_bindings", &self.switch_bindings)
            .finish_non_exhaustive()
    }
}
