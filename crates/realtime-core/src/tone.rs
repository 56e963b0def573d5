//! Day/night tone: hourly keyframes, minute blending and tint gating.
//!
//! The tone for a frame is a straight line between the keyframe of the
//! current hour and the keyframe of the next hour, positioned by the
//! elapsed minutes: `a + (b - a) * minute / 60` per channel. At minute 0
//! the result is exactly the current hour's keyframe; at minute 59 it is
//! within one unit of the next hour's.
//!
//! # Rounding
//!
//! Channels are rounded half away from zero (the behaviour of
//! `f64::round`). The rounding is done in integer arithmetic on
//! sixtieths of a unit, so boundary minutes carry no float error.
//!
//! # Gating
//!
//! The tone is forced to [`Tone::NEUTRAL`] when the anti-tint switch is
//! on or the current map is not marked for tinting. The gate is evaluated
//! on every call; nothing is cached between frames.

use std::sync::Arc;

use realtime_types::{SwitchId, TintMode, Tone, VariableId};

use crate::config::{ConfigError, HOURS_PER_DAY, RealTimeConfig, expect_len};
use crate::host::{MapMetadata, SwitchStore, VariableStore, read_switch, read_variable};

/// Map notetag that enables tinting, matched case-insensitively.
pub const TINT_NOTETAG: &str = "<real time tint>";

/// Minutes in an hour, the blend denominator.
const MINUTES_PER_HOUR: i64 = 60;

/// Whether a map note carries the tint notetag.
pub fn has_tint_notetag(note: &str) -> bool {
    note.to_ascii_lowercase().contains(TINT_NOTETAG)
}

// ---------------------------------------------------------------------------
// Tone table
// ---------------------------------------------------------------------------

/// The 24 hourly keyframes, hour 0 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneTable {
    keyframes: [Tone; HOURS_PER_DAY],
}

impl ToneTable {
    /// Build a table from exactly 24 keyframes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any other count.
    pub fn from_keyframes(keyframes: &[Tone]) -> Result<Self, ConfigError> {
        expect_len("tones", keyframes.len(), HOURS_PER_DAY)?;
        let keyframes = <[Tone; HOURS_PER_DAY]>::try_from(keyframes).map_err(|_err| {
            ConfigError::Invalid {
                reason: format!("tones must have exactly {HOURS_PER_DAY} entries"),
            }
        })?;
        Ok(Self { keyframes })
    }

    /// Build the table from the `tones` section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless there are exactly 24 tones.
    pub fn from_config(config: &RealTimeConfig) -> Result<Self, ConfigError> {
        Self::from_keyframes(&config.tones)
    }

    /// Keyframe for an hour. Hours outside 0-23 wrap around the day.
    pub fn keyframe_for(&self, hour: i64) -> Tone {
        usize::try_from(hour.rem_euclid(24))
            .ok()
            .and_then(|idx| self.keyframes.get(idx))
            .copied()
            .unwrap_or(Tone::NEUTRAL)
    }
}

// ---------------------------------------------------------------------------
// Blending
// ---------------------------------------------------------------------------

/// An unrounded position between two adjacent hourly keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendedTone {
    /// Keyframe of the current hour.
    pub from: Tone,
    /// Keyframe of the following hour.
    pub to: Tone,
    /// Elapsed minutes into the hour, 0-59.
    pub minute: u8,
}

impl BlendedTone {
    /// Fraction of the hour elapsed, in `[0, 1)`.
    pub fn fraction(&self) -> f64 {
        f64::from(self.minute) / 60.0
    }

    /// Exact channel values in `[red, green, blue, gray]` order.
    pub fn exact(&self) -> [f64; 4] {
        let fraction = self.fraction();
        let lerp = |a: i32, b: i32| {
            let a = f64::from(a);
            a + (f64::from(b) - a) * fraction
        };
        [
            lerp(self.from.red, self.to.red),
            lerp(self.from.green, self.to.green),
            lerp(self.from.blue, self.to.blue),
            lerp(self.from.gray, self.to.gray),
        ]
    }

    /// Round every channel half away from zero.
    pub fn round(&self) -> Tone {
        let minute = i64::from(self.minute);
        Tone::new(
            blend_channel(self.from.red, self.to.red, minute),
            blend_channel(self.from.green, self.to.green, minute),
            blend_channel(self.from.blue, self.to.blue, minute),
            blend_channel(self.from.gray, self.to.gray, minute),
        )
    }
}

/// `round(a + (b - a) * minute / 60)` with ties away from zero.
fn blend_channel(a: i32, b: i32, minute: i64) -> i32 {
    let a = i64::from(a);
    let b = i64::from(b);
    let sixtieths = a
        .saturating_mul(MINUTES_PER_HOUR)
        .saturating_add(b.saturating_sub(a).saturating_mul(minute));
    let rounded = div_round_half_away(sixtieths, MINUTES_PER_HOUR);
    i32::try_from(rounded).unwrap_or(if rounded < 0 { i32::MIN } else { i32::MAX })
}

/// Integer division rounding to nearest, ties away from zero.
fn div_round_half_away(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.checked_div(denominator).unwrap_or(0);
    let remainder = numerator.checked_rem(denominator).unwrap_or(0);
    // Truncating division: the remainder carries the numerator's sign.
    if remainder.saturating_abs().saturating_mul(2) >= denominator.saturating_abs() {
        quotient.saturating_add(numerator.signum())
    } else {
        quotient
    }
}

// ---------------------------------------------------------------------------
// Interpolator
// ---------------------------------------------------------------------------

/// Computes the frame tone from the hour and minute variables.
pub struct ToneInterpolator {
    table: ToneTable,
    variables: Arc<dyn VariableStore>,
    switches: Arc<dyn SwitchStore>,
    map: Arc<dyn MapMetadata>,
    hour: VariableId,
    minute: VariableId,
    anti_tint: SwitchId,
}

impl ToneInterpolator {
    /// Create an interpolator.
    ///
    /// `hour` and `minute` are the variables the publisher writes; an
    /// unbound slot reads as 0. `anti_tint` forces the neutral tone while on.
    pub fn new(
        table: ToneTable,
        variables: Arc<dyn VariableStore>,
        switches: Arc<dyn SwitchStore>,
        map: Arc<dyn MapMetadata>,
        hour: VariableId,
        minute: VariableId,
        anti_tint: SwitchId,
    ) -> Self {
        Self {
            table,
            variables,
            switches,
            map,
            hour,
            minute,
            anti_tint,
        }
    }

    /// Which mode this frame resolves to.
    pub fn tint_mode(&self) -> TintMode {
        if read_switch(self.switches.as_ref(), self.anti_tint)
            || !self.map.current_map_has_tint_marker()
        {
            TintMode::Neutral
        } else {
            TintMode::Active
        }
    }

    /// The unrounded blend for this frame, or `None` when the tone is
    /// gated to neutral.
    pub fn current_blend(&self) -> Option<BlendedTone> {
        match self.tint_mode() {
            TintMode::Neutral => None,
            TintMode::Active => {
                let hour = read_variable(self.variables.as_ref(), self.hour);
                let minute = read_variable(self.variables.as_ref(), self.minute);
                Some(self.blend_at(hour, minute))
            }
        }
    }

    /// The tone to apply this frame.
    pub fn current_tone(&self) -> Tone {
        self.current_blend()
            .as_ref()
            .map_or(Tone::NEUTRAL, BlendedTone::round)
    }

    /// Blend for an explicit time, ignoring the gate.
    ///
    /// The hour wraps around the day and the minute is clamped to 0-59,
    /// since the variables can be overwritten by game events.
    pub fn blend_at(&self, hour: i64, minute: i64) -> BlendedTone {
        let hour = hour.rem_euclid(24);
        let next = hour.saturating_add(1).rem_euclid(24);
        let minute = u8::try_from(minute.clamp(0, 59)).unwrap_or(0);
        BlendedTone {
            from: self.table.keyframe_for(hour),
            to: self.table.keyframe_for(next),
            minute,
        }
    }

    /// The keyframe table.
    pub const fn table(&self) -> &ToneTable {
        &self.table
    }
}

impl core::fmt::Debug for ToneInterpolator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ToneInterpolator")
            .field("hour", &self.hour)
            .field("minute", &self.minute)
            .field("anti_tint", &self.anti_tint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::host::{MemoryMap, MemorySwitches, MemoryVariables};

    const HOUR: VariableId = VariableId(5);
    const MINUTE: VariableId = VariableId(6);
    const ANTI_TINT: SwitchId = SwitchId(2);

    struct Fixture {
        variables: Arc<MemoryVariables>,
        switches: Arc<MemorySwitches>,
        map: Arc<MemoryMap>,
        interpolator: ToneInterpolator,
    }

    fn fixture() -> Fixture {
        let table = ToneTable::from_config(&RealTimeConfig::default()).unwrap();
        let variables = Arc::new(MemoryVariables::new());
        let switches = Arc::new(MemorySwitches::new());
        let map = Arc::new(MemoryMap::with_note("<Real Time Tint>"));
        let interpolator = ToneInterpolator::new(
            table,
            variables.clone(),
            switches.clone(),
            map.clone(),
            HOUR,
            MINUTE,
            ANTI_TINT,
        );
        Fixture {
            variables,
            switches,
            map,
            interpolator,
        }
    }

    fn set_time(fx: &Fixture, hour: i64, minute: i64) {
        fx.variables.set_variable(HOUR, hour);
        fx.variables.set_variable(MINUTE, minute);
    }

    #[test]
    fn notetag_is_case_insensitive() {
        assert!(has_tint_notetag("<Real Time Tint>"));
        assert!(has_tint_notetag("forest\n<REAL TIME TINT>\n"));
        assert!(!has_tint_notetag("<Real Time>"));
        assert!(!has_tint_notetag(""));
    }

    #[test]
    fn table_requires_twenty_four_entries() {
        assert!(ToneTable::from_keyframes(&[Tone::NEUTRAL; 23]).is_err());
        assert!(ToneTable::from_keyframes(&[Tone::NEUTRAL; 25]).is_err());
        assert!(ToneTable::from_keyframes(&[Tone::NEUTRAL; 24]).is_ok());
    }

    #[test]
    fn keyframe_lookup_wraps() {
        let fx = fixture();
        let table = fx.interpolator.table();
        assert_eq!(table.keyframe_for(18), Tone::new(68, -34, -34, 0));
        assert_eq!(table.keyframe_for(24), table.keyframe_for(0));
        assert_eq!(table.keyframe_for(-1), table.keyframe_for(23));
    }

    #[test]
    fn top_of_hour_matches_keyframe() {
        let fx = fixture();
        for hour in 0..24 {
            set_time(&fx, hour, 0);
            assert_eq!(
                fx.interpolator.current_tone(),
                fx.interpolator.table().keyframe_for(hour),
                "hour {hour}"
            );
        }
    }

    #[test]
    fn minute_fifty_nine_is_within_one_of_next_hour() {
        let fx = fixture();
        for hour in 0..24 {
            set_time(&fx, hour, 59);
            let tone = fx.interpolator.current_tone().channels();
            let next = fx.interpolator.table().keyframe_for(hour + 1).channels();
            for (got, want) in tone.iter().zip(next.iter()) {
                assert!((got - want).abs() <= 1, "hour {hour}: {got} vs {want}");
            }
        }
    }

    #[test]
    fn blend_never_overshoots_and_is_monotonic() {
        let fx = fixture();
        for hour in 0..24 {
            let from = fx.interpolator.table().keyframe_for(hour).channels();
            let to = fx.interpolator.table().keyframe_for(hour + 1).channels();
            let mut previous = from;
            for minute in 0..60 {
                let tone = fx.interpolator.blend_at(hour, minute).round().channels();
                for c in 0..4 {
                    let (lo, hi) = (from[c].min(to[c]), from[c].max(to[c]));
                    assert!(tone[c] >= lo && tone[c] <= hi);
                    if to[c] >= from[c] {
                        assert!(tone[c] >= previous[c]);
                    } else {
                        assert!(tone[c] <= previous[c]);
                    }
                }
                previous = tone;
            }
        }
    }

    #[test]
    fn half_past_six_pm_rounds_away_from_zero() {
        let fx = fixture();
        set_time(&fx, 18, 30);
        // 68 -> 0, -34 -> -51, -34 -> -17, 0 -> 34 at half way.
        assert_eq!(fx.interpolator.current_tone(), Tone::new(34, -43, -26, 17));

        let exact = fx.interpolator.current_blend().unwrap().exact();
        assert!((exact[1] - -42.5).abs() < 1e-9);
        assert!((exact[2] - -25.5).abs() < 1e-9);
    }

    #[test]
    fn eleven_pm_blends_into_midnight() {
        let fx = fixture();
        set_time(&fx, 23, 30);
        let blend = fx.interpolator.current_blend().unwrap();
        assert_eq!(blend.to, fx.interpolator.table().keyframe_for(0));
    }

    #[test]
    fn out_of_range_variables_are_tamed() {
        let fx = fixture();
        let blend = fx.interpolator.blend_at(26, 90);
        assert_eq!(blend.from, fx.interpolator.table().keyframe_for(2));
        assert_eq!(blend.minute, 59);
        assert_eq!(fx.interpolator.blend_at(5, -3).minute, 0);
    }

    #[test]
    fn anti_tint_switch_forces_neutral() {
        let fx = fixture();
        fx.switches.set_switch(ANTI_TINT, true);
        for hour in 0..24 {
            for minute in [0, 17, 59] {
                set_time(&fx, hour, minute);
                assert_eq!(fx.interpolator.current_tone(), Tone::NEUTRAL);
            }
        }
        assert_eq!(fx.interpolator.tint_mode(), TintMode::Neutral);
    }

    #[test]
    fn untinted_map_forces_neutral_and_is_rechecked_each_frame() {
        let fx = fixture();
        set_time(&fx, 20, 0);
        assert_eq!(fx.interpolator.current_tone(), Tone::new(-68, -68, 0, 68));

        fx.map.load_map("Cave");
        assert_eq!(fx.interpolator.current_tone(), Tone::NEUTRAL);

        fx.map.unload_map();
        assert_eq!(fx.interpolator.tint_mode(), TintMode::Neutral);

        fx.map.load_map("<real time tint>");
        assert_eq!(fx.interpolator.tint_mode(), TintMode::Active);
    }

    #[test]
    fn unbound_hour_and_minute_read_as_midnight() {
        let table = ToneTable::from_config(&RealTimeConfig::default()).unwrap();
        let interpolator = ToneInterpolator::new(
            table,
            Arc::new(MemoryVariables::new()),
            Arc::new(MemorySwitches::new()),
            Arc::new(MemoryMap::with_note("<Real Time Tint>")),
            VariableId::UNBOUND,
            VariableId::UNBOUND,
            SwitchId::UNBOUND,
        );
        assert_eq!(interpolator.current_tone(), Tone::new(-68, -68, 0, 68));
    }

    #[test]
    fn rounding_helper_ties_away_from_zero() {
        assert_eq!(div_round_half_away(30, 60), 1);
        assert_eq!(div_round_half_away(-30, 60), -1);
        assert_eq!(div_round_half_away(29, 60), 0);
        assert_eq!(div_round_half_away(-91, 60), -2);
        assert_eq!(div_round_half_away(120, 60), 2);
    }
}
