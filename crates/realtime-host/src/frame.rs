//! The host's render loop.
//!
//! Each frame asks the core for the current tone and expands the sample
//! dialogue line, then hands both to a [`FrameSink`]. A real game would
//! apply the tone to its screen filter and draw the text; the reference
//! host logs them.

use std::time::Duration;

use realtime_core::system::RealTimeSystem;
use realtime_types::{TintMode, Tone};
use tracing::{debug, info};

/// What one frame produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Tone to apply.
    pub tone: Tone,
    /// Whether tinting was active.
    pub mode: TintMode,
    /// The expanded dialogue line.
    pub text: String,
}

/// Receives every rendered frame.
pub trait FrameSink {
    /// Called once per frame.
    fn on_frame(&mut self, report: &FrameReport);
}

/// Logs frames, at `info` when the tone changes and `debug` otherwise.
#[derive(Debug, Default)]
pub struct LogSink {
    last_tone: Option<Tone>,
}

impl FrameSink for LogSink {
    fn on_frame(&mut self, report: &FrameReport) {
        if self.last_tone == Some(report.tone) {
            debug!(frame = report.frame, text = %report.text, "Frame rendered");
        } else {
            info!(
                frame = report.frame,
                tone = %report.tone,
                mode = ?report.mode,
                text = %report.text,
                "Screen tone changed"
            );
            self.last_tone = Some(report.tone);
        }
    }
}

/// Render one frame.
pub fn render_frame(system: &RealTimeSystem, frame: u64, sample_text: &str) -> FrameReport {
    FrameReport {
        frame,
        tone: system.current_tone(),
        mode: system.tint_mode(),
        text: system.expand(sample_text),
    }
}

/// Render frames every `interval` until `max_frames` have run
/// (0 = forever). Returns the number of frames rendered.
pub async fn run_frames(
    system: &RealTimeSystem,
    sample_text: &str,
    interval: Duration,
    max_frames: u64,
    sink: &mut dyn FrameSink,
) -> u64 {
    let mut frame: u64 = 0;
    loop {
        if max_frames > 0 && frame >= max_frames {
            return frame;
        }
        frame = frame.saturating_add(1);
        let report = render_frame(system, frame, sample_text);
        sink.on_frame(&report);
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use realtime_core::clock::FixedClock;
    use realtime_core::config::RealTimeConfig;
    use realtime_core::host::{MemoryMap, MemorySwitches, MemoryVariables};
    use realtime_core::system::HostHandles;
    use realtime_types::HostTime;

    use super::*;

    #[derive(Default)]
    struct Collect {
        reports: Vec<FrameReport>,
    }

    impl FrameSink for Collect {
        fn on_frame(&mut self, report: &FrameReport) {
            self.reports.push(report.clone());
        }
    }

    fn make_system(map_note: &str) -> RealTimeSystem {
        let config = RealTimeConfig::parse("variables:\n  hour: 5\n  minute: 6\n").unwrap();
        let host = HostHandles {
            variables: Arc::new(MemoryVariables::new()),
            switches: Arc::new(MemorySwitches::new()),
            map: Arc::new(MemoryMap::with_note(map_note)),
            clock: Arc::new(FixedClock::new(HostTime {
                year: 2024,
                month0: 0,
                day: 1,
                weekday_from_sunday: 1,
                hour: 13,
                minute: 0,
                second: 0,
            })),
        };
        RealTimeSystem::new(&config, host).unwrap()
    }

    #[test]
    fn frame_reports_tone_and_text() {
        let system = make_system("<Real Time Tint>");
        system.tick();
        let report = render_frame(&system, 1, r"\Hour12 \Meridiem");
        assert_eq!(report.tone, Tone::NEUTRAL);
        assert_eq!(report.mode, TintMode::Active);
        assert_eq!(report.text, "1 PM");
    }

    #[test]
    fn untinted_map_reports_neutral_mode() {
        let system = make_system("Cellar");
        system.tick();
        assert_eq!(render_frame(&system, 1, "").mode, TintMode::Neutral);
    }

    #[tokio::test(start_paused = true)]
    async fn frame_limit_stops_the_loop() {
        let system = make_system("<Real Time Tint>");
        system.tick();
        let mut sink = Collect::default();

        let frames = run_frames(&system, r"\Hour", Duration::from_millis(16), 3, &mut sink).await;
        assert_eq!(frames, 3);
        assert_eq!(sink.reports.len(), 3);
        assert_eq!(sink.reports[2].frame, 3);
        assert_eq!(sink.reports[0].text, "13");
    }
}
