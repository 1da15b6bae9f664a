//! Timer engine implementation.
//!
//! The timer engine is a frame-driven state machine. It does not read a
//! clock or spawn threads: the host measures the time since the previous
//! frame and passes it to `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Running <-> Paused
//!          Running -> Ended -> Ready
//! ```
//!
//! `reset()` returns to `Ready` from any state.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerSettings::default(), sinks);
//! engine.advance(); // Ready -> Running
//! // Once per frame:
//! engine.tick(delta_secs); // Returns Some(Event) when the run ends
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::input::{applied_duration, clamp_duration, format_whole, parse_seconds};
use super::pitch::{clamp01, PitchCurve};
use crate::events::Event;
use crate::sinks::{Clip, Sinks};

/// Slack allowed when deciding a run has finished, so frame deltas that add
/// up to the duration in real arithmetic still complete under float rounding.
const COMPLETION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Ready,
    Running,
    Paused,
    Ended,
}

/// Construction-time parameters for an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSettings {
    /// Initial queued duration in seconds.
    pub duration_secs: f64,
    /// Time remaining at which the pitch ramp begins.
    pub warn_window_secs: f64,
    /// Indicator value shown once a run has ended.
    pub max_indicator: f64,
    pub pitch: PitchCurve,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            duration_secs: 90.0,
            warn_window_secs: 20.0,
            max_indicator: 1.0,
            pitch: PitchCurve::default(),
        }
    }
}

/// Mutable state of the single timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSession {
    pub state: TimerState,
    /// Length of the current run. Never zero or negative.
    pub duration_secs: f64,
    /// Duration applied on the next reset. May be zero.
    pub queued_duration_secs: f64,
    /// Share of `duration_secs` consumed since the last reset.
    pub elapsed_fraction: f64,
    pub warn_window_secs: f64,
    pub pitch_onset_fraction: f64,
}

/// Core timer engine.
///
/// Owns the session and drives the sinks. All methods take `&mut self`;
/// the host must not call into the engine from more than one thread at a time.
#[derive(Debug)]
pub struct TimerEngine {
    session: TimerSession,
    pitch: PitchCurve,
    max_indicator: f64,
    sinks: Sinks,
}

impl TimerEngine {
    /// Create an engine in the `Ready` state.
    ///
    /// The initial duration is clamped like any user input and pushed to the
    /// input field.
    pub fn new(settings: TimerSettings, sinks: Sinks) -> Self {
        let queued = clamp_duration(settings.duration_secs);
        let warn = clamp_duration(settings.warn_window_secs);
        let duration = applied_duration(queued);
        let mut engine = Self {
            session: TimerSession {
                state: TimerState::Ready,
                duration_secs: duration,
                queued_duration_secs: queued,
                elapsed_fraction: 0.0,
                warn_window_secs: warn,
                pitch_onset_fraction: PitchCurve::onset_fraction(duration, warn),
            },
            pitch: settings.pitch,
            max_indicator: clamp01(settings.max_indicator),
            sinks,
        };
        engine.sinks.input.set_queued_text(&format_whole(queued));
        engine.reset();
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.session.state
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn duration_secs(&self) -> f64 {
        self.session.duration_secs
    }

    pub fn queued_duration_secs(&self) -> f64 {
        self.session.queued_duration_secs
    }

    pub fn elapsed_fraction(&self) -> f64 {
        self.session.elapsed_fraction
    }

    pub fn pitch_onset_fraction(&self) -> f64 {
        self.session.pitch_onset_fraction
    }

    pub fn warn_window_secs(&self) -> f64 {
        self.session.warn_window_secs
    }

    /// Seconds left in the current run, never negative.
    pub fn remaining_secs(&self) -> f64 {
        ((1.0 - self.session.elapsed_fraction) * self.session.duration_secs).max(0.0)
    }

    /// Pitch the ticking sound has at the current elapsed fraction.
    pub fn pitch(&self) -> f64 {
        match self.session.state {
            TimerState::Running | TimerState::Paused => self
                .pitch
                .pitch_at(self.session.elapsed_fraction, self.session.pitch_onset_fraction),
            TimerState::Ready | TimerState::Ended => self.pitch.neutral(),
        }
    }

    pub fn sinks_mut(&mut self) -> &mut Sinks {
        &mut self.sinks
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.session.state,
            duration_secs: self.session.duration_secs,
            queued_duration_secs: self.session.queued_duration_secs,
            remaining_secs: self.remaining_secs(),
            elapsed_fraction: self.session.elapsed_fraction,
            pitch: self.pitch(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The single toggle action: pause a running timer, start a ready or
    /// paused one, and reset an ended one.
    pub fn advance(&mut self) -> Option<Event> {
        match self.session.state {
            TimerState::Running => self.pause(),
            TimerState::Paused | TimerState::Ready => self.start(),
            TimerState::Ended => self.reset(),
        }
    }

    pub fn start(&mut self) -> Option<Event> {
        let from = self.session.state;
        match from {
            TimerState::Ready | TimerState::Paused => {
                self.session.state = TimerState::Running;
                self.sinks.audio.play();
                tracing::debug!(?from, duration_secs = self.session.duration_secs, "timer running");
                if from == TimerState::Ready {
                    Some(Event::TimerStarted {
                        duration_secs: self.session.duration_secs,
                        at: Utc::now(),
                    })
                } else {
                    Some(Event::TimerResumed {
                        remaining_secs: self.remaining_secs(),
                        at: Utc::now(),
                    })
                }
            }
            TimerState::Running | TimerState::Ended => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.session.state {
            TimerState::Running => {
                self.session.state = TimerState::Paused;
                self.sinks.audio.stop();
                tracing::debug!(elapsed = self.session.elapsed_fraction, "timer paused");
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs(),
                    elapsed_fraction: self.session.elapsed_fraction,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Return to `Ready`, applying the queued duration.
    pub fn reset(&mut self) -> Option<Event> {
        self.session.state = TimerState::Ready;
        self.session.duration_secs = applied_duration(self.session.queued_duration_secs);
        self.session.elapsed_fraction = 0.0;
        self.recompute_onset();

        self.sinks
            .display
            .set_remaining_text(&format_whole(self.session.duration_secs));
        self.sinks.display.set_indicator_fraction(0.0);
        self.sinks.audio.set_clip(Clip::Ticking);
        self.sinks.audio.set_loop(true);
        self.sinks.audio.set_pitch(self.pitch.neutral());
        self.sinks.audio.stop();

        tracing::debug!(duration_secs = self.session.duration_secs, "timer reset");
        Some(Event::TimerReset {
            duration_secs: self.session.duration_secs,
            at: Utc::now(),
        })
    }

    /// Call once per frame with the seconds since the previous frame.
    /// Returns `Some(Event::TimerCompleted)` on the frame the run ends.
    pub fn tick(&mut self, delta_secs: f64) -> Option<Event> {
        match self.session.state {
            TimerState::Ready => {
                self.sinks
                    .display
                    .set_remaining_text(&format_whole(self.session.duration_secs));
                None
            }
            TimerState::Running => self.tick_running(delta_secs),
            TimerState::Paused | TimerState::Ended => None,
        }
    }

    /// Set the queued duration from user text. Unparsable text reads as zero.
    pub fn set_duration_from_text(&mut self, text: &str) -> Option<Event> {
        let secs = clamp_duration(parse_seconds(text));
        self.update_duration(secs)
    }

    /// Add `delta_secs` to the value currently shown in the input field.
    pub fn adjust_queued_duration(&mut self, delta_secs: f64) -> Option<Event> {
        let current = parse_seconds(&self.sinks.input.current_text());
        let delta = if delta_secs.is_finite() { delta_secs } else { 0.0 };
        self.update_duration(clamp_duration(current + delta))
    }

    /// Change the warn window. Takes effect immediately, even mid-run.
    pub fn set_warn_window(&mut self, secs: f64) -> Option<Event> {
        self.session.warn_window_secs = clamp_duration(secs);
        self.recompute_onset();
        Some(Event::WarnWindowChanged {
            warn_window_secs: self.session.warn_window_secs,
            pitch_onset_fraction: self.session.pitch_onset_fraction,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_running(&mut self, delta_secs: f64) -> Option<Event> {
        let delta = if delta_secs.is_finite() {
            delta_secs.max(0.0)
        } else {
            0.0
        };
        let session = &mut self.session;
        session.elapsed_fraction += delta / session.duration_secs;

        let remaining = ((1.0 - session.elapsed_fraction) * session.duration_secs).max(0.0);
        let pitch = self
            .pitch
            .pitch_at(session.elapsed_fraction, session.pitch_onset_fraction);
        let indicator = clamp01(session.elapsed_fraction);

        self.sinks.display.set_remaining_text(&format_whole(remaining));
        self.sinks.display.set_indicator_fraction(indicator);
        self.sinks.audio.set_pitch(pitch);
        if let Some(hook) = self.sinks.time_scale.as_mut() {
            hook.set_time_scale(indicator);
        }
        tracing::trace!(elapsed = indicator, pitch, "tick");

        if self.session.elapsed_fraction >= 1.0 - COMPLETION_EPSILON {
            return Some(self.complete());
        }
        None
    }

    fn complete(&mut self) -> Event {
        self.session.elapsed_fraction = 1.0;
        self.session.state = TimerState::Ended;

        self.sinks.audio.set_clip(Clip::Gong);
        self.sinks.audio.set_pitch(self.pitch.neutral());
        self.sinks.audio.set_loop(false);
        self.sinks.audio.play();
        self.sinks.display.set_indicator_fraction(self.max_indicator);
        self.sinks.completion.notify();

        tracing::info!(duration_secs = self.session.duration_secs, "timer completed");
        Event::TimerCompleted {
            duration_secs: self.session.duration_secs,
            at: Utc::now(),
        }
    }

    fn update_duration(&mut self, new_secs: f64) -> Option<Event> {
        self.session.queued_duration_secs = new_secs;
        self.sinks.input.set_queued_text(&format_whole(new_secs));

        let applied = self.session.state != TimerState::Running;
        if applied {
            self.session.duration_secs = applied_duration(new_secs);
            self.recompute_onset();
        }
        tracing::debug!(queued_secs = new_secs, applied, "duration queued");
        Some(Event::DurationQueued {
            queued_secs: new_secs,
            applied,
            at: Utc::now(),
        })
    }

    fn recompute_onset(&mut self) {
        self.session.pitch_onset_fraction =
            PitchCurve::onset_fraction(self.session.duration_secs, self.session.warn_window_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::recording::{recording_sinks, recording_sinks_with_time_scale, SinkCall};
    use approx::assert_relative_eq;

    fn engine_with(duration: f64, warn: f64) -> (TimerEngine, crate::sinks::recording::Recorder) {
        let (sinks, recorder) = recording_sinks();
        let settings = TimerSettings {
            duration_secs: duration,
            warn_window_secs: warn,
            ..TimerSettings::default()
        };
        (TimerEngine::new(settings, sinks), recorder)
    }

    #[test]
    fn new_engine_is_ready_and_shows_duration() {
        let (engine, recorder) = engine_with(90.0, 20.0);
        assert_eq!(engine.state(), TimerState::Ready);
        assert_eq!(engine.duration_secs(), 90.0);
        assert_eq!(recorder.input_text(), "90");
        assert_eq!(recorder.last_remaining_text().as_deref(), Some("90"));
        assert_eq!(recorder.last_clip(), Some(Clip::Ticking));
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, recorder) = engine_with(10.0, 2.0);
        recorder.clear();

        assert!(matches!(engine.advance(), Some(Event::TimerStarted { .. })));
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(recorder.calls(), vec![SinkCall::Play]);

        assert!(matches!(engine.advance(), Some(Event::TimerPaused { .. })));
        assert_eq!(engine.state(), TimerState::Paused);

        assert!(matches!(engine.advance(), Some(Event::TimerResumed { .. })));
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(
            recorder.calls(),
            vec![SinkCall::Play, SinkCall::Stop, SinkCall::Play]
        );
    }

    #[test]
    fn explicit_commands_ignore_wrong_states() {
        let (mut engine, _recorder) = engine_with(10.0, 2.0);
        assert!(engine.pause().is_none());
        engine.start();
        assert!(engine.start().is_none());
    }

    #[test]
    fn tick_advances_only_while_running() {
        let (mut engine, _recorder) = engine_with(10.0, 2.0);
        engine.tick(5.0);
        assert_eq!(engine.elapsed_fraction(), 0.0);

        engine.advance();
        engine.tick(2.5);
        assert_relative_eq!(engine.elapsed_fraction(), 0.25);

        engine.advance();
        engine.tick(100.0);
        assert_relative_eq!(engine.elapsed_fraction(), 0.25);
    }

    #[test]
    fn running_tick_updates_readout_and_indicator() {
        let (mut engine, recorder) = engine_with(10.0, 2.0);
        engine.advance();
        engine.tick(3.4);
        assert_eq!(recorder.last_remaining_text().as_deref(), Some("7"));
        assert_relative_eq!(recorder.last_indicator().unwrap(), 0.34);
        assert_eq!(recorder.last_pitch(), Some(1.0));
    }

    #[test]
    fn ready_tick_reflects_live_duration_edits() {
        let (mut engine, recorder) = engine_with(10.0, 2.0);
        engine.set_duration_from_text("45");
        recorder.clear();
        engine.tick(0.016);
        assert_eq!(recorder.calls(), vec![SinkCall::RemainingText("45".into())]);
    }

    #[test]
    fn paused_and_ended_ticks_touch_nothing() {
        let (mut engine, recorder) = engine_with(1.0, 0.0);
        engine.advance();
        engine.advance();
        recorder.clear();
        engine.tick(0.5);
        assert!(recorder.calls().is_empty());

        engine.advance();
        engine.tick(2.0);
        assert_eq!(engine.state(), TimerState::Ended);
        recorder.clear();
        engine.tick(0.5);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn completion_switches_to_gong_once() {
        let (mut engine, recorder) = engine_with(2.0, 1.0);
        engine.advance();
        assert!(engine.tick(1.0).is_none());
        recorder.clear();

        let event = engine.tick(1.0);
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(engine.state(), TimerState::Ended);
        assert_eq!(engine.elapsed_fraction(), 1.0);

        let calls = recorder.calls();
        let tail = &calls[calls.len() - 6..];
        assert_eq!(
            tail,
            &[
                SinkCall::Clip(Clip::Gong),
                SinkCall::Pitch(1.0),
                SinkCall::Loop(false),
                SinkCall::Play,
                SinkCall::Indicator(1.0),
                SinkCall::Completed,
            ]
        );
        assert_eq!(recorder.last_remaining_text().as_deref(), Some("0"));

        assert!(engine.tick(1.0).is_none());
        assert_eq!(recorder.completions(), 1);
    }

    #[test]
    fn ended_indicator_uses_max_indicator() {
        let (sinks, recorder) = recording_sinks();
        let settings = TimerSettings {
            duration_secs: 1.0,
            max_indicator: 0.75,
            ..TimerSettings::default()
        };
        let mut engine = TimerEngine::new(settings, sinks);
        engine.advance();
        engine.tick(1.0);
        assert_eq!(recorder.last_indicator(), Some(0.75));
    }

    #[test]
    fn advance_from_ended_resets() {
        let (mut engine, recorder) = engine_with(1.0, 0.0);
        engine.advance();
        engine.tick(1.0);
        recorder.clear();

        assert!(matches!(engine.advance(), Some(Event::TimerReset { .. })));
        assert_eq!(engine.state(), TimerState::Ready);
        assert_eq!(engine.elapsed_fraction(), 0.0);
        assert_eq!(
            recorder.calls(),
            vec![
                SinkCall::RemainingText("1".into()),
                SinkCall::Indicator(0.0),
                SinkCall::Clip(Clip::Ticking),
                SinkCall::Loop(true),
                SinkCall::Pitch(1.0),
                SinkCall::Stop,
            ]
        );
    }

    #[test]
    fn edits_while_running_wait_for_reset() {
        let (mut engine, _recorder) = engine_with(60.0, 10.0);
        engine.advance();
        engine.tick(1.0);

        let event = engine.set_duration_from_text("30");
        assert!(matches!(
            event,
            Some(Event::DurationQueued { applied: false, .. })
        ));
        assert_eq!(engine.duration_secs(), 60.0);
        assert_eq!(engine.queued_duration_secs(), 30.0);

        engine.reset();
        assert_eq!(engine.duration_secs(), 30.0);
    }

    #[test]
    fn edits_while_paused_apply_immediately() {
        let (mut engine, _recorder) = engine_with(60.0, 10.0);
        engine.advance();
        engine.tick(30.0);
        engine.advance();
        engine.set_duration_from_text("120");
        assert_eq!(engine.duration_secs(), 120.0);
        assert_relative_eq!(engine.elapsed_fraction(), 0.5);
        assert_relative_eq!(engine.pitch_onset_fraction(), 110.0 / 120.0);
    }

    #[test]
    fn unparsable_text_matches_zero() {
        let (mut a, rec_a) = engine_with(60.0, 10.0);
        let (mut b, rec_b) = engine_with(60.0, 10.0);
        a.set_duration_from_text("abc");
        b.set_duration_from_text("0");
        assert_eq!(a.session(), b.session());
        assert_eq!(a.duration_secs(), 1.0);
        assert_eq!(a.queued_duration_secs(), 0.0);
        assert_eq!(rec_a.input_text(), rec_b.input_text());
        assert_eq!(rec_a.input_text(), "0");
    }

    #[test]
    fn adjust_reads_the_input_field() {
        let (mut engine, recorder) = engine_with(60.0, 10.0);
        recorder.set_input_text("100");
        engine.adjust_queued_duration(5.0);
        assert_eq!(engine.queued_duration_secs(), 105.0);
        assert_eq!(recorder.input_text(), "105");

        engine.adjust_queued_duration(-2000.0);
        assert_eq!(engine.queued_duration_secs(), 0.0);
        assert_eq!(engine.duration_secs(), 1.0);

        engine.adjust_queued_duration(5000.0);
        assert_eq!(engine.queued_duration_secs(), 999.0);
    }

    #[test]
    fn warn_window_change_recomputes_onset() {
        let (mut engine, _recorder) = engine_with(90.0, 20.0);
        assert!((engine.pitch_onset_fraction() - 0.7778).abs() < 1e-4);
        engine.set_warn_window(90.0);
        assert_eq!(engine.pitch_onset_fraction(), 0.0);
    }

    #[test]
    fn negative_and_nan_deltas_are_ignored() {
        let (mut engine, _recorder) = engine_with(10.0, 2.0);
        engine.advance();
        engine.tick(-5.0);
        engine.tick(f64::NAN);
        assert_eq!(engine.elapsed_fraction(), 0.0);
    }

    #[test]
    fn time_scale_hook_receives_elapsed_fraction() {
        let (sinks, recorder) = recording_sinks_with_time_scale();
        let settings = TimerSettings {
            duration_secs: 4.0,
            ..TimerSettings::default()
        };
        let mut engine = TimerEngine::new(settings, sinks);
        engine.advance();
        engine.tick(1.0);
        assert_eq!(recorder.count(|c| *c == SinkCall::TimeScale(0.25)), 1);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let (engine, _recorder) = engine_with(90.0, 20.0);
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                pitch,
                ..
            } => {
                assert_eq!(state, TimerState::Ready);
                assert_eq!(remaining_secs, 90.0);
                assert_eq!(pitch, 1.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
