use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every state change of the engine produces an Event.
/// Hosts log or print them; the sinks carry the actual side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Ready -> Running.
    TimerStarted {
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: f64,
        elapsed_fraction: f64,
        at: DateTime<Utc>,
    },
    /// Paused -> Running.
    TimerResumed {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    TimerReset {
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    /// A new duration was queued. `applied` is false while a run is in
    /// flight and the value waits for the next reset.
    DurationQueued {
        queued_secs: f64,
        applied: bool,
        at: DateTime<Utc>,
    },
    WarnWindowChanged {
        warn_window_secs: f64,
        pitch_onset_fraction: f64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        duration_secs: f64,
        queued_duration_secs: f64,
        remaining_secs: f64,
        elapsed_fraction: f64,
        pitch: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name of the event, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerResumed { .. } => "TimerResumed",
            Event::TimerCompleted { .. } => "TimerCompleted",
            Event::TimerReset { .. } => "TimerReset",
            Event::DurationQueued { .. } => "DurationQueued",
            Event::WarnWindowChanged { .. } => "WarnWindowChanged",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}
