//! Side-effect collaborators driven by the timer engine.
//!
//! The engine requests display updates, audio changes and the completion
//! notification through these traits. Requests are fire-and-forget: the
//! engine never waits on a sink and assumes every call succeeds.

pub mod recording;

use crossbeam_channel::{Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Audio clip the engine can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clip {
    /// Looping tick played while the timer runs.
    Ticking,
    /// One-shot sound played when the timer ends.
    Gong,
}

/// Digital readout and radial indicator.
pub trait DisplaySink {
    fn set_remaining_text(&mut self, text: &str);

    /// `fraction` is always within `[0, 1]`.
    fn set_indicator_fraction(&mut self, fraction: f64);
}

/// The duration input field.
pub trait InputFieldSink {
    fn set_queued_text(&mut self, text: &str);

    /// Text currently shown in the field.
    fn current_text(&self) -> String;
}

pub trait AudioSink {
    fn set_clip(&mut self, clip: Clip);
    fn set_loop(&mut self, looping: bool);
    fn set_pitch(&mut self, pitch: f64);
    fn play(&mut self);
    fn stop(&mut self);
}

/// Invoked exactly once when a run reaches its end.
pub trait CompletionNotifier {
    fn notify(&mut self);
}

impl<F: FnMut()> CompletionNotifier for F {
    fn notify(&mut self) {
        self()
    }
}

/// Optional hook that receives the elapsed fraction on every running frame,
/// e.g. to drive a shader time scale.
pub trait TimeScaleSink {
    fn set_time_scale(&mut self, elapsed_fraction: f64);
}

/// Signals completion over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: Sender<()>,
}

impl ChannelNotifier {
    pub fn new(tx: Sender<()>) -> Self {
        Self { tx }
    }
}

impl CompletionNotifier for ChannelNotifier {
    fn notify(&mut self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                tracing::debug!("completion signal already pending, dropping");
            }
            Err(TrySendError::Disconnected(())) => {
                tracing::warn!("completion receiver dropped");
            }
        }
    }
}

/// No-op implementation of every sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn set_remaining_text(&mut self, _text: &str) {}
    fn set_indicator_fraction(&mut self, _fraction: f64) {}
}

impl InputFieldSink for NullSink {
    fn set_queued_text(&mut self, _text: &str) {}
    fn current_text(&self) -> String {
        String::new()
    }
}

impl AudioSink for NullSink {
    fn set_clip(&mut self, _clip: Clip) {}
    fn set_loop(&mut self, _looping: bool) {}
    fn set_pitch(&mut self, _pitch: f64) {}
    fn play(&mut self) {}
    fn stop(&mut self) {}
}

impl CompletionNotifier for NullSink {
    fn notify(&mut self) {}
}

/// The full set of collaborators an engine drives.
pub struct Sinks {
    pub display: Box<dyn DisplaySink>,
    pub input: Box<dyn InputFieldSink>,
    pub audio: Box<dyn AudioSink>,
    pub completion: Box<dyn CompletionNotifier>,
    pub time_scale: Option<Box<dyn TimeScaleSink>>,
}

impl Sinks {
    /// Sinks that discard every request.
    pub fn null() -> Self {
        Self {
            display: Box::new(NullSink),
            input: Box::new(NullSink),
            audio: Box::new(NullSink),
            completion: Box::new(NullSink),
            time_scale: None,
        }
    }

    pub fn with_display(mut self, display: impl DisplaySink + 'static) -> Self {
        self.display = Box::new(display);
        self
    }

    pub fn with_input(mut self, input: impl InputFieldSink + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_completion(mut self, completion: impl CompletionNotifier + 'static) -> Self {
        self.completion = Box::new(completion);
        self
    }

    pub fn with_time_scale(mut self, time_scale: impl TimeScaleSink + 'static) -> Self {
        self.time_scale = Some(Box::new(time_scale));
        self
    }
}

impl Default for Sinks {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for Sinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks")
            .field("time_scale", &self.time_scale.is_some())
            .finish_non_exhaustive()
    }
}
