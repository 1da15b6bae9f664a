//! Sinks that record every request, for tests and headless hosts.

use std::cell::RefCell;
use std::rc::Rc;

use super::{AudioSink, Clip, CompletionNotifier, DisplaySink, InputFieldSink, Sinks, TimeScaleSink};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    RemainingText(String),
    Indicator(f64),
    QueuedText(String),
    Clip(Clip),
    Loop(bool),
    Pitch(f64),
    Play,
    Stop,
    Completed,
    TimeScale(f64),
}

#[derive(Debug, Default)]
struct Log {
    calls: Vec<SinkCall>,
    input_text: String,
}

/// Handle onto the calls captured by [`recording_sinks`].
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Rc<RefCell<Log>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<SinkCall> {
        self.log.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().calls.clear();
    }

    /// Simulate the user typing into the input field.
    pub fn set_input_text(&self, text: &str) {
        self.log.borrow_mut().input_text = text.to_string();
    }

    pub fn input_text(&self) -> String {
        self.log.borrow().input_text.clone()
    }

    pub fn completions(&self) -> usize {
        self.count(|c| matches!(c, SinkCall::Completed))
    }

    pub fn count(&self, pred: impl Fn(&SinkCall) -> bool) -> usize {
        self.log.borrow().calls.iter().filter(|c| pred(*c)).count()
    }

    pub fn last_remaining_text(&self) -> Option<String> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            SinkCall::RemainingText(t) => Some(t.clone()),
            _ => None,
        })
    }

    pub fn last_indicator(&self) -> Option<f64> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            SinkCall::Indicator(v) => Some(*v),
            _ => None,
        })
    }

    pub fn last_pitch(&self) -> Option<f64> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            SinkCall::Pitch(v) => Some(*v),
            _ => None,
        })
    }

    pub fn last_clip(&self) -> Option<Clip> {
        self.log.borrow().calls.iter().rev().find_map(|c| match c {
            SinkCall::Clip(v) => Some(*v),
            _ => None,
        })
    }

    fn push(&self, call: SinkCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

/// A single recording sink implementing every sink trait.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    recorder: Recorder,
}

impl DisplaySink for RecordingSink {
    fn set_remaining_text(&mut self, text: &str) {
        self.recorder.push(SinkCall::RemainingText(text.to_string()));
    }

    fn set_indicator_fraction(&mut self, fraction: f64) {
        self.recorder.push(SinkCall::Indicator(fraction));
    }
}

impl InputFieldSink for RecordingSink {
    fn set_queued_text(&mut self, text: &str) {
        self.recorder.set_input_text(text);
        self.recorder.push(SinkCall::QueuedText(text.to_string()));
    }

    fn current_text(&self) -> String {
        self.recorder.input_text()
    }
}

impl AudioSink for RecordingSink {
    fn set_clip(&mut self, clip: Clip) {
        self.recorder.push(SinkCall::Clip(clip));
    }
    fn set_loop(&mut self, looping: bool) {
        self.recorder.push(SinkCall::Loop(looping));
    }
    fn set_pitch(&mut self, pitch: f64) {
        self.recorder.push(SinkCall::Pitch(pitch));
    }
    fn play(&mut self) {
        self.recorder.push(SinkCall::Play);
    }
    fn stop(&mut self) {
        self.recorder.push(SinkCall::Stop);
    }
}

impl CompletionNotifier for RecordingSink {
    fn notify(&mut self) {
        self.recorder.push(SinkCall::Completed);
    }
}

impl TimeScaleSink for RecordingSink {
    fn set_time_scale(&mut self, elapsed_fraction: f64) {
        self.recorder.push(SinkCall::TimeScale(elapsed_fraction));
    }
}

/// Build sinks that log every call into one shared [`Recorder`].
pub fn recording_sinks() -> (Sinks, Recorder) {
    let recorder = Recorder::default();
    let sink = RecordingSink {
        recorder: recorder.clone(),
    };
    let sinks = Sinks {
        display: Box::new(sink.clone()),
        input: Box::new(sink.clone()),
        audio: Box::new(sink.clone()),
        completion: Box::new(sink),
        time_scale: None,
    };
    (sinks, recorder)
}

/// Like [`recording_sinks`], with the time-scale hook registered too.
pub fn recording_sinks_with_time_scale() -> (Sinks, Recorder) {
    let (sinks, recorder) = recording_sinks();
    let sink = RecordingSink {
        recorder: recorder.clone(),
    };
    (sinks.with_time_scale(sink), recorder)
}
