//! Terminal rendition of the clock's display, input field and audio.
//!
//! The sinks write into a shared [`Screen`]; the frame loop renders it once
//! per frame. There is no audio device: clip and pitch show up on the status
//! line, and the gong rings the terminal bell.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use countdown_core::{AudioSink, Clip, DisplaySink, InputFieldSink, Sinks, TimerState};

#[derive(Debug)]
pub struct Screen {
    remaining_text: String,
    indicator: f64,
    queued_text: String,
    clip: Clip,
    looping: bool,
    pitch: f64,
    playing: bool,
    bell: bool,
    bell_pending: bool,
    bar_width: usize,
}

impl Screen {
    pub fn new(bar_width: usize, bell: bool) -> Self {
        Self {
            remaining_text: String::new(),
            indicator: 0.0,
            queued_text: String::new(),
            clip: Clip::Ticking,
            looping: true,
            pitch: 1.0,
            playing: false,
            bell,
            bell_pending: false,
            bar_width: bar_width.max(1),
        }
    }

    /// Status line without terminal control sequences.
    pub fn status_line(&self, state: TimerState) -> String {
        let filled = (self.indicator * self.bar_width as f64).round() as usize;
        let filled = filled.min(self.bar_width);
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            ".".repeat(self.bar_width - filled)
        );
        let sound = match (self.playing, self.clip) {
            (false, _) => "silent".to_string(),
            (true, Clip::Gong) => "gong".to_string(),
            (true, Clip::Ticking) => format!("tick x{:.2}", self.pitch),
        };
        let state = match state {
            TimerState::Ready => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Ended => "time up",
        };
        format!(
            "[{bar}] {:>4}s  {state:<8} {sound:<12} next: {}s",
            self.remaining_text, self.queued_text
        )
    }

    /// Redraw the status line in place, ringing the bell if the gong fired.
    pub fn render(&mut self, out: &mut impl Write, state: TimerState) -> io::Result<()> {
        write!(out, "\r\x1b[2K{}", self.status_line(state))?;
        if self.bell_pending {
            self.bell_pending = false;
            write!(out, "\x07")?;
        }
        out.flush()
    }
}

pub type SharedScreen = Rc<RefCell<Screen>>;

pub struct TerminalDisplay(SharedScreen);

impl DisplaySink for TerminalDisplay {
    fn set_remaining_text(&mut self, text: &str) {
        self.0.borrow_mut().remaining_text = text.to_string();
    }

    fn set_indicator_fraction(&mut self, fraction: f64) {
        self.0.borrow_mut().indicator = fraction;
    }
}

pub struct TerminalInput(SharedScreen);

impl InputFieldSink for TerminalInput {
    fn set_queued_text(&mut self, text: &str) {
        self.0.borrow_mut().queued_text = text.to_string();
    }

    fn current_text(&self) -> String {
        self.0.borrow().queued_text.clone()
    }
}

pub struct TerminalAudio(SharedScreen);

impl AudioSink for TerminalAudio {
    fn set_clip(&mut self, clip: Clip) {
        tracing::debug!(?clip, "audio clip");
        self.0.borrow_mut().clip = clip;
    }

    fn set_loop(&mut self, looping: bool) {
        self.0.borrow_mut().looping = looping;
    }

    fn set_pitch(&mut self, pitch: f64) {
        tracing::trace!(pitch, "audio pitch");
        self.0.borrow_mut().pitch = pitch;
    }

    fn play(&mut self) {
        let mut screen = self.0.borrow_mut();
        screen.playing = true;
        if screen.clip == Clip::Gong && screen.bell {
            screen.bell_pending = true;
        }
        tracing::debug!(clip = ?screen.clip, looping = screen.looping, "audio play");
    }

    fn stop(&mut self) {
        self.0.borrow_mut().playing = false;
    }
}

/// Sinks bound to one shared screen. Completion is logged; the bell is rung
/// by the audio sink when the gong plays.
pub fn terminal_sinks(screen: &SharedScreen) -> Sinks {
    Sinks::null()
        .with_display(TerminalDisplay(Rc::clone(screen)))
        .with_input(TerminalInput(Rc::clone(screen)))
        .with_audio(TerminalAudio(Rc::clone(screen)))
        .with_completion(|| tracing::info!("time is up"))
}
