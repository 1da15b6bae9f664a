//! # Countdown Core Library
//!
//! This library provides the core logic for the Countdown clock: a single
//! countdown timer with a radial indicator, a digital readout, a ticking
//! sound whose pitch rises as the end approaches, and a gong on completion.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A frame-driven state machine. The host measures the
//!   time between frames and passes it to `tick()`; the engine never reads a
//!   clock of its own.
//! - **Sinks**: Display, input field, audio and completion collaborators the
//!   engine drives through narrow traits. The engine never renders or plays
//!   anything itself.
//! - **Storage**: TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`PitchCurve`]: Pitch ramp applied to the ticking sound
//! - [`Sinks`]: Side-effect collaborators
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod sinks;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use sinks::{
    AudioSink, ChannelNotifier, Clip, CompletionNotifier, DisplaySink, InputFieldSink, NullSink,
    Sinks, TimeScaleSink,
};
pub use storage::Config;
pub use timer::{PitchCurve, PitchRamp, TimerEngine, TimerSession, TimerSettings, TimerState};
