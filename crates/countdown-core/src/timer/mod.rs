mod engine;
pub mod input;
pub mod pitch;

pub use engine::{TimerEngine, TimerSession, TimerSettings, TimerState};
pub use pitch::{PitchCurve, PitchRamp};
