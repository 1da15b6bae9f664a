//! Terminal host: drives one [`countdown_core::TimerEngine`] per frame.

pub mod input;
pub mod terminal;

pub use input::{forward_lines, HostCommand};
pub use terminal::{terminal_sinks, Screen};
