use std::io::Write;

use clap::Args;
use countdown_core::{Config, CoreError, Event, Sinks, TimerEngine};

/// Smallest step accepted, keeping a 999 s run under a million frames.
const MIN_STEP_SECS: f64 = 0.001;

#[derive(Args)]
pub struct SimulateArgs {
    /// Countdown length in seconds (overrides timer.duration_secs)
    #[arg(long)]
    pub duration: Option<f64>,
    /// Seconds before the end at which the ticking starts to rise
    #[arg(long)]
    pub warn_window: Option<f64>,
    /// Simulated seconds per frame
    #[arg(long, default_value = "1.0")]
    pub step: f64,
    /// Print a state snapshot after every frame
    #[arg(long)]
    pub snapshots: bool,
}

/// Run one countdown to completion without a terminal, printing events as JSON lines.
pub fn run(args: SimulateArgs, config: &Config) -> Result<(), CoreError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    simulate(args, config, &mut out)
}

fn simulate(args: SimulateArgs, config: &Config, out: &mut impl Write) -> Result<(), CoreError> {
    if !args.step.is_finite() || args.step < MIN_STEP_SECS {
        return Err(CoreError::Custom(format!(
            "step must be at least {MIN_STEP_SECS} seconds"
        )));
    }

    let mut settings = config.timer_settings();
    if let Some(duration) = args.duration {
        settings.duration_secs = duration;
    }
    if let Some(warn) = args.warn_window {
        settings.warn_window_secs = warn;
    }

    let mut engine = TimerEngine::new(settings, Sinks::null());
    let mut emit = |event: &Event| -> Result<(), CoreError> {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
        Ok(())
    };

    if let Some(event) = engine.advance() {
        emit(&event)?;
    }
    let mut frames = 0u64;
    loop {
        frames += 1;
        let completed = engine.tick(args.step);
        if args.snapshots {
            emit(&engine.snapshot())?;
        }
        if let Some(event) = completed {
            emit(&event)?;
            break;
        }
    }
    tracing::debug!(frames, "simulation finished");
    emit(&engine.snapshot())?;
    Ok(())
}
