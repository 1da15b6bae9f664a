use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Args;
use countdown_core::{Config, CoreError, Event, TimerEngine, TimerState};
use crossbeam_channel::{never, select, tick, unbounded, Receiver};

use crate::host::{forward_lines, terminal_sinks, HostCommand, Screen};

#[derive(Args)]
pub struct RunArgs {
    /// Countdown length in seconds (overrides timer.duration_secs)
    #[arg(long)]
    pub duration: Option<f64>,
    /// Seconds before the end at which the ticking starts to rise
    #[arg(long)]
    pub warn_window: Option<f64>,
    /// Frames per second (overrides display.frame_rate)
    #[arg(long)]
    pub frame_rate: Option<u32>,
    /// Do not ring the terminal bell on the gong
    #[arg(long)]
    pub no_bell: bool,
}

const HELP: &str = "enter: start/pause  +N/-N: adjust  N: set duration  w N: warn window  r: reset  q: quit";

pub fn run(args: RunArgs, config: &Config) -> Result<(), CoreError> {
    let mut settings = config.timer_settings();
    if let Some(duration) = args.duration {
        settings.duration_secs = duration;
    }
    if let Some(warn) = args.warn_window {
        settings.warn_window_secs = warn;
    }
    let frame_rate = args.frame_rate.unwrap_or(config.display.frame_rate).clamp(1, 240);
    let bell = config.display.bell && !args.no_bell;

    let screen = Rc::new(RefCell::new(Screen::new(
        config.display.bar_width as usize,
        bell,
    )));
    let mut engine = TimerEngine::new(settings, terminal_sinks(&screen));

    let (tx, rx) = unbounded();
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || forward_lines(std::io::stdin().lock(), tx))?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{HELP}")?;
    tracing::info!(
        duration_secs = engine.duration_secs(),
        warn_window_secs = engine.warn_window_secs(),
        frame_rate,
        "clock ready"
    );

    let frames = tick(Duration::from_secs_f64(1.0 / f64::from(frame_rate)));
    let mut commands: Receiver<HostCommand> = rx;
    let mut input_closed = false;
    let mut last_frame = Instant::now();

    loop {
        select! {
            recv(commands) -> msg => match msg {
                Ok(HostCommand::Quit) => break,
                Ok(command) => {
                    if let Some(event) = apply(&mut engine, command) {
                        log_event(&event);
                    }
                }
                // Piped input: let a running countdown finish before exiting.
                Err(_) => input_closed = true,
            },
            recv(frames) -> at => {
                let now = at.unwrap_or_else(|_| Instant::now());
                let delta = now.saturating_duration_since(last_frame).as_secs_f64();
                last_frame = now;
                if let Some(event) = engine.tick(delta) {
                    log_event(&event);
                }
                screen.borrow_mut().render(&mut stdout, engine.state())?;
            },
        }

        if input_closed {
            if engine.state() != TimerState::Running {
                break;
            }
            commands = never();
        }
    }

    writeln!(stdout)?;
    Ok(())
}

/// Forward one host command to the engine.
fn apply(engine: &mut TimerEngine, command: HostCommand) -> Option<Event> {
    match command {
        HostCommand::Toggle => engine.advance(),
        HostCommand::Reset => engine.reset(),
        HostCommand::Adjust(delta) => engine.adjust_queued_duration(delta),
        HostCommand::SetDuration(text) => engine.set_duration_from_text(&text),
        HostCommand::WarnWindow(secs) => engine.set_warn_window(secs),
        HostCommand::Status => Some(engine.snapshot()),
        HostCommand::Quit => None,
    }
}

fn log_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!(kind = event.kind(), "{json}"),
        Err(e) => tracing::warn!("could not serialize event: {e}"),
    }
}
