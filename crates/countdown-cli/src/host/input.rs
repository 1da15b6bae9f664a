//! Keyboard input for the terminal host.
//!
//! Input is line-based: each line read from stdin becomes one
//! [`HostCommand`], forwarded to the frame loop over a channel.

use std::io::BufRead;

use crossbeam_channel::Sender;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Start, pause, resume, or reset after the gong.
    Toggle,
    Reset,
    /// Add seconds to the queued duration (`+10`, `-5`).
    Adjust(f64),
    /// Set the queued duration from raw text.
    SetDuration(String),
    /// Change the pitch warn window (`w 15`).
    WarnWindow(f64),
    Status,
    Quit,
}

/// Map one input line to a command.
///
/// Anything not recognised is treated as duration text, so a stray word
/// behaves like typing it into the duration field.
pub fn parse_line(line: &str) -> HostCommand {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" | "s" | "space" | "toggle" => return HostCommand::Toggle,
        "r" | "reset" => return HostCommand::Reset,
        "?" | "status" => return HostCommand::Status,
        "q" | "quit" | "exit" | "esc" => return HostCommand::Quit,
        _ => {}
    }

    if let Some(rest) = line.strip_prefix('w').or_else(|| line.strip_prefix('W')) {
        if let Ok(secs) = rest.trim().parse::<f64>() {
            return HostCommand::WarnWindow(secs);
        }
    }
    if line.starts_with('+') || line.starts_with('-') {
        if let Ok(delta) = line.parse::<f64>() {
            return HostCommand::Adjust(delta);
        }
    }
    HostCommand::SetDuration(line.to_string())
}

/// Read lines until EOF or the receiver goes away.
pub fn forward_lines(reader: impl BufRead, tx: Sender<HostCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("stdin read failed: {e}");
                break;
            }
        };
        let command = parse_line(&line);
        let quit = command == HostCommand::Quit;
        if tx.send(command).is_err() || quit {
            break;
        }
    }
    tracing::debug!("input closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_and_keywords() {
        assert_eq!(parse_line(""), HostCommand::Toggle);
        assert_eq!(parse_line("  space "), HostCommand::Toggle);
        assert_eq!(parse_line("R"), HostCommand::Reset);
        assert_eq!(parse_line("esc"), HostCommand::Quit);
        assert_eq!(parse_line("?"), HostCommand::Status);
    }

    #[test]
    fn signed_numbers_adjust() {
        assert_eq!(parse_line("+10"), HostCommand::Adjust(10.0));
        assert_eq!(parse_line("-2000"), HostCommand::Adjust(-2000.0));
        assert_eq!(parse_line("-x"), HostCommand::SetDuration("-x".into()));
    }

    #[test]
    fn warn_window_prefix() {
        assert_eq!(parse_line("w 15"), HostCommand::WarnWindow(15.0));
        assert_eq!(parse_line("W7.5"), HostCommand::WarnWindow(7.5));
    }

    #[test]
    fn everything_else_is_duration_text() {
        assert_eq!(parse_line("90"), HostCommand::SetDuration("90".into()));
        assert_eq!(parse_line("abc"), HostCommand::SetDuration("abc".into()));
        assert_eq!(parse_line("wait"), HostCommand::SetDuration("wait".into()));
    }

    #[test]
    fn forward_lines_stops_at_quit() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let input = std::io::Cursor::new("\n+5\nq\n30\n");
        forward_lines(input, tx);
        let got: Vec<HostCommand> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![HostCommand::Toggle, HostCommand::Adjust(5.0), HostCommand::Quit]
        );
    }
}
