//! Duration input helpers.
//!
//! User-entered durations are never rejected: text that does not parse is
//! read as zero and every value is clamped into `[0, MAX_DURATION_SECS]`.

use super::pitch::clamp;

pub const MIN_DURATION_SECS: f64 = 0.0;
pub const MAX_DURATION_SECS: f64 = 999.0;

/// Parse seconds from user text. Anything unparsable, NaN or infinite reads as 0.
pub fn parse_seconds(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn clamp_duration(secs: f64) -> f64 {
    clamp(secs, MIN_DURATION_SECS, MAX_DURATION_SECS)
}

/// Duration a run actually uses for a queued value. A queued zero floors at one second.
pub fn applied_duration(queued_secs: f64) -> f64 {
    if queued_secs <= 0.0 {
        1.0
    } else {
        queued_secs
    }
}

/// Format seconds as a whole number, rounding half away from zero.
pub fn format_whole(secs: f64) -> String {
    let rounded = secs.round();
    if rounded == 0.0 || !rounded.is_finite() {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{rounded:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_numbers_and_whitespace() {
        assert_eq!(parse_seconds("90"), 90.0);
        assert_eq!(parse_seconds("  12.5 "), 12.5);
        assert_eq!(parse_seconds("-3"), -3.0);
    }

    #[test]
    fn parse_treats_garbage_as_zero() {
        assert_eq!(parse_seconds("abc"), 0.0);
        assert_eq!(parse_seconds(""), 0.0);
        assert_eq!(parse_seconds("NaN"), 0.0);
        assert_eq!(parse_seconds("inf"), 0.0);
    }

    #[test]
    fn clamp_duration_bounds() {
        assert_eq!(clamp_duration(-2000.0), 0.0);
        assert_eq!(clamp_duration(5000.0), 999.0);
        assert_eq!(clamp_duration(42.0), 42.0);
    }

    #[test]
    fn applied_duration_floors_zero() {
        assert_eq!(applied_duration(0.0), 1.0);
        assert_eq!(applied_duration(30.0), 30.0);
    }

    #[test]
    fn format_whole_rounds() {
        assert_eq!(format_whole(89.5), "90");
        assert_eq!(format_whole(89.4), "89");
        assert_eq!(format_whole(-0.3), "0");
        assert_eq!(format_whole(999.0), "999");
    }
}
