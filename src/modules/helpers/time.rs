use std::sync::OnceLock;

use regex::Regex;

fn float_prefix() -> &'static Regex {
    static FLOAT_PREFIX: OnceLock<Regex> = OnceLock::new();
    FLOAT_PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid float regex")
    })
}

fn integer_prefix() -> &'static Regex {
    static INTEGER_PREFIX: OnceLock<Regex> = OnceLock::new();
    INTEGER_PREFIX.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("valid integer regex"))
}

/// # parse a number
/// parse the leading decimal number of a field, trailing garbage is ignored
/// (`"45.2s"` is 45.2). timing exports regularly append units to a value.
///
/// ## Returns
/// * `Option<f64>` - `None` when the field does not start with a finite number
pub fn parse_float(text: &str) -> Option<f64> {
    let found = float_prefix().find(text.trim())?;
    found
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// # parse an integer
/// parse the leading integer of a field, `"12.0"` and `"12 laps"` are both 12
pub fn parse_integer(text: &str) -> Option<i64> {
    let found = integer_prefix().find(text.trim())?;
    found.as_str().parse::<i64>().ok()
}

/// # parse a time to seconds
/// converts `H:MM:SS.f`, `MM:SS.f` or bare seconds to seconds.
/// the fields are split on `:` and weighted 3600/60/1.
///
/// ## Arguments
/// * `text` - the time as exported by the timing system
///
/// ## Returns
/// * `Option<f64>` - the amount of seconds, `None` when the text is empty or
///   one of its fields is not a number
pub fn parse_time_to_seconds(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parts: Vec<&str> = text.split(':').collect();
    let weights: &[f64] = match parts.len() {
        3 => &[3600.0, 60.0, 1.0],
        2 => &[60.0, 1.0],
        1 => &[1.0],
        _ => return None,
    };

    let mut seconds = 0.0;
    for (part, weight) in parts.iter().zip(weights) {
        seconds += parse_float(part)? * weight;
    }

    Some(seconds).filter(|value| value.is_finite())
}

/// # format seconds for display
/// formats as `H:MM:SS.d` when there is at least an hour, `MM:SS.d` otherwise.
/// the tenths are truncated, never rounded.
///
/// ## Returns
/// * `String` - the formatted time, `N/A` for NaN or infinite input
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "N/A".to_string();
    }
    if seconds < 0.0 {
        return format!("-{}", format_seconds(-seconds));
    }

    // in whole milliseconds, float remainders lose tenths
    let ms = (seconds * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    let mins = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1000;
    let tenths = (ms % 1000) / 100;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{}", hours, mins, secs, tenths)
    } else {
        format!("{:02}:{:02}.{}", mins, secs, tenths)
    }
}

/// formats an optional time, `N/A` when there is none
pub fn format_optional_seconds(seconds: Option<f64>) -> String {
    seconds.map(format_seconds).unwrap_or_else(|| "N/A".to_string())
}
