use jiff::{SignedDuration, civil::Time};

/// Runs `$block` and logs how long it took at debug level.
#[macro_export]
macro_rules! timer_debug {
    ($msg:literal, $block:expr) => {{
        let now = jiff::Timestamp::now();
        let result = $block;
        let elapsed = jiff::Timestamp::now().duration_since(now);

        tracing::debug!("{}: took {:?}", $msg, elapsed);

        result
    }};
    ($msg:literal, $arg:expr, $block:expr) => {{
        let now = jiff::Timestamp::now();
        let result = $block;
        let elapsed = jiff::Timestamp::now().duration_since(now);

        tracing::debug!("{} {}: took {:?}", $msg, $arg, elapsed);

        result
    }};
}

const SECONDS_PER_MINUTE: f64 = 60.0;
const MAX_SECONDS: f64 = i64::MAX as f64;

/// Converts a number of minutes into a duration.
///
/// Returns `None` for non-finite, negative or out of range values.
pub fn duration_from_minutes(minutes: f64) -> Option<SignedDuration> {
    let seconds = minutes * SECONDS_PER_MINUTE;
    if !seconds.is_finite() || seconds < 0.0 || seconds >= MAX_SECONDS {
        return None;
    }

    Some(SignedDuration::from_secs_f64(seconds))
}

pub fn minutes(duration: SignedDuration) -> f64 {
    duration.as_secs_f64() / SECONDS_PER_MINUTE
}

/// Minutes elapsed between two clock times of the same day, `to - from`.
pub fn minutes_between(from: Time, to: Time) -> f64 {
    minutes(to.duration_since(from))
}
