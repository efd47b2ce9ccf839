//! Error categorization and retry strategy.
//!
//! This module maps transport failures onto [`ErrorKind`] and configures the
//! retry strategy used for the calibration query.

use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};

use super::types::ErrorKind;

/// Creates the retry strategy for the calibration query.
///
/// Exponential backoff starting at `CALIBRATION_RETRY_INITIAL_DELAY_MS`,
/// capped at one second, with jitter, limited to
/// `CALIBRATION_RETRY_ATTEMPTS` retries after the first attempt.
pub fn get_calibration_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(crate::config::CALIBRATION_RETRY_INITIAL_DELAY_MS / 2)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(crate::config::CALIBRATION_RETRY_ATTEMPTS)
}

/// Categorizes an HTTP status code that is not a success.
///
/// Returns `None` for 2xx/3xx.
pub fn categorize_status(status: u16) -> Option<ErrorKind> {
    match status {
        crate::config::HTTP_STATUS_TOO_MANY_REQUESTS => Some(ErrorKind::Throttled),
        400..=499 => Some(ErrorKind::ClientError),
        500..=599 => Some(ErrorKind::ServerError),
        _ => None,
    }
}

/// Categorizes a `reqwest::Error` into an `ErrorKind`.
///
/// Status codes take precedence over the error's transport flags.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorKind {
    if let Some(kind) = error.status().and_then(|s| categorize_status(s.as_u16())) {
        return kind;
    }

    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_decode() || error.is_body() {
        ErrorKind::MalformedResponse
    } else {
        ErrorKind::Network
    }
}

/// Parses a `Retry-After` header value given in (possibly fractional) seconds.
///
/// HTTP-date values are not supported and yield `None`. Values beyond
/// [`MAX_ADVISED_WAIT`](crate::config::MAX_ADVISED_WAIT) are capped.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    advised_wait(seconds)
}

/// Converts a server-advised wait in seconds into a capped `Duration`.
///
/// Negative and NaN values yield `None`; anything too large for a `Duration`
/// or above [`MAX_ADVISED_WAIT`](crate::config::MAX_ADVISED_WAIT) yields the cap.
pub fn advised_wait(seconds: f64) -> Option<Duration> {
    if seconds.is_nan() || seconds < 0.0 {
        return None;
    }
    let cap = crate::config::MAX_ADVISED_WAIT;
    let wait = Duration::try_from_secs_f64(seconds).unwrap_or(cap);
    Some(wait.min(cap))
}
