//! Clock helpers
//!
//! The engine works in Unix seconds and never reads the clock itself; hosts
//! use these helpers to fill [`cert_policy::EvaluationContext`].

use crate::error::Result;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current time in Unix seconds
///
/// # Errors
///
/// Returns `Error::SystemTime` if the clock is before the epoch.
pub fn unix_now() -> Result<u64> {
    unix_seconds(SystemTime::now())
}

/// Convert a `SystemTime` to Unix seconds
///
/// # Errors
///
/// Returns `Error::SystemTime` for times before the epoch.
pub fn unix_seconds(time: SystemTime) -> Result<u64> {
    Ok(time.duration_since(UNIX_EPOCH)?.as_secs())
}

/// Convert Unix seconds back to a `SystemTime`
#[must_use]
pub fn from_unix_seconds(seconds: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_seconds_round_trip() {
        let time = from_unix_seconds(1_700_000_000);
        assert_eq!(unix_seconds(time).unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_before_epoch_is_an_error() {
        let before = UNIX_EPOCH - Duration::from_secs(1);
        assert!(unix_seconds(before).is_err());
    }

    #[test]
    fn test_now_is_after_2023() {
        assert!(unix_now().unwrap() > 1_700_000_000);
    }
}
