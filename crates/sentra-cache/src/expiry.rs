//! Shared TTL and key-encoding helpers.

use std::time::Duration;

use jiff::{SignedDuration, Timestamp};

/// Default time-to-live of cached diagnoses.
pub(crate) const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Returns `true` once `created_at` is at least `ttl` old.
///
/// A zero TTL therefore expires entries immediately.
pub(crate) fn is_expired(created_at: Timestamp, ttl: Duration, now: Timestamp) -> bool {
    let age = now.duration_since(created_at);
    match SignedDuration::try_from(ttl) {
        Ok(ttl) => age >= ttl,
        Err(_) => false,
    }
}

/// Encodes `value` in lowercase base 36.
pub(crate) fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }

    #[test]
    fn zero_ttl_is_always_expired() {
        let now = Timestamp::now();
        assert!(is_expired(now, Duration::ZERO, now));
        assert!(!is_expired(now, DEFAULT_TTL, now));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let now = Timestamp::now();
        let created = now - SignedDuration::from_secs(61);
        assert!(is_expired(created, Duration::from_secs(60), now));
        assert!(!is_expired(created, Duration::from_secs(120), now));
    }
}
