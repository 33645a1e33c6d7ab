//! Availability judgment for pastes.
//!
//! Pure functions over a snapshot and a caller-supplied "now". No I/O, no
//! side effects; the store applies these inside its atomic consume step.

use chrono::{DateTime, Utc};

use super::aggregate::Paste;

/// Time-based expiry. The boundary instant is already past the TTL, so
/// `now == expires_at` counts as expired. An absent `expires_at` never
/// expires.
pub fn is_time_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        Some(at) => now >= at,
        None => false,
    }
}

/// View-budget exhaustion. An absent `max_views` never exhausts.
pub fn is_view_exhausted(max_views: Option<i64>, view_count: i64) -> bool {
    match max_views {
        Some(max) => view_count >= max,
        None => false,
    }
}

impl Paste {
    /// Either expiry reason alone makes the paste unavailable. Both are
    /// judged against the same snapshot, so no ordering between them.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        !is_time_expired(self.expires_at, now) && !is_view_exhausted(self.max_views, self.view_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_absent_expiry_never_expires() {
        assert!(!is_time_expired(None, t0()));
        assert!(!is_time_expired(None, t0() + Duration::days(10_000)));
    }

    #[test]
    fn test_time_expiry_boundary() {
        let expires = t0() + Duration::seconds(60);
        assert!(!is_time_expired(Some(expires), expires - Duration::seconds(1)));
        assert!(is_time_expired(Some(expires), expires));
        assert!(is_time_expired(Some(expires), expires + Duration::seconds(1)));
    }

    #[test]
    fn test_absent_view_limit_never_exhausts() {
        assert!(!is_view_exhausted(None, 0));
        assert!(!is_view_exhausted(None, 1_000_000));
    }

    #[test]
    fn test_view_exhaustion_boundary() {
        assert!(!is_view_exhausted(Some(3), 2));
        assert!(is_view_exhausted(Some(3), 3));
        assert!(is_view_exhausted(Some(1), 1));
    }

    #[test]
    fn test_availability_requires_both_budgets() {
        let expires = t0() + Duration::seconds(60);
        let mut paste = Paste::new_for_insert("x".into(), t0(), Some(expires), Some(2));
        assert!(paste.is_available(t0()));

        // view budget spent
        paste.view_count = 2;
        assert!(!paste.is_available(t0()));

        // time budget spent
        paste.view_count = 0;
        assert!(!paste.is_available(expires));

        // both spent at once is still just unavailable
        paste.view_count = 2;
        assert!(!paste.is_available(expires));
    }

    #[test]
    fn test_paste_without_budgets_is_always_available() {
        let paste = Paste::new_for_insert("x".into(), t0(), None, None);
        assert!(paste.is_available(t0() + Duration::days(10_000)));
    }
}
