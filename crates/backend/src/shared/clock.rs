//! Time source for the service.
//!
//! "Now" is resolved once per request and passed down to the service and
//! store; expiry is never judged against an ambient clock read mid-flight.

use chrono::{DateTime, Utc};

use super::config::Config;

/// Operating mode, fixed at construction from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// Wall clock; caller-supplied overrides are ignored.
    Real,
    /// Honor a caller-supplied instant, falling back to the wall clock
    /// when none is given.
    Deterministic,
}

#[derive(Debug, Clone, Copy)]
pub struct Clock {
    mode: ClockMode,
}

impl Clock {
    pub fn new(mode: ClockMode) -> Self {
        Self { mode }
    }

    pub fn from_config(config: &Config) -> Self {
        if config.clock.deterministic {
            Self::new(ClockMode::Deterministic)
        } else {
            Self::new(ClockMode::Real)
        }
    }

    /// Resolve "now" for one request.
    pub fn now(&self, override_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match (self.mode, override_at) {
            (ClockMode::Deterministic, Some(at)) => at,
            _ => Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_real_mode_ignores_override() {
        let clock = Clock::new(ClockMode::Real);
        let now = clock.now(Some(fixed()));
        assert!(now > fixed());
    }

    #[test]
    fn test_deterministic_mode_returns_override_exactly() {
        let clock = Clock::new(ClockMode::Deterministic);
        assert_eq!(clock.now(Some(fixed())), fixed());
    }

    #[test]
    fn test_deterministic_mode_without_override_uses_wall_clock() {
        let clock = Clock::new(ClockMode::Deterministic);
        let before = Utc::now();
        let now = clock.now(None);
        assert!(now >= before);
    }
}
