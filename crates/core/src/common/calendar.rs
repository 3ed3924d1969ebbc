use crate::config::{ConfigError, MarketConfig};
use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

/// # Summary
/// Regular trading session of a single exchange: a fixed local window on
/// weekdays, evaluated in the exchange's own timezone.
///
/// # Invariants
/// - `open < close`, both in exchange local time.
/// - Boundaries are inclusive: a session 09:15–15:30 is open at exactly
///   09:15:00 and at exactly 15:30:00, closed one second either side.
/// - Saturdays and Sundays are always closed; exchange holidays are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

impl MarketHours {
    /// # Summary
    /// Builds a session from explicit parts.
    ///
    /// # Returns
    /// `ConfigError::Invalid` when `open` is not strictly before `close`.
    pub fn new(tz: Tz, open: NaiveTime, close: NaiveTime) -> Result<Self, ConfigError> {
        if open >= close {
            return Err(ConfigError::Invalid(format!(
                "market open {} must be before close {}",
                open, close
            )));
        }
        Ok(Self { tz, open, close })
    }

    /// # Summary
    /// Builds a session from the `[market]` config section.
    ///
    /// # Logic
    /// 1. Parses the IANA timezone name.
    /// 2. Parses `open` and `close` as `HH:MM` (or `HH:MM:SS`).
    /// 3. Delegates the ordering check to [`MarketHours::new`].
    pub fn from_config(cfg: &MarketConfig) -> Result<Self, ConfigError> {
        let tz: Tz = cfg
            .timezone
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone: {}", cfg.timezone)))?;
        let open = parse_clock(&cfg.open)?;
        let close = parse_clock(&cfg.close)?;
        Self::new(tz, open, close)
    }

    /// Converts an instant to exchange local time.
    pub fn local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.tz)
    }

    /// # Summary
    /// Whether the market is open at `now`.
    ///
    /// # Logic
    /// 1. Converts `now` to exchange local time.
    /// 2. Rejects weekends.
    /// 3. Checks `open <= local time <= close`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = self.local(now);
        if !is_weekday(local.weekday()) {
            return false;
        }
        let t = local.time();
        self.open <= t && t <= self.close
    }

    /// # Summary
    /// First session open strictly after `now`.
    ///
    /// # Logic
    /// Walks forward day by day from the local date of `now` (at most a week)
    /// and returns the first weekday whose open instant lies in the future.
    ///
    /// # Returns
    /// `None` only if the local open time cannot be mapped to an instant on
    /// any of the next eight days (a DST gap swallowing the open every day).
    pub fn next_open(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = self.local(now).date_naive();
        (0..8u64)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter(|date| is_weekday(date.weekday()))
            .filter_map(|date| self.tz.from_local_datetime(&date.and_time(self.open)).earliest())
            .map(|local| local.with_timezone(&Utc))
            .find(|open_at| *open_at > now)
    }
}

fn is_weekday(day: Weekday) -> bool {
    !matches!(day, Weekday::Sat | Weekday::Sun)
}

fn parse_clock(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| ConfigError::Invalid(format!("invalid time of day '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn nse() -> MarketHours {
        MarketHours::from_config(&MarketConfig::default()).unwrap()
    }

    fn ist(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Kolkata
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_session_boundaries() {
        let hours = nse();
        // 2025-01-06 is a Monday
        assert!(hours.is_open(ist(2025, 1, 6, 9, 15, 0)));
        assert!(!hours.is_open(ist(2025, 1, 6, 9, 14, 59)));
        assert!(hours.is_open(ist(2025, 1, 6, 15, 30, 0)));
        assert!(!hours.is_open(ist(2025, 1, 6, 15, 30, 1)));
        assert!(hours.is_open(ist(2025, 1, 10, 12, 0, 0)));
    }

    #[test]
    fn test_weekend_is_closed() {
        let hours = nse();
        assert!(!hours.is_open(ist(2025, 1, 11, 12, 0, 0)));
        assert!(!hours.is_open(ist(2025, 1, 12, 12, 0, 0)));
    }

    #[test]
    fn test_next_open_skips_weekend() {
        let hours = nse();
        // Friday evening -> Monday morning
        let next = hours.next_open(ist(2025, 1, 10, 16, 0, 0)).unwrap();
        assert_eq!(next, ist(2025, 1, 13, 9, 15, 0));
        // Before the bell on a weekday -> same day
        let next = hours.next_open(ist(2025, 1, 7, 8, 0, 0)).unwrap();
        assert_eq!(next, ist(2025, 1, 7, 9, 15, 0));
        // During the session -> next day
        let next = hours.next_open(ist(2025, 1, 7, 10, 0, 0)).unwrap();
        assert_eq!(next, ist(2025, 1, 8, 9, 15, 0));
    }

    #[test]
    fn test_rejects_inverted_window() {
        let mut cfg = MarketConfig::default();
        cfg.open = "16:00".to_string();
        assert!(MarketHours::from_config(&cfg).is_err());

        let mut cfg = MarketConfig::default();
        cfg.timezone = "Mars/Olympus".to_string();
        assert!(MarketHours::from_config(&cfg).is_err());
    }
}
