use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

/// Inclusive window of local hours in which signals are acted on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradingHours {
    start_hour: u32,
    end_hour: u32,
    timezone: Tz,
}

impl TradingHours {
    pub fn new(start_hour: u32, end_hour: u32, timezone: Tz) -> Self {
        Self {
            start_hour,
            end_hour,
            timezone,
        }
    }

    /// Hour of `at` in the reference time zone
    pub fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.timezone).hour()
    }

    pub fn is_live(&self, at: DateTime<Utc>) -> bool {
        let hour = self.local_hour(at);
        hour >= self.start_hour && hour <= self.end_hour
    }

    pub fn window(&self) -> (u32, u32) {
        (self.start_hour, self.end_hour)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Default for TradingHours {
    fn default() -> Self {
        Self::new(0, 23, chrono_tz::America::New_York)
    }
}
