use chrono::{Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Current calendar day in the local timezone
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub struct SystemClock;
impl Clock for SystemClock {}

/// Clock frozen at a given instant
pub struct FixedClock {
    pub millis: i64,
    pub date: NaiveDate,
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }

    fn today(&self) -> NaiveDate {
        self.date
    }
}
