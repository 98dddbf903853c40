use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Source of "now" for due-item queries and scheduling
pub trait DateProvider: Send + Sync {
    fn get_current_time(&self) -> DateTime<Local>;
}

/// Default date provider that uses the system's current date/time
pub struct SystemDateProvider;

impl DateProvider for SystemDateProvider {
    fn get_current_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Pretends today is `override_date`, keeping the real local time of day
pub struct OverrideDateProvider {
    override_date: NaiveDate,
}

impl OverrideDateProvider {
    pub fn new(override_date: NaiveDate) -> Self {
        Self { override_date }
    }
}

impl DateProvider for OverrideDateProvider {
    fn get_current_time(&self) -> DateTime<Local> {
        let now = Local::now();
        let naive = self.override_date.and_time(now.time());
        // A time of day skipped by a DST jump on the override date keeps the real clock
        Local.from_local_datetime(&naive).earliest().unwrap_or(now)
    }
}

/// Always returns the same instant
pub struct FixedDateProvider {
    instant: DateTime<Local>,
}

impl FixedDateProvider {
    pub fn new(instant: DateTime<Local>) -> Self {
        Self { instant }
    }
}

impl DateProvider for FixedDateProvider {
    fn get_current_time(&self) -> DateTime<Local> {
        self.instant
    }
}
