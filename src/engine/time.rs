//! Conversion between business-local wall-clock values and UTC storage.
//!
//! Every "is it due" or "same day/week/month" comparison happens on the
//! business-local side. Everything persisted is UTC. Nothing outside this
//! module converts between the two.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Utc,
};
use chrono_tz::Tz;

use crate::error::ShiftopsError;

/// Storage encoding of instants, identical to SQLite's `datetime()` output.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    tz: Tz,
}

impl BusinessClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn from_name(name: &str) -> Result<Self, ShiftopsError> {
        let tz: Tz = name
            .parse()
            .map_err(|_| ShiftopsError::invalid_timezone(name))?;
        Ok(Self::new(tz))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Business-local wall clock at `instant`.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    pub fn today(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date()
    }

    /// Business-local wall clock to UTC.
    ///
    /// Ambiguous times (DST fall-back) take the earlier instant. Times that do
    /// not exist (DST spring-forward) are pushed one hour later.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                let shifted = local + Duration::hours(1);
                match self.tz.from_local_datetime(&shifted).earliest() {
                    Some(dt) => dt.with_timezone(&Utc),
                    None => Utc.from_utc_datetime(&local),
                }
            }
        }
    }

    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        self.to_utc(date.and_time(time))
    }

    /// Parse a user-supplied instant: RFC 3339 with an offset, or a naive
    /// `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DDTHH:MM[:SS]` read as business-local.
    pub fn parse_instant(&self, s: &str) -> Result<DateTime<Utc>, ShiftopsError> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        for format in [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
        ] {
            if let Ok(local) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(self.to_utc(local));
            }
        }
        Err(ShiftopsError::validation(format!(
            "Invalid timestamp '{s}'. Use RFC 3339 or 'YYYY-MM-DD HH:MM'."
        )))
    }

    /// Render an instant in business-local time for humans.
    pub fn display(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M %Z")
            .to_string()
    }
}

pub fn to_storage(instant: DateTime<Utc>) -> String {
    instant.format(STORAGE_FORMAT).to_string()
}

pub fn from_storage(s: &str) -> Result<DateTime<Utc>, ShiftopsError> {
    NaiveDateTime::parse_from_str(s, STORAGE_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|_| ShiftopsError::database(format!("Malformed stored timestamp: {s}")))
}

pub fn date_to_storage(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn date_from_storage(s: &str) -> Result<NaiveDate, ShiftopsError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| ShiftopsError::database(format!("Malformed stored date: {s}")))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ShiftopsError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ShiftopsError::validation(format!("Invalid date '{s}'. Use YYYY-MM-DD.")))
}

/// `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ShiftopsError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| ShiftopsError::validation(format!("Invalid time of day '{s}'. Use HH:MM.")))
}

pub fn time_to_storage(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Wire format for JSON output.
pub fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
