//! Decides whether a generator is due and when its instance appears/expires.
//!
//! Evaluation is pure: it reads the generator definition, its cursor and the
//! current instant, and never touches the store. The factory calls it again
//! under the generator lock before inserting anything.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::engine::time::BusinessClock;
use crate::error::ShiftopsError;
use crate::models::{Generator, Recurrence};

/// One due instance of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// Business-local date the instance belongs to; becomes the new cursor.
    pub period: NaiveDate,
    pub appear_at: DateTime<Utc>,
    pub deadline_at: DateTime<Utc>,
}

/// Reject definitions that can never be evaluated sensibly.
pub fn validate(generator: &Generator) -> Result<(), ShiftopsError> {
    if let Some(end) = generator.end_date {
        if end < generator.start_date {
            return Err(ShiftopsError::invalid_recurrence(format!(
                "Generator {}: end date {end} is before start date {}",
                generator.id, generator.start_date
            )));
        }
    }
    match generator.recurrence {
        Recurrence::Weekly => {
            if generator.days_of_week.is_empty() {
                return Err(ShiftopsError::invalid_recurrence(format!(
                    "Generator {}: weekly recurrence needs at least one weekday",
                    generator.id
                )));
            }
            if let Some(bad) = generator.days_of_week.iter().find(|d| !(1..=7).contains(*d)) {
                return Err(ShiftopsError::invalid_recurrence(format!(
                    "Generator {}: weekday {bad} is outside 1..7",
                    generator.id
                )));
            }
        }
        Recurrence::Monthly => {
            if generator.days_of_month.is_empty() {
                return Err(ShiftopsError::invalid_recurrence(format!(
                    "Generator {}: monthly recurrence needs at least one day of month",
                    generator.id
                )));
            }
            if let Some(bad) = generator
                .days_of_month
                .iter()
                .find(|d| **d == 0 || !(-31..=31).contains(*d))
            {
                return Err(ShiftopsError::invalid_recurrence(format!(
                    "Generator {}: day of month {bad} must be 1..31 or -1..-31",
                    generator.id
                )));
            }
        }
        Recurrence::None | Recurrence::Daily => {}
    }
    Ok(())
}

/// Returns the instance to create right now, or `None` when nothing is due.
pub fn evaluate(
    generator: &Generator,
    clock: &BusinessClock,
    now: DateTime<Utc>,
) -> Result<Option<Occurrence>, ShiftopsError> {
    validate(generator)?;
    if !generator.is_active {
        return Ok(None);
    }

    let local = clock.local(now);
    let today = local.date();

    if today < generator.start_date {
        return Ok(None);
    }
    if generator.end_date.is_some_and(|end| today > end) {
        return Ok(None);
    }
    if already_generated(generator.recurrence, generator.last_generated_at, today) {
        return Ok(None);
    }
    if local.time() < generator.appear_time {
        return Ok(None);
    }
    if !matches_day(generator, today) {
        return Ok(None);
    }

    Ok(Some(occurrence_on(generator, clock, today)))
}

/// Period test against the generation cursor.
///
/// Monthly cursors are compared by trigger day rather than by month so that a
/// generator with several trigger days in one month produces one instance per
/// trigger. A cursor ahead of `today` always counts as generated.
pub fn already_generated(recurrence: Recurrence, cursor: Option<NaiveDate>, today: NaiveDate) -> bool {
    let Some(cursor) = cursor else { return false };
    match recurrence {
        Recurrence::None => true,
        Recurrence::Daily | Recurrence::Monthly => cursor >= today,
        Recurrence::Weekly => cursor.iso_week() >= today.iso_week(),
    }
}

pub fn matches_day(generator: &Generator, today: NaiveDate) -> bool {
    match generator.recurrence {
        Recurrence::None | Recurrence::Daily => true,
        Recurrence::Weekly => {
            let weekday = today.weekday().number_from_monday();
            generator.days_of_week.contains(&weekday)
        }
        Recurrence::Monthly => {
            let month_len = days_in_month(today.year(), today.month());
            generator
                .days_of_month
                .iter()
                .filter_map(|value| effective_day(*value, month_len))
                .any(|day| day == today.day())
        }
    }
}

/// Calendar day a configured monthly value lands on in a month of `month_len` days.
///
/// `31` in April is the 30th; `-1` is the last day, `-2` the one before. A
/// negative value reaching before the 1st has no day that month.
pub fn effective_day(value: i32, month_len: u32) -> Option<u32> {
    if value > 0 {
        Some((value as u32).min(month_len))
    } else if value < 0 {
        let day = month_len as i32 + value + 1;
        (day >= 1).then_some(day as u32)
    } else {
        None
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Appear/deadline instants for an instance on `date`.
///
/// A deadline time earlier than the appear time rolls over to the next day.
/// Without a deadline time the instance is due by the end of its day.
pub fn occurrence_on(generator: &Generator, clock: &BusinessClock, date: NaiveDate) -> Occurrence {
    let appear_at = clock.at(date, generator.appear_time);
    let deadline_local = match generator.deadline_time {
        Some(deadline) if deadline < generator.appear_time => {
            (date + Duration::days(1)).and_time(deadline)
        }
        Some(deadline) => date.and_time(deadline),
        None => date.and_time(end_of_day()),
    };
    Occurrence {
        period: date,
        appear_at,
        deadline_at: clock.to_utc(deadline_local),
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
