//! When an instance may be archived, and with which reason.
//!
//! Every function here is a pure decision over an already-loaded task,
//! resolution and settings. The sweeps in `engine::sweep` call them again
//! under the write lock before archiving.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::engine::status::Resolution;
use crate::engine::time::BusinessClock;
use crate::models::{ArchiveReason, ArchiveSettings, Shift, Task, TaskStatus};

/// Whether the completion sweep runs for a dealership in this invocation.
pub fn completion_window_open(settings: &ArchiveSettings, clock: &BusinessClock, now: DateTime<Utc>) -> bool {
    if !settings.auto_archive_enabled {
        return false;
    }
    match settings.auto_archive_day_of_week {
        Some(day) => clock.today(now).weekday() == day,
        None => true,
    }
}

/// Completed (on time or late) and the last completing response has settled.
pub fn completion_reason(
    resolution: &Resolution,
    settings: &ArchiveSettings,
    now: DateTime<Utc>,
) -> Option<ArchiveReason> {
    if !resolution.status.is_completed() {
        return None;
    }
    let completed_at = resolution.completed_at?;
    let cooldown = Duration::try_minutes(settings.completion_cooldown_minutes)?;
    (now - completed_at >= cooldown).then_some(ArchiveReason::Completed)
}

/// Overdue for longer than the dealership's archive threshold.
pub fn expiry_reason(
    task: &Task,
    resolution: &Resolution,
    settings: &ArchiveSettings,
    now: DateTime<Utc>,
) -> Option<ArchiveReason> {
    if resolution.status != TaskStatus::Overdue {
        return None;
    }
    let deadline = task.deadline_at?;
    let threshold = Duration::try_days(settings.task_archive_days)?;
    (now - deadline > threshold).then_some(ArchiveReason::Expired)
}

/// The grace period after the shift closed has run out.
pub fn shift_grace_elapsed(shift: &Shift, settings: &ArchiveSettings, now: DateTime<Utc>) -> bool {
    let grace = Duration::try_hours(settings.archive_overdue_hours_after_shift);
    match (shift.shift_end, grace) {
        (Some(end), Some(grace)) => end.checked_add_signed(grace).is_some_and(|due| now >= due),
        _ => false,
    }
}

/// Unfinished work whose deadline fell inside the closed shift.
///
/// Completed, completed-late and pending-review tasks are never swept here,
/// whatever their deadline.
pub fn after_shift_reason(task: &Task, resolution: &Resolution, shift: &Shift) -> Option<ArchiveReason> {
    let end = shift.shift_end?;
    let deadline = task.deadline_at?;
    if deadline < shift.shift_start || deadline > end {
        return None;
    }
    if resolution.status.is_completed() || resolution.status == TaskStatus::PendingReview {
        return None;
    }
    Some(ArchiveReason::ExpiredAfterShift)
}
