//! Batch sweeps over every eligible dealership.
//!
//! Each sweep is a one-shot pass that an external scheduler invokes. Units of
//! work (one generator, one task, one shift) run in their own transaction; a
//! failed unit is logged, counted in the report and skipped, and the sweep
//! moves on. Running a sweep twice with the same `now` changes nothing the
//! second time.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{connection, dealership_repo, generator_repo, setting_repo, shift_repo, task_repo};
use crate::engine::archival;
use crate::engine::factory;
use crate::engine::status::{self, Resolution};
use crate::engine::time::BusinessClock;
use crate::error::{ErrorClass, ShiftopsError};
use crate::models::{ArchiveReason, ArchiveSettings, Task};

/// Failed units of a sweep, by class.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct UnitErrors {
    pub configuration: usize,
    pub integrity: usize,
    pub failed: usize,
}

impl UnitErrors {
    fn record(&mut self, unit: &'static str, id: &str, err: &ShiftopsError) {
        match err.class() {
            ErrorClass::Configuration => {
                self.configuration += 1;
                tracing::warn!(unit, id, code = err.code.as_str(), "skipping: {}", err.message);
            }
            ErrorClass::Integrity => {
                self.integrity += 1;
                tracing::warn!(unit, id, code = err.code.as_str(), "skipping: {}", err.message);
            }
            ErrorClass::Transient | ErrorClass::Request => {
                self.failed += 1;
                tracing::error!(unit, id, code = err.code.as_str(), "failed: {}", err.message);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.configuration + self.integrity + self.failed
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerationReport {
    pub generators_checked: usize,
    /// IDs of the tasks created in this pass.
    pub generated: Vec<String>,
    pub errors: UnitErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedTask {
    pub task_id: String,
    pub reason: ArchiveReason,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ArchiveReport {
    pub dealerships_checked: usize,
    /// Dealerships whose completion sweep was gated off today.
    pub completion_skipped: Vec<String>,
    pub archived: Vec<ArchivedTask>,
    pub errors: UnitErrors,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ShiftReport {
    pub processed_shifts: Vec<String>,
    /// Closed shifts still inside their grace period.
    pub waiting: usize,
    pub archived: Vec<ArchivedTask>,
    pub errors: UnitErrors,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    pub generation: GenerationReport,
    pub archival: ArchiveReport,
    pub shifts: ShiftReport,
}

/// Generate every due instance for every active dealership.
pub fn run_generation(
    conn: &Connection,
    clock: &BusinessClock,
    now: DateTime<Utc>,
) -> Result<GenerationReport, ShiftopsError> {
    let mut report = GenerationReport::default();

    for generator_id in generator_repo::list_orphaned_generator_ids(conn)? {
        let err = ShiftopsError::integrity(format!(
            "Generator {generator_id} belongs to a missing or inactive dealership"
        ));
        report.errors.record("generator", &generator_id, &err);
    }

    for dealership in dealership_repo::list_active_dealerships(conn)? {
        let generator_ids = match generator_repo::list_active_generator_ids(conn, &dealership.id) {
            Ok(ids) => ids,
            Err(e) => {
                report.errors.record("dealership", &dealership.id, &e);
                continue;
            }
        };
        for generator_id in generator_ids {
            report.generators_checked += 1;
            match factory::generate(conn, clock, &generator_id, now) {
                Ok(Some(task)) => report.generated.push(task.id),
                Ok(None) => {}
                Err(e) => report.errors.record("generator", &generator_id, &e),
            }
        }
    }

    tracing::info!(
        checked = report.generators_checked,
        generated = report.generated.len(),
        errors = report.errors.total(),
        "generation sweep finished"
    );
    Ok(report)
}

/// Completion and general expiry sweeps, per active dealership.
pub fn run_archival(
    conn: &Connection,
    clock: &BusinessClock,
    now: DateTime<Utc>,
) -> Result<ArchiveReport, ShiftopsError> {
    let mut report = ArchiveReport::default();

    for dealership in dealership_repo::list_active_dealerships(conn)? {
        report.dealerships_checked += 1;
        let settings = match setting_repo::load_archive_settings(conn, &dealership.id) {
            Ok(settings) => settings,
            Err(e) => {
                report.errors.record("dealership", &dealership.id, &e);
                continue;
            }
        };
        let completion_open = archival::completion_window_open(&settings, clock, now);
        if !completion_open {
            report.completion_skipped.push(dealership.id.clone());
        }

        let task_ids = match task_repo::list_active_task_ids(conn, &dealership.id) {
            Ok(ids) => ids,
            Err(e) => {
                report.errors.record("dealership", &dealership.id, &e);
                continue;
            }
        };
        for task_id in task_ids {
            let decide = |task: &Task, resolution: &Resolution| {
                dealership_reason(task, resolution, &settings, completion_open, now)
            };
            match archive_if(conn, &task_id, now, decide) {
                Ok(Some(reason)) => report.archived.push(ArchivedTask { task_id, reason }),
                Ok(None) => {}
                Err(e) => report.errors.record("task", &task_id, &e),
            }
        }
    }

    tracing::info!(
        dealerships = report.dealerships_checked,
        archived = report.archived.len(),
        errors = report.errors.total(),
        "archival sweep finished"
    );
    Ok(report)
}

fn dealership_reason(
    task: &Task,
    resolution: &Resolution,
    settings: &ArchiveSettings,
    completion_open: bool,
    now: DateTime<Utc>,
) -> Option<ArchiveReason> {
    if completion_open {
        if let Some(reason) = archival::completion_reason(resolution, settings, now) {
            return Some(reason);
        }
    }
    archival::expiry_reason(task, resolution, settings, now)
}

/// Re-read and re-resolve one task under the write lock, then archive it if
/// `decide` still says so.
fn archive_if<F>(
    conn: &Connection,
    task_id: &str,
    now: DateTime<Utc>,
    decide: F,
) -> Result<Option<ArchiveReason>, ShiftopsError>
where
    F: FnOnce(&Task, &Resolution) -> Option<ArchiveReason>,
{
    connection::immediate(conn, || {
        let task = task_repo::get_task_by_id(conn, task_id)?;
        if task.is_archived() || !task.is_active {
            return Ok(None);
        }
        let resolution = status::load_resolution(conn, &task, now)?;
        let Some(reason) = decide(&task, &resolution) else {
            return Ok(None);
        };
        if !task_repo::archive_task(conn, &task.id, reason, now)? {
            return Ok(None);
        }
        tracing::info!(task = %task.id, reason = reason.as_str(), "archived task");
        Ok(Some(reason))
    })
}

/// Shift-triggered expiry: handle every closed shift whose grace period has
/// run out, exactly once.
pub fn run_shift_archival(conn: &Connection, now: DateTime<Utc>) -> Result<ShiftReport, ShiftopsError> {
    let mut report = ShiftReport::default();

    for shift in shift_repo::list_unprocessed_closed(conn)? {
        let settings = match setting_repo::load_archive_settings(conn, &shift.dealership_id) {
            Ok(settings) => settings,
            Err(e) => {
                report.errors.record("shift", &shift.id, &e);
                continue;
            }
        };
        if !archival::shift_grace_elapsed(&shift, &settings, now) {
            report.waiting += 1;
            continue;
        }
        match process_shift(conn, &shift.id, now) {
            Ok(Some(archived)) => {
                report.processed_shifts.push(shift.id);
                report.archived.extend(archived);
            }
            Ok(None) => {}
            Err(e) => report.errors.record("shift", &shift.id, &e),
        }
    }

    tracing::info!(
        shifts = report.processed_shifts.len(),
        waiting = report.waiting,
        archived = report.archived.len(),
        "shift sweep finished"
    );
    Ok(report)
}

/// One shift in one transaction. `None` when another run got there first.
fn process_shift(
    conn: &Connection,
    shift_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<Vec<ArchivedTask>>, ShiftopsError> {
    connection::immediate(conn, || {
        let shift = shift_repo::get_shift_by_id(conn, shift_id)?;
        let Some(end) = shift.shift_end else {
            return Ok(None);
        };
        if shift.archived_tasks_processed {
            return Ok(None);
        }

        let mut archived = Vec::new();
        let candidates =
            task_repo::list_active_with_deadline_between(conn, &shift.dealership_id, shift.shift_start, end)?;
        for task in candidates {
            let resolution = status::load_resolution(conn, &task, now)?;
            let Some(reason) = archival::after_shift_reason(&task, &resolution, &shift) else {
                continue;
            };
            if task_repo::archive_task(conn, &task.id, reason, now)? {
                tracing::info!(task = %task.id, shift = %shift.id, "archived task after shift");
                archived.push(ArchivedTask {
                    task_id: task.id,
                    reason,
                });
            }
        }

        if !shift_repo::mark_processed(conn, &shift.id)? {
            return Err(ShiftopsError::database(format!(
                "Shift {} was processed concurrently",
                shift.id
            )));
        }
        Ok(Some(archived))
    })
}

/// Generation, then the dealership sweeps, then the shift sweep.
pub fn run_all(conn: &Connection, clock: &BusinessClock, now: DateTime<Utc>) -> Result<SweepReport, ShiftopsError> {
    Ok(SweepReport {
        generation: run_generation(conn, clock, now)?,
        archival: run_archival(conn, clock, now)?,
        shifts: run_shift_archival(conn, now)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignment_repo;
    use crate::db::generator_repo::NewGenerator;
    use crate::db::task_repo::NewTask;
    use crate::engine::time::{parse_date, parse_time_of_day};
    use crate::models::{Priority, Recurrence, ResponseStatus, ResponseType, TaskType};

    fn clock() -> BusinessClock {
        BusinessClock::from_name("Asia/Yekaterinburg").unwrap()
    }

    /// Local business time (UTC+5).
    fn at(s: &str) -> DateTime<Utc> {
        clock().parse_instant(s).unwrap()
    }

    fn setup() -> Connection {
        let conn = connection::open_in_memory().unwrap();
        dealership_repo::create_dealership(&conn, "d1", "North").unwrap();
        dealership_repo::create_dealership(&conn, "d2", "South").unwrap();
        for (user, dealership) in [("u1", "d1"), ("u2", "d1"), ("u3", "d1"), ("v1", "d2")] {
            dealership_repo::create_user(&conn, user, dealership, user).unwrap();
        }
        conn
    }

    fn generator(conn: &Connection, id: &str, recurrence: Recurrence, assignees: &[&str]) -> NewGenerator {
        let new = NewGenerator {
            dealership_id: "d1".into(),
            title: format!("Generator {id}"),
            description: None,
            recurrence,
            appear_time: parse_time_of_day("10:00").unwrap(),
            deadline_time: Some(parse_time_of_day("18:00").unwrap()),
            days_of_week: vec![],
            days_of_month: vec![],
            start_date: parse_date("2024-01-01").unwrap(),
            end_date: None,
            task_type: TaskType::Individual,
            response_type: ResponseType::Completion,
            priority: Priority::Medium,
            tags: vec![],
            assignees: assignees.iter().map(|s| s.to_string()).collect(),
        };
        generator_repo::create_generator(conn, id, &new).unwrap();
        new
    }

    fn direct_task(conn: &Connection, id: &str, dealership: &str, deadline: &str, assignees: &[&str]) {
        task_repo::create_task(
            conn,
            id,
            &NewTask {
                dealership_id: dealership,
                generator_id: None,
                generation_period: None,
                title: id,
                description: None,
                task_type: TaskType::Group,
                response_type: ResponseType::Completion,
                priority: Priority::Medium,
                tags: &[],
                appear_at: at("2024-03-01 08:00"),
                deadline_at: Some(at(deadline)),
            },
        )
        .unwrap();
        for user in assignees {
            assignment_repo::create_assignment(conn, id, user).unwrap();
        }
    }

    fn respond(conn: &Connection, task: &str, user: &str, status: ResponseStatus, when: &str) {
        assignment_repo::upsert_response(conn, task, user, status, None, at(when)).unwrap();
    }

    fn reason_of(conn: &Connection, id: &str) -> Option<ArchiveReason> {
        task_repo::get_task_by_id(conn, id).unwrap().archive_reason
    }

    #[test]
    fn test_daily_sweep_generates_once_per_day() {
        let conn = setup();
        generator(&conn, "g1", Recurrence::Daily, &["u1"]);
        generator_repo::advance_cursor(&conn, "g1", None, parse_date("2024-03-04").unwrap()).unwrap();

        let early = run_generation(&conn, &clock(), at("2024-03-05 09:59")).unwrap();
        assert!(early.generated.is_empty());
        let first = run_generation(&conn, &clock(), at("2024-03-05 10:30")).unwrap();
        assert_eq!(first.generated.len(), 1);
        let second = run_generation(&conn, &clock(), at("2024-03-05 20:00")).unwrap();
        assert!(second.generated.is_empty());
        assert_eq!(second.generators_checked, 1);
    }

    #[test]
    fn test_weekly_friday_example() {
        let conn = setup();
        let mut new = generator(&conn, "unused", Recurrence::Daily, &["u1"]);
        new.recurrence = Recurrence::Weekly;
        new.days_of_week = vec![5];
        generator_repo::create_generator(&conn, "g1", &new).unwrap();
        generator_repo::set_generator_active(&conn, "unused", false).unwrap();

        // 2024-03-01 and 2024-03-08 are Fridays.
        assert_eq!(run_generation(&conn, &clock(), at("2024-03-01 11:00")).unwrap().generated.len(), 1);
        assert!(run_generation(&conn, &clock(), at("2024-03-01 15:00")).unwrap().generated.is_empty());
        assert!(run_generation(&conn, &clock(), at("2024-03-05 11:00")).unwrap().generated.is_empty());
        assert_eq!(run_generation(&conn, &clock(), at("2024-03-08 11:00")).unwrap().generated.len(), 1);
    }

    #[test]
    fn test_monthly_last_day_sweeps() {
        let conn = setup();
        let mut new = generator(&conn, "unused", Recurrence::Daily, &["u1"]);
        generator_repo::set_generator_active(&conn, "unused", false).unwrap();
        new.recurrence = Recurrence::Monthly;
        new.days_of_month = vec![-1];
        generator_repo::create_generator(&conn, "g1", &new).unwrap();

        let mut created = Vec::new();
        for day in ["2024-01-30", "2024-01-31", "2024-02-28", "2024-02-29", "2025-02-28"] {
            let report = run_generation(&conn, &clock(), at(&format!("{day} 12:00"))).unwrap();
            if !report.generated.is_empty() {
                created.push(day);
            }
        }
        assert_eq!(created, vec!["2024-01-31", "2024-02-29", "2025-02-28"]);
    }

    #[test]
    fn test_broken_generator_does_not_stop_sweep() {
        let conn = setup();
        let mut bad = generator(&conn, "g1", Recurrence::Daily, &["u1"]);
        generator_repo::set_generator_active(&conn, "g1", false).unwrap();
        bad.recurrence = Recurrence::Weekly;
        bad.days_of_week = vec![];
        generator_repo::create_generator(&conn, "g0", &bad).unwrap();
        generator(&conn, "g2", Recurrence::Daily, &["v1"]);
        generator(&conn, "g3", Recurrence::Daily, &["u2"]);

        let report = run_generation(&conn, &clock(), at("2024-03-05 12:00")).unwrap();
        assert_eq!(report.generated.len(), 1);
        assert_eq!(report.errors.configuration, 1);
        assert_eq!(report.errors.integrity, 1);
        assert_eq!(task_repo::tasks_for_generator(&conn, "g3").unwrap().len(), 1);
    }

    #[test]
    fn test_orphaned_generators_are_reported() {
        let conn = setup();
        generator(&conn, "g1", Recurrence::Daily, &["u1"]);
        dealership_repo::set_dealership_active(&conn, "d1", false).unwrap();
        let report = run_generation(&conn, &clock(), at("2024-03-05 12:00")).unwrap();
        assert!(report.generated.is_empty());
        assert_eq!(report.errors.integrity, 1);
        assert_eq!(report.generators_checked, 0);
    }

    #[test]
    fn test_completion_sweep_respects_cooldown_and_day() {
        let conn = setup();
        direct_task(&conn, "t1", "d1", "2024-03-01 18:00", &["u1", "u2"]);
        respond(&conn, "t1", "u1", ResponseStatus::Completed, "2024-03-01 11:00");
        respond(&conn, "t1", "u2", ResponseStatus::Completed, "2024-03-01 12:00");

        let report = run_archival(&conn, &clock(), at("2024-03-01 12:03")).unwrap();
        assert!(report.archived.is_empty());

        setting_repo::set_setting(&conn, Some("d1"), "auto_archive_day_of_week", "1").unwrap();
        let report = run_archival(&conn, &clock(), at("2024-03-01 13:00")).unwrap();
        assert!(report.archived.is_empty());
        assert_eq!(report.completion_skipped, vec!["d1".to_string()]);

        // 2024-03-04 is a Monday.
        let report = run_archival(&conn, &clock(), at("2024-03-04 09:00")).unwrap();
        assert_eq!(
            report.archived,
            vec![ArchivedTask {
                task_id: "t1".into(),
                reason: ArchiveReason::Completed
            }]
        );
        let task = task_repo::get_task_by_id(&conn, "t1").unwrap();
        assert!(!task.is_active);
        assert!(task.archived_at.is_some());
    }

    #[test]
    fn test_dealerships_diverge_on_archive_day() {
        let conn = setup();
        direct_task(&conn, "t1", "d1", "2024-03-01 18:00", &["u1"]);
        direct_task(&conn, "t2", "d2", "2024-03-01 18:00", &["v1"]);
        respond(&conn, "t1", "u1", ResponseStatus::Completed, "2024-03-01 11:00");
        respond(&conn, "t2", "v1", ResponseStatus::Completed, "2024-03-01 11:00");
        setting_repo::set_setting(&conn, Some("d1"), "auto_archive_day_of_week", "5").unwrap();
        setting_repo::set_setting(&conn, Some("d2"), "auto_archive_day_of_week", "6").unwrap();

        // Friday in business time.
        let report = run_archival(&conn, &clock(), at("2024-03-01 20:00")).unwrap();
        assert_eq!(report.archived.len(), 1);
        assert_eq!(reason_of(&conn, "t1"), Some(ArchiveReason::Completed));
        assert_eq!(reason_of(&conn, "t2"), None);
        assert_eq!(report.completion_skipped, vec!["d2".to_string()]);
    }

    #[test]
    fn test_general_expiry_after_threshold() {
        let conn = setup();
        setting_repo::set_setting(&conn, None, "task_archive_days", "3").unwrap();
        direct_task(&conn, "t1", "d1", "2024-03-01 18:00", &["u1"]);
        direct_task(&conn, "t2", "d1", "2024-03-01 18:00", &["u2"]);
        respond(&conn, "t2", "u2", ResponseStatus::PendingReview, "2024-03-01 17:00");

        assert!(run_archival(&conn, &clock(), at("2024-03-04 18:00")).unwrap().archived.is_empty());
        let report = run_archival(&conn, &clock(), at("2024-03-04 18:01")).unwrap();
        assert_eq!(report.archived.len(), 1);
        assert_eq!(reason_of(&conn, "t1"), Some(ArchiveReason::Expired));
        assert_eq!(reason_of(&conn, "t2"), None);
    }

    #[test]
    fn test_invalid_setting_skips_only_that_dealership() {
        let conn = setup();
        setting_repo::set_setting(&conn, Some("d1"), "task_archive_days", "soon").unwrap();
        direct_task(&conn, "t1", "d1", "2024-01-01 18:00", &["u1"]);
        direct_task(&conn, "t2", "d2", "2024-01-01 18:00", &["v1"]);

        let report = run_archival(&conn, &clock(), at("2024-03-04 18:00")).unwrap();
        assert_eq!(report.errors.configuration, 1);
        assert_eq!(reason_of(&conn, "t1"), None);
        assert_eq!(reason_of(&conn, "t2"), Some(ArchiveReason::Expired));
    }

    #[test]
    fn test_oversized_archive_days_skips_only_that_dealership() {
        let conn = setup();
        setting_repo::set_setting(&conn, Some("d1"), "task_archive_days", "200000000000").unwrap();
        direct_task(&conn, "t1", "d1", "2024-01-01 18:00", &["u1"]);
        direct_task(&conn, "t2", "d2", "2024-01-01 18:00", &["v1"]);

        let report = run_archival(&conn, &clock(), at("2024-03-04 18:00")).unwrap();
        assert_eq!(report.errors.configuration, 1);
        assert_eq!(reason_of(&conn, "t1"), None);
        assert_eq!(reason_of(&conn, "t2"), Some(ArchiveReason::Expired));
    }

    #[test]
    fn test_oversized_shift_grace_is_a_configuration_error() {
        let conn = setup();
        setting_repo::set_setting(&conn, None, "archive_overdue_hours_after_shift", "100000000000")
            .unwrap();
        shift_repo::open_shift(&conn, "s1", "d1", "u1", at("2024-03-01 08:00")).unwrap();
        shift_repo::close_shift(&conn, "s1", at("2024-03-01 20:00")).unwrap();
        direct_task(&conn, "open", "d1", "2024-03-01 13:00", &["u1"]);

        let report = run_shift_archival(&conn, at("2024-03-09 00:00")).unwrap();
        assert_eq!(report.errors.configuration, 1);
        assert!(report.processed_shifts.is_empty());
        assert_eq!(reason_of(&conn, "open"), None);
    }

    #[test]
    fn test_shift_sweep_leaves_work_under_review() {
        let conn = setup();
        shift_repo::open_shift(&conn, "s1", "d1", "u1", at("2024-03-01 08:00")).unwrap();
        shift_repo::close_shift(&conn, "s1", at("2024-03-01 20:00")).unwrap();
        direct_task(&conn, "review", "d1", "2024-03-01 13:00", &["u1"]);
        respond(&conn, "review", "u1", ResponseStatus::PendingReview, "2024-03-01 14:00");

        let report = run_shift_archival(&conn, at("2024-03-01 22:00")).unwrap();
        assert_eq!(report.processed_shifts, vec!["s1".to_string()]);
        assert!(report.archived.is_empty());
        assert_eq!(reason_of(&conn, "review"), None);
    }

    #[test]
    fn test_shift_sweep_archives_unfinished_once() {
        let conn = setup();
        shift_repo::open_shift(&conn, "s1", "d1", "u1", at("2024-03-01 08:00")).unwrap();
        shift_repo::close_shift(&conn, "s1", at("2024-03-01 20:00")).unwrap();

        direct_task(&conn, "late", "d1", "2024-03-01 13:00", &["u1"]);
        respond(&conn, "late", "u1", ResponseStatus::Completed, "2024-03-01 15:00");
        direct_task(&conn, "done", "d1", "2024-03-01 13:00", &["u1"]);
        respond(&conn, "done", "u1", ResponseStatus::Completed, "2024-03-01 12:00");
        direct_task(&conn, "open", "d1", "2024-03-01 13:00", &["u1", "u2"]);
        respond(&conn, "open", "u1", ResponseStatus::Acknowledged, "2024-03-01 09:00");
        direct_task(&conn, "after", "d1", "2024-03-01 21:00", &["u1"]);
        direct_task(&conn, "other", "d2", "2024-03-01 13:00", &["v1"]);

        let waiting = run_shift_archival(&conn, at("2024-03-01 21:59")).unwrap();
        assert_eq!(waiting.waiting, 1);
        assert!(waiting.processed_shifts.is_empty());

        let report = run_shift_archival(&conn, at("2024-03-01 22:00")).unwrap();
        assert_eq!(report.processed_shifts, vec!["s1".to_string()]);
        assert_eq!(
            report.archived,
            vec![ArchivedTask {
                task_id: "open".into(),
                reason: ArchiveReason::ExpiredAfterShift
            }]
        );
        assert_eq!(reason_of(&conn, "late"), None);
        assert_eq!(reason_of(&conn, "done"), None);
        assert_eq!(reason_of(&conn, "after"), None);
        assert_eq!(reason_of(&conn, "other"), None);
        assert!(shift_repo::get_shift_by_id(&conn, "s1").unwrap().archived_tasks_processed);

        let again = run_shift_archival(&conn, at("2024-03-02 22:00")).unwrap();
        assert!(again.processed_shifts.is_empty());
        assert!(again.archived.is_empty());
    }

    #[test]
    fn test_open_shift_is_ignored() {
        let conn = setup();
        shift_repo::open_shift(&conn, "s1", "d1", "u1", at("2024-03-01 08:00")).unwrap();
        direct_task(&conn, "t1", "d1", "2024-03-01 13:00", &["u1"]);
        let report = run_shift_archival(&conn, at("2024-03-05 00:00")).unwrap();
        assert!(report.archived.is_empty());
        assert_eq!(report.waiting, 0);
    }

    #[test]
    fn test_run_all_is_idempotent() {
        let conn = setup();
        generator(&conn, "g1", Recurrence::Daily, &["u1"]);
        let now = at("2024-03-05 12:00");
        let first = run_all(&conn, &clock(), now).unwrap();
        assert_eq!(first.generation.generated.len(), 1);
        let second = run_all(&conn, &clock(), now).unwrap();
        assert!(second.generation.generated.is_empty());
        assert!(second.archival.archived.is_empty());
        assert!(second.shifts.archived.is_empty());
    }
}
