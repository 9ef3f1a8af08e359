//! Materializes a due generator into a task with its assignments.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::{assignment_repo, connection, dealership_repo, generator_repo, task_repo};
use crate::db::task_repo::NewTask;
use crate::engine::recurrence;
use crate::engine::time::BusinessClock;
use crate::error::ShiftopsError;
use crate::models::{Generator, Task};

/// Generate the current instance of one generator if it is due.
///
/// The whole check-and-act sequence runs inside one immediate transaction:
/// the generator is re-read and re-evaluated under the write lock, the
/// cursor is advanced with a compare-and-swap, and the unique
/// (generator, period) index backs both up. On any error nothing is kept.
pub fn generate(
    conn: &Connection,
    clock: &BusinessClock,
    generator_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<Task>, ShiftopsError> {
    connection::immediate(conn, || {
        let generator = generator_repo::get_generator_by_id(conn, generator_id)?;
        let Some(occurrence) = recurrence::evaluate(&generator, clock, now)? else {
            return Ok(None);
        };

        check_dealership(conn, &generator)?;
        let assignees = eligible_assignees(conn, &generator)?;

        let task_id = ulid::Ulid::new().to_string();
        task_repo::create_task(
            conn,
            &task_id,
            &NewTask {
                dealership_id: &generator.dealership_id,
                generator_id: Some(&generator.id),
                generation_period: Some(occurrence.period),
                title: &generator.title,
                description: generator.description.as_deref(),
                task_type: generator.task_type,
                response_type: generator.response_type,
                priority: generator.priority,
                tags: &generator.tags,
                appear_at: occurrence.appear_at,
                deadline_at: Some(occurrence.deadline_at),
            },
        )?;
        for user_id in &assignees {
            assignment_repo::create_assignment(conn, &task_id, user_id)?;
        }

        if !generator_repo::advance_cursor(
            conn,
            &generator.id,
            generator.last_generated_at,
            occurrence.period,
        )? {
            return Err(ShiftopsError::database(format!(
                "Generation cursor of {} moved during generation",
                generator.id
            )));
        }

        tracing::info!(
            generator = %generator.id,
            task = %task_id,
            period = %occurrence.period,
            assignees = assignees.len(),
            "generated task instance"
        );
        task_repo::get_task_by_id(conn, &task_id).map(Some)
    })
}

fn check_dealership(conn: &Connection, generator: &Generator) -> Result<(), ShiftopsError> {
    match dealership_repo::find_dealership(conn, &generator.dealership_id)? {
        Some(dealership) if dealership.is_active => Ok(()),
        Some(_) => Err(ShiftopsError::integrity(format!(
            "Generator {} belongs to inactive dealership {}",
            generator.id, generator.dealership_id
        ))),
        None => Err(ShiftopsError::integrity(format!(
            "Generator {} references missing dealership {}",
            generator.id, generator.dealership_id
        ))),
    }
}

/// Assignees that still exist, are active, and work at the generator's
/// dealership. Others are dropped with a warning; none left is an error.
fn eligible_assignees(conn: &Connection, generator: &Generator) -> Result<Vec<String>, ShiftopsError> {
    let mut eligible = Vec::with_capacity(generator.assignees.len());
    for user_id in &generator.assignees {
        match dealership_repo::find_user(conn, user_id)? {
            Some(user) if user.is_active && user.dealership_id == generator.dealership_id => {
                eligible.push(user.id);
            }
            _ => {
                tracing::warn!(
                    generator = %generator.id,
                    user = %user_id,
                    "skipping assignee that is missing, inactive, or from another dealership"
                );
            }
        }
    }
    if eligible.is_empty() {
        return Err(ShiftopsError::integrity(format!(
            "Generator {} has no eligible assignees",
            generator.id
        )));
    }
    Ok(eligible)
}
