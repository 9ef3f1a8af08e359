use serde_json::json;

use crate::cli::{parse_choice, Context};
use crate::db::{assignment_repo, connection, dealership_repo, task_repo};
use crate::engine::status;
use crate::error::ShiftopsError;
use crate::models::ResponseStatus;
use crate::output;

pub fn run(task_ref: &str, user_ref: &str, status: &str, comment: Option<&str>, ctx: &Context) -> i32 {
    ctx.finish(run_inner(task_ref, user_ref, status, comment, ctx))
}

fn run_inner(
    task_ref: &str,
    user_ref: &str,
    status_value: &str,
    comment: Option<&str>,
    ctx: &Context,
) -> Result<i32, ShiftopsError> {
    let response_status = parse_choice(
        status_value,
        ResponseStatus::from_str,
        "response status",
        "pending, acknowledged, pending_review, completed, rejected",
    )?;

    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;
    let task = task_repo::resolve_task(&conn, task_ref)?;
    let user = dealership_repo::resolve_user(&conn, user_ref)?;

    let response = connection::immediate(&conn, || {
        let task = task_repo::get_task_by_id(&conn, &task.id)?;
        if task.is_archived() {
            return Err(ShiftopsError::task_archived(&task.id));
        }
        if !assignment_repo::is_assigned(&conn, &task.id, &user.id)? {
            return Err(ShiftopsError::not_assigned(&task.id, &user.id));
        }
        assignment_repo::upsert_response(&conn, &task.id, &user.id, response_status, comment, now)
    })?;
    tracing::info!(task = %task.id, user = %user.id, status = response_status.as_str(), "response recorded");

    let resolution = status::load_resolution(&conn, &task, now)?;
    if ctx.json {
        output::json::print_success(json!({
            "response": output::json::response_json(&response),
            "task_status": resolution.status.as_str()
        }));
    } else {
        println!(
            "{} -> {} on {} (task is {})",
            user.name,
            response.status.as_str(),
            task.id,
            resolution.status.as_str()
        );
    }
    Ok(0)
}
