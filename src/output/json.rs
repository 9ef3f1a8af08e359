use serde_json::{json, Value};

use crate::engine::status::Resolution;
use crate::engine::time::{date_to_storage, rfc3339, time_to_storage};
use crate::error::ShiftopsError;
use crate::models::{Assignment, Generator, Response, Shift, Task};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &ShiftopsError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn print(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}

pub fn print_success(data: Value) {
    print(&success(data));
}

pub fn generator_json(g: &Generator) -> Value {
    json!({
        "id": g.id,
        "dealership_id": g.dealership_id,
        "title": g.title,
        "description": g.description,
        "recurrence": g.recurrence.as_str(),
        "appear_time": time_to_storage(g.appear_time),
        "deadline_time": g.deadline_time.map(time_to_storage),
        "days_of_week": g.days_of_week,
        "days_of_month": g.days_of_month,
        "start_date": date_to_storage(g.start_date),
        "end_date": g.end_date.map(date_to_storage),
        "task_type": g.task_type.as_str(),
        "response_type": g.response_type.as_str(),
        "priority": g.priority.as_str(),
        "tags": g.tags,
        "assignees": g.assignees,
        "last_generated_at": g.last_generated_at.map(date_to_storage),
        "is_active": g.is_active
    })
}

pub fn task_summary(t: &Task, resolution: &Resolution) -> Value {
    json!({
        "id": t.id,
        "dealership_id": t.dealership_id,
        "title": t.title,
        "status": resolution.status.as_str(),
        "priority": t.priority.as_str(),
        "appear_at": rfc3339(t.appear_at),
        "deadline_at": t.deadline_at.map(rfc3339),
        "is_active": t.is_active,
        "archive_reason": t.archive_reason.map(|r| r.as_str())
    })
}

pub fn task_detail(
    t: &Task,
    resolution: &Resolution,
    assignments: &[Assignment],
    responses: &[Response],
) -> Value {
    json!({
        "id": t.id,
        "dealership_id": t.dealership_id,
        "generator_id": t.generator_id,
        "generation_period": t.generation_period.map(date_to_storage),
        "title": t.title,
        "description": t.description,
        "status": resolution.status.as_str(),
        "completed_at": resolution.completed_at.map(rfc3339),
        "task_type": t.task_type.as_str(),
        "response_type": t.response_type.as_str(),
        "priority": t.priority.as_str(),
        "tags": t.tags,
        "appear_at": rfc3339(t.appear_at),
        "deadline_at": t.deadline_at.map(rfc3339),
        "is_active": t.is_active,
        "archived_at": t.archived_at.map(rfc3339),
        "archive_reason": t.archive_reason.map(|r| r.as_str()),
        "assignees": assignments.iter().map(|a| a.user_id.as_str()).collect::<Vec<_>>(),
        "responses": responses.iter().map(response_json).collect::<Vec<_>>()
    })
}

pub fn response_json(r: &Response) -> Value {
    json!({
        "task_id": r.task_id,
        "user_id": r.user_id,
        "status": r.status.as_str(),
        "comment": r.comment,
        "responded_at": rfc3339(r.responded_at)
    })
}

pub fn shift_json(s: &Shift) -> Value {
    json!({
        "id": s.id,
        "dealership_id": s.dealership_id,
        "user_id": s.user_id,
        "shift_start": rfc3339(s.shift_start),
        "shift_end": s.shift_end.map(rfc3339),
        "archived_tasks_processed": s.archived_tasks_processed
    })
}
