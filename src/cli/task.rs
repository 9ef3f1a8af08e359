use serde_json::json;

use crate::cli::{parse_choice, Context, TaskCommands};
use crate::db::task_repo::{self, NewTask};
use crate::db::{assignment_repo, connection, dealership_repo};
use crate::engine::status;
use crate::error::ShiftopsError;
use crate::models::{Priority, ResponseType, TaskStatus, TaskType};
use crate::output;

pub fn run(cmd: TaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        TaskCommands::Add {
            title,
            dealership,
            description,
            appear,
            deadline,
            task_type,
            response,
            priority,
            tags,
            assignees,
        } => run_add(
            AddArgs {
                title: &title,
                dealership: &dealership,
                description: description.as_deref(),
                appear: appear.as_deref(),
                deadline: deadline.as_deref(),
                task_type: &task_type,
                response: &response,
                priority: &priority,
                tags: &tags,
                assignees: &assignees,
            },
            ctx,
        ),
        TaskCommands::List { dealership, status, all } => {
            run_list(dealership.as_deref(), status.as_deref(), all, ctx)
        }
        TaskCommands::Show { id } => run_show(&id, ctx),
    };
    ctx.finish(result)
}

struct AddArgs<'a> {
    title: &'a str,
    dealership: &'a str,
    description: Option<&'a str>,
    appear: Option<&'a str>,
    deadline: Option<&'a str>,
    task_type: &'a str,
    response: &'a str,
    priority: &'a str,
    tags: &'a [String],
    assignees: &'a [String],
}

fn run_add(args: AddArgs, ctx: &Context) -> Result<i32, ShiftopsError> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(ShiftopsError::validation("Task title is required"));
    }
    let task_type = parse_choice(args.task_type, TaskType::from_str, "task type", "individual, group")?;
    let response_type = parse_choice(
        args.response,
        ResponseType::from_str,
        "response type",
        "notification, completion, completion_with_proof",
    )?;
    let priority = parse_choice(args.priority, Priority::from_str, "priority", "low, medium, high")?;

    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let appear_at = ctx.instant(&clock, args.appear)?;
    let deadline_at = args.deadline.map(|s| clock.parse_instant(s)).transpose()?;
    if deadline_at.is_some_and(|deadline| deadline < appear_at) {
        return Err(ShiftopsError::validation("Deadline is before the appearance time"));
    }

    // Resolve everything before any writes.
    let dealership = dealership_repo::resolve_dealership(&conn, args.dealership)?;
    let mut assignees = Vec::with_capacity(args.assignees.len());
    for reference in args.assignees {
        let user = dealership_repo::resolve_user(&conn, reference)?;
        if user.dealership_id != dealership.id || !user.is_active {
            return Err(ShiftopsError::validation(format!(
                "User {} is not an active member of {}",
                user.id, dealership.name
            )));
        }
        assignees.push(user.id);
    }

    let task_id = ulid::Ulid::new().to_string();
    let task = connection::immediate(&conn, || {
        let task = task_repo::create_task(
            &conn,
            &task_id,
            &NewTask {
                dealership_id: &dealership.id,
                generator_id: None,
                generation_period: None,
                title,
                description: args.description,
                task_type,
                response_type,
                priority,
                tags: args.tags,
                appear_at,
                deadline_at,
            },
        )?;
        for user_id in &assignees {
            assignment_repo::create_assignment(&conn, &task.id, user_id)?;
        }
        Ok(task)
    })?;

    let now = ctx.now(&clock)?;
    let resolution = status::load_resolution(&conn, &task, now)?;
    if ctx.json {
        output::json::print_success(json!({
            "task": output::json::task_summary(&task, &resolution)
        }));
    } else {
        println!("Added task: {} ({})", task.title, task.id);
    }
    Ok(0)
}

fn run_list(
    dealership_ref: Option<&str>,
    status_filter: Option<&str>,
    include_archived: bool,
    ctx: &Context,
) -> Result<i32, ShiftopsError> {
    let wanted = status_filter
        .map(|s| {
            parse_choice(
                s,
                TaskStatus::from_str,
                "status",
                "pending, acknowledged, pending_review, completed, completed_late, overdue",
            )
        })
        .transpose()?;

    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;
    let dealership_id = match dealership_ref {
        Some(reference) => Some(dealership_repo::resolve_dealership(&conn, reference)?.id),
        None => None,
    };

    let mut resolved = Vec::new();
    for task in task_repo::list_tasks(&conn, dealership_id.as_deref(), include_archived)? {
        let resolution = status::load_resolution(&conn, &task, now)?;
        if wanted.is_some_and(|w| w != resolution.status) {
            continue;
        }
        resolved.push((task, resolution));
    }

    if ctx.json {
        output::json::print_success(json!({
            "tasks": resolved
                .iter()
                .map(|(t, r)| output::json::task_summary(t, r))
                .collect::<Vec<_>>()
        }));
    } else {
        output::text::print_task_list(&resolved, &clock);
    }
    Ok(0)
}

fn run_show(reference: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;
    let task = task_repo::resolve_task(&conn, reference)?;
    let assignments = assignment_repo::list_assignments(&conn, &task.id)?;
    let responses = assignment_repo::list_responses(&conn, &task.id)?;
    let resolution = status::resolve_task(&task, &assignments, &responses, now);

    if ctx.json {
        output::json::print_success(json!({
            "task": output::json::task_detail(&task, &resolution, &assignments, &responses)
        }));
    } else {
        output::text::print_task(&task, &resolution, &responses, &clock);
    }
    Ok(0)
}
