use std::io::{self, Read};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::cli::{parse_choice, Context, GeneratorArgs, GeneratorCommands};
use crate::db::generator_repo::{self, NewGenerator};
use crate::db::{connection, dealership_repo, task_repo};
use crate::engine::recurrence;
use crate::engine::status;
use crate::engine::time::{self, BusinessClock};
use crate::error::ShiftopsError;
use crate::models::{Generator, Priority, Recurrence, ResponseType, TaskType};
use crate::output;

pub fn run(cmd: GeneratorCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        GeneratorCommands::Add(args) => run_add(args, ctx),
        GeneratorCommands::Load => run_load(ctx),
        GeneratorCommands::List { dealership } => run_list(dealership.as_deref(), ctx),
        GeneratorCommands::Show { reference } => run_show(&reference, ctx),
        GeneratorCommands::Pause { reference } => run_set_active(&reference, false, ctx),
        GeneratorCommands::Resume { reference } => run_set_active(&reference, true, ctx),
    };
    ctx.finish(result)
}

/// One generator definition as typed by a person, before resolution.
#[derive(Debug, Deserialize)]
struct GeneratorInput {
    dealership: String,
    title: String,
    description: Option<String>,
    #[serde(default = "default_recurrence")]
    recurrence: String,
    appear_time: String,
    deadline_time: Option<String>,
    #[serde(default)]
    days_of_week: Vec<u32>,
    #[serde(default)]
    days_of_month: Vec<i32>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(default = "default_task_type")]
    task_type: String,
    #[serde(default = "default_response_type")]
    response_type: String,
    #[serde(default = "default_priority")]
    priority: String,
    #[serde(default)]
    tags: Vec<String>,
    assignees: Vec<String>,
}

fn default_recurrence() -> String {
    "daily".into()
}

fn default_task_type() -> String {
    "individual".into()
}

fn default_response_type() -> String {
    "completion".into()
}

fn default_priority() -> String {
    "medium".into()
}

#[derive(Deserialize)]
struct LoadInput {
    generators: Vec<GeneratorInput>,
}

impl From<GeneratorArgs> for GeneratorInput {
    fn from(args: GeneratorArgs) -> Self {
        Self {
            dealership: args.dealership,
            title: args.title,
            description: args.description,
            recurrence: args.recurrence,
            appear_time: args.appear,
            deadline_time: args.deadline,
            days_of_week: args.weekdays,
            days_of_month: args.month_days,
            start_date: args.start,
            end_date: args.end,
            task_type: args.task_type,
            response_type: args.response,
            priority: args.priority,
            tags: args.tags,
            assignees: args.assignees,
        }
    }
}

/// Resolve references and parse every field. Fails on the first bad value.
fn to_new_generator(
    conn: &Connection,
    clock: &BusinessClock,
    now: DateTime<Utc>,
    input: GeneratorInput,
) -> Result<NewGenerator, ShiftopsError> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(ShiftopsError::validation("Generator title is required"));
    }
    let dealership = dealership_repo::resolve_dealership(conn, &input.dealership)?;
    if input.assignees.is_empty() {
        return Err(ShiftopsError::validation(format!(
            "Generator '{title}' needs at least one assignee"
        )));
    }
    let mut assignees = Vec::with_capacity(input.assignees.len());
    for reference in &input.assignees {
        let user = dealership_repo::resolve_user(conn, reference)?;
        if user.dealership_id != dealership.id {
            return Err(ShiftopsError::validation(format!(
                "User {} does not belong to dealership {}",
                user.id, dealership.name
            )));
        }
        assignees.push(user.id);
    }

    let start_date = match input.start_date.as_deref() {
        Some(s) => time::parse_date(s)?,
        None => clock.today(now),
    };

    Ok(NewGenerator {
        dealership_id: dealership.id,
        title,
        description: input.description,
        recurrence: parse_choice(
            &input.recurrence,
            Recurrence::from_str,
            "recurrence",
            "none, daily, weekly, monthly",
        )?,
        appear_time: time::parse_time_of_day(&input.appear_time)?,
        deadline_time: input.deadline_time.as_deref().map(time::parse_time_of_day).transpose()?,
        days_of_week: input.days_of_week,
        days_of_month: input.days_of_month,
        start_date,
        end_date: input.end_date.as_deref().map(time::parse_date).transpose()?,
        task_type: parse_choice(&input.task_type, TaskType::from_str, "task type", "individual, group")?,
        response_type: parse_choice(
            &input.response_type,
            ResponseType::from_str,
            "response type",
            "notification, completion, completion_with_proof",
        )?,
        priority: parse_choice(&input.priority, Priority::from_str, "priority", "low, medium, high")?,
        tags: input.tags,
        assignees,
    })
}

/// Insert and validate all definitions in one transaction.
fn create_all(conn: &Connection, drafts: &[NewGenerator]) -> Result<Vec<Generator>, ShiftopsError> {
    connection::immediate(conn, || {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = ulid::Ulid::new().to_string();
            let generator = generator_repo::create_generator(conn, &id, draft)?;
            recurrence::validate(&generator)?;
            created.push(generator);
        }
        Ok(created)
    })
}

fn run_add(args: GeneratorArgs, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;
    let draft = to_new_generator(&conn, &clock, now, args.into())?;
    let created = create_all(&conn, std::slice::from_ref(&draft))?;

    if ctx.json {
        let generators: Vec<_> = created.iter().map(output::json::generator_json).collect();
        output::json::print_success(json!({ "generator": generators.first() }));
    } else {
        for g in &created {
            println!("Added generator: {} ({})", g.title, g.id);
        }
    }
    Ok(0)
}

fn run_load(ctx: &Context) -> Result<i32, ShiftopsError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ShiftopsError::validation(e.to_string()))?;
    let load: LoadInput = serde_json::from_str(&input)?;
    if load.generators.is_empty() {
        return Err(ShiftopsError::validation("At least one generator is required"));
    }

    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;
    let drafts = load
        .generators
        .into_iter()
        .map(|g| to_new_generator(&conn, &clock, now, g))
        .collect::<Result<Vec<_>, _>>()?;
    let created = create_all(&conn, &drafts)?;

    if ctx.json {
        output::json::print_success(json!({
            "generators_created": created.len(),
            "generators": created.iter().map(output::json::generator_json).collect::<Vec<_>>()
        }));
    } else {
        println!("Loaded {} generator(s).", created.len());
        for g in &created {
            println!("  {} - {}", g.id, g.title);
        }
    }
    Ok(0)
}

fn run_list(dealership_ref: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let dealership_id = match dealership_ref {
        Some(reference) => Some(dealership_repo::resolve_dealership(&conn, reference)?.id),
        None => None,
    };
    let generators = generator_repo::list_generators(&conn, dealership_id.as_deref())?;

    if ctx.json {
        output::json::print_success(json!({
            "generators": generators.iter().map(output::json::generator_json).collect::<Vec<_>>()
        }));
    } else {
        output::text::print_generator_list(&generators);
    }
    Ok(0)
}

fn run_show(reference: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;
    let generator = generator_repo::resolve_generator(&conn, reference)?;
    let tasks = task_repo::tasks_for_generator(&conn, &generator.id)?;
    let mut resolved = Vec::with_capacity(tasks.len());
    for task in tasks {
        let resolution = status::load_resolution(&conn, &task, now)?;
        resolved.push((task, resolution));
    }

    if ctx.json {
        output::json::print_success(json!({
            "generator": output::json::generator_json(&generator),
            "tasks": resolved
                .iter()
                .map(|(t, r)| output::json::task_summary(t, r))
                .collect::<Vec<_>>()
        }));
    } else {
        output::text::print_generator(&generator);
        if !resolved.is_empty() {
            println!("\nTasks:");
            output::text::print_task_list(&resolved, &clock);
        }
    }
    Ok(0)
}

fn run_set_active(reference: &str, active: bool, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let generator = generator_repo::resolve_generator(&conn, reference)?;
    generator_repo::set_generator_active(&conn, &generator.id, active)?;

    if ctx.json {
        output::json::print_success(json!({
            "generator": { "id": generator.id, "title": generator.title, "is_active": active }
        }));
    } else {
        let verb = if active { "Resumed" } else { "Paused" };
        println!("{verb} generator: {} ({})", generator.title, generator.id);
    }
    Ok(0)
}
