use serde_json::json;

use crate::cli::{Context, ShiftCommands};
use crate::db::{dealership_repo, shift_repo};
use crate::error::ShiftopsError;
use crate::output;

pub fn run(cmd: ShiftCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        ShiftCommands::Open { user, at } => run_open(&user, at.as_deref(), ctx),
        ShiftCommands::Close { id, at } => run_close(&id, at.as_deref(), ctx),
        ShiftCommands::List { dealership } => run_list(dealership.as_deref(), ctx),
    };
    ctx.finish(result)
}

fn run_open(user_ref: &str, at: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let start = ctx.instant(&clock, at)?;
    let user = dealership_repo::resolve_user(&conn, user_ref)?;
    if !user.is_active {
        return Err(ShiftopsError::validation(format!("User {} is inactive", user.id)));
    }
    let id = ulid::Ulid::new().to_string();
    let shift = shift_repo::open_shift(&conn, &id, &user.dealership_id, &user.id, start)?;

    if ctx.json {
        output::json::print_success(json!({ "shift": output::json::shift_json(&shift) }));
    } else {
        println!("Opened shift {} for {} at {}", shift.id, user.name, clock.display(shift.shift_start));
    }
    Ok(0)
}

fn run_close(reference: &str, at: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let end = ctx.instant(&clock, at)?;
    let shift = shift_repo::resolve_shift(&conn, reference)?;
    if shift.is_closed() {
        return Err(ShiftopsError::shift_already_closed(&shift.id));
    }
    if end < shift.shift_start {
        return Err(ShiftopsError::validation("Shift cannot end before it starts"));
    }
    let shift = shift_repo::close_shift(&conn, &shift.id, end)?;
    tracing::info!(shift = %shift.id, "shift closed");

    if ctx.json {
        output::json::print_success(json!({ "shift": output::json::shift_json(&shift) }));
    } else {
        println!("Closed shift {} at {}", shift.id, clock.display(end));
    }
    Ok(0)
}

fn run_list(dealership_ref: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let dealership_id = match dealership_ref {
        Some(reference) => Some(dealership_repo::resolve_dealership(&conn, reference)?.id),
        None => None,
    };
    let shifts = shift_repo::list_shifts(&conn, dealership_id.as_deref())?;

    if ctx.json {
        output::json::print_success(json!({
            "shifts": shifts.iter().map(output::json::shift_json).collect::<Vec<_>>()
        }));
    } else {
        output::text::print_shift_list(&shifts, &clock);
    }
    Ok(0)
}
