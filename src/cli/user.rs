use serde_json::json;

use crate::cli::{Context, UserCommands};
use crate::db::dealership_repo;
use crate::error::ShiftopsError;
use crate::output;

pub fn run(cmd: UserCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        UserCommands::Add { name, dealership } => run_add(&name, &dealership, ctx),
        UserCommands::List { dealership } => run_list(dealership.as_deref(), ctx),
        UserCommands::Deactivate { reference } => run_deactivate(&reference, ctx),
    };
    ctx.finish(result)
}

fn run_add(name: &str, dealership_ref: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShiftopsError::validation("User name is required"));
    }
    let conn = ctx.open()?;
    let dealership = dealership_repo::resolve_dealership(&conn, dealership_ref)?;
    let id = ulid::Ulid::new().to_string();
    let user = dealership_repo::create_user(&conn, &id, &dealership.id, name)?;

    if ctx.json {
        output::json::print_success(json!({ "user": user }));
    } else {
        println!("Added user: {} ({}) to {}", user.name, user.id, dealership.name);
    }
    Ok(0)
}

fn run_list(dealership_ref: Option<&str>, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let dealership_id = match dealership_ref {
        Some(reference) => Some(dealership_repo::resolve_dealership(&conn, reference)?.id),
        None => None,
    };
    let users = dealership_repo::list_users(&conn, dealership_id.as_deref())?;
    if ctx.json {
        output::json::print_success(json!({ "users": users }));
    } else {
        output::text::print_user_list(&users);
    }
    Ok(0)
}

fn run_deactivate(reference: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let user = dealership_repo::resolve_user(&conn, reference)?;
    dealership_repo::set_user_active(&conn, &user.id, false)?;

    if ctx.json {
        output::json::print_success(json!({
            "user": { "id": user.id, "name": user.name, "is_active": false }
        }));
    } else {
        println!("Deactivated user: {} ({})", user.name, user.id);
    }
    Ok(0)
}
