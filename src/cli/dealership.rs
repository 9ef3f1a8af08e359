use serde_json::json;

use crate::cli::{Context, DealershipCommands};
use crate::db::dealership_repo;
use crate::error::ShiftopsError;
use crate::output;

pub fn run(cmd: DealershipCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        DealershipCommands::Add { name } => run_add(&name, ctx),
        DealershipCommands::List => run_list(ctx),
        DealershipCommands::Deactivate { reference } => run_deactivate(&reference, ctx),
    };
    ctx.finish(result)
}

fn run_add(name: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShiftopsError::validation("Dealership name is required"));
    }
    let conn = ctx.open()?;
    let id = ulid::Ulid::new().to_string();
    let dealership = dealership_repo::create_dealership(&conn, &id, name)?;

    if ctx.json {
        output::json::print_success(json!({ "dealership": dealership }));
    } else {
        println!("Added dealership: {} ({})", dealership.name, dealership.id);
    }
    Ok(0)
}

fn run_list(ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let dealerships = dealership_repo::list_dealerships(&conn)?;
    if ctx.json {
        output::json::print_success(json!({ "dealerships": dealerships }));
    } else {
        output::text::print_dealership_list(&dealerships);
    }
    Ok(0)
}

fn run_deactivate(reference: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let dealership = dealership_repo::resolve_dealership(&conn, reference)?;
    dealership_repo::set_dealership_active(&conn, &dealership.id, false)?;
    tracing::info!(dealership = %dealership.id, "dealership deactivated");

    if ctx.json {
        output::json::print_success(json!({
            "dealership": { "id": dealership.id, "name": dealership.name, "is_active": false }
        }));
    } else {
        println!("Deactivated dealership: {} ({})", dealership.name, dealership.id);
    }
    Ok(0)
}
