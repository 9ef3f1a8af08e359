use serde_json::json;

use crate::cli::Context;
use crate::config::{self, AppConfig};
use crate::db::connection;
use crate::error::ShiftopsError;
use crate::output;

pub fn run(timezone: &str, ctx: &Context) -> i32 {
    ctx.finish(run_inner(timezone, ctx))
}

fn run_inner(timezone: &str, ctx: &Context) -> Result<i32, ShiftopsError> {
    let config = AppConfig {
        timezone: timezone.to_string(),
    };
    // Reject an unknown timezone before anything is created.
    config.clock()?;

    connection::init_db(&ctx.db)?;
    let config_path = config::write(&ctx.db, &config)?;

    if ctx.json {
        output::json::print_success(json!({
            "path": ctx.db.to_string_lossy(),
            "config": config_path.to_string_lossy(),
            "timezone": config.timezone
        }));
    } else {
        println!("Initialized shiftops at {} ({})", ctx.db.display(), config.timezone);
    }
    Ok(0)
}
