use crate::cli::{Context, SweepCommands};
use crate::engine::sweep;
use crate::error::ShiftopsError;
use crate::output;

pub fn run(cmd: SweepCommands, ctx: &Context) -> i32 {
    ctx.finish(run_inner(cmd, ctx))
}

fn run_inner(cmd: SweepCommands, ctx: &Context) -> Result<i32, ShiftopsError> {
    let conn = ctx.open()?;
    let clock = ctx.clock()?;
    let now = ctx.now(&clock)?;

    match cmd {
        SweepCommands::Generate => {
            let report = sweep::run_generation(&conn, &clock, now)?;
            if ctx.json {
                output::json::print_success(serde_json::to_value(&report)?);
            } else {
                output::text::print_generation_report(&report);
            }
        }
        SweepCommands::Archive => {
            let report = sweep::run_archival(&conn, &clock, now)?;
            if ctx.json {
                output::json::print_success(serde_json::to_value(&report)?);
            } else {
                output::text::print_archive_report(&report);
            }
        }
        SweepCommands::Shifts => {
            let report = sweep::run_shift_archival(&conn, now)?;
            if ctx.json {
                output::json::print_success(serde_json::to_value(&report)?);
            } else {
                output::text::print_shift_report(&report);
            }
        }
        SweepCommands::All => {
            let report = sweep::run_all(&conn, &clock, now)?;
            if ctx.json {
                output::json::print_success(serde_json::to_value(&report)?);
            } else {
                output::text::print_generation_report(&report.generation);
                output::text::print_archive_report(&report.archival);
                output::text::print_shift_report(&report.shifts);
            }
        }
    }
    Ok(0)
}
