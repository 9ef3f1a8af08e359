pub mod json;
pub mod text;

use crate::error::ShiftopsError;

/// Print `err` in the requested format and return the error exit code.
pub fn report_error(err: &ShiftopsError, json_output: bool) -> i32 {
    if json_output {
        json::print(&json::error(err));
    } else {
        eprintln!("Error: {}", err.message);
    }
    1
}
