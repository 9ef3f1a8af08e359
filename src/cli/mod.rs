pub mod commands;
pub mod init;
pub mod dealership;
pub mod user;
pub mod generator;
pub mod task;
pub mod respond;
pub mod shift;
pub mod setting;
pub mod sweep;

pub use commands::*;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::config;
use crate::db::connection;
use crate::engine::time::BusinessClock;
use crate::error::ShiftopsError;
use crate::output;

/// Global options shared by every command.
pub struct Context {
    pub db: PathBuf,
    pub json: bool,
    pub now: Option<String>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            db: cli.db.clone(),
            json: cli.json,
            now: cli.now.clone(),
        }
    }

    pub fn open(&self) -> Result<Connection, ShiftopsError> {
        connection::open_db(&self.db)
    }

    pub fn clock(&self) -> Result<BusinessClock, ShiftopsError> {
        config::load(&self.db)?.clock()
    }

    /// `--now` if given, otherwise the system clock.
    pub fn now(&self, clock: &BusinessClock) -> Result<DateTime<Utc>, ShiftopsError> {
        self.instant(clock, None)
    }

    /// An explicit instant argument, falling back to [`Context::now`].
    pub fn instant(&self, clock: &BusinessClock, value: Option<&str>) -> Result<DateTime<Utc>, ShiftopsError> {
        match value.or(self.now.as_deref()) {
            Some(s) => clock.parse_instant(s),
            None => Ok(Utc::now()),
        }
    }

    /// Map a command result to an exit code, printing the error if any.
    pub fn finish(&self, result: Result<i32, ShiftopsError>) -> i32 {
        match result {
            Ok(code) => code,
            Err(e) => output::report_error(&e, self.json),
        }
    }
}

/// Parse one of the fixed string choices of a model enum.
pub(crate) fn parse_choice<T>(
    value: &str,
    parse: fn(&str) -> Option<T>,
    field: &str,
    allowed: &str,
) -> Result<T, ShiftopsError> {
    parse(value).ok_or_else(|| {
        ShiftopsError::validation(format!("Invalid {field} '{value}'. Expected one of: {allowed}"))
    })
}
