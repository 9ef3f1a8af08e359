pub mod time;
pub mod recurrence;
pub mod factory;
pub mod status;
pub mod archival;
pub mod sweep;
