pub mod connection;
pub mod migrations;
pub mod columns;
pub mod task_repo;
pub mod dealership_repo;
pub mod generator_repo;
pub mod assignment_repo;
pub mod shift_repo;
pub mod setting_repo;

pub use connection::*;
