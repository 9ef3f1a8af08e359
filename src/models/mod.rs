pub mod task;
pub mod generator;
pub mod assignment;
pub mod shift;
pub mod dealership;
pub mod setting;

pub use task::*;
pub use generator::*;
pub use assignment::*;
pub use shift::*;
pub use dealership::*;
pub use setting::*;
