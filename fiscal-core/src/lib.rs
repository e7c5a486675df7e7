pub mod calculations;
pub mod config;
pub mod models;

pub use calculations::brackets::evaluate;
pub use calculations::projection::Projector;
pub use config::{ScheduleError, ScheduleRegistry};
pub use models::*;
