pub mod registry;

pub use registry::{ScheduleError, ScheduleRegistry};
