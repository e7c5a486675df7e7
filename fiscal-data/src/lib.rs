//! Jurisdiction tables for `fiscal-core`, loaded from CSV.
//!
//! The built-in tables are embedded at compile time; override files in the
//! same format can be layered on top with [`ScheduleLoader::load`].

mod builtin;
mod loader;

pub use builtin::{BUILTIN_BRACKETS, BUILTIN_PARAMETERS, builtin_registry};
pub use loader::{BracketRecord, ParameterRecord, ScheduleLoader, ScheduleLoaderError};
