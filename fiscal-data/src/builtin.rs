use fiscal_core::ScheduleRegistry;

use crate::loader::{ScheduleLoader, ScheduleLoaderError};

/// Bracket tables shipped with the crate.
pub const BUILTIN_BRACKETS: &str = include_str!("../data/brackets.csv");

/// Schedule parameters shipped with the crate.
pub const BUILTIN_PARAMETERS: &str = include_str!("../data/parameters.csv");

/// A registry holding every built-in schedule.
///
/// # Errors
///
/// Only fails if the embedded files are malformed, which the tests rule out.
pub fn builtin_registry() -> Result<ScheduleRegistry, ScheduleLoaderError> {
    let brackets = ScheduleLoader::parse_brackets(BUILTIN_BRACKETS.as_bytes())?;
    let parameters = ScheduleLoader::parse_parameters(BUILTIN_PARAMETERS.as_bytes())?;

    let mut registry = ScheduleRegistry::new();
    ScheduleLoader::load(&mut registry, &brackets, &parameters)?;
    Ok(registry)
}
