pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
pub mod settings;

pub use cli::{Cli, Command};
pub use commands::run;
pub use settings::{OutputFormat, RunConfig, Settings};
