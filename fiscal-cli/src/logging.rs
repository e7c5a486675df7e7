//! Subscriber setup for one run of `fiscal-calc`.
//!
//! Results go to stdout, so log lines only ever go to stderr and, when a
//! settings file names one, to an append-only log file. The filter is chosen
//! once: `RUST_LOG`, then the settings file, then `info`.

use std::{
    fs::File,
    io::{self, IsTerminal},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::settings::RunConfig;

const DEFAULT_DIRECTIVE: &str = "info";

/// `<local time> <LEVEL> <target>: <fields>`, coloured only on a terminal.
struct LocalTime;

fn level_colour(level: Level) -> &'static str {
    match level {
        Level::ERROR => "1;31",
        Level::WARN => "1;33",
        Level::INFO => "1;32",
        Level::DEBUG => "1;34",
        Level::TRACE => "1;35",
    }
}

impl<S, N> FormatEvent<S, N> for LocalTime
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            write!(
                writer,
                "\x1b[2m{stamp}\x1b[0m \x1b[{}m{:<5}\x1b[0m \x1b[36m{}\x1b[0m: ",
                level_colour(*meta.level()),
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{stamp} {:<5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Picks the filter directive: the environment, then the settings file,
/// then [`DEFAULT_DIRECTIVE`]. Blank values count as unset.
fn directive<'a>(
    env: Option<&'a str>,
    configured: Option<&'a str>,
) -> &'a str {
    env.into_iter()
        .chain(configured)
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
}

fn build_filter(
    env: Option<&str>,
    configured: Option<&str>,
) -> Result<EnvFilter> {
    let directive = directive(env, configured);
    EnvFilter::try_new(directive).with_context(|| format!("invalid log filter '{directive}'"))
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// Installs the global subscriber for this run.
///
/// # Errors
///
/// Fails when the chosen filter does not parse, the log file cannot be
/// opened, or a subscriber is already installed.
pub fn init(config: &RunConfig) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), config.log_level.as_deref())?;

    let console = config.console_logging.then(|| {
        fmt::layer()
            .event_format(LocalTime)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
    });

    let file = match &config.log_file {
        Some(path) => Some(
            fmt::layer()
                .event_format(LocalTime)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("a log subscriber is already installed")
}
