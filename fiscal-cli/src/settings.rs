//! TOML settings and their merge with command-line flags.
//!
//! Precedence: command line, then the settings file, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use fiscal_core::Jurisdiction;
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_JURISDICTION: Jurisdiction = Jurisdiction::France;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of a settings file. Every key is optional.
///
/// ```toml
/// default_jurisdiction = "IT"
/// base_year = 2025
/// log_level = "debug"
/// log_file = "fiscal-calc.log"
/// output = "json"
/// tables = "overrides/brackets.csv"
/// parameters = "overrides/parameters.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub default_jurisdiction: Option<String>,
    pub base_year: Option<i32>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub output: OutputFormat,
    pub tables: Option<PathBuf>,
    pub parameters: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Everything a command needs, after merging flags over settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub jurisdiction: Jurisdiction,
    pub base_year: Option<i32>,
    pub output: OutputFormat,
    pub tables: Option<PathBuf>,
    pub parameters: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub console_logging: bool,
}

impl RunConfig {
    pub fn resolve(
        cli: &Cli,
        settings: Settings,
    ) -> Result<Self> {
        let code = cli
            .jurisdiction
            .as_deref()
            .or(settings.default_jurisdiction.as_deref());
        let jurisdiction = match code {
            Some(code) => Jurisdiction::parse(code)
                .ok_or_else(|| anyhow!("unknown jurisdiction '{code}' (expected FR, IT, ES, UK or DE)"))?,
            None => DEFAULT_JURISDICTION,
        };

        Ok(Self {
            jurisdiction,
            base_year: cli.base_year.or(settings.base_year),
            output: if cli.json {
                OutputFormat::Json
            } else {
                settings.output
            },
            tables: cli.tables.clone().or(settings.tables),
            parameters: cli.parameters.clone().or(settings.parameters),
            log_level: settings.log_level,
            log_file: settings.log_file,
            console_logging: !cli.quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("fiscal-calc").chain(args.iter().copied()))
    }

    // ── parsing ──────────────────────────────────────────────────────────
    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn parses_every_key() {
        let settings = Settings::from_toml(
            r#"
            default_jurisdiction = "ES"
            base_year = 2030
            log_level = "warn"
            log_file = "calc.log"
            output = "json"
            tables = "brackets.csv"
            parameters = "parameters.csv"
            "#,
        )
        .unwrap();

        assert_eq!(settings.default_jurisdiction.as_deref(), Some("ES"));
        assert_eq!(settings.base_year, Some(2030));
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.tables, Some(PathBuf::from("brackets.csv")));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(Settings::from_toml("colour = \"blue\"").is_err());
    }

    // ── precedence ───────────────────────────────────────────────────────
    #[test]
    fn flags_win_over_settings() {
        let settings = Settings {
            default_jurisdiction: Some("ES".to_string()),
            base_year: Some(2030),
            ..Settings::default()
        };

        let config = RunConfig::resolve(
            &cli(&["-j", "uk", "--base-year", "2026", "--json", "payroll", "1"]),
            settings,
        )
        .unwrap();

        assert_eq!(config.jurisdiction, Jurisdiction::UnitedKingdom);
        assert_eq!(config.base_year, Some(2026));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn settings_win_over_defaults() {
        let settings = Settings {
            default_jurisdiction: Some("it".to_string()),
            output: OutputFormat::Json,
            ..Settings::default()
        };

        let config = RunConfig::resolve(&cli(&["payroll", "1"]), settings).unwrap();

        assert_eq!(config.jurisdiction, Jurisdiction::Italy);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.console_logging);
    }

    #[test]
    fn defaults_without_settings() {
        let config = RunConfig::resolve(&cli(&["payroll", "1"]), Settings::default()).unwrap();

        assert_eq!(config.jurisdiction, DEFAULT_JURISDICTION);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.base_year, None);
    }

    #[test]
    fn unknown_jurisdiction_is_an_error() {
        let result = RunConfig::resolve(&cli(&["-j", "US", "payroll", "1"]), Settings::default());

        assert!(result.is_err());
    }
}
