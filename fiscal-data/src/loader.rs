use std::collections::BTreeMap;
use std::io::Read;

use fiscal_core::{
    Bracket, BracketTable, BracketTableError, Jurisdiction, ScheduleKey, ScheduleRegistry, TaxType,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading schedule data.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown jurisdiction '{0}'")]
    UnknownJurisdiction(String),

    #[error("Unknown tax type '{0}'")]
    UnknownTaxType(String),

    #[error("Invalid bracket table for {key}: {source}")]
    InvalidTable {
        key: ScheduleKey,
        #[source]
        source: BracketTableError,
    },
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a brackets CSV file.
///
/// - `jurisdiction`: country code (FR, IT, ES, UK, DE)
/// - `tax_type`: e.g. `income`, `inheritance`, `vat`
/// - `sub_key`: relationship, category or regime (empty for none)
/// - `lower_bound`: start of the bracket
/// - `upper_bound`: end of the bracket (empty for unbounded)
/// - `rate`: marginal rate as a fraction (e.g. 0.20 for 20%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub jurisdiction: String,
    pub tax_type: String,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub sub_key: Option<String>,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

/// A single row of a parameters CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParameterRecord {
    pub jurisdiction: String,
    pub tax_type: String,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub sub_key: Option<String>,
    pub name: String,
    pub value: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn schedule_key(
    jurisdiction: &str,
    tax_type: &str,
    sub_key: Option<&String>,
) -> Result<ScheduleKey, ScheduleLoaderError> {
    let jurisdiction = Jurisdiction::parse(jurisdiction)
        .ok_or_else(|| ScheduleLoaderError::UnknownJurisdiction(jurisdiction.to_string()))?;
    let tax_type = TaxType::parse(tax_type)
        .ok_or_else(|| ScheduleLoaderError::UnknownTaxType(tax_type.to_string()))?;
    Ok(ScheduleKey {
        jurisdiction,
        tax_type,
        sub_key: sub_key.cloned(),
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Loader for bracket tables and schedule parameters from CSV files.
///
/// Loading writes into a [`ScheduleRegistry`], so the same loader serves the
/// embedded tables and user override files.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// Lines starting with `#` are skipped and fields are trimmed.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, ScheduleLoaderError> {
        let mut records = Vec::new();
        for result in csv_reader(reader).deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Parse parameter records from a CSV reader.
    pub fn parse_parameters<R: Read>(
        reader: R
    ) -> Result<Vec<ParameterRecord>, ScheduleLoaderError> {
        let mut records = Vec::new();
        for result in csv_reader(reader).deserialize() {
            let record: ParameterRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Load records into `registry`.
    ///
    /// Bracket rows are grouped by (jurisdiction, tax type, sub-key), sorted
    /// by lower bound and validated as one table, which replaces any table
    /// already registered for that key. Parameters already set on the key are
    /// kept. Parameter rows then set one value each.
    ///
    /// Loading the same records twice produces the same registry. Returns the
    /// number of records applied.
    ///
    /// Nothing is written to the registry if any record fails to resolve or
    /// any table fails validation.
    pub fn load(
        registry: &mut ScheduleRegistry,
        brackets: &[BracketRecord],
        parameters: &[ParameterRecord],
    ) -> Result<usize, ScheduleLoaderError> {
        let mut groups: BTreeMap<ScheduleKey, Vec<Bracket>> = BTreeMap::new();
        for record in brackets {
            let key = schedule_key(&record.jurisdiction, &record.tax_type, record.sub_key.as_ref())?;
            groups.entry(key).or_default().push(Bracket::new(
                record.lower_bound,
                record.upper_bound,
                record.rate,
            ));
        }

        let mut tables = Vec::with_capacity(groups.len());
        for (key, mut rows) in groups {
            rows.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));
            match BracketTable::new(rows) {
                Ok(table) => tables.push((key, table)),
                Err(source) => return Err(ScheduleLoaderError::InvalidTable { key, source }),
            }
        }

        let mut values = Vec::with_capacity(parameters.len());
        for record in parameters {
            let key = schedule_key(&record.jurisdiction, &record.tax_type, record.sub_key.as_ref())?;
            values.push((key, record.name.trim().to_string(), record.value));
        }

        for (key, table) in tables {
            debug!(%key, brackets = table.brackets().len(), "loaded bracket table");
            registry.upsert_table(key, table);
        }
        for (key, name, value) in values {
            registry.set_parameter(key, name, value);
        }

        let applied = brackets.len() + parameters.len();
        info!(applied, schedules = registry.len(), "schedule data loaded");
        Ok(applied)
    }
}
