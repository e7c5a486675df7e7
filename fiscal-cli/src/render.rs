//! Text and JSON rendering of calculator results.

use std::fmt;

use anyhow::{Context, Result};
use fiscal_core::calculations::common::round_half_up;
use fiscal_core::TaxResult;
use rust_decimal::Decimal;
use serde::Serialize;

/// Pretty-printed JSON for any result type.
pub fn json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result")
}

/// `1234567.891` → `1,234,567.89`.
pub fn amount(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

pub fn money(
    value: Decimal,
    currency: &str,
) -> String {
    format!("{} {currency}", amount(value))
}

/// A percentage already scaled to 0..100.
pub fn pct(value: Decimal) -> String {
    format!("{:.2} %", round_half_up(value))
}

/// A fractional rate such as `0.055`, shown as `5.50 %`.
pub fn rate(value: Decimal) -> String {
    pct(value * Decimal::ONE_HUNDRED)
}

/// A simple column-aligned table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        row: Vec<String>,
    ) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

impl fmt::Display for Table {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let widths = self.widths();
        let line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{cell:>width$}", width = widths[i]))
                .collect();
            writeln!(f, "  {}", padded.join("  ").trim_end())
        };

        line(f, &self.headers)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        line(f, &rule)?;
        for row in &self.rows {
            line(f, row)?;
        }
        Ok(())
    }
}

/// Slice-by-slice breakdown of a bracket evaluation.
pub fn breakdown(
    result: &TaxResult,
    currency: &str,
) -> Table {
    let mut table = Table::new(["From", "To", "Rate", "Taxed", "Tax"]);
    for slice in &result.breakdown {
        table.push(vec![
            amount(slice.bracket.lower_bound),
            slice
                .bracket
                .upper_bound
                .map(amount)
                .unwrap_or_else(|| "∞".to_string()),
            rate(slice.bracket.rate),
            money(slice.taxed_amount, currency),
            money(slice.tax, currency),
        ]);
    }
    table
}

/// A titled list of labelled values, optionally followed by a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    title: String,
    rows: Vec<(String, String)>,
    table: Option<Table>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn row(
        mut self,
        label: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        self.rows.push((label.into(), value.to_string()));
        self
    }

    /// Adds `table` unless it has no rows.
    pub fn table(
        mut self,
        table: Table,
    ) -> Self {
        if !table.is_empty() {
            self.table = Some(table);
        }
        self
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;

        let width = self
            .rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        for (label, value) in &self.rows {
            writeln!(f, "{label:<width$}  {value}")?;
        }

        if let Some(table) = &self.table {
            writeln!(f)?;
            write!(f, "{table}")?;
        }
        Ok(())
    }
}
