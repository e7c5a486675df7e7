use std::fmt;

use serde::{Deserialize, Serialize};

/// Serializes as its two-letter code, the same form `parse` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Jurisdiction {
    #[serde(rename = "FR")]
    France,
    #[serde(rename = "IT")]
    Italy,
    #[serde(rename = "ES")]
    Spain,
    #[serde(rename = "UK", alias = "GB")]
    UnitedKingdom,
    #[serde(rename = "DE")]
    Germany,
}

impl Jurisdiction {
    pub fn all() -> &'static [Jurisdiction] {
        &[
            Self::France,
            Self::Italy,
            Self::Spain,
            Self::UnitedKingdom,
            Self::Germany,
        ]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::France => "FR",
            Self::Italy => "IT",
            Self::Spain => "ES",
            Self::UnitedKingdom => "UK",
            Self::Germany => "DE",
        }
    }

    /// Accepts the two-letter code in any case; `GB` is an alias for `UK`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FR" => Some(Self::France),
            "IT" => Some(Self::Italy),
            "ES" => Some(Self::Spain),
            "UK" | "GB" => Some(Self::UnitedKingdom),
            "DE" => Some(Self::Germany),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::France => "France",
            Self::Italy => "Italy",
            Self::Spain => "Spain",
            Self::UnitedKingdom => "United Kingdom",
            Self::Germany => "Germany",
        }
    }

    /// ISO 4217 currency code amounts are expressed in.
    pub fn currency(&self) -> &'static str {
        match self {
            Self::UnitedKingdom => "GBP",
            _ => "EUR",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    Income,
    Inheritance,
    CapitalGains,
    Corporate,
    Vat,
    ImportDuty,
    Municipal,
    Payroll,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Inheritance => "inheritance",
            Self::CapitalGains => "capital_gains",
            Self::Corporate => "corporate",
            Self::Vat => "vat",
            Self::ImportDuty => "import_duty",
            Self::Municipal => "municipal",
            Self::Payroll => "payroll",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "income" => Some(Self::Income),
            "inheritance" => Some(Self::Inheritance),
            "capital_gains" => Some(Self::CapitalGains),
            "corporate" => Some(Self::Corporate),
            "vat" => Some(Self::Vat),
            "import_duty" => Some(Self::ImportDuty),
            "municipal" => Some(Self::Municipal),
            "payroll" => Some(Self::Payroll),
            _ => None,
        }
    }
}

impl fmt::Display for TaxType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
