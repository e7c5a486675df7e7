use std::path::PathBuf;

use clap::{Parser, Subcommand};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tax and public-finance calculators for France, Italy, Spain, the United
/// Kingdom and Germany.
///
/// Amounts are accepted as free text: currency symbols, spaces and thousands
/// separators are ignored, and anything that is not a number counts as 0.
/// Rates are given in percent.
#[derive(Debug, Parser)]
#[command(name = "fiscal-calc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Jurisdiction code (FR, IT, ES, UK, DE).
    #[arg(short, long, global = true)]
    pub jurisdiction: Option<String>,

    /// Bracket override CSV, layered over the built-in tables.
    #[arg(long, global = true)]
    pub tables: Option<PathBuf>,

    /// Parameter override CSV, layered over the built-in parameters.
    #[arg(long, global = true)]
    pub parameters: Option<PathBuf>,

    /// Calendar year labelling year 0 of projections.
    #[arg(long, global = true)]
    pub base_year: Option<i32>,

    /// Hide log output on the console.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Personal income tax
    Income {
        /// Annual taxable income
        #[arg(value_name = "INCOME")]
        income: String,

        /// Household parts (family quotient jurisdictions only)
        #[arg(long)]
        parts: Option<String>,

        /// Regional surcharge in percent, replacing the configured one
        #[arg(long)]
        regional_rate: Option<String>,
    },

    /// Inheritance tax for a single heir
    Inheritance {
        /// Value received by the heir
        #[arg(value_name = "VALUE")]
        value: String,

        /// spouse, child, sibling, nephew, relative or other
        #[arg(short, long, default_value = "child")]
        relationship: String,

        /// Earlier gifts from the same donor
        #[arg(long, default_value = "0")]
        prior_gifts: String,

        /// The heir is disabled
        #[arg(long)]
        disabled: bool,

        /// The estate passes a main residence to the heir
        #[arg(long)]
        main_residence: bool,
    },

    /// Capital gains tax on one disposal
    CapitalGains {
        #[arg(value_name = "PURCHASE")]
        purchase: String,

        #[arg(value_name = "SALE")]
        sale: String,

        /// Acquisition and disposal costs
        #[arg(long, default_value = "0")]
        expenses: String,

        /// securities, government-bonds or real-estate
        #[arg(long, default_value = "securities")]
        asset: String,

        /// Years the asset was held
        #[arg(long, default_value = "0")]
        holding_years: String,

        /// Taxpayer pays the higher rate (banded jurisdictions)
        #[arg(long)]
        higher_rate: bool,
    },

    /// Corporate income tax
    Corporate {
        /// Taxable profit
        #[arg(value_name = "PROFIT")]
        profit: String,

        /// Annual turnover, used for SME eligibility
        #[arg(long, default_value = "0")]
        turnover: String,

        /// Company is in its first years of trading
        #[arg(long)]
        new_company: bool,

        /// Municipal trade tax multiplier in percent (e.g. 400)
        #[arg(long)]
        multiplier: Option<String>,

        /// Regional production tax in percent, replacing the configured one
        #[arg(long)]
        regional_rate: Option<String>,
    },

    /// Value-added tax
    Vat {
        #[arg(value_name = "AMOUNT")]
        amount: String,

        /// standard, intermediate, reduced, super-reduced or zero
        #[arg(short, long, default_value = "standard")]
        category: String,

        /// AMOUNT already includes VAT
        #[arg(long)]
        extract: bool,
    },

    /// Customs duty and import VAT
    ImportDuty {
        /// Cost of the goods
        #[arg(value_name = "COST")]
        cost: String,

        #[arg(long, default_value = "0")]
        insurance: String,

        #[arg(long, default_value = "0")]
        freight: String,

        /// Tariff rate in percent
        #[arg(long, default_value = "0")]
        duty_rate: String,

        /// VAT category of the goods
        #[arg(short, long, default_value = "standard")]
        category: String,
    },

    /// Municipal property tax
    Municipal {
        /// Cadastral value
        #[arg(value_name = "VALUE")]
        value: String,

        /// Municipal rate in percent, replacing the default
        #[arg(long)]
        rate: Option<String>,

        /// The property is the owner's main residence
        #[arg(long)]
        main_residence: bool,
    },

    /// Employee and employer social contributions
    Payroll {
        /// Gross annual salary
        #[arg(value_name = "SALARY")]
        salary: String,
    },

    /// Project a single value (GDP, revenue, ...) over several years
    Project {
        #[arg(value_name = "START")]
        start: String,

        /// Annual growth in percent
        #[arg(long, default_value = "0", conflicts_with_all = ["rates", "delta"])]
        rate: String,

        /// Comma-separated annual growth rates in percent, one per year
        #[arg(long, value_delimiter = ',', conflicts_with = "delta")]
        rates: Option<Vec<String>>,

        /// Fixed amount added every year
        #[arg(long)]
        delta: Option<String>,

        #[arg(short, long, default_value_t = 5)]
        years: u32,
    },

    /// Budget deficit projection
    Deficit {
        #[arg(value_name = "REVENUE")]
        revenue: String,

        #[arg(value_name = "SPENDING")]
        spending: String,

        /// Annual revenue growth in percent
        #[arg(long, default_value = "0")]
        revenue_growth: String,

        /// Annual spending growth in percent
        #[arg(long, default_value = "0")]
        spending_growth: String,

        /// GDP, to report the deficit as a share of it
        #[arg(long)]
        gdp: Option<String>,

        /// Annual GDP growth in percent
        #[arg(long, default_value = "0")]
        gdp_growth: String,

        #[arg(short, long, default_value_t = 5)]
        years: u32,
    },

    /// Public debt and debt-to-GDP projection
    Debt {
        #[arg(value_name = "DEBT")]
        debt: String,

        #[arg(value_name = "GDP")]
        gdp: String,

        /// Annual debt growth in percent
        #[arg(long, default_value = "0")]
        debt_growth: String,

        /// Annual GDP growth in percent
        #[arg(long, default_value = "0")]
        gdp_growth: String,

        #[arg(short, long, default_value_t = 5)]
        years: u32,
    },

    /// List the configured schedules
    Tables {
        /// Only show this tax type (e.g. inheritance, vat)
        #[arg(long)]
        tax_type: Option<String>,

        /// Show every jurisdiction, not only the selected one
        #[arg(long)]
        all: bool,
    },
}
