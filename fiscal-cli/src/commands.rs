//! Subcommand dispatch: coerce arguments, run a calculator, render.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use fiscal_core::calculations::common::{coerce_amount, pct_to_rate};
use fiscal_core::calculations::tools::{
    AssetClass, CapitalGainsCalculator, CapitalGainsInput, CorporateTaxCalculator,
    CorporateTaxInput, DebtProjectionInput, DeficitProjectionInput, ImportDutyCalculator,
    ImportDutyInput, IncomeTaxCalculator, IncomeTaxInput, InheritanceInput,
    InheritanceTaxCalculator, MunicipalTaxCalculator, MunicipalTaxInput, PayrollCalculator,
    PayrollInput, Relationship, VatCalculator, VatCategory, VatInput, VatMode, project_debt,
    project_deficit,
};
use fiscal_core::{Growth, Projector, ScheduleRegistry, SeriesSpec, TaxSchedule, TaxType};
use fiscal_data::{ScheduleLoader, builtin_registry};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::Command;
use crate::render::{self, Report, Table, amount, money, pct, rate};
use crate::settings::{OutputFormat, RunConfig};

// ─── registry ────────────────────────────────────────────────────────────────

/// Built-in schedules with any override files from `config` layered on top.
pub fn load_registry(config: &RunConfig) -> Result<ScheduleRegistry> {
    let mut registry = builtin_registry().context("Built-in schedule data is invalid")?;

    let brackets = match &config.tables {
        Some(path) => {
            let records = ScheduleLoader::parse_brackets(open(path)?)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            info!(path = %path.display(), records = records.len(), "bracket overrides parsed");
            records
        }
        None => Vec::new(),
    };
    let parameters = match &config.parameters {
        Some(path) => {
            let records = ScheduleLoader::parse_parameters(open(path)?)
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            info!(path = %path.display(), records = records.len(), "parameter overrides parsed");
            records
        }
        None => Vec::new(),
    };

    if !brackets.is_empty() || !parameters.is_empty() {
        ScheduleLoader::load(&mut registry, &brackets, &parameters)
            .context("Failed to apply override files")?;
    }
    Ok(registry)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

// ─── dispatch ────────────────────────────────────────────────────────────────

/// Runs one subcommand and returns its rendered output.
pub fn run(
    command: &Command,
    config: &RunConfig,
    registry: &ScheduleRegistry,
) -> Result<String> {
    let jurisdiction = config.jurisdiction;
    let currency = jurisdiction.currency();
    debug!(?command, %jurisdiction, "running command");

    match command {
        Command::Income {
            income,
            parts,
            regional_rate,
        } => {
            let input = IncomeTaxInput {
                household_parts: parts.as_deref().map(coerce_amount),
                regional_surcharge_rate: optional_rate(regional_rate.as_deref()),
                ..IncomeTaxInput::new(jurisdiction, coerce_amount(income))
            };
            let result = IncomeTaxCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Income tax ({})", jurisdiction.name()))
                    .row("Gross income", money(r.gross_income, currency))
                    .row("Taxable income", money(r.taxable_income, currency))
                    .row("Household parts", r.household_parts)
                    .row("Bracket tax", money(r.brackets.total_tax, currency))
                    .row("Regional surcharge", money(r.regional_surcharge, currency))
                    .row("Surcharge", money(r.surcharge, currency))
                    .row("Total tax", money(r.total_tax, currency))
                    .row("Net income", money(r.net_income, currency))
                    .row("Effective rate", pct(r.effective_rate_pct))
                    .row("Marginal rate", rate(r.marginal_rate))
                    .table(render::breakdown(&r.brackets, currency))
            })
        }

        Command::Inheritance {
            value,
            relationship,
            prior_gifts,
            disabled,
            main_residence,
        } => {
            let relationship = Relationship::parse(relationship)
                .ok_or_else(|| anyhow!("unknown relationship '{relationship}'"))?;
            let input = InheritanceInput {
                prior_gifts: coerce_amount(prior_gifts),
                heir_disabled: *disabled,
                includes_main_residence: *main_residence,
                ..InheritanceInput::new(jurisdiction, relationship, coerce_amount(value))
            };
            let result = InheritanceTaxCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Inheritance tax ({})", jurisdiction.name()))
                    .row("Relationship", r.relationship)
                    .row("Inheritance", money(r.inheritance_value, currency))
                    .row("Allowance applied", money(r.allowance_applied, currency))
                    .row("Taxable amount", money(r.taxable_amount, currency))
                    .row("Surcharge", money(r.surcharge, currency))
                    .row("Total tax", money(r.total_tax, currency))
                    .row("Net inheritance", money(r.net_inheritance, currency))
                    .row("Effective rate", pct(r.effective_rate_pct))
                    .table(render::breakdown(&r.brackets, currency))
            })
        }

        Command::CapitalGains {
            purchase,
            sale,
            expenses,
            asset,
            holding_years,
            higher_rate,
        } => {
            let asset_class =
                AssetClass::parse(asset).ok_or_else(|| anyhow!("unknown asset class '{asset}'"))?;
            let input = CapitalGainsInput {
                asset_class,
                holding_years: coerce_amount(holding_years),
                higher_rate_taxpayer: *higher_rate,
                ..CapitalGainsInput::new(
                    jurisdiction,
                    coerce_amount(purchase),
                    coerce_amount(sale),
                    coerce_amount(expenses),
                )
            };
            let result = CapitalGainsCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Capital gains tax ({})", jurisdiction.name()))
                    .row("Regime", &r.regime)
                    .row("Capital gain", money(r.capital_gain, currency))
                    .row("Allowance applied", money(r.allowance_applied, currency))
                    .row("Taxable gain", money(r.taxable_gain, currency))
                    .row("Surcharge", money(r.surcharge, currency))
                    .row("Total tax", money(r.total_tax, currency))
                    .row("Net gain", money(r.net_gain, currency))
                    .row("Effective rate", pct(r.effective_rate_pct))
                    .table(render::breakdown(&r.brackets, currency))
            })
        }

        Command::Corporate {
            profit,
            turnover,
            new_company,
            multiplier,
            regional_rate,
        } => {
            let input = CorporateTaxInput {
                turnover: coerce_amount(turnover),
                newly_formed: *new_company,
                municipal_multiplier: optional_rate(multiplier.as_deref()),
                regional_tax_rate: optional_rate(regional_rate.as_deref()),
                ..CorporateTaxInput::new(jurisdiction, coerce_amount(profit))
            };
            let result = CorporateTaxCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Corporate tax ({})", jurisdiction.name()))
                    .row("Regime", &r.regime)
                    .row("Taxable profit", money(r.taxable_profit, currency))
                    .row("Bracket tax", money(r.brackets.total_tax, currency))
                    .row("Marginal relief", money(r.marginal_relief, currency))
                    .row("Surcharge", money(r.surcharge, currency))
                    .row("Regional tax", money(r.regional_tax, currency))
                    .row("Trade tax", money(r.trade_tax, currency))
                    .row("Total tax", money(r.total_tax, currency))
                    .row("Profit after tax", money(r.profit_after_tax, currency))
                    .row("Effective rate", pct(r.effective_rate_pct))
                    .table(render::breakdown(&r.brackets, currency))
            })
        }

        Command::Vat {
            amount: value,
            category,
            extract,
        } => {
            let input = VatInput {
                mode: if *extract {
                    VatMode::ExtractFromGross
                } else {
                    VatMode::AddToNet
                },
                ..VatInput::new(jurisdiction, coerce_amount(value), vat_category(category)?)
            };
            let result = VatCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("VAT ({})", jurisdiction.name()))
                    .row("Category", r.category)
                    .row("Rate", rate(r.rate))
                    .row("Net amount", money(r.net_amount, currency))
                    .row("VAT", money(r.vat_amount, currency))
                    .row("Gross amount", money(r.gross_amount, currency))
            })
        }

        Command::ImportDuty {
            cost,
            insurance,
            freight,
            duty_rate,
            category,
        } => {
            let input = ImportDutyInput {
                insurance: coerce_amount(insurance),
                freight: coerce_amount(freight),
                vat_category: vat_category(category)?,
                ..ImportDutyInput::new(jurisdiction, coerce_amount(cost), coerce_amount(duty_rate))
            };
            let result = ImportDutyCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Import duty ({})", jurisdiction.name()))
                    .row("CIF value", money(r.cif_value, currency))
                    .row(
                        "Customs duty",
                        if r.duty_waived {
                            format!("{} (low-value exemption)", money(r.customs_duty, currency))
                        } else {
                            money(r.customs_duty, currency)
                        },
                    )
                    .row("Import VAT rate", rate(r.vat_rate))
                    .row("Import VAT", money(r.import_vat, currency))
                    .row("Total taxes", money(r.total_taxes, currency))
                    .row("Landed cost", money(r.landed_cost, currency))
            })
        }

        Command::Municipal {
            value,
            rate: rate_pct,
            main_residence,
        } => {
            let input = MunicipalTaxInput {
                rate_pct: rate_pct.as_deref().map(coerce_amount),
                main_residence: *main_residence,
                ..MunicipalTaxInput::new(jurisdiction, coerce_amount(value))
            };
            let result = MunicipalTaxCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Municipal property tax ({})", jurisdiction.name()))
                    .row("Cadastral value", money(r.cadastral_value, currency))
                    .row("Taxable base", money(r.taxable_base, currency))
                    .row("Main residence exempt", if r.main_residence_exempt { "yes" } else { "no" })
                    .row("Total tax", money(r.total_tax, currency))
                    .row("Effective rate", pct(r.effective_rate_pct))
            })
        }

        Command::Payroll { salary } => {
            let input = PayrollInput::new(jurisdiction, coerce_amount(salary));
            let result = PayrollCalculator::new(registry).calculate(&input)?;
            emit(config, &result, |r| {
                Report::new(format!("Payroll contributions ({})", jurisdiction.name()))
                    .row("Gross salary", money(r.gross_salary, currency))
                    .row("Employee contributions", money(r.employee_contributions, currency))
                    .row("Employer contributions", money(r.employer_contributions, currency))
                    .row("Net salary", money(r.net_salary, currency))
                    .row("Total employer cost", money(r.total_employer_cost, currency))
                    .row("Employee rate", pct(r.employee_rate_pct))
                    .table(render::breakdown(&r.employee, currency))
            })
        }

        Command::Project {
            start,
            rate: rate_pct,
            rates,
            delta,
            years,
        } => {
            let growth = match (rates, delta) {
                (Some(rates), _) => {
                    Growth::Schedule(rates.iter().map(String::as_str).map(coerce_amount).collect())
                }
                (None, Some(delta)) => Growth::Linear(coerce_amount(delta)),
                (None, None) => Growth::Compound(coerce_amount(rate_pct)),
            };
            let points = projector(config).project_with(coerce_amount(start), &growth, *years);
            emit(config, &points, |points| {
                let mut table = Table::new(["Year", "Value"]);
                for point in points {
                    table.push(vec![point.year_label.to_string(), amount(point.value)]);
                }
                Report::new("Projection")
                    .row("Start", amount(coerce_amount(start)))
                    .row("Years", years)
                    .table(table)
            })
        }

        Command::Deficit {
            revenue,
            spending,
            revenue_growth,
            spending_growth,
            gdp,
            gdp_growth,
            years,
        } => {
            let input = DeficitProjectionInput {
                revenue: SeriesSpec::compound(coerce_amount(revenue), coerce_amount(revenue_growth)),
                spending: SeriesSpec::compound(
                    coerce_amount(spending),
                    coerce_amount(spending_growth),
                ),
                gdp: gdp
                    .as_deref()
                    .map(|gdp| SeriesSpec::compound(coerce_amount(gdp), coerce_amount(gdp_growth))),
                years: *years,
            };
            let projection = project_deficit(&projector(config), &input);
            emit(config, &projection, |p| {
                let mut table = Table::new(["Year", "Revenue", "Spending", "Deficit", "% GDP"]);
                for year in &p.years {
                    table.push(vec![
                        year.year_label.to_string(),
                        amount(year.revenue),
                        amount(year.spending),
                        amount(year.deficit),
                        year.deficit_to_gdp_pct.map(pct).unwrap_or_else(|| "-".to_string()),
                    ]);
                }
                Report::new("Deficit projection")
                    .row("Cumulative deficit", amount(p.cumulative_deficit))
                    .table(table)
            })
        }

        Command::Debt {
            debt,
            gdp,
            debt_growth,
            gdp_growth,
            years,
        } => {
            let input = DebtProjectionInput {
                debt: SeriesSpec::compound(coerce_amount(debt), coerce_amount(debt_growth)),
                gdp: SeriesSpec::compound(coerce_amount(gdp), coerce_amount(gdp_growth)),
                years: *years,
            };
            let points = project_debt(&projector(config), &input);
            emit(config, &points, |points| {
                let mut table = Table::new(["Year", "Debt", "GDP", "Debt / GDP"]);
                for point in points {
                    table.push(vec![
                        point.year_label.to_string(),
                        amount(point.debt),
                        amount(point.gdp),
                        pct(point.debt_to_gdp_pct),
                    ]);
                }
                Report::new("Debt projection").table(table)
            })
        }

        Command::Tables { tax_type, all } => {
            let tax_type = match tax_type {
                Some(name) => Some(
                    TaxType::parse(&name.replace('-', "_"))
                        .ok_or_else(|| anyhow!("unknown tax type '{name}'"))?,
                ),
                None => None,
            };
            let schedules: Vec<&TaxSchedule> = registry
                .keys()
                .into_iter()
                .filter(|key| *all || key.jurisdiction == jurisdiction)
                .filter(|key| tax_type.is_none_or(|t| key.tax_type == t))
                .filter_map(|key| registry.get(key).ok())
                .collect();
            emit(config, &schedules, |schedules| {
                let mut table = Table::new(["Schedule", "Brackets", "Rates", "Parameters"]);
                for schedule in schedules {
                    table.push(vec![
                        schedule.key.to_string(),
                        schedule.table.brackets().len().to_string(),
                        rate_span(schedule),
                        schedule
                            .parameters
                            .iter()
                            .map(|(name, value)| format!("{name}={value}"))
                            .collect::<Vec<_>>()
                            .join(" "),
                    ]);
                }
                let title = if *all {
                    "Schedules".to_string()
                } else {
                    format!("Schedules ({})", jurisdiction.name())
                };
                Report::new(title).row("Count", schedules.len()).table(table)
            })
        }
    }
}

// ─── helpers ─────────────────────────────────────────────────────────────────

fn emit<T, F>(
    config: &RunConfig,
    result: &T,
    report: F,
) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> Report,
{
    match config.output {
        OutputFormat::Json => render::json(result),
        OutputFormat::Text => Ok(report(result).to_string()),
    }
}

fn projector(config: &RunConfig) -> Projector {
    config
        .base_year
        .map(Projector::new)
        .unwrap_or_else(Projector::current)
}

/// A percentage argument as a fraction; `None` when not given.
fn optional_rate(pct: Option<&str>) -> Option<Decimal> {
    pct.map(|pct| pct_to_rate(coerce_amount(pct)))
}

fn vat_category(name: &str) -> Result<VatCategory> {
    VatCategory::parse(name).ok_or_else(|| anyhow!("unknown VAT category '{name}'"))
}

fn rate_span(schedule: &TaxSchedule) -> String {
    let rates = schedule.table.brackets().iter().map(|b| b.rate);
    match (rates.clone().min(), rates.max()) {
        (Some(low), Some(high)) if low == high => rate(low),
        (Some(low), Some(high)) => format!("{} - {}", rate(low), rate(high)),
        _ => "exempt".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use fiscal_core::Jurisdiction;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn config(jurisdiction: Jurisdiction) -> RunConfig {
        RunConfig {
            jurisdiction,
            base_year: Some(2025),
            output: OutputFormat::Text,
            tables: None,
            parameters: None,
            log_level: None,
            log_file: None,
            console_logging: false,
        }
    }

    fn run_text(
        jurisdiction: Jurisdiction,
        command: Command,
    ) -> String {
        let registry = builtin_registry().expect("built-in data must be valid");
        run(&command, &config(jurisdiction), &registry).expect("command should succeed")
    }

    // =========================================================================
    // argument coercion
    // =========================================================================

    #[test]
    fn optional_rate_converts_percent() {
        assert_eq!(optional_rate(Some("3.9")), Some(dec!(0.039)));
        assert_eq!(optional_rate(Some("400")), Some(dec!(4)));
        assert_eq!(optional_rate(None), None);
    }

    #[test]
    fn garbage_amount_is_treated_as_zero() {
        let output = run_text(
            Jurisdiction::UnitedKingdom,
            Command::Payroll {
                salary: "lots".to_string(),
            },
        );

        let net = output
            .lines()
            .find(|line| line.starts_with("Net salary"))
            .expect("net salary row");
        assert!(net.ends_with(" 0.00 GBP"), "{output}");
    }

    #[test]
    fn unknown_relationship_is_an_error() {
        let registry = builtin_registry().expect("built-in data must be valid");
        let command = Command::Inheritance {
            value: "1000".to_string(),
            relationship: "cousin".to_string(),
            prior_gifts: "0".to_string(),
            disabled: false,
            main_residence: false,
        };

        let err = run(&command, &config(Jurisdiction::France), &registry).unwrap_err();

        assert_eq!(err.to_string(), "unknown relationship 'cousin'");
    }

    // =========================================================================
    // rendering
    // =========================================================================

    #[test]
    fn capital_gains_text_report() {
        let output = run_text(
            Jurisdiction::Italy,
            Command::CapitalGains {
                purchase: "€10,000".to_string(),
                sale: "15000".to_string(),
                expenses: "500".to_string(),
                asset: "securities".to_string(),
                holding_years: "0".to_string(),
                higher_rate: false,
            },
        );

        assert!(output.starts_with("Capital gains tax (Italy)\n"), "{output}");
        assert!(output.contains("1,170.00 EUR"), "{output}");
        assert!(output.contains("3,330.00 EUR"), "{output}");
    }

    #[test]
    fn projection_labels_years_from_base_year() {
        let output = run_text(
            Jurisdiction::France,
            Command::Project {
                start: "1000".to_string(),
                rate: "10".to_string(),
                rates: None,
                delta: None,
                years: 2,
            },
        );

        assert!(output.contains("2027  1,210.00"), "{output}");
    }

    #[test]
    fn json_output_serializes_result() {
        let registry = builtin_registry().expect("built-in data must be valid");
        let config = RunConfig {
            output: OutputFormat::Json,
            ..config(Jurisdiction::Germany)
        };
        let command = Command::Vat {
            amount: "100".to_string(),
            category: "reduced".to_string(),
            extract: false,
        };

        let output = run(&command, &config, &registry).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["category"], "reduced");
        let vat: Decimal = value["vat_amount"].as_str().unwrap().parse().unwrap();
        assert_eq!(vat, dec!(7));
    }

    #[test]
    fn tables_filters_by_jurisdiction_and_type() {
        let output = run_text(
            Jurisdiction::UnitedKingdom,
            Command::Tables {
                tax_type: Some("vat".to_string()),
                all: false,
            },
        );

        assert!(output.contains("Count  3"), "{output}");
        assert!(output.contains("UK/vat/zero"), "{output}");
        assert!(!output.contains("FR/"), "{output}");
    }

    #[test]
    fn rate_span_describes_table() {
        let registry = builtin_registry().expect("built-in data must be valid");
        let income = registry
            .lookup(Jurisdiction::UnitedKingdom, TaxType::Income, None)
            .unwrap();
        let vat = registry
            .lookup(Jurisdiction::Germany, TaxType::Vat, Some("standard"))
            .unwrap();

        assert_eq!(rate_span(income), "0.00 % - 45.00 %");
        assert_eq!(rate_span(vat), "19.00 %");
    }
}
