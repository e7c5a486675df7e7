//! Integration tests running the calculators against the built-in tables.

use fiscal_core::calculations::tools::{
    AssetClass, CapitalGainsCalculator, CapitalGainsInput, CorporateTaxCalculator,
    CorporateTaxInput, DeficitProjectionInput, ImportDutyCalculator, ImportDutyInput,
    IncomeTaxCalculator, IncomeTaxInput, InheritanceInput, InheritanceTaxCalculator,
    MunicipalTaxCalculator, MunicipalTaxInput, PayrollCalculator, PayrollInput, Relationship,
    VatCalculator, VatCategory, VatInput, project_deficit,
};
use fiscal_core::{Jurisdiction, Projector, ScheduleRegistry, SeriesSpec, TaxType};
use fiscal_data::{ScheduleLoader, builtin_registry};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn registry() -> ScheduleRegistry {
    builtin_registry().expect("built-in data must be valid")
}

// =============================================================================
// inheritance
// =============================================================================

#[test]
fn test_france_child_inheritance() {
    let registry = registry();
    let input = InheritanceInput::new(Jurisdiction::France, Relationship::Child, dec!(150000));

    let result = InheritanceTaxCalculator::new(&registry)
        .calculate(&input)
        .expect("FR child schedule");

    // 8072 × 5% + 4037 × 10% + 3823 × 15% + 34068 × 20%
    assert_eq!(result.allowance_applied, dec!(100000));
    assert_eq!(result.taxable_amount, dec!(50000));
    assert_eq!(result.total_tax, dec!(8194.35));
    assert_eq!(result.brackets.breakdown.len(), 4);
}

#[test]
fn test_spouse_inheritance_is_exempt() {
    let registry = registry();
    let calculator = InheritanceTaxCalculator::new(&registry);

    for jurisdiction in [Jurisdiction::France, Jurisdiction::Italy, Jurisdiction::UnitedKingdom] {
        for value in [dec!(0), dec!(150000), dec!(2500000), dec!(90000000)] {
            let input = InheritanceInput::new(jurisdiction, Relationship::Spouse, value);

            let result = calculator.calculate(&input).expect("spouse schedule");

            assert_eq!(result.total_tax, dec!(0), "{jurisdiction} spouse, {value}");
        }
    }
}

#[test]
fn test_italy_child_below_franchise() {
    let registry = registry();
    let input = InheritanceInput::new(Jurisdiction::Italy, Relationship::Child, dec!(900000));

    let result = InheritanceTaxCalculator::new(&registry)
        .calculate(&input)
        .expect("IT child schedule");

    assert_eq!(result.total_tax, dec!(0));
}

// =============================================================================
// capital gains
// =============================================================================

#[test]
fn test_italy_flat_capital_gains() {
    let registry = registry();
    let input = CapitalGainsInput::new(Jurisdiction::Italy, dec!(10000), dec!(15000), dec!(500));

    let result = CapitalGainsCalculator::new(&registry)
        .calculate(&input)
        .expect("IT standard schedule");

    assert_eq!(result.capital_gain, dec!(4500));
    assert_eq!(result.total_tax, dec!(1170.00));
    assert_eq!(result.net_gain, dec!(3330.00));
}

#[test]
fn test_italy_real_estate_held_five_years_is_exempt() {
    let registry = registry();
    let input = CapitalGainsInput {
        asset_class: AssetClass::RealEstate,
        holding_years: dec!(5),
        ..CapitalGainsInput::new(Jurisdiction::Italy, dec!(200000), dec!(260000), dec!(0))
    };

    let result = CapitalGainsCalculator::new(&registry)
        .calculate(&input)
        .expect("IT exempt schedule");

    assert_eq!(result.regime, "exempt");
    assert_eq!(result.total_tax, dec!(0));
}

// =============================================================================
// income
// =============================================================================

#[test]
fn test_uk_income_tax() {
    let registry = registry();

    let result = IncomeTaxCalculator::new(&registry)
        .calculate(&IncomeTaxInput::new(Jurisdiction::UnitedKingdom, dec!(60000)))
        .expect("UK income schedule");

    // 37700 × 20% + 9730 × 40%
    assert_eq!(result.total_tax, dec!(11432.00));
}

#[test]
fn test_spain_income_tax() {
    let registry = registry();

    let result = IncomeTaxCalculator::new(&registry)
        .calculate(&IncomeTaxInput::new(Jurisdiction::Spain, dec!(30000)))
        .expect("ES income schedule");

    // 12450 × 19% + 7750 × 24% + 9800 × 30%
    assert_eq!(result.total_tax, dec!(7165.50));
}

// =============================================================================
// corporate / VAT / import / municipal / payroll
// =============================================================================

#[test]
fn test_germany_corporate_tax() {
    let registry = registry();

    let result = CorporateTaxCalculator::new(&registry)
        .calculate(&CorporateTaxInput::new(Jurisdiction::Germany, dec!(100000)))
        .expect("DE corporate schedule");

    assert_eq!(result.total_tax, dec!(29825.00));
}

#[test]
fn test_every_vat_category_is_flat() {
    let registry = registry();
    let calculator = VatCalculator::new(&registry);

    for key in registry.keys() {
        if key.tax_type != TaxType::Vat {
            continue;
        }
        let category = key
            .sub_key
            .as_deref()
            .and_then(VatCategory::parse)
            .unwrap_or_else(|| panic!("unknown VAT category in {key}"));
        assert!(calculator.rate(key.jurisdiction, category).is_ok(), "{key}");
    }
}

#[test]
fn test_france_reduced_vat() {
    let registry = registry();

    let result = VatCalculator::new(&registry)
        .calculate(&VatInput::new(Jurisdiction::France, dec!(200), VatCategory::Reduced))
        .expect("FR reduced VAT");

    assert_eq!(result.vat_amount, dec!(11.00));
}

#[test]
fn test_uk_low_value_import() {
    let registry = registry();
    let input = ImportDutyInput::new(Jurisdiction::UnitedKingdom, dec!(135), dec!(8));

    let result = ImportDutyCalculator::new(&registry)
        .calculate(&input)
        .expect("UK import");

    assert!(result.duty_waived);
    assert_eq!(result.import_vat, dec!(27.00));
}

#[test]
fn test_italy_main_residence_municipal_exemption() {
    let registry = registry();
    let input = MunicipalTaxInput {
        main_residence: true,
        ..MunicipalTaxInput::new(Jurisdiction::Italy, dec!(1000))
    };

    let result = MunicipalTaxCalculator::new(&registry)
        .calculate(&input)
        .expect("IT municipal");

    assert_eq!(result.total_tax, dec!(0));
}

#[test]
fn test_france_payroll() {
    let registry = registry();

    let result = PayrollCalculator::new(&registry)
        .calculate(&PayrollInput::new(Jurisdiction::France, dec!(40000)))
        .expect("FR payroll");

    assert_eq!(result.net_salary, dec!(31200.00));
    assert_eq!(result.total_employer_cost, dec!(56800.00));
}

// =============================================================================
// projections
// =============================================================================

#[test]
fn test_deficit_projection_scenario() {
    let input = DeficitProjectionInput {
        revenue: SeriesSpec::compound(dec!(850), dec!(2.5)),
        spending: SeriesSpec::compound(dec!(900), dec!(3.0)),
        gdp: Some(SeriesSpec::compound(dec!(0), dec!(2))),
        years: 5,
    };

    let projection = project_deficit(&Projector::new(2025), &input);

    let year_five = &projection.years[5];
    let revenue = dec!(850) * dec!(1.025) * dec!(1.025) * dec!(1.025) * dec!(1.025) * dec!(1.025);
    let spending = dec!(900) * dec!(1.03) * dec!(1.03) * dec!(1.03) * dec!(1.03) * dec!(1.03);
    assert_eq!(year_five.deficit, spending - revenue);
    assert_eq!(year_five.deficit_to_gdp_pct, Some(dec!(0)));
}

// =============================================================================
// overrides
// =============================================================================

#[test]
fn test_override_file_replaces_builtin_rate() {
    let mut registry = registry();
    let overrides = ScheduleLoader::parse_brackets(
        "jurisdiction,tax_type,sub_key,lower_bound,upper_bound,rate\nIT,capital_gains,standard,0,,0.33\n"
            .as_bytes(),
    )
    .expect("override CSV");

    ScheduleLoader::load(&mut registry, &overrides, &[]).expect("override load");

    let result = CapitalGainsCalculator::new(&registry)
        .calculate(&CapitalGainsInput::new(
            Jurisdiction::Italy,
            dec!(10000),
            dec!(15000),
            dec!(500),
        ))
        .expect("IT standard schedule");
    assert_eq!(result.total_tax, dec!(1485.00));
}
