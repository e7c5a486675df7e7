//! Jurisdiction-aware calculators.
//!
//! Each calculator borrows a [`ScheduleRegistry`](crate::ScheduleRegistry),
//! picks the schedule that matches its input (relationship, VAT category,
//! company size, ...) and runs the bracket evaluator or projector. Any
//! exemption or reduced rate is expressed by which schedule is picked.

pub mod capital_gains;
pub mod corporate;
pub mod fiscal;
pub mod import_duty;
pub mod income;
pub mod inheritance;
pub mod municipal;
pub mod payroll;
pub mod vat;

pub use capital_gains::{AssetClass, CapitalGainsCalculator, CapitalGainsInput, CapitalGainsResult};
pub use corporate::{CorporateTaxCalculator, CorporateTaxInput, CorporateTaxResult};
pub use fiscal::{
    DebtProjectionInput, DebtYear, DeficitProjection, DeficitProjectionInput, DeficitYear,
    project_debt, project_deficit,
};
pub use import_duty::{ImportDutyCalculator, ImportDutyInput, ImportDutyResult};
pub use income::{IncomeTaxCalculator, IncomeTaxInput, IncomeTaxResult};
pub use inheritance::{InheritanceInput, InheritanceResult, InheritanceTaxCalculator, Relationship};
pub use municipal::{MunicipalTaxCalculator, MunicipalTaxInput, MunicipalTaxResult};
pub use payroll::{PayrollCalculator, PayrollInput, PayrollResult};
pub use vat::{VatCalculator, VatCategory, VatInput, VatMode, VatResult};
