//! Value-added tax.
//!
//! Every category is a flat schedule under the `vat` tax type, keyed by the
//! category name. A jurisdiction without a given category (the UK has no
//! intermediate rate, Germany no super-reduced one) reports it as not found.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up, safe_ratio, saturating_add};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, ScheduleKey, TaxType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatCategory {
    #[default]
    Standard,
    Intermediate,
    Reduced,
    SuperReduced,
    Zero,
}

impl VatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Intermediate => "intermediate",
            Self::Reduced => "reduced",
            Self::SuperReduced => "super_reduced",
            Self::Zero => "zero",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Some(Self::Standard),
            "intermediate" => Some(Self::Intermediate),
            "reduced" => Some(Self::Reduced),
            "super_reduced" => Some(Self::SuperReduced),
            "zero" => Some(Self::Zero),
            _ => None,
        }
    }
}

impl fmt::Display for VatCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the input amount excludes or includes VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    #[default]
    AddToNet,
    ExtractFromGross,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatInput {
    pub jurisdiction: Jurisdiction,
    pub amount: Decimal,
    pub category: VatCategory,
    pub mode: VatMode,
}

impl VatInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        amount: Decimal,
        category: VatCategory,
    ) -> Self {
        Self {
            jurisdiction,
            amount,
            category,
            mode: VatMode::AddToNet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatResult {
    pub jurisdiction: Jurisdiction,
    pub category: VatCategory,
    pub rate: Decimal,
    pub net_amount: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct VatCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> VatCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// The fractional rate of `category` in `jurisdiction`.
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::NotFound`] when the category is not configured.
    /// * [`ScheduleError::NotFlat`] when its table is not a single flat rate.
    pub fn rate(
        &self,
        jurisdiction: Jurisdiction,
        category: VatCategory,
    ) -> Result<Decimal, ScheduleError> {
        let key = ScheduleKey::with_sub_key(jurisdiction, TaxType::Vat, category.as_str());
        let schedule = self.registry.get(&key)?;
        if schedule.table.is_empty() {
            return Ok(Decimal::ZERO);
        }
        schedule
            .table
            .flat_rate()
            .ok_or(ScheduleError::NotFlat(key))
    }

    /// # Errors
    ///
    /// See [`Self::rate`].
    pub fn calculate(
        &self,
        input: &VatInput,
    ) -> Result<VatResult, ScheduleError> {
        let rate = self.rate(input.jurisdiction, input.category)?;
        let amount = non_negative(input.amount);

        let (net_amount, vat_amount) = match input.mode {
            VatMode::AddToNet => (amount, round_half_up(amount * rate)),
            VatMode::ExtractFromGross => {
                let net = round_half_up(safe_ratio(amount, Decimal::ONE + rate));
                (net, amount - net)
            }
        };
        debug!(jurisdiction = %input.jurisdiction, category = %input.category, %rate, "computed VAT");

        Ok(VatResult {
            jurisdiction: input.jurisdiction,
            category: input.category,
            rate,
            net_amount,
            vat_amount,
            gross_amount: saturating_add(net_amount, vat_amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::tools::fixtures::{flat, registry, schedule, table};

    fn key(
        jurisdiction: Jurisdiction,
        category: VatCategory,
    ) -> ScheduleKey {
        ScheduleKey::with_sub_key(jurisdiction, TaxType::Vat, category.as_str())
    }

    fn test_registry() -> ScheduleRegistry {
        registry(vec![
            schedule(key(Jurisdiction::France, VatCategory::Standard), flat(dec!(0.20)), &[]),
            schedule(key(Jurisdiction::France, VatCategory::Reduced), flat(dec!(0.055)), &[]),
            schedule(key(Jurisdiction::UnitedKingdom, VatCategory::Zero), flat(dec!(0)), &[]),
            schedule(
                key(Jurisdiction::Spain, VatCategory::Standard),
                table(&[
                    (dec!(0), Some(dec!(100)), dec!(0.10)),
                    (dec!(100), None, dec!(0.21)),
                ]),
                &[],
            ),
        ])
    }

    fn calculate(input: &VatInput) -> Result<VatResult, ScheduleError> {
        let registry = test_registry();
        VatCalculator::new(&registry).calculate(input)
    }

    // =========================================================================
    // category parsing
    // =========================================================================

    #[test]
    fn category_parse_accepts_hyphens() {
        assert_eq!(VatCategory::parse("super-reduced"), Some(VatCategory::SuperReduced));
        assert_eq!(VatCategory::parse(" Standard "), Some(VatCategory::Standard));
        assert_eq!(VatCategory::parse("luxury"), None);
    }

    // =========================================================================
    // add / extract
    // =========================================================================

    #[test]
    fn adds_vat_to_net_amount() {
        let result = calculate(&VatInput::new(
            Jurisdiction::France,
            dec!(100),
            VatCategory::Standard,
        ))
        .unwrap();

        assert_eq!(result.vat_amount, dec!(20.00));
        assert_eq!(result.gross_amount, dec!(120.00));
    }

    #[test]
    fn extracts_vat_from_gross_amount() {
        let input = VatInput {
            mode: VatMode::ExtractFromGross,
            ..VatInput::new(Jurisdiction::France, dec!(120), VatCategory::Standard)
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.net_amount, dec!(100.00));
        assert_eq!(result.vat_amount, dec!(20.00));
        assert_eq!(result.gross_amount, dec!(120));
    }

    #[test]
    fn extraction_rounds_net_and_keeps_gross_exact() {
        let input = VatInput {
            mode: VatMode::ExtractFromGross,
            ..VatInput::new(Jurisdiction::France, dec!(10), VatCategory::Reduced)
        };

        let result = calculate(&input).unwrap();

        // 10 / 1.055 = 9.4786...
        assert_eq!(result.net_amount, dec!(9.48));
        assert_eq!(result.vat_amount, dec!(0.52));
        assert_eq!(result.gross_amount, dec!(10));
    }

    #[test]
    fn zero_rated_goods_carry_no_vat() {
        let result = calculate(&VatInput::new(
            Jurisdiction::UnitedKingdom,
            dec!(250),
            VatCategory::Zero,
        ))
        .unwrap();

        assert_eq!(result.vat_amount, dec!(0));
        assert_eq!(result.gross_amount, dec!(250));
    }

    // =========================================================================
    // configuration errors
    // =========================================================================

    #[test]
    fn missing_category_is_not_found() {
        let result = calculate(&VatInput::new(
            Jurisdiction::UnitedKingdom,
            dec!(100),
            VatCategory::Intermediate,
        ));

        assert!(matches!(result, Err(ScheduleError::NotFound(_))));
    }

    #[test]
    fn progressive_vat_table_is_rejected() {
        let result = calculate(&VatInput::new(
            Jurisdiction::Spain,
            dec!(100),
            VatCategory::Standard,
        ));

        assert_eq!(
            result,
            Err(ScheduleError::NotFlat(key(Jurisdiction::Spain, VatCategory::Standard)))
        );
    }
}
