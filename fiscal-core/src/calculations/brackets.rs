//! Progressive bracket evaluation.
//!
//! The taxable amount is cut into slices, one per bracket, in ascending
//! order. Each slice is taxed at its bracket's marginal rate and the slices
//! are summed. Flat rates are single-bracket tables and exemptions are empty
//! or zero-rate tables, so the evaluator itself never branches on the kind
//! of tax.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::{Bracket, evaluate};
//!
//! let brackets = vec![
//!     Bracket::new(dec!(0), Some(dec!(8072)), dec!(0.05)),
//!     Bracket::new(dec!(8072), Some(dec!(12109)), dec!(0.10)),
//!     Bracket::new(dec!(12109), None, dec!(0.15)),
//! ];
//!
//! let result = evaluate(dec!(10000), &brackets);
//!
//! // 8072 × 5% + 1928 × 10%
//! assert_eq!(result.total_tax, dec!(596.40));
//! assert_eq!(result.breakdown.len(), 2);
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::non_negative;
use crate::models::{Bracket, BracketSlice, TaxResult};

/// Evaluates `taxable_amount` against `brackets`.
///
/// Negative amounts are treated as zero. Iteration stops as soon as the
/// amount is exhausted, so the breakdown only lists brackets that taxed
/// something. An unbounded bracket absorbs whatever remains.
pub fn evaluate(
    taxable_amount: Decimal,
    brackets: &[Bracket],
) -> TaxResult {
    let taxable_amount = non_negative(taxable_amount);
    let mut remaining = taxable_amount;
    let mut total_tax = Decimal::ZERO;
    let mut breakdown = Vec::new();

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let taxed_amount = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let tax = taxed_amount * bracket.rate;

        total_tax += tax;
        remaining -= taxed_amount;
        breakdown.push(BracketSlice {
            bracket: bracket.clone(),
            taxed_amount,
            tax,
        });
    }

    debug!(
        %taxable_amount,
        %total_tax,
        slices = breakdown.len(),
        "evaluated bracket table"
    );

    TaxResult {
        taxable_amount,
        total_tax,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::BracketTable;

    /// French direct-line inheritance scale.
    fn direct_line_brackets() -> Vec<Bracket> {
        vec![
            Bracket::new(dec!(0), Some(dec!(8072)), dec!(0.05)),
            Bracket::new(dec!(8072), Some(dec!(12109)), dec!(0.10)),
            Bracket::new(dec!(12109), Some(dec!(15932)), dec!(0.15)),
            Bracket::new(dec!(15932), Some(dec!(552324)), dec!(0.20)),
            Bracket::new(dec!(552324), Some(dec!(902838)), dec!(0.30)),
            Bracket::new(dec!(902838), Some(dec!(1805677)), dec!(0.40)),
            Bracket::new(dec!(1805677), None, dec!(0.45)),
        ]
    }

    // =========================================================================
    // evaluate tests
    // =========================================================================

    #[test]
    fn evaluate_zero_amount_yields_empty_breakdown() {
        let result = evaluate(dec!(0), &direct_line_brackets());

        assert_eq!(result.total_tax, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn evaluate_negative_amount_is_clamped_to_zero() {
        let result = evaluate(dec!(-5000), &direct_line_brackets());

        assert_eq!(result.taxable_amount, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
    }

    #[test]
    fn evaluate_within_first_bracket() {
        let result = evaluate(dec!(5000), &direct_line_brackets());

        assert_eq!(result.total_tax, dec!(250.00));
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn evaluate_sums_every_slice() {
        let result = evaluate(dec!(50000), &direct_line_brackets());

        // 8072×5% + 4037×10% + 3823×15% + 34068×20%
        // = 403.60 + 403.70 + 573.45 + 6813.60
        assert_eq!(result.total_tax, dec!(8194.35));
        let slices: Vec<Decimal> = result.breakdown.iter().map(|s| s.taxed_amount).collect();
        assert_eq!(slices, vec![dec!(8072), dec!(4037), dec!(3823), dec!(34068)]);
    }

    #[test]
    fn evaluate_exactly_on_boundary_does_not_touch_next_bracket() {
        let result = evaluate(dec!(8072), &direct_line_brackets());

        assert_eq!(result.total_tax, dec!(403.60));
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn evaluate_unbounded_bracket_absorbs_remainder() {
        let result = evaluate(dec!(2000000), &direct_line_brackets());

        let last = result.breakdown.last().unwrap();
        assert_eq!(last.taxed_amount, dec!(194323));
        assert_eq!(result.marginal_rate(), dec!(0.45));
    }

    #[test]
    fn evaluate_empty_table_is_exempt() {
        let result = evaluate(dec!(1000000), &[]);

        assert_eq!(result.total_tax, dec!(0));
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn evaluate_zero_rate_table_is_exempt() {
        let table = BracketTable::flat(dec!(0)).unwrap();

        let result = table.evaluate(dec!(1000000));

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn evaluate_is_idempotent() {
        let brackets = direct_line_brackets();

        assert_eq!(
            evaluate(dec!(123456.78), &brackets),
            evaluate(dec!(123456.78), &brackets)
        );
    }

    // =========================================================================
    // properties
    // =========================================================================

    fn amount() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    /// Contiguous tables of one to seven brackets starting at zero, widths
    /// up to a million, rates in whole basis points, unbounded last bracket.
    fn bracket_table() -> impl Strategy<Value = BracketTable> {
        prop::collection::vec((1i64..100_000_000, 0i64..=10_000), 1..8).prop_map(|slices| {
            let last = slices.len() - 1;
            let mut lower = Decimal::ZERO;
            let brackets = slices
                .into_iter()
                .enumerate()
                .map(|(index, (width_cents, rate_bp))| {
                    let upper = (index < last).then(|| lower + Decimal::new(width_cents, 2));
                    let bracket = Bracket::new(lower, upper, Decimal::new(rate_bp, 4));
                    if let Some(upper) = upper {
                        lower = upper;
                    }
                    bracket
                })
                .collect();
            BracketTable::new(brackets).expect("generated brackets form a valid table")
        })
    }

    proptest! {
        #[test]
        fn evaluate_is_monotonic_for_any_table(table in bracket_table(), a in amount(), b in amount()) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };

            prop_assert!(table.evaluate(low).total_tax <= table.evaluate(high).total_tax);
        }

        #[test]
        fn tax_is_continuous_across_any_boundary(
            table in bracket_table(),
            index in any::<prop::sample::Index>(),
            pct in 1i64..=100,
        ) {
            let brackets = table.brackets();
            prop_assume!(brackets.len() > 1);
            let position = index.index(brackets.len() - 1);
            let (below, above) = (&brackets[position], &brackets[position + 1]);
            let boundary = above.lower_bound;
            let step_down = below.width().unwrap() * Decimal::new(pct, 2);
            let step_up = above.width().unwrap_or(Decimal::ONE) * Decimal::new(pct, 2);
            let at = table.evaluate(boundary).total_tax;

            prop_assert_eq!(at - table.evaluate(boundary - step_down).total_tax, step_down * below.rate);
            prop_assert_eq!(table.evaluate(boundary + step_up).total_tax - at, step_up * above.rate);
        }

        #[test]
        fn evaluate_never_exceeds_the_amount(table in bracket_table(), x in amount()) {
            prop_assert!(table.evaluate(x).total_tax <= x);
        }

        #[test]
        fn evaluate_is_monotonic(a in amount(), b in amount()) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let brackets = direct_line_brackets();

            prop_assert!(
                evaluate(low, &brackets).total_tax <= evaluate(high, &brackets).total_tax
            );
        }

        #[test]
        fn flat_table_is_plain_multiplication(x in amount(), rate_bp in 0i64..=10_000) {
            let rate = Decimal::new(rate_bp, 4);
            let table = BracketTable::flat(rate).unwrap();

            prop_assert_eq!(table.evaluate(x).total_tax, x * rate);
        }

        #[test]
        fn crossing_a_boundary_adds_at_most_the_marginal_rate(index in 0usize..6, cents in 1i64..10_000) {
            let brackets = direct_line_brackets();
            let boundary = brackets[index].upper_bound.unwrap();
            let step = Decimal::new(cents, 2);
            let below = evaluate(boundary - step, &brackets).total_tax;
            let at = evaluate(boundary, &brackets).total_tax;

            prop_assert_eq!(at - below, step * brackets[index].rate);
        }

        #[test]
        fn evaluate_zero_is_zero_for_any_flat_rate(rate_bp in 0i64..=10_000) {
            let table = BracketTable::flat(Decimal::new(rate_bp, 4)).unwrap();

            prop_assert_eq!(table.evaluate(Decimal::ZERO).total_tax, Decimal::ZERO);
        }
    }
}
