use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TaxResult;
use crate::calculations::brackets::evaluate;

/// A contiguous value range taxed at a single marginal rate.
///
/// `upper_bound` of `None` means the bracket is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl Bracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Width of the bracket, or `None` when it is unbounded.
    pub fn width(&self) -> Option<Decimal> {
        self.upper_bound.map(|upper| upper - self.lower_bound)
    }
}

/// Reasons a bracket table is rejected at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("first bracket must start at 0, got {0}")]
    DoesNotStartAtZero(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has upper bound {upper} not above lower bound {lower}")]
    EmptyRange {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedNotLast(usize),

    #[error("last bracket must be unbounded, but ends at {0}")]
    LastBracketBounded(Decimal),

    #[error("bracket {index} has rate {rate} outside 0..=1")]
    InvalidRate { index: usize, rate: Decimal },
}

/// An ordered, validated sequence of brackets.
///
/// Brackets start at zero, are contiguous and ascending, and the last one is
/// unbounded. An empty table is allowed and models a full exemption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bracket>", into = "Vec<Bracket>")]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Validates `brackets` and wraps them.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] when the brackets do not form a
    /// contiguous 0→∞ partition or a rate lies outside 0..=1.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, BracketTableError> {
        let last = brackets.len().saturating_sub(1);
        let mut expected_lower = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if index == 0 && !bracket.lower_bound.is_zero() {
                return Err(BracketTableError::DoesNotStartAtZero(bracket.lower_bound));
            }
            if bracket.lower_bound != expected_lower {
                return Err(BracketTableError::NotContiguous {
                    index,
                    expected: expected_lower,
                    found: bracket.lower_bound,
                });
            }
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            match bracket.upper_bound {
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(BracketTableError::EmptyRange {
                        index,
                        lower: bracket.lower_bound,
                        upper,
                    });
                }
                Some(upper) if index == last => {
                    return Err(BracketTableError::LastBracketBounded(upper));
                }
                Some(upper) => expected_lower = upper,
                None if index != last => {
                    return Err(BracketTableError::UnboundedNotLast(index));
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    /// A single 0→∞ bracket at `rate`.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError::InvalidRate`] when `rate` is outside 0..=1.
    pub fn flat(rate: Decimal) -> Result<Self, BracketTableError> {
        Self::new(vec![Bracket::new(Decimal::ZERO, None, rate)])
    }

    /// A table with no brackets; every amount evaluates to zero tax.
    pub fn exempt() -> Self {
        Self::default()
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// The rate of a single-bracket table, if this table is flat.
    pub fn flat_rate(&self) -> Option<Decimal> {
        match self.brackets.as_slice() {
            [only] => Some(only.rate),
            _ => None,
        }
    }

    pub fn evaluate(
        &self,
        taxable_amount: Decimal,
    ) -> TaxResult {
        evaluate(taxable_amount, &self.brackets)
    }
}

impl TryFrom<Vec<Bracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<Bracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<Bracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
    ) -> Bracket {
        Bracket::new(lower, upper, rate)
    }

    #[test]
    fn new_accepts_contiguous_table() {
        let table = BracketTable::new(vec![
            bracket(dec!(0), Some(dec!(10000)), dec!(0.10)),
            bracket(dec!(10000), Some(dec!(40000)), dec!(0.20)),
            bracket(dec!(40000), None, dec!(0.40)),
        ])
        .expect("table should be valid");

        assert_eq!(table.brackets().len(), 3);
        assert_eq!(table.flat_rate(), None);
    }

    #[test]
    fn new_accepts_empty_table() {
        let table = BracketTable::new(vec![]).expect("empty table is an exemption");

        assert!(table.is_empty());
        assert_eq!(table, BracketTable::exempt());
    }

    #[test]
    fn new_rejects_table_not_starting_at_zero() {
        let result = BracketTable::new(vec![bracket(dec!(100), None, dec!(0.10))]);

        assert_eq!(result, Err(BracketTableError::DoesNotStartAtZero(dec!(100))));
    }

    #[test]
    fn new_rejects_gap_between_brackets() {
        let result = BracketTable::new(vec![
            bracket(dec!(0), Some(dec!(10000)), dec!(0.10)),
            bracket(dec!(12000), None, dec!(0.20)),
        ]);

        assert_eq!(
            result,
            Err(BracketTableError::NotContiguous {
                index: 1,
                expected: dec!(10000),
                found: dec!(12000),
            })
        );
    }

    #[test]
    fn new_rejects_overlapping_brackets() {
        let result = BracketTable::new(vec![
            bracket(dec!(0), Some(dec!(10000)), dec!(0.10)),
            bracket(dec!(8000), None, dec!(0.20)),
        ]);

        assert!(matches!(
            result,
            Err(BracketTableError::NotContiguous { index: 1, .. })
        ));
    }

    #[test]
    fn new_rejects_inverted_range() {
        let result = BracketTable::new(vec![
            bracket(dec!(0), Some(dec!(0)), dec!(0.10)),
            bracket(dec!(0), None, dec!(0.20)),
        ]);

        assert_eq!(
            result,
            Err(BracketTableError::EmptyRange {
                index: 0,
                lower: dec!(0),
                upper: dec!(0),
            })
        );
    }

    #[test]
    fn new_rejects_unbounded_bracket_in_the_middle() {
        let result = BracketTable::new(vec![
            bracket(dec!(0), None, dec!(0.10)),
            bracket(dec!(0), None, dec!(0.20)),
        ]);

        assert_eq!(result, Err(BracketTableError::UnboundedNotLast(0)));
    }

    #[test]
    fn new_rejects_bounded_last_bracket() {
        let result = BracketTable::new(vec![bracket(dec!(0), Some(dec!(5000)), dec!(0.10))]);

        assert_eq!(result, Err(BracketTableError::LastBracketBounded(dec!(5000))));
    }

    #[test]
    fn new_rejects_rate_above_one() {
        let result = BracketTable::flat(dec!(1.5));

        assert_eq!(
            result,
            Err(BracketTableError::InvalidRate {
                index: 0,
                rate: dec!(1.5),
            })
        );
    }

    #[test]
    fn flat_table_reports_its_rate() {
        let table = BracketTable::flat(dec!(0.26)).unwrap();

        assert_eq!(table.flat_rate(), Some(dec!(0.26)));
    }

    #[test]
    fn width_is_none_for_unbounded_bracket() {
        assert_eq!(bracket(dec!(0), None, dec!(0.1)).width(), None);
        assert_eq!(
            bracket(dec!(100), Some(dec!(250)), dec!(0.1)).width(),
            Some(dec!(150))
        );
    }
}
