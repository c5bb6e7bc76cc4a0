//! Seed quantities in count or weight units

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Units a seed quantity can be expressed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Seeds,
    Grams,
    Milligrams,
    Kilograms,
    Ounces,
    Pounds,
}

/// Unit families; conversion only happens inside a family
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnitFamily {
    Count,
    Weight,
}

/// Static label and scaling information for a unit
#[derive(Debug, Clone, Copy)]
pub struct UnitInfo {
    pub unit: Unit,
    pub label: &'static str,
    pub symbol: &'static str,
    /// Grams per one of this unit; `None` for count units
    pub grams_factor: Option<Decimal>,
}

/// Label and conversion table for every supported unit
pub const UNIT_TABLE: [UnitInfo; 6] = [
    UnitInfo {
        unit: Unit::Seeds,
        label: "Seeds",
        symbol: "ct",
        grams_factor: None,
    },
    UnitInfo {
        unit: Unit::Grams,
        label: "Grams",
        symbol: "g",
        grams_factor: Some(Decimal::ONE),
    },
    UnitInfo {
        unit: Unit::Milligrams,
        label: "Milligrams",
        symbol: "mg",
        grams_factor: Some(Decimal::from_parts(1, 0, 0, false, 3)),
    },
    UnitInfo {
        unit: Unit::Kilograms,
        label: "Kilograms",
        symbol: "kg",
        grams_factor: Some(Decimal::from_parts(1000, 0, 0, false, 0)),
    },
    UnitInfo {
        // 28.349523125 g
        unit: Unit::Ounces,
        label: "Ounces",
        symbol: "oz",
        grams_factor: Some(Decimal::from_parts(2_579_719_349, 6, 0, false, 9)),
    },
    UnitInfo {
        // 453.59237 g
        unit: Unit::Pounds,
        label: "Pounds",
        symbol: "lb",
        grams_factor: Some(Decimal::from_parts(45_359_237, 0, 0, false, 5)),
    },
];

impl Unit {
    pub fn info(&self) -> &'static UnitInfo {
        let index = match self {
            Unit::Seeds => 0,
            Unit::Grams => 1,
            Unit::Milligrams => 2,
            Unit::Kilograms => 3,
            Unit::Ounces => 4,
            Unit::Pounds => 5,
        };
        &UNIT_TABLE[index]
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Seeds => UnitFamily::Count,
            _ => UnitFamily::Weight,
        }
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }

    pub fn is_weight(&self) -> bool {
        self.family() == UnitFamily::Weight
    }

    pub fn parse(s: &str) -> Option<Self> {
        UNIT_TABLE
            .iter()
            .find(|info| {
                info.label.eq_ignore_ascii_case(s) || info.symbol.eq_ignore_ascii_case(s)
            })
            .map(|info| info.unit)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An immutable amount of seed material
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "QuantityRepr")]
pub struct Quantity {
    pub value: Decimal,
    pub unit: Unit,
}

/// Wire form of a quantity; converted through `Quantity::new`
#[derive(Deserialize)]
struct QuantityRepr {
    value: Decimal,
    unit: Unit,
}

impl TryFrom<QuantityRepr> for Quantity {
    type Error = DomainError;

    fn try_from(repr: QuantityRepr) -> Result<Self, Self::Error> {
        Quantity::new(repr.value, repr.unit)
    }
}

fn out_of_range(field: &'static str) -> DomainError {
    DomainError::InvalidField {
        field,
        message: "Quantity is out of range".to_string(),
    }
}

impl Quantity {
    /// Create a quantity, rejecting negative values
    pub fn new(value: Decimal, unit: Unit) -> DomainResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeQuantity {
                field: "quantity",
                available: Decimal::ZERO,
                requested: value.abs(),
            });
        }
        Ok(Self { value, unit })
    }

    pub fn seeds(count: u32) -> Self {
        Self {
            value: Decimal::from(count),
            unit: Unit::Seeds,
        }
    }

    pub fn zero(unit: Unit) -> Self {
        Self {
            value: Decimal::ZERO,
            unit,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn family(&self) -> UnitFamily {
        self.unit.family()
    }

    /// Convert to another unit of the same family
    pub fn convert(&self, target: Unit) -> DomainResult<Quantity> {
        if self.unit == target {
            return Ok(*self);
        }
        match (self.unit.info().grams_factor, target.info().grams_factor) {
            (Some(from), Some(to)) => {
                let value = self
                    .value
                    .checked_mul(from)
                    .and_then(|grams| grams.checked_div(to))
                    .ok_or_else(|| out_of_range("quantity"))?;
                Ok(Quantity {
                    value: value.normalize(),
                    unit: target,
                })
            }
            _ => Err(DomainError::UnitFamilyMismatch {
                from: self.unit,
                to: target,
            }),
        }
    }

    /// Add a same-family quantity, expressed in this quantity's unit
    pub fn add(&self, other: &Quantity) -> DomainResult<Quantity> {
        let other = other.convert(self.unit)?;
        let value = self
            .value
            .checked_add(other.value)
            .ok_or_else(|| out_of_range("quantity"))?;
        Ok(Quantity {
            value,
            unit: self.unit,
        })
    }

    /// Subtract a same-family quantity; a negative result is rejected
    pub fn subtract(&self, other: &Quantity) -> DomainResult<Quantity> {
        let other = other.convert(self.unit)?;
        let value = self
            .value
            .checked_sub(other.value)
            .ok_or_else(|| out_of_range("remaining_quantity"))?;
        if value < Decimal::ZERO {
            return Err(DomainError::NegativeQuantity {
                field: "remaining_quantity",
                available: self.value,
                requested: other.value,
            });
        }
        Ok(Quantity {
            value,
            unit: self.unit,
        })
    }

    /// Compare against a same-family quantity
    pub fn compare(&self, other: &Quantity) -> DomainResult<Ordering> {
        let other = other.convert(self.unit)?;
        Ok(self.value.cmp(&other.value))
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.unit.info().symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_unit_table_factors() {
        assert_eq!(Unit::Grams.info().grams_factor, Some(dec("1")));
        assert_eq!(Unit::Milligrams.info().grams_factor, Some(dec("0.001")));
        assert_eq!(Unit::Kilograms.info().grams_factor, Some(dec("1000")));
        assert_eq!(Unit::Ounces.info().grams_factor, Some(dec("28.349523125")));
        assert_eq!(Unit::Pounds.info().grams_factor, Some(dec("453.59237")));
        assert_eq!(Unit::Seeds.info().grams_factor, None);
    }

    #[test]
    fn test_table_order_matches_units() {
        for info in UNIT_TABLE.iter() {
            assert_eq!(info.unit.info().label, info.label);
        }
    }

    #[test]
    fn test_convert_kilograms_to_grams() {
        let q = Quantity::new(dec("1.5"), Unit::Kilograms).unwrap();
        let g = q.convert(Unit::Grams).unwrap();
        assert_eq!(g.value, dec("1500"));
        assert_eq!(g.unit, Unit::Grams);
    }

    #[test]
    fn test_convert_pounds_to_ounces() {
        let q = Quantity::new(dec("1"), Unit::Pounds).unwrap();
        assert_eq!(q.convert(Unit::Ounces).unwrap().value, dec("16"));
    }

    #[test]
    fn test_convert_across_families_fails() {
        let q = Quantity::seeds(10);
        assert_eq!(
            q.convert(Unit::Grams),
            Err(DomainError::UnitFamilyMismatch {
                from: Unit::Seeds,
                to: Unit::Grams
            })
        );
    }

    #[test]
    fn test_subtract_rejects_negative() {
        let a = Quantity::seeds(5);
        let err = a.subtract(&Quantity::seeds(12)).unwrap_err();
        assert!(matches!(err, DomainError::NegativeQuantity { .. }));
    }

    #[test]
    fn test_subtract_mixed_weight_units() {
        let a = Quantity::new(dec("1"), Unit::Kilograms).unwrap();
        let b = Quantity::new(dec("250"), Unit::Grams).unwrap();
        assert_eq!(a.subtract(&b).unwrap().value, dec("0.75"));
    }

    #[test]
    fn test_negative_quantity_rejected_on_construction() {
        assert!(Quantity::new(dec("-1"), Unit::Grams).is_err());
        assert!(Quantity::new(Decimal::ZERO, Unit::Grams).unwrap().is_zero());
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(Unit::parse("kg"), Some(Unit::Kilograms));
        assert_eq!(Unit::parse("Seeds"), Some(Unit::Seeds));
        assert_eq!(Unit::parse("stone"), None);
    }

    #[test]
    fn test_deserialize_rejects_negative_value() {
        let result = serde_json::from_str::<Quantity>(r#"{"value":"-5","unit":"seeds"}"#);
        assert!(result.is_err());

        let q: Quantity = serde_json::from_str(r#"{"value":"5","unit":"seeds"}"#).unwrap();
        assert_eq!(q, Quantity::seeds(5));
    }

    #[test]
    fn test_convert_overflow_is_an_error() {
        let huge = Quantity {
            value: Decimal::MAX,
            unit: Unit::Kilograms,
        };
        assert!(matches!(
            huge.convert(Unit::Grams),
            Err(DomainError::InvalidField { .. })
        ));
        let huge_lb = Quantity {
            value: Decimal::MAX,
            unit: Unit::Pounds,
        };
        assert!(huge_lb.convert(Unit::Milligrams).is_err());
    }

    #[test]
    fn test_add_overflow_is_an_error() {
        let huge = Quantity {
            value: Decimal::MAX,
            unit: Unit::Grams,
        };
        assert!(matches!(
            huge.add(&huge),
            Err(DomainError::InvalidField { .. })
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn subtract_succeeds_only_when_not_overdrawn(a in 0u32..100_000, b in 0u32..100_000) {
                let lhs = Quantity::seeds(a);
                let rhs = Quantity::seeds(b);
                let ordering = lhs.compare(&rhs).unwrap();
                match lhs.subtract(&rhs) {
                    Ok(diff) => {
                        prop_assert_ne!(ordering, Ordering::Less);
                        prop_assert_eq!(diff.value, Decimal::from(a - b));
                    }
                    Err(e) => {
                        prop_assert_eq!(ordering, Ordering::Less);
                        let is_negative = matches!(e, DomainError::NegativeQuantity { .. });
                        prop_assert!(is_negative);
                    }
                }
            }
        }
    }
}
