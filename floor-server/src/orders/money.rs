//! Money arithmetic
//!
//! Amounts travel as `f64` whole currency units (UZS has no minor unit in
//! practice). Every sum, percentage and comparison is done in `Decimal` and
//! converted back only for storage.

use rust_decimal::prelude::*;
use shared::models::{Order, OrderItem};

use super::manager::ManagerError;

const DECIMAL_PLACES: u32 = 2;

/// Largest accepted tender or price
const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Card and transfer amounts may differ from the total by one unit
pub const CARD_TOLERANCE: Decimal = Decimal::ONE;

/// Split legs must add up to the declared total within 0.01
pub const MIXED_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Back to `f64`, rounded to two decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `amount * percent / 100`, rounded half away from zero to whole units
pub fn percent_of(amount: Decimal, percent: f64) -> Decimal {
    (amount * to_decimal(percent) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Share of `part` in `total` as a percentage with two decimals
pub fn share_percent(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    to_f64(part * Decimal::ONE_HUNDRED / total)
}

/// Σ unit_price × quantity
pub fn subtotal(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .map(|i| to_decimal(i.unit_price) * Decimal::from(i.quantity))
        .sum()
}

/// Compare two amounts within 0.01
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MIXED_TOLERANCE
}

/// Reject NaN, infinities, negatives and absurd values
pub fn require_amount(value: f64, field: &'static str) -> Result<Decimal, ManagerError> {
    if !value.is_finite() || value < 0.0 || value > MAX_AMOUNT {
        return Err(ManagerError::InvalidAmount { field, value });
    }
    Ok(to_decimal(value))
}

/// Service, tax and final total for a subtotal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charges {
    pub service_percent: f64,
    pub tax_percent: f64,
    pub service_amount: f64,
    pub tax_amount: f64,
    pub final_total: f64,
}

impl Charges {
    /// Tax is charged on the subtotal, not on subtotal + service
    pub fn compute(subtotal: f64, service_percent: f64, tax_percent: f64) -> Self {
        let base = to_decimal(subtotal);
        let service = percent_of(base, service_percent);
        let tax = percent_of(base, tax_percent);
        Self {
            service_percent,
            tax_percent,
            service_amount: to_f64(service),
            tax_amount: to_f64(tax),
            final_total: to_f64(base + service + tax),
        }
    }

    /// Freeze onto an order; a no-op when totals are already set
    pub fn apply_once(self, order: &mut Order) -> bool {
        if order.final_total.is_some() {
            return false;
        }
        order.service_percent = Some(self.service_percent);
        order.tax_percent = Some(self.tax_percent);
        order.service_amount = Some(self.service_amount);
        order.tax_amount = Some(self.tax_amount);
        order.final_total = Some(self.final_total);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, qty: u32) -> OrderItem {
        OrderItem {
            food_id: "f".into(),
            name: "f".into(),
            unit_price: price,
            quantity: qty,
            category_id: None,
            station_target: None,
        }
    }

    #[test]
    fn test_subtotal_is_exact() {
        let items = [item(5000.0, 2), item(25000.0, 1), item(0.1, 3)];
        assert_eq!(to_f64(subtotal(&items)), 35000.3);
    }

    #[test]
    fn test_charges_scenario() {
        let charges = Charges::compute(35000.0, 10.0, 0.0);
        assert_eq!(charges.service_amount, 3500.0);
        assert_eq!(charges.tax_amount, 0.0);
        assert_eq!(charges.final_total, 38500.0);
    }

    #[test]
    fn test_tax_on_subtotal() {
        let charges = Charges::compute(10000.0, 10.0, 12.0);
        assert_eq!(charges.service_amount, 1000.0);
        assert_eq!(charges.tax_amount, 1200.0);
        assert_eq!(charges.final_total, 12200.0);
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        assert_eq!(percent_of(Decimal::from(12345), 10.0), Decimal::from(1235));
        assert_eq!(percent_of(Decimal::from(12344), 10.0), Decimal::from(1234));
    }

    #[test]
    fn test_apply_once_preserves_frozen_totals() {
        let mut order_charges = Charges::compute(35000.0, 10.0, 0.0);
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut order = Order::new("o-1", date, "t-1", "w-1", 0);
        assert!(order_charges.apply_once(&mut order));

        order_charges = Charges::compute(35000.0, 20.0, 5.0);
        assert!(!order_charges.apply_once(&mut order));
        assert_eq!(order.final_total, Some(38500.0));
        assert_eq!(order.service_percent, Some(10.0));
    }

    #[test]
    fn test_share_percent() {
        assert_eq!(share_percent(Decimal::from(20000), Decimal::from(38500)), 51.95);
        assert_eq!(share_percent(Decimal::ONE, Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_require_amount() {
        assert!(require_amount(f64::NAN, "amount").is_err());
        assert!(require_amount(-1.0, "amount").is_err());
        assert_eq!(require_amount(100.0, "amount").unwrap(), Decimal::from(100));
    }
}
