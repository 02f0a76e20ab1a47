//! Payment reconciliation
//!
//! Turns a tender into the amounts recorded on the order. Nothing here talks
//! to a payment network; a card payment is whatever the terminal charged.

use rust_decimal::Decimal;
use shared::models::{MixedPayment, Payment, PaymentMethod};

use super::manager::ManagerError;
use super::money::{
    CARD_TOLERANCE, MIXED_TOLERANCE, require_amount, share_percent, to_decimal, to_f64,
};

/// Validated outcome of a tender against a final total
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub method: PaymentMethod,
    /// Amount tendered (mixed: the declared total)
    pub amount: f64,
    pub change: f64,
    pub mixed: Option<MixedPayment>,
}

/// Check a tender against the order's final total
///
/// - cash: `amount >= final_total`, change is the difference
/// - card / transfer: within one unit of `final_total`, no change
/// - mixed: both legs non-negative, legs sum to `total` within 0.01,
///   `total >= final_total`, change is `total - final_total`
pub fn reconcile(payment: &Payment, final_total: f64) -> Result<Settlement, ManagerError> {
    let required = to_decimal(final_total);

    match *payment {
        Payment::Cash { amount } => {
            let amount = require_positive(amount, "amount")?;
            if amount < required {
                return Err(ManagerError::InsufficientAmount {
                    required: final_total,
                    provided: to_f64(amount),
                });
            }
            Ok(Settlement {
                method: PaymentMethod::Cash,
                amount: to_f64(amount),
                change: to_f64(amount - required),
                mixed: None,
            })
        }
        Payment::Card { amount } | Payment::Transfer { amount } => {
            let tendered = require_positive(amount, "amount")?;
            if (tendered - required).abs() > CARD_TOLERANCE {
                return Err(ManagerError::AmountMismatch {
                    required: final_total,
                    provided: to_f64(tendered),
                });
            }
            Ok(Settlement {
                method: payment.method(),
                amount: to_f64(tendered),
                change: 0.0,
                mixed: None,
            })
        }
        Payment::Mixed {
            cash,
            card,
            total,
            change,
        } => {
            let cash = require_amount(cash, "cash")?;
            let card = require_amount(card, "card")?;
            let total = require_positive(total, "total")?;

            if (cash + card - total).abs() > MIXED_TOLERANCE {
                return Err(ManagerError::SplitMismatch {
                    cash: to_f64(cash),
                    card: to_f64(card),
                    total: to_f64(total),
                });
            }
            if total < required {
                return Err(ManagerError::InsufficientAmount {
                    required: final_total,
                    provided: to_f64(total),
                });
            }

            let change_amount = to_f64(total - required);
            if let Some(claimed) = change
                && !super::money::money_eq(claimed, change_amount)
            {
                tracing::warn!(
                    claimed,
                    computed = change_amount,
                    "Client change differs from computed change, using computed"
                );
            }

            Ok(Settlement {
                method: PaymentMethod::Mixed,
                amount: to_f64(total),
                change: change_amount,
                mixed: Some(MixedPayment {
                    cash_amount: to_f64(cash),
                    card_amount: to_f64(card),
                    total_amount: to_f64(total),
                    change_amount,
                    cash_percent: share_percent(cash, total),
                    card_percent: share_percent(card, total),
                }),
            })
        }
    }
}

fn require_positive(value: f64, field: &'static str) -> Result<Decimal, ManagerError> {
    let amount = require_amount(value, field)?;
    if amount.is_zero() {
        return Err(ManagerError::InvalidAmount { field, value });
    }
    Ok(amount)
}
