//! Order Model
//!
//! The order aggregate as persisted by the floor server. Items are price and
//! name snapshots taken at creation; later catalog edits never touch them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
///
/// ```text
/// pending -> preparing -> ready -> served -> completed -> paid
///                                             completed -> pending_payment -> paid
/// (pending | preparing | ready | served) -> cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Completed,
    PendingPayment,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Completed => "completed",
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Position in the kitchen progression (pending..served)
    fn kitchen_rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Preparing => Some(1),
            Self::Ready => Some(2),
            Self::Served => Some(3),
            _ => None,
        }
    }

    /// Still on the floor: not yet completed, paid or cancelled
    pub fn is_open(&self) -> bool {
        self.kitchen_rank().is_some()
    }

    /// Service has ended and money is involved
    pub fn is_financial(&self) -> bool {
        matches!(self, Self::Completed | Self::PendingPayment | Self::Paid)
    }

    /// No further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Awaiting settlement at the cashier
    pub fn is_awaiting_payment(&self) -> bool {
        matches!(self, Self::Completed | Self::PendingPayment)
    }

    /// Whether a generic status update may move from `self` to `next`
    ///
    /// Completion and payment have their own operations and are never
    /// reachable through here.
    pub fn can_update_to(&self, next: OrderStatus) -> bool {
        match (self.kitchen_rank(), next) {
            (Some(_), OrderStatus::Cancelled) => true,
            (Some(cur), _) => next.kitchen_rank().is_some_and(|n| n > cur),
            (None, OrderStatus::PendingPayment) => *self == OrderStatus::Completed,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "served" => Ok(Self::Served),
            "completed" => Ok(Self::Completed),
            "pending_payment" => Ok(Self::PendingPayment),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Payment method recorded on a settled order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Mixed,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment tender submitted by the cashier
///
/// Tagged by `method`:
/// `{"method":"cash","amount":40000}`,
/// `{"method":"mixed","cash":20000,"card":18500,"total":38500}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Payment {
    Cash {
        amount: f64,
    },
    Card {
        amount: f64,
    },
    Transfer {
        amount: f64,
    },
    Mixed {
        cash: f64,
        card: f64,
        total: f64,
        /// Client-computed change, advisory only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        change: Option<f64>,
    },
}

impl Payment {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Cash { .. } => PaymentMethod::Cash,
            Self::Card { .. } => PaymentMethod::Card,
            Self::Transfer { .. } => PaymentMethod::Transfer,
            Self::Mixed { .. } => PaymentMethod::Mixed,
        }
    }
}

/// Split cash + card breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MixedPayment {
    pub cash_amount: f64,
    pub card_amount: f64,
    pub total_amount: f64,
    pub change_amount: f64,
    /// Share of the total paid in cash, percent with two decimals
    pub cash_percent: f64,
    pub card_percent: f64,
}

/// Order item snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub food_id: String,
    pub name: String,
    /// Catalog price at creation time
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Resolved station address (category -> printer), `None` when unmapped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_target: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// Sequential per `order_date`, starting at 1
    pub daily_number: u32,
    /// Business date in the restaurant timezone
    pub order_date: NaiveDate,
    pub table_id: String,
    #[serde(default)]
    pub table_name: String,
    /// Creator
    pub staff_id: String,
    #[serde(default)]
    pub staff_name: String,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    // === Totals ===
    pub subtotal: f64,
    /// Rates captured when totals were frozen (for receipts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
    /// `subtotal + service_amount + tax_amount`; immutable once set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_total: Option<f64>,

    pub status: OrderStatus,

    // === Transition timestamps (epoch millis) ===
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparing_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub served_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,

    // === Payment ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixed_payment: Option<MixedPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier_notes: Option<String>,

    // === Receipt ===
    #[serde(default)]
    pub receipt_printed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_printed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_printed_by: Option<String>,

    /// Table occupancy has been released for this order
    #[serde(default)]
    pub table_released: bool,
}

impl Order {
    /// Fresh pending order without items; `daily_number` is assigned by storage
    pub fn new(
        id: impl Into<String>,
        order_date: NaiveDate,
        table_id: impl Into<String>,
        staff_id: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            daily_number: 0,
            order_date,
            table_id: table_id.into(),
            table_name: String::new(),
            staff_id: staff_id.into(),
            staff_name: String::new(),
            items: Vec::new(),
            notes: None,
            subtotal: 0.0,
            service_percent: None,
            tax_percent: None,
            service_amount: None,
            tax_amount: None,
            final_total: None,
            status: OrderStatus::Pending,
            created_at,
            preparing_at: None,
            ready_at: None,
            served_at: None,
            completed_at: None,
            paid_at: None,
            cancelled_at: None,
            completed_by: None,
            payment_method: None,
            payment_amount: None,
            change_amount: None,
            mixed_payment: None,
            paid_by: None,
            cashier_notes: None,
            receipt_printed: false,
            receipt_printed_at: None,
            receipt_printed_by: None,
            table_released: false,
        }
    }

    /// Human-readable number, e.g. `#007`
    pub fn formatted_number(&self) -> String {
        format_daily_number(self.daily_number)
    }

    /// Total item quantity across all lines
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Timestamp of the most recent transition into the current status
    pub fn status_changed_at(&self) -> i64 {
        let at = match self.status {
            OrderStatus::Pending => None,
            OrderStatus::Preparing => self.preparing_at,
            OrderStatus::Ready => self.ready_at,
            OrderStatus::Served => self.served_at,
            OrderStatus::Completed | OrderStatus::PendingPayment => self.completed_at,
            OrderStatus::Paid => self.paid_at,
            OrderStatus::Cancelled => self.cancelled_at,
        };
        at.unwrap_or(self.created_at)
    }
}

/// `#` + number zero padded to three digits
pub fn format_daily_number(n: u32) -> String {
    format!("#{:03}", n)
}

// =============================================================================
// Requests
// =============================================================================

/// Item line in a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderItem {
    pub food_id: String,
    pub quantity: u32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub table_id: String,
    pub items: Vec<CreateOrderItem>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Client-computed total, compared and logged but never trusted
    #[serde(default)]
    pub client_total: Option<f64>,
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(flatten)]
    pub payment: Payment,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Filter for completed order history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletedOrdersFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub staff_id: Option<String>,
    /// `true` selects paid orders instead of completed ones
    #[serde(default)]
    pub paid: bool,
    pub limit: Option<usize>,
}

impl CompletedOrdersFilter {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// Sales summary for one business date
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailySalesSummary {
    pub date: Option<NaiveDate>,
    pub total_orders: u32,
    pub completed_orders: u32,
    pub paid_orders: u32,
    pub total_revenue: f64,
    pub total_service_amount: f64,
    pub total_tax_amount: f64,
    pub avg_order_value: f64,
}
