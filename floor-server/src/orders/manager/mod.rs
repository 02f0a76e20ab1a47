//! OrdersManager - order ledger and state machine
//!
//! ```text
//! create ──> pending -> preparing -> ready -> served ──close──> completed ──pay──> paid
//!               └──────────┴───────────┴────────┴──> cancelled      └─> pending_payment ──pay──> paid
//! ```
//!
//! Every transition is a read-modify-write inside one storage transaction.
//! Side effects (table occupancy, printing) run after the commit and can
//! only be logged or reported, never undo it.

mod error;

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{
    CompletedOrdersFilter, CreateOrderItem, CreateOrderRequest, DailySalesSummary, Order,
    OrderItem, OrderStatus, PaymentRequest, PrintResult, Settings, Staff,
};
use shared::util::{new_id, now_millis};
use tracing::instrument;

pub use error::{ManagerError, ManagerResult};

use super::lifecycle::{TableLifecycle, TableReleasePoint};
use super::money::{self, Charges, to_decimal, to_f64};
use super::payment;
use super::storage::OrderStorage;
use crate::catalog::Collaborators;
use crate::printing::PrintDispatcher;
use crate::utils::time;

/// An order plus what happened at the printers while producing it
#[derive(Debug, Clone, Serialize)]
pub struct OrderOutcome {
    pub order: Order,
    pub print_results: Vec<PrintResult>,
}

impl OrderOutcome {
    fn quiet(order: Order) -> Self {
        Self {
            order,
            print_results: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    collaborators: Collaborators,
    lifecycle: TableLifecycle,
    dispatcher: PrintDispatcher,
    timezone: Tz,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("release_point", &self.lifecycle.release_point())
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl OrdersManager {
    pub fn new(
        storage: OrderStorage,
        collaborators: Collaborators,
        dispatcher: PrintDispatcher,
        release_point: TableReleasePoint,
        timezone: Tz,
    ) -> Self {
        let lifecycle = TableLifecycle::new(collaborators.tables.clone(), release_point);
        Self {
            storage,
            collaborators,
            lifecycle,
            dispatcher,
            timezone,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn release_point(&self) -> TableReleasePoint {
        self.lifecycle.release_point()
    }

    /// Current business date
    pub fn today(&self) -> NaiveDate {
        time::today(self.timezone)
    }

    fn settings(&self) -> Settings {
        self.collaborators.settings.settings()
    }

    /// Resolve the acting staff member
    fn actor(&self, staff_id: &str) -> ManagerResult<Staff> {
        let staff_id = staff_id.trim();
        if staff_id.is_empty() {
            return Err(ManagerError::StaffRequired);
        }
        let staff = self
            .collaborators
            .staff
            .find_staff(staff_id)
            .ok_or_else(|| ManagerError::StaffNotFound(staff_id.to_string()))?;
        if !staff.is_active {
            return Err(ManagerError::StaffInactive(staff.id));
        }
        Ok(staff)
    }

    fn ensure_not_terminal(order: &Order) -> ManagerResult<()> {
        match order.status {
            OrderStatus::Paid => Err(ManagerError::AlreadyPaid(order.id.clone())),
            OrderStatus::Cancelled => Err(ManagerError::Cancelled(order.id.clone())),
            _ => Ok(()),
        }
    }

    // ========== Create ==========

    /// Validate items against the catalog, price them server-side, persist
    /// with the next daily number, occupy the table, send kitchen tickets
    #[instrument(skip(self, req), fields(table_id = %req.table_id))]
    pub async fn create_order(
        &self,
        staff_id: &str,
        req: CreateOrderRequest,
    ) -> ManagerResult<OrderOutcome> {
        if req.items.is_empty() {
            return Err(ManagerError::EmptyOrder);
        }
        if let Some(line) = req.items.iter().find(|i| i.quantity == 0) {
            return Err(ManagerError::InvalidQuantity {
                food_id: line.food_id.clone(),
                quantity: line.quantity,
            });
        }

        let staff = self.actor(staff_id)?;
        let table = self
            .collaborators
            .tables
            .find_table(&req.table_id)
            .ok_or_else(|| ManagerError::TableNotFound(req.table_id.clone()))?;

        let today = self.today();
        let items = self.reserve_items(&req.items, today)?;

        let subtotal = to_f64(money::subtotal(&items));
        if let Some(client_total) = req.client_total
            && !money::money_eq(client_total, subtotal)
        {
            tracing::warn!(
                client_total,
                subtotal,
                "Client total differs from catalog prices, using server subtotal"
            );
        }

        let mut order = Order::new(new_id(), today, table.id, staff.id, now_millis());
        order.table_name = table.name;
        order.staff_name = staff.display_name;
        order.items = items.clone();
        order.notes = req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        order.subtotal = subtotal;

        let settings = self.settings();
        if settings.charges_at_creation {
            Charges::compute(subtotal, settings.service_percent, settings.tax_percent)
                .apply_once(&mut order);
        }

        let order = match self.storage.create_order(order) {
            Ok(order) => order,
            Err(e) => {
                self.restore_items(&items);
                return Err(e.into());
            }
        };

        tracing::info!(
            order_id = %order.id,
            daily_number = order.daily_number,
            subtotal = order.subtotal,
            items = order.items.len(),
            "Order created"
        );

        self.lifecycle.occupy(&order.table_id);
        let print_results = self.dispatcher.dispatch_kitchen(&order).await;

        Ok(OrderOutcome {
            order,
            print_results,
        })
    }

    /// Reserve stock line by line; on the first failure give back what was
    /// already taken
    fn reserve_items(
        &self,
        lines: &[CreateOrderItem],
        today: NaiveDate,
    ) -> ManagerResult<Vec<OrderItem>> {
        let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());

        for line in lines {
            let food = match self
                .collaborators
                .foods
                .reserve_stock(&line.food_id, line.quantity, today)
            {
                Ok(food) => food,
                Err(e) => {
                    self.restore_items(&items);
                    return Err(e.into());
                }
            };

            let station_target = self.collaborators.stations.station_for_category(&food.category_id);
            items.push(OrderItem {
                food_id: food.id,
                name: food.name,
                unit_price: food.price,
                quantity: line.quantity,
                category_id: Some(food.category_id),
                station_target,
            });
        }

        Ok(items)
    }

    fn restore_items(&self, items: &[OrderItem]) {
        for item in items {
            self.collaborators
                .foods
                .restore_stock(&item.food_id, item.quantity);
        }
    }

    // ========== Transitions ==========

    /// Kitchen progression, `pending_payment` and cancellation
    #[instrument(skip(self))]
    pub fn update_status(&self, order_id: &str, status: &str) -> ManagerResult<Order> {
        let next: OrderStatus = status
            .parse()
            .map_err(|_| ManagerError::InvalidStatus(status.to_string()))?;
        let now = now_millis();

        let (order, release) = self.storage.update_order(order_id, |order| {
            Self::ensure_not_terminal(order)?;
            if !order.status.can_update_to(next) {
                return Err(ManagerError::InvalidTransition {
                    order_id: order.id.clone(),
                    from: order.status,
                    to: next,
                });
            }

            order.status = next;
            match next {
                OrderStatus::Preparing => order.preparing_at = Some(now),
                OrderStatus::Ready => order.ready_at = Some(now),
                OrderStatus::Served => order.served_at = Some(now),
                OrderStatus::Cancelled => order.cancelled_at = Some(now),
                _ => {}
            }

            let release = next == OrderStatus::Cancelled && !order.table_released;
            if release {
                order.table_released = true;
            }
            Ok(release)
        })?;

        tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
        if release {
            self.release_table(&order);
        }
        Ok(order)
    }

    /// Complete an order
    ///
    /// Charges are computed from the current settings unless they were
    /// frozen earlier, in which case they are kept. Closing a completed
    /// order again returns it unchanged.
    #[instrument(skip(self))]
    pub async fn close_order(&self, order_id: &str, staff_id: &str) -> ManagerResult<OrderOutcome> {
        let staff = self.actor(staff_id)?;
        let settings = self.settings();
        let release_on_close = self.lifecycle.release_point() == TableReleasePoint::Completion;
        let now = now_millis();

        let (order, (closed_now, release)) = self.storage.update_order(order_id, |order| {
            Self::ensure_not_terminal(order)?;
            if order.status.is_awaiting_payment() {
                return Ok((false, false));
            }

            order.status = OrderStatus::Completed;
            order.completed_at = Some(now);
            order.completed_by = Some(staff.id.clone());
            Charges::compute(order.subtotal, settings.service_percent, settings.tax_percent)
                .apply_once(order);

            let release = release_on_close && !order.table_released;
            if release {
                order.table_released = true;
            }
            Ok::<_, ManagerError>((true, release))
        })?;

        if !closed_now {
            tracing::debug!(order_id = %order.id, "Order already closed");
            return Ok(OrderOutcome::quiet(order));
        }

        tracing::info!(
            order_id = %order.id,
            daily_number = order.daily_number,
            final_total = order.final_total,
            "Order completed"
        );
        if release {
            self.release_table(&order);
        }

        if settings.auto_print {
            return Ok(self.auto_print_receipt(order, &settings, &staff.id).await);
        }
        Ok(OrderOutcome::quiet(order))
    }

    /// Settle a completed order
    #[instrument(skip(self, req), fields(method = %req.payment.method()))]
    pub async fn process_payment(
        &self,
        order_id: &str,
        staff_id: &str,
        req: PaymentRequest,
    ) -> ManagerResult<OrderOutcome> {
        let staff = self.actor(staff_id)?;
        let settings = self.settings();
        let now = now_millis();

        let (order, release) = self.storage.update_order(order_id, |order| {
            Self::ensure_not_terminal(order)?;
            if !order.status.is_awaiting_payment() {
                return Err(ManagerError::NotCompleted {
                    order_id: order.id.clone(),
                    status: order.status,
                });
            }

            let charges =
                Charges::compute(order.subtotal, settings.service_percent, settings.tax_percent);
            charges.apply_once(order);
            let final_total = order.final_total.unwrap_or(charges.final_total);

            let settlement = payment::reconcile(&req.payment, final_total)?;

            order.status = OrderStatus::Paid;
            order.paid_at = Some(now);
            order.paid_by = Some(staff.id.clone());
            order.payment_method = Some(settlement.method);
            order.payment_amount = Some(settlement.amount);
            order.change_amount = Some(settlement.change);
            order.mixed_payment = settlement.mixed;
            order.cashier_notes = req
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from);

            let release = !order.table_released;
            if release {
                order.table_released = true;
            }
            Ok(release)
        })?;

        tracing::info!(
            order_id = %order.id,
            daily_number = order.daily_number,
            method = ?order.payment_method,
            amount = order.payment_amount,
            change = order.change_amount,
            "Order paid"
        );
        if release {
            self.release_table(&order);
        }

        if settings.auto_print {
            return Ok(self.auto_print_receipt(order, &settings, &staff.id).await);
        }
        Ok(OrderOutcome::quiet(order))
    }

    /// Remove an order that has not reached a financial state
    #[instrument(skip(self))]
    pub fn delete_order(&self, order_id: &str) -> ManagerResult<Order> {
        let order = self.storage.delete_order(order_id, |order| {
            if order.status.is_financial() {
                return Err(ManagerError::NotDeletable {
                    order_id: order.id.clone(),
                    status: order.status,
                });
            }
            Ok(())
        })?;

        tracing::info!(order_id = %order.id, daily_number = order.daily_number, "Order deleted");
        if !order.table_released {
            self.release_table(&order);
        }
        Ok(order)
    }

    /// Free the order's table unless another order still holds it
    fn release_table(&self, order: &Order) {
        let still_busy = match self.storage.all_orders() {
            Ok(orders) => orders
                .iter()
                .any(|o| o.id != order.id && o.table_id == order.table_id && holds_table(o)),
            Err(e) => {
                tracing::warn!(error = %e, "Could not check other orders on table, freeing anyway");
                false
            }
        };

        if still_busy {
            tracing::debug!(table_id = %order.table_id, "Table still has live orders, keeping it occupied");
            return;
        }
        self.lifecycle.free(&order.table_id);
    }

    // ========== Printing ==========

    async fn auto_print_receipt(&self, order: Order, settings: &Settings, staff_id: &str) -> OrderOutcome {
        match self.dispatcher.dispatch_receipt(&order, settings).await {
            Ok(result) => self.record_receipt(order, result, staff_id),
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Receipt not printed");
                OrderOutcome::quiet(order)
            }
        }
    }

    fn record_receipt(&self, order: Order, result: PrintResult, staff_id: &str) -> OrderOutcome {
        if !result.success {
            return OrderOutcome {
                order,
                print_results: vec![result],
            };
        }

        let now = now_millis();
        let updated = self.storage.update_order::<_, ManagerError>(&order.id, |o| {
            o.receipt_printed = true;
            o.receipt_printed_at = Some(now);
            o.receipt_printed_by = Some(staff_id.to_string());
            Ok(())
        });

        let order = match updated {
            Ok((updated, ())) => updated,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Failed to record receipt print");
                order
            }
        };
        OrderOutcome {
            order,
            print_results: vec![result],
        }
    }

    /// Print the receipt again on the cashier printer
    #[instrument(skip(self))]
    pub async fn reprint_receipt(&self, order_id: &str, staff_id: &str) -> ManagerResult<OrderOutcome> {
        let staff = self.actor(staff_id)?;
        let order = self.get_order(order_id)?;
        if !order.status.is_financial() {
            return Err(ManagerError::NotCompleted {
                order_id: order.id,
                status: order.status,
            });
        }

        let result = self
            .dispatcher
            .dispatch_receipt(&order, &self.settings())
            .await?;
        Ok(self.record_receipt(order, result, &staff.id))
    }

    /// Send the kitchen tickets again
    #[instrument(skip(self))]
    pub async fn reprint_kitchen(&self, order_id: &str) -> ManagerResult<Vec<PrintResult>> {
        let order = self.get_order(order_id)?;
        if order.status == OrderStatus::Cancelled {
            return Err(ManagerError::Cancelled(order.id));
        }
        Ok(self.dispatcher.dispatch_kitchen(&order).await)
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> ManagerResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    /// Orders for a table, newest first
    pub fn orders_by_table(&self, table_id: &str) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .all_orders()?
            .into_iter()
            .filter(|o| o.table_id == table_id)
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Tables with an order that is not yet paid or cancelled
    pub fn busy_tables(&self) -> ManagerResult<Vec<String>> {
        let mut tables: Vec<String> = self
            .storage
            .all_orders()?
            .into_iter()
            .filter(|o| is_busy(o.status))
            .map(|o| o.table_id)
            .collect();
        tables.sort();
        tables.dedup();
        Ok(tables)
    }

    /// A staff member's orders that are not yet paid or cancelled, newest first
    pub fn my_pending(&self, staff_id: &str) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .all_orders()?
            .into_iter()
            .filter(|o| o.staff_id == staff_id && is_busy(o.status))
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Completed (or paid) orders, newest first
    pub fn completed_orders(&self, filter: &CompletedOrdersFilter) -> ManagerResult<Vec<Order>> {
        let wanted = if filter.paid {
            OrderStatus::Paid
        } else {
            OrderStatus::Completed
        };

        let mut orders: Vec<Order> = self
            .storage
            .all_orders()?
            .into_iter()
            .filter(|o| o.status == wanted)
            .filter(|o| filter.start_date.is_none_or(|d| o.order_date >= d))
            .filter(|o| filter.end_date.is_none_or(|d| o.order_date <= d))
            .filter(|o| {
                filter
                    .staff_id
                    .as_deref()
                    .is_none_or(|s| o.staff_id == s || o.completed_by.as_deref() == Some(s))
            })
            .collect();

        orders.sort_by_key(|o| {
            std::cmp::Reverse(if filter.paid { o.paid_at } else { o.completed_at })
        });
        orders.truncate(filter.limit());
        Ok(orders)
    }

    /// Orders waiting at the cashier, oldest completion first
    pub fn pending_payments(&self) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .all_orders()?
            .into_iter()
            .filter(|o| o.status.is_awaiting_payment())
            .collect();
        orders.sort_by_key(|o| {
            (
                o.completed_at.unwrap_or(o.created_at),
                o.order_date,
                o.daily_number,
            )
        });
        Ok(orders)
    }

    /// Totals over one business date's completed and paid orders
    pub fn daily_sales_summary(&self, date: Option<NaiveDate>) -> ManagerResult<DailySalesSummary> {
        let date = date.unwrap_or_else(|| self.today());
        let orders: Vec<Order> = self
            .storage
            .orders_on(date)?
            .into_iter()
            .filter(|o| o.status.is_financial())
            .collect();

        let mut summary = DailySalesSummary {
            date: Some(date),
            ..Default::default()
        };
        let mut revenue = Decimal::ZERO;
        let mut service = Decimal::ZERO;
        let mut tax = Decimal::ZERO;

        for order in &orders {
            summary.total_orders += 1;
            if order.status == OrderStatus::Paid {
                summary.paid_orders += 1;
            } else {
                summary.completed_orders += 1;
            }
            revenue += to_decimal(order.final_total.unwrap_or(order.subtotal));
            service += to_decimal(order.service_amount.unwrap_or_default());
            tax += to_decimal(order.tax_amount.unwrap_or_default());
        }

        summary.total_revenue = to_f64(revenue);
        summary.total_service_amount = to_f64(service);
        summary.total_tax_amount = to_f64(tax);
        if summary.total_orders > 0 {
            summary.avg_order_value = to_f64(revenue / Decimal::from(summary.total_orders));
        }
        Ok(summary)
    }
}

fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        (b.created_at, b.order_date, b.daily_number).cmp(&(
            a.created_at,
            a.order_date,
            a.daily_number,
        ))
    });
}

/// Still holding a table: on the floor or waiting for payment
fn is_busy(status: OrderStatus) -> bool {
    status.is_open() || status.is_awaiting_payment()
}

/// Busy and not yet past the release point
///
/// With release at completion a closed order has `table_released` set and
/// no longer keeps its table.
fn holds_table(order: &Order) -> bool {
    is_busy(order.status) && !order.table_released
}
