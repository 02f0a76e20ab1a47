//! Print dispatch fan-out
//!
//! Splits an order into one ticket per station and sends them all at once.
//! Every station gets its own connection and timeout; the call returns when
//! each attempt has either delivered or failed. Failures are reported, never
//! retried, and never affect the order.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono_tz::Tz;
use futures::future::join_all;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, PrintResult, Settings, StationTicket, TicketItem, TicketKind};
use shared::util::now_millis;
use sora_printer::{NetworkPrinter, PrintError, Printer};
use thiserror::Error;
use tracing::instrument;

use super::renderer::TicketRenderer;

/// Paper width of the floor printers (80mm)
const PAPER_WIDTH: usize = 48;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Print(#[from] PrintError),

    #[error("No cashier printer configured")]
    NoCashierPrinter,
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoCashierPrinter => {
                AppError::with_message(ErrorCode::PrinterNotAvailable, err.to_string())
            }
            other => AppError::with_message(ErrorCode::PrintFailed, other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrintDispatcher {
    renderer: TicketRenderer,
    timeout: Duration,
    default_port: u16,
}

impl PrintDispatcher {
    pub fn new(timeout: Duration, default_port: u16, timezone: Tz) -> Self {
        Self {
            renderer: TicketRenderer::new(PAPER_WIDTH, timezone),
            timeout,
            default_port,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Group an order's items by their snapshotted station
    ///
    /// Items without a station are left out and logged.
    pub fn kitchen_tickets(order: &Order) -> Vec<StationTicket> {
        let mut by_station: BTreeMap<&str, Vec<TicketItem>> = BTreeMap::new();

        for item in &order.items {
            match item.station_target.as_deref().map(str::trim) {
                Some(station) if !station.is_empty() => {
                    by_station.entry(station).or_default().push(TicketItem {
                        name: item.name.clone(),
                        quantity: item.quantity,
                        unit_price: item.unit_price,
                    });
                }
                _ => {
                    tracing::warn!(
                        order_id = %order.id,
                        food_id = %item.food_id,
                        name = %item.name,
                        "No kitchen station mapped for item, skipping"
                    );
                }
            }
        }

        by_station
            .into_iter()
            .map(|(station, items)| StationTicket {
                station_address: station.to_string(),
                kind: TicketKind::Kitchen,
                order_id: order.id.clone(),
                order_number: order.formatted_number(),
                table_name: order.table_name.clone(),
                staff_name: order.staff_name.clone(),
                items,
            })
            .collect()
    }

    /// Send kitchen tickets to every station the order touches
    #[instrument(skip_all, fields(order_id = %order.id, daily_number = order.daily_number))]
    pub async fn dispatch_kitchen(&self, order: &Order) -> Vec<PrintResult> {
        let tickets = Self::kitchen_tickets(order);
        if tickets.is_empty() {
            tracing::debug!("No kitchen stations for order");
            return Vec::new();
        }

        let printed_at = now_millis();
        let sends = tickets.iter().map(|ticket| {
            let bytes = self.renderer.render_kitchen(ticket, printed_at);
            self.deliver(
                &ticket.station_address,
                TicketKind::Kitchen,
                ticket.items.len(),
                bytes,
            )
        });
        let results = join_all(sends).await;

        let failed = results.iter().filter(|r| !r.success).count();
        tracing::info!(
            stations = results.len(),
            failed,
            "Kitchen dispatch finished"
        );
        results
    }

    /// Print the receipt on the cashier printer, `print_copies` times
    #[instrument(skip_all, fields(order_id = %order.id, daily_number = order.daily_number))]
    pub async fn dispatch_receipt(
        &self,
        order: &Order,
        settings: &Settings,
    ) -> Result<PrintResult, DispatchError> {
        let address = settings
            .cashier_printer_ip
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(DispatchError::NoCashierPrinter)?;

        let single = self.renderer.render_receipt(order, settings);
        let copies = usize::from(settings.copies());
        let mut bytes = Vec::with_capacity(single.len() * copies);
        for _ in 0..copies {
            bytes.extend_from_slice(&single);
        }

        Ok(self
            .deliver(address, TicketKind::Receipt, order.items.len(), bytes)
            .await)
    }

    async fn deliver(
        &self,
        address: &str,
        kind: TicketKind,
        item_count: usize,
        bytes: Vec<u8>,
    ) -> PrintResult {
        match self.send(address, &bytes).await {
            Ok(()) => {
                tracing::info!(station = %address, kind = ?kind, item_count, "Ticket delivered");
                PrintResult::ok(address, kind, item_count)
            }
            Err(e) => {
                tracing::warn!(station = %address, kind = ?kind, error = %e, "Ticket delivery failed");
                PrintResult::failed(address, kind, item_count, e.to_string())
            }
        }
    }

    async fn send(&self, address: &str, bytes: &[u8]) -> Result<(), DispatchError> {
        let printer =
            NetworkPrinter::from_station(address, self.default_port)?.with_timeout(self.timeout);
        printer.print(bytes).await?;
        Ok(())
    }
}
