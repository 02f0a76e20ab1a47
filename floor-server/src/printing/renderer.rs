//! Ticket renderer
//!
//! Renders kitchen station tickets and cashier receipts into ESC/POS bytes.
//! Labels follow what the floor staff are used to reading.

use chrono_tz::Tz;
use shared::models::{Order, PaymentMethod, Settings, StationTicket};
use sora_printer::{EscPosBuilder, pad_text, truncate_text};

use crate::utils::time::format_ticket_time;

/// Receipt column widths: quantity and line total
const QTY_COL: usize = 5;
const SUM_COL: usize = 12;

#[derive(Debug, Clone)]
pub struct TicketRenderer {
    width: usize,
    timezone: Tz,
}

impl TicketRenderer {
    /// Common widths: 32 chars for 58mm paper, 48 for 80mm
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// One station's share of an order
    pub fn render_kitchen(&self, ticket: &StationTicket, printed_at: i64) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);

        b.center().double_size().bold();
        b.line("ZAKAZ CHEKI");
        b.line(&ticket.order_number);
        b.bold_off().reset_size();
        b.left().sep_double();

        b.line_lr("STOL:", &ticket.table_name);
        b.line_lr("OFITSIANT:", &ticket.staff_name);
        b.line_lr("VAQT:", &format_ticket_time(printed_at, self.timezone));
        b.sep_single();

        for item in &ticket.items {
            b.double_height().bold();
            b.line(&truncate_text(&item.name.to_uppercase(), self.width));
            b.bold_off().reset_size();
            b.line(&format!("  Miqdor: x {}", item.quantity));
        }

        let total: u32 = ticket.items.iter().map(|i| i.quantity).sum();
        b.sep_single();
        b.bold().line(&format!("JAMI: {} TA TAOM", total)).bold_off();
        b.sep_single();

        b.feed(3).cut();
        b.build()
    }

    /// Customer receipt; payment lines are added once the order is paid
    pub fn render_receipt(&self, order: &Order, settings: &Settings) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);
        let currency = settings.currency.as_str();

        b.center().double_size().bold();
        b.line(&settings.restaurant_name);
        b.bold_off().reset_size();
        if !settings.phone.is_empty() {
            b.line(&settings.phone);
        }
        if !settings.address.is_empty() {
            b.line(&settings.address);
        }
        b.newline().left();

        let at = order.completed_at.unwrap_or(order.created_at);
        b.line(&format!("Data: {}", format_ticket_time(at, self.timezone)));
        b.line(&format!("Zakaz: {}", order.formatted_number()));
        b.line(&format!("Ofitsiant: {}", order.staff_name));
        b.line(&format!("Stol: {}", order.table_name));
        b.sep_single();

        let name_col = self.width.saturating_sub(QTY_COL + SUM_COL);
        b.line(&self.columns("Naimenovanie", "Kol", "Summa", name_col));
        for item in &order.items {
            b.line(&self.columns(
                &item.name,
                &item.quantity.to_string(),
                &format_amount(item.line_total()),
                name_col,
            ));
        }
        b.sep_single();

        b.line_lr("Summa:", &with_currency(order.subtotal, currency));
        if let (Some(pct), Some(amount)) = (order.service_percent, order.service_amount)
            && amount > 0.0
        {
            b.line_lr(
                &format!("Obsluzhivanie ({}%):", format_percent(pct)),
                &with_currency(amount, currency),
            );
        }
        if let (Some(pct), Some(amount)) = (order.tax_percent, order.tax_amount)
            && amount > 0.0
        {
            b.line_lr(
                &format!("Nalog ({}%):", format_percent(pct)),
                &with_currency(amount, currency),
            );
        }
        b.sep_double();

        let total = order.final_total.unwrap_or(order.subtotal);
        b.double_height().bold();
        b.line_lr("ITOGO:", &with_currency(total, currency));
        b.bold_off().reset_size();

        if let Some(method) = order.payment_method {
            b.sep_single();
            b.line_lr("Oplata:", method_label(method));
            match &order.mixed_payment {
                Some(mixed) => {
                    b.line_lr("  Nalichnye:", &with_currency(mixed.cash_amount, currency));
                    b.line_lr("  Karta:", &with_currency(mixed.card_amount, currency));
                }
                None => {
                    if let Some(amount) = order.payment_amount {
                        b.line_lr("Polucheno:", &with_currency(amount, currency));
                    }
                }
            }
            if let Some(change) = order.change_amount.filter(|c| *c > 0.0) {
                b.line_lr("Sdacha:", &with_currency(change, currency));
            }
        }

        if !settings.receipt_footer.is_empty() {
            b.newline().center().line(&settings.receipt_footer).left();
        }

        b.feed(3).cut();
        b.build()
    }

    fn columns(&self, name: &str, qty: &str, sum: &str, name_col: usize) -> String {
        format!(
            "{}{}{}",
            pad_text(&truncate_text(name, name_col), name_col, false),
            pad_text(qty, QTY_COL, true),
            pad_text(sum, SUM_COL, true),
        )
    }
}

fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Nalichnye",
        PaymentMethod::Card => "Karta",
        PaymentMethod::Transfer => "Perechislenie",
        PaymentMethod::Mixed => "Smeshannaya",
    }
}

/// `38500` -> `38 500`; fractional amounts keep two decimals
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc().abs() as u64;
    let frac = ((rounded.abs() - rounded.abs().trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}

fn with_currency(amount: f64, currency: &str) -> String {
    format!("{} {}", format_amount(amount), currency)
}

fn format_percent(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{}", pct)
    }
}
