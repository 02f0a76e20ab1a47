//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use floor_server::catalog::{Collaborators, InMemoryCatalog};
use floor_server::orders::{OrderStorage, OrdersManager, TableReleasePoint};
use floor_server::printing::PrintDispatcher;
use shared::models::{
    Category, CreateOrderItem, CreateOrderRequest, DiningTable, Food, Printer, Settings, Staff,
    TableStatus,
};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const WAITER: &str = "w-1";
pub const CASHIER: &str = "c-1";

/// Loopback socket that records every payload written to it
pub struct Station {
    pub address: String,
    pub received: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl Station {
    /// Next payload, or `None` after a short wait
    pub async fn next_payload(&mut self) -> Option<Vec<u8>> {
        tokio::time::timeout(Duration::from_secs(2), self.received.recv())
            .await
            .ok()
            .flatten()
    }
}

pub async fn live_station() -> Station {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let (tx, received) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = socket.read_to_end(&mut buf).await;
                let _ = tx.send(buf);
            });
        }
    });

    Station { address, received }
}

/// Address of a loopback port nobody listens on
pub async fn dead_station() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}

pub fn food(id: &str, name: &str, price: f64, category: &str, stock: u32) -> Food {
    Food {
        id: id.into(),
        name: name.into(),
        price,
        category_id: category.into(),
        stock_qty: stock,
        is_active: true,
        expiration_date: None,
        unit: None,
    }
}

/// Restaurant with a hot kitchen and a bar, each routed to its own station
///
/// Settings: service 10 %, tax 0 %, no cashier printer, auto print on.
pub fn restaurant(kitchen: &str, bar: &str) -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();

    catalog.upsert_printer(Printer {
        id: "p-kitchen".into(),
        name: "Kitchen".into(),
        ip_address: kitchen.into(),
        description: None,
    });
    catalog.upsert_printer(Printer {
        id: "p-bar".into(),
        name: "Bar".into(),
        ip_address: bar.into(),
        description: None,
    });
    catalog.upsert_category(Category {
        id: "hot".into(),
        title: "Hot".into(),
        printer_id: Some("p-kitchen".into()),
    });
    catalog.upsert_category(Category {
        id: "drinks".into(),
        title: "Drinks".into(),
        printer_id: Some("p-bar".into()),
    });
    catalog.upsert_category(Category {
        id: "bread".into(),
        title: "Bread".into(),
        printer_id: None,
    });

    catalog.upsert_food(food("plov", "Plov", 25000.0, "hot", 100));
    catalog.upsert_food(food("tea", "Tea", 5000.0, "drinks", 100));
    catalog.upsert_food(food("non", "Non", 3000.0, "bread", 100));

    for n in 1..=6 {
        catalog.upsert_table(DiningTable {
            id: format!("t-{n}"),
            name: format!("Stol {n}"),
            status: TableStatus::Free,
            capacity: Some(4),
            is_active: true,
        });
    }

    for (id, name) in [(WAITER, "Aziza"), (CASHIER, "Bekzod")] {
        catalog.upsert_staff(Staff {
            id: id.into(),
            display_name: name.into(),
            is_active: true,
            commission_percent: 0.0,
        });
    }

    catalog.set_settings(Settings {
        service_percent: 10.0,
        tax_percent: 0.0,
        ..Settings::default()
    });

    Arc::new(catalog)
}

pub fn manager(catalog: Arc<InMemoryCatalog>) -> OrdersManager {
    manager_with_storage(catalog, OrderStorage::open_in_memory().unwrap())
}

pub fn manager_with_storage(catalog: Arc<InMemoryCatalog>, storage: OrderStorage) -> OrdersManager {
    OrdersManager::new(
        storage,
        Collaborators::from_memory(catalog),
        PrintDispatcher::new(
            Duration::from_millis(500),
            sora_printer::DEFAULT_PORT,
            chrono_tz::Asia::Tashkent,
        ),
        TableReleasePoint::Payment,
        chrono_tz::Asia::Tashkent,
    )
}

pub fn order_request(table_id: &str, lines: &[(&str, u32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        table_id: table_id.into(),
        items: lines
            .iter()
            .map(|(food_id, quantity)| CreateOrderItem {
                food_id: (*food_id).into(),
                quantity: *quantity,
            })
            .collect(),
        notes: None,
        client_total: None,
    }
}
