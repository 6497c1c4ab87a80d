//! Order database
//!
//! Single SQLite connection behind a mutex. Every operation is one short
//! statement (plus a read-back), so holding the lock for the whole call is
//! fine for the request rates this service sees.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::path::Path;

use super::types::{NewOrder, NewOrderStatus, Order, OrderStatus, DEFAULT_STATUS, DEFAULT_STATUSES};
use super::{validate_status, OrderError};
use crate::logger::{self, LogTag};

/// created_at is stored as fixed-width RFC3339 (microseconds, UTC) so TEXT order is chronological
const ORDER_COLUMNS: &str = "id, customer_name, product_id, total, status, created_at";

pub struct OrderStore {
    conn: Mutex<Connection>,
}

impl OrderStore {
    /// Open (or create) the database file
    pub fn open(path: &str) -> Result<Self, OrderError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(5_000))?;

        let store = Self::from_connection(conn)?;
        logger::info(
            LogTag::Database,
            &format!("Order database initialized at {}", path),
        );
        Ok(store)
    }

    /// Private in-memory database (tests, demos)
    pub fn open_in_memory() -> Result<Self, OrderError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, OrderError> {
        initialize_schema(&conn)?;
        seed_statuses(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))?;
        let orders = stmt
            .query_map([], order_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    pub fn get_order(&self, id: i64) -> Result<Option<Order>, OrderError> {
        let conn = self.conn.lock();
        Ok(select_order(&conn, id)?)
    }

    /// Validate and insert a new order, returning the stored record
    pub fn create_order(&self, new_order: NewOrder) -> Result<Order, OrderError> {
        let new_order = new_order.validated()?;
        let status = new_order
            .status
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());
        let created_at = Utc::now();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO orders (customer_name, product_id, total, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new_order.customer_name,
                new_order.product_id,
                new_order.total,
                status,
                created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        )?;
        let id = conn.last_insert_rowid();

        let order = select_order(&conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        logger::debug(
            LogTag::Database,
            &format!("Inserted order {} ({})", order.id, order.customer_name),
        );
        Ok(order)
    }

    /// Set an order's status. Returns None when no order has this id.
    pub fn update_status(&self, id: i64, status: &str) -> Result<Option<Order>, OrderError> {
        let status = validate_status(status)?;

        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(select_order(&conn, id)?)
    }

    pub fn list_statuses(&self) -> Result<Vec<OrderStatus>, OrderError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, name, color FROM order_statuses ORDER BY id ASC")?;
        let statuses = stmt
            .query_map([], status_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statuses)
    }

    pub fn create_status(&self, new_status: NewOrderStatus) -> Result<OrderStatus, OrderError> {
        let name = validate_status(&new_status.name)?.to_string();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO order_statuses (name, color) VALUES (?1, ?2)",
            params![name, new_status.color],
        )?;
        Ok(OrderStatus {
            id: conn.last_insert_rowid(),
            name,
            color: new_status.color,
        })
    }
}

fn initialize_schema(conn: &Connection) -> Result<(), OrderError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_name TEXT NOT NULL,
            product_id INTEGER,
            total REAL NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
        CREATE TABLE IF NOT EXISTS order_statuses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT
        );",
    )?;
    Ok(())
}

/// Insert the default statuses into an empty status table
fn seed_statuses(conn: &Connection) -> Result<(), OrderError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM order_statuses", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    for (name, color) in DEFAULT_STATUSES {
        conn.execute(
            "INSERT INTO order_statuses (name, color) VALUES (?1, ?2)",
            params![name, color],
        )?;
    }
    Ok(())
}

fn select_order(conn: &Connection, id: i64) -> rusqlite::Result<Option<Order>> {
    conn.query_row(
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
        params![id],
        order_from_row,
    )
    .optional()
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let created_at: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Order {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        product_id: row.get(2)?,
        total: row.get(3)?,
        status: row.get(4)?,
        created_at,
    })
}

fn status_from_row(row: &Row<'_>) -> rusqlite::Result<OrderStatus> {
    Ok(OrderStatus {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
    })
}
