//! # Order Repository
//!
//! Database operations for orders and their inline items.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create(&OrderDraft)                               │
//! │                                                                         │
//! │  1..=10 items? ── no ──► DbError::Rule(CoreError::OrderItemCount)      │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── INSERT orders (placed_at = now)                                   │
//! │  ├── for each item:                                                    │
//! │  │     SELECT unit_price_cents FROM products   ← price snapshot        │
//! │  │     INSERT order_items                                              │
//! │  COMMIT                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderWithItems  (the caller fires the order-created signal)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Each item copies the product's unit price when it is saved, so later
//! price edits never change existing orders.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{push_order_by, push_page, Page, PageRequest, SortOrder};
use crate::error::{DbError, DbResult};
use storefront_core::forms::{OrderChange, OrderDraft, OrderItemDraft};
use storefront_core::validation::order_item_count_in_bounds;
use storefront_core::{CoreError, Order, OrderItem, OrderWithItems, MAX_ORDER_ITEMS, MIN_ORDER_ITEMS};

/// Sortable changelist columns: `o` parameter value → SQL expression.
const SORTABLE: &[(&str, &str)] = &[
    ("id", "o.id"),
    ("placed_at", "o.placed_at"),
    ("payment_status", "o.payment_status"),
    ("customer", "cu.first_name || ' ' || cu.last_name"),
];

/// Changelist query of the order admin.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub customer_id: Option<String>,
    pub ordering: Option<SortOrder>,
    pub page: PageRequest,
}

impl OrderListQuery {
    fn push_filters(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(customer_id) = &self.customer_id {
            builder.push(" WHERE o.customer_id = ");
            builder.push_bind(customer_id.clone());
        }
    }
}

/// A changelist row: the order plus its customer's name.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub customer_first_name: String,
    pub customer_last_name: String,
}

impl OrderRow {
    /// "First Last" of the ordering customer.
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.customer_first_name, self.customer_last_name)
    }
}

fn check_item_count(count: usize) -> DbResult<()> {
    if !order_item_count_in_bounds(count) {
        return Err(CoreError::OrderItemCount {
            count,
            min: MIN_ORDER_ITEMS,
            max: MAX_ORDER_ITEMS,
        }
        .into());
    }
    Ok(())
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists one changelist page, newest first by default.
    pub async fn list(&self, query: &OrderListQuery) -> DbResult<Page<OrderRow>> {
        debug!(customer_id = ?query.customer_id, "Listing orders");

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT o.id, o.placed_at, o.payment_status, o.customer_id, \
             cu.first_name AS customer_first_name, cu.last_name AS customer_last_name \
             FROM orders o INNER JOIN customers cu ON cu.id = o.customer_id",
        );
        query.push_filters(&mut builder);
        push_order_by(
            &mut builder,
            query.ordering.as_ref(),
            SORTABLE,
            "o.placed_at DESC",
            "o.id",
        );
        push_page(&mut builder, query.page);

        let rows = builder
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut counter = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders o");
        query.push_filters(&mut counter);
        let total: i64 = counter.build_query_scalar().fetch_one(&self.pool).await?;

        debug!(count = rows.len(), total, "Orders listed");
        Ok(Page::new(rows, total, query.page))
    }

    /// Gets an order together with its items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<OrderWithItems>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, placed_at, payment_status, customer_id FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Gets the items of an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, quantity, unit_price_cents \
             FROM order_items WHERE order_id = ?1 ORDER BY rowid",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Creates an order with its items in one transaction.
    ///
    /// ## Returns
    /// * `Ok(OrderWithItems)` - the committed order
    /// * `Err(DbError::Rule)` - item count outside 1..=10
    /// * `Err(DbError::NotFound)` - an item references an unknown product
    /// * `Err(DbError::ForeignKey)` - unknown customer
    pub async fn create(&self, draft: &OrderDraft) -> DbResult<OrderWithItems> {
        check_item_count(draft.items.len())?;

        let order = Order {
            id: Uuid::new_v4().to_string(),
            placed_at: Utc::now(),
            payment_status: draft.payment_status,
            customer_id: draft.customer_id.clone(),
        };

        debug!(id = %order.id, customer_id = %order.customer_id, "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, placed_at, payment_status, customer_id) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&order.id)
        .bind(order.placed_at)
        .bind(order.payment_status)
        .bind(&order.customer_id)
        .execute(&mut *tx)
        .await?;

        let items = insert_items(&mut *tx, &order.id, &draft.items, &HashMap::new()).await?;

        tx.commit().await?;

        info!(id = %order.id, items = items.len(), "Order created");
        Ok(OrderWithItems { order, items })
    }

    /// Saves the order change form.
    ///
    /// When `change.items` is present the inline items are replaced as a
    /// whole; lines for products already on the order keep their price
    /// snapshot.
    pub async fn update(&self, id: &str, change: &OrderChange) -> DbResult<OrderWithItems> {
        if let Some(items) = &change.items {
            check_item_count(items.len())?;
        }

        debug!(id = %id, "Updating order");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE orders SET payment_status = ?2, customer_id = ?3 WHERE id = ?1")
            .bind(id)
            .bind(change.payment_status)
            .bind(&change.customer_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        if let Some(items) = &change.items {
            let existing: Vec<(String, i64)> = sqlx::query_as(
                "SELECT product_id, unit_price_cents FROM order_items WHERE order_id = ?1",
            )
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
            let snapshots: HashMap<String, i64> = existing.into_iter().collect();

            sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_items(&mut *tx, id, items, &snapshots).await?;
        }

        tx.commit().await?;

        self.get_with_items(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Deletes an order; its items go with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts order items, snapshotting each product's current price unless
/// `snapshots` already holds one for that product.
async fn insert_items(
    conn: &mut SqliteConnection,
    order_id: &str,
    drafts: &[OrderItemDraft],
    snapshots: &HashMap<String, i64>,
) -> DbResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let unit_price_cents = match snapshots.get(&draft.product_id) {
            Some(price) => *price,
            None => {
                let price: Option<i64> =
                    sqlx::query_scalar("SELECT unit_price_cents FROM products WHERE id = ?1")
                        .bind(&draft.product_id)
                        .fetch_optional(&mut *conn)
                        .await?;
                price.ok_or_else(|| DbError::not_found("Product", &draft.product_id))?
            }
        };

        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: draft.product_id.clone(),
            quantity: draft.quantity,
            unit_price_cents,
        };

        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .execute(&mut *conn)
        .await?;

        items.push(item);
    }

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================
