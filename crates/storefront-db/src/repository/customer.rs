//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Key Operations
//! - Changelist annotated with `orders_count` (every order, whatever its status)
//! - Name search by case-insensitive prefix on first or last name
//! - List-editable membership
//! - CRUD and autocomplete for the order form's customer picker

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{prefix_pattern, push_order_by, push_page, ListQuery, Page};
use crate::error::{DbError, DbResult};
use storefront_core::forms::CustomerDraft;
use storefront_core::{Customer, Membership};

/// Sortable changelist columns: `o` parameter value → SQL expression.
const SORTABLE: &[(&str, &str)] = &[
    ("first_name", "c.first_name"),
    ("last_name", "c.last_name"),
    ("membership", "c.membership"),
    ("orders_count", "orders_count"),
];

const DEFAULT_ORDERING: &str = "c.first_name ASC, c.last_name ASC";

const CUSTOMER_COLUMNS: &str =
    "c.id, c.first_name, c.last_name, c.email, c.phone, c.birth_date, c.membership";

/// A changelist row: the customer plus their order count.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CustomerRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub orders_count: i64,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    fn push_name_search(builder: &mut QueryBuilder<'_, Sqlite>, term: &str) {
        let pattern = prefix_pattern(term);
        builder.push("(c.first_name LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" ESCAPE '\\' OR c.last_name LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\')");
    }

    fn push_search(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
        if let Some(term) = query.search_term() {
            builder.push(" WHERE ");
            Self::push_name_search(builder, term);
        }
    }

    /// Lists one changelist page.
    ///
    /// Ordered by first name, then last name, unless the caller sorts on
    /// another column.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Page<CustomerRow>> {
        debug!(search = ?query.search, ordering = ?query.ordering, "Listing customers");

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(CUSTOMER_COLUMNS);
        builder.push(
            ", COUNT(o.id) AS orders_count \
             FROM customers c LEFT JOIN orders o ON o.customer_id = c.id",
        );
        Self::push_search(&mut builder, query);
        builder.push(" GROUP BY c.id");
        push_order_by(
            &mut builder,
            query.ordering.as_ref(),
            SORTABLE,
            DEFAULT_ORDERING,
            "c.id",
        );
        push_page(&mut builder, query.page);

        let rows = builder
            .build_query_as::<CustomerRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut counter = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM customers c");
        Self::push_search(&mut counter, query);
        let total: i64 = counter.build_query_scalar().fetch_one(&self.pool).await?;

        debug!(count = rows.len(), total, "Customers listed");
        Ok(Page::new(rows, total, query.page))
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers c WHERE c.id = ?1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(DbError::Duplicate)` - email already in use
    pub async fn insert(&self, draft: &CustomerDraft) -> DbResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            birth_date: draft.birth_date,
            membership: draft.membership,
        };

        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, first_name, last_name, email, phone, birth_date, membership
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.birth_date)
        .bind(customer.membership)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates an existing customer from the change form.
    pub async fn update(&self, id: &str, draft: &CustomerDraft) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                first_name = ?2,
                last_name = ?3,
                email = ?4,
                phone = ?5,
                birth_date = ?6,
                membership = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(draft.birth_date)
        .bind(draft.membership)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(Customer {
            id: id.to_string(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            birth_date: draft.birth_date,
            membership: draft.membership,
        })
    }

    /// Saves the list-editable `membership` column in one transaction.
    pub async fn update_memberships(&self, memberships: &[(String, Membership)]) -> DbResult<u64> {
        debug!(count = memberships.len(), "Updating memberships");

        let mut tx = self.pool.begin().await?;

        for (id, membership) in memberships {
            let result = sqlx::query("UPDATE customers SET membership = ?2 WHERE id = ?1")
                .bind(id)
                .bind(*membership)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Customer", id));
            }
        }

        tx.commit().await?;

        Ok(memberships.len() as u64)
    }

    /// Deletes a customer.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKey)` - the customer has orders
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Customers whose first or last name starts with `term`.
    pub async fn autocomplete(&self, term: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(CUSTOMER_COLUMNS);
        builder.push(" FROM customers c WHERE ");
        Self::push_name_search(&mut builder, term.trim());
        builder.push(" ORDER BY ");
        builder.push(DEFAULT_ORDERING);
        builder.push(", c.id LIMIT ");
        builder.push_bind(i64::from(limit));

        let customers = builder
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
