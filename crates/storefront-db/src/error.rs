//! # Database Error Types
//!
//! How a failed store query is reported to the admin layer.
//!
//! ## Constraint Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite result                          DbError            admin        │
//! │  ─────────────                          ───────            ─────        │
//! │  no row for the id                  ──► NotFound       ──► 404          │
//! │  UNIQUE (customers.email)           ──► Duplicate      ──► 409          │
//! │  FOREIGN KEY (protected delete,     ──► ForeignKey     ──► 409          │
//! │    unknown collection / customer)                                       │
//! │  CHECK (price ≥ 100, quantity > 0)  ──► Check          ──► 400          │
//! │  CoreError raised inside a write    ──► Rule           ──► 400          │
//! │  pool timed out / closed            ──► Unavailable    ──► 500          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::error::ErrorKind;
use storefront_core::CoreError;
use thiserror::Error;

/// Errors of the store repositories.
#[derive(Debug, Error)]
pub enum DbError {
    /// The id names no row of this model.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A unique column already holds the submitted value.
    #[error("{column} is already in use")]
    Duplicate { column: String },

    /// The write breaks a relation: deleting a row other rows still point
    /// at, or pointing at a row that does not exist.
    #[error("Related object check failed: {0}")]
    ForeignKey(String),

    /// A CHECK constraint of the schema rejected the values.
    #[error("Value out of range: {0}")]
    Check(String),

    /// A write was refused by an admin rule (e.g. inline item bounds).
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// The database file could not be opened.
    #[error("Cannot open database {location}: {reason}")]
    Open { location: String, reason: String },

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No connection could be acquired, or the pool is closed.
    #[error("Database unavailable")]
    Unavailable,

    /// Any other SQLite failure.
    #[error("Query failed: {0}")]
    Query(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(column: impl Into<String>) -> Self {
        DbError::Duplicate {
            column: column.into(),
        }
    }
}

/// Column of a `UNIQUE constraint failed: customers.email` message.
fn unique_column(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .and_then(|target| target.split(", ").next())
        .map(|column| column.rsplit('.').next().unwrap_or(column))
        .unwrap_or(message)
        .to_string()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Object", "unknown"),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::duplicate(unique_column(message)),
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKey(message.to_string()),
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::Check(message.to_string())
                    }
                    _ => DbError::Query(message.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DbError::Unavailable,
            other => DbError::Query(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{collection, customer_draft, product_draft, test_db};
    use storefront_core::ValidationError;

    #[test]
    fn test_unique_column() {
        assert_eq!(unique_column("UNIQUE constraint failed: customers.email"), "email");
        assert_eq!(
            unique_column("UNIQUE constraint failed: products.slug, products.collection_id"),
            "slug"
        );
    }

    #[test]
    fn test_rule_error_is_transparent() {
        let err: DbError = CoreError::Validation(ValidationError::Required {
            field: "title".to_string(),
        })
        .into();
        assert_eq!(err.to_string(), "Validation error: title is required");
    }

    #[tokio::test]
    async fn test_constraint_failures_are_classified() {
        let db = test_db().await;

        db.customers().insert(&customer_draft("Ada", "Lovelace")).await.unwrap();
        let err = db
            .customers()
            .insert(&customer_draft("Ada", "Lovelace"))
            .await
            .unwrap_err();
        assert!(matches!(&err, DbError::Duplicate { column } if column == "email"));

        let err = db
            .products()
            .insert(&product_draft("no-such-collection", "Tea", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)));

        // Bypasses the form validation that normally stops this
        let snacks = collection(&db, "Snacks").await;
        let err: DbError = sqlx::query(
            "INSERT INTO products (id, title, slug, unit_price_cents, inventory, collection_id, last_update)
             VALUES ('p-1', 'Gum', 'gum', 10, 1, ?, CURRENT_TIMESTAMP)",
        )
        .bind(&snacks.id)
        .execute(db.pool())
        .await
        .unwrap_err()
        .into();
        assert!(matches!(err, DbError::Check(_)));
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let db = test_db().await;
        db.close().await;

        let err = db.collections().count().await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable));
    }
}
