//! # Collection Repository
//!
//! Database operations for collections.
//!
//! ## Key Operations
//! - Changelist annotated with `products_count`
//! - CRUD operations (delete refused while products reference the collection)
//! - Autocomplete for the product form's collection picker
//!
//! ## Aggregate Annotation
//! ```text
//! collections c  LEFT JOIN  products p ON p.collection_id = c.id
//!
//! c.id │ c.title  │ p.id          GROUP BY c.id      c.title  │ products_count
//! ─────┼──────────┼──────    ─────────────────────►  ─────────┼───────────────
//!  a   │ Snacks   │ p1                                Snacks   │ 2
//!  a   │ Snacks   │ p2                                Bakery   │ 0
//!  b   │ Bakery   │ NULL     COUNT(p.id) skips NULL
//! ```

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{contains_pattern, push_order_by, push_page, ListQuery, Page};
use crate::error::{DbError, DbResult};
use storefront_core::forms::CollectionDraft;
use storefront_core::Collection;

/// Sortable changelist columns: `o` parameter value → SQL expression.
const SORTABLE: &[(&str, &str)] = &[
    ("title", "c.title"),
    ("products_count", "products_count"),
];

/// A changelist row: the collection plus its product count.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CollectionRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub collection: Collection,
    pub products_count: i64,
}

/// Repository for collection database operations.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: SqlitePool,
}

impl CollectionRepository {
    /// Creates a new CollectionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CollectionRepository { pool }
    }

    fn push_search<'a>(builder: &mut QueryBuilder<'a, Sqlite>, query: &ListQuery) {
        if let Some(term) = query.search_term() {
            builder.push(" WHERE c.title LIKE ");
            builder.push_bind(contains_pattern(term));
            builder.push(" ESCAPE '\\'");
        }
    }

    /// Lists one changelist page.
    ///
    /// Search matches the title anywhere, case-insensitively. Default
    /// ordering is by title.
    pub async fn list(&self, query: &ListQuery) -> DbResult<Page<CollectionRow>> {
        debug!(search = ?query.search, ordering = ?query.ordering, "Listing collections");

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT c.id, c.title, c.featured_product_id, COUNT(p.id) AS products_count \
             FROM collections c LEFT JOIN products p ON p.collection_id = c.id",
        );
        Self::push_search(&mut builder, query);
        builder.push(" GROUP BY c.id");
        push_order_by(
            &mut builder,
            query.ordering.as_ref(),
            SORTABLE,
            "c.title ASC",
            "c.id",
        );
        push_page(&mut builder, query.page);

        let rows = builder
            .build_query_as::<CollectionRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut counter = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM collections c");
        Self::push_search(&mut counter, query);
        let total: i64 = counter.build_query_scalar().fetch_one(&self.pool).await?;

        debug!(count = rows.len(), total, "Collections listed");
        Ok(Page::new(rows, total, query.page))
    }

    /// Gets a collection by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Collection>> {
        let collection = sqlx::query_as::<_, Collection>(
            "SELECT id, title, featured_product_id FROM collections WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collection)
    }

    /// Inserts a new collection.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKey)` - featured product doesn't exist
    pub async fn insert(&self, draft: &CollectionDraft) -> DbResult<Collection> {
        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            featured_product_id: draft.featured_product_id.clone(),
        };

        debug!(id = %collection.id, title = %collection.title, "Inserting collection");

        sqlx::query("INSERT INTO collections (id, title, featured_product_id) VALUES (?1, ?2, ?3)")
            .bind(&collection.id)
            .bind(&collection.title)
            .bind(&collection.featured_product_id)
            .execute(&self.pool)
            .await?;

        Ok(collection)
    }

    /// Updates an existing collection.
    pub async fn update(&self, id: &str, draft: &CollectionDraft) -> DbResult<Collection> {
        debug!(id = %id, "Updating collection");

        let result =
            sqlx::query("UPDATE collections SET title = ?2, featured_product_id = ?3 WHERE id = ?1")
                .bind(id)
                .bind(&draft.title)
                .bind(&draft.featured_product_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Collection", id));
        }

        Ok(Collection {
            id: id.to_string(),
            title: draft.title.clone(),
            featured_product_id: draft.featured_product_id.clone(),
        })
    }

    /// Deletes a collection.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKey)` - products still belong to it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting collection");

        let result = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Collection", id));
        }

        Ok(())
    }

    /// Collections whose title contains `term`, for autocomplete widgets.
    pub async fn autocomplete(&self, term: &str, limit: u32) -> DbResult<Vec<Collection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, title, featured_product_id FROM collections \
             WHERE title LIKE ?1 ESCAPE '\\' ORDER BY title, id LIMIT ?2",
        )
        .bind(contains_pattern(term.trim()))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    /// All collections by title, for the product changelist's sidebar filter.
    pub async fn all(&self) -> DbResult<Vec<Collection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, title, featured_product_id FROM collections ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    /// Counts all collections.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
