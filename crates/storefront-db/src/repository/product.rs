//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Changelist joined with the collection title (select-related)
//! - Sidebar filters: collection, last update, inventory
//! - List-editable unit prices
//! - The "Clear Inventory" bulk action
//!
//! ## Inventory Filter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Filter and column share one threshold                     │
//! │                                                                         │
//! │  ?inventory=<10                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryFilter::parse → Some(Low)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE p.inventory < LOW_INVENTORY_THRESHOLD                           │
//! │                                                                         │
//! │  Every returned row renders InventoryStatus::classify(inventory) = Low │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{contains_pattern, push_order_by, push_page, search_term, Page, PageRequest, SortOrder};
use crate::error::{DbError, DbResult};
use storefront_core::dates::DateRange;
use storefront_core::forms::ProductDraft;
use storefront_core::inventory::LOW_INVENTORY_THRESHOLD;
use storefront_core::{InventoryStatus, Money, Product};

/// Sortable changelist columns: `o` parameter value → SQL expression.
///
/// `inventory_status` sorts by the underlying inventory count.
const SORTABLE: &[(&str, &str)] = &[
    ("title", "p.title"),
    ("unit_price", "p.unit_price_cents"),
    ("inventory", "p.inventory"),
    ("inventory_status", "p.inventory"),
    ("collection_title", "collection_title"),
    ("last_update", "p.last_update"),
];

const PRODUCT_COLUMNS: &str = "p.id, p.title, p.slug, p.description, p.unit_price_cents, \
                               p.inventory, p.last_update, p.collection_id";

/// Ids bound per `UPDATE ... WHERE id IN (...)` of the clear-inventory action.
pub const CLEAR_INVENTORY_CHUNK: usize = 500;

/// Changelist query of the product admin.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub collection_id: Option<String>,
    pub last_update: Option<DateRange>,
    pub inventory: Option<InventoryStatus>,
    pub ordering: Option<SortOrder>,
    pub page: PageRequest,
}

impl ProductListQuery {
    fn push_filters(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut clause = " WHERE ";

        if let Some(term) = search_term(self.search.as_deref()) {
            builder.push(clause);
            builder.push("p.title LIKE ");
            builder.push_bind(contains_pattern(term));
            builder.push(" ESCAPE '\\'");
            clause = " AND ";
        }

        if let Some(collection_id) = &self.collection_id {
            builder.push(clause);
            builder.push("p.collection_id = ");
            builder.push_bind(collection_id.clone());
            clause = " AND ";
        }

        if let Some(range) = self.last_update {
            builder.push(clause);
            builder.push("p.last_update >= ");
            builder.push_bind(range.since);
            builder.push(" AND p.last_update < ");
            builder.push_bind(range.until);
            clause = " AND ";
        }

        if let Some(status) = self.inventory {
            builder.push(clause);
            builder.push(match status {
                InventoryStatus::Low => "p.inventory < ",
                InventoryStatus::Ok => "p.inventory >= ",
            });
            builder.push_bind(LOW_INVENTORY_THRESHOLD);
        }
    }
}

/// A changelist row: the product plus its collection's title.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub collection_title: String,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Low-stock products of one collection
/// let page = repo.list(&ProductListQuery {
///     collection_id: Some(collection_id),
///     inventory: Some(InventoryStatus::Low),
///     ..Default::default()
/// }).await?;
///
/// // Bulk action
/// let cleared = repo.clear_inventory(&selected).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists one changelist page.
    ///
    /// Default ordering is by title.
    pub async fn list(&self, query: &ProductListQuery) -> DbResult<Page<ProductRow>> {
        debug!(
            search = ?query.search,
            collection_id = ?query.collection_id,
            inventory = ?query.inventory,
            "Listing products"
        );

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(PRODUCT_COLUMNS);
        builder.push(
            ", c.title AS collection_title \
             FROM products p INNER JOIN collections c ON c.id = p.collection_id",
        );
        query.push_filters(&mut builder);
        push_order_by(
            &mut builder,
            query.ordering.as_ref(),
            SORTABLE,
            "p.title ASC",
            "p.id",
        );
        push_page(&mut builder, query.page);

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut counter = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products p");
        query.push_filters(&mut counter);
        let total: i64 = counter.build_query_scalar().fetch_one(&self.pool).await?;

        debug!(count = rows.len(), total, "Products listed");
        Ok(Page::new(rows, total, query.page))
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE p.id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product, stamping `last_update`.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKey)` - collection doesn't exist
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            unit_price_cents: draft.unit_price.cents(),
            inventory: draft.inventory,
            last_update: Utc::now(),
            collection_id: draft.collection_id.clone(),
        };

        debug!(id = %product.id, slug = %product.slug, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, slug, description,
                unit_price_cents, inventory, last_update, collection_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(product.inventory)
        .bind(product.last_update)
        .bind(&product.collection_id)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates an existing product from the change form.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the stored product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                title = ?2,
                slug = ?3,
                description = ?4,
                unit_price_cents = ?5,
                inventory = ?6,
                last_update = ?7,
                collection_id = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.unit_price.cents())
        .bind(draft.inventory)
        .bind(now)
        .bind(&draft.collection_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(Product {
            id: id.to_string(),
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            unit_price_cents: draft.unit_price.cents(),
            inventory: draft.inventory,
            last_update: now,
            collection_id: draft.collection_id.clone(),
        })
    }

    /// Saves the list-editable `unit_price` column.
    ///
    /// All rows are written in one transaction; an unknown id rolls back
    /// the whole batch.
    pub async fn update_unit_prices(&self, prices: &[(String, Money)]) -> DbResult<u64> {
        debug!(count = prices.len(), "Updating unit prices");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (id, price) in prices {
            let result = sqlx::query(
                "UPDATE products SET unit_price_cents = ?2, last_update = ?3 WHERE id = ?1",
            )
            .bind(id)
            .bind(price.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", id));
            }
        }

        tx.commit().await?;

        Ok(prices.len() as u64)
    }

    /// Sets the inventory of the selected products to zero.
    ///
    /// Only the selected rows are touched; their `last_update` is
    /// refreshed. Unknown and repeated ids are ignored. The ids are bound
    /// [`CLEAR_INVENTORY_CHUNK`] at a time inside one transaction, so any
    /// selection size stays under SQLite's bind-variable limit.
    ///
    /// ## Returns
    /// Number of products updated.
    pub async fn clear_inventory(&self, ids: &[String]) -> DbResult<u64> {
        let mut selected: Vec<&str> = ids.iter().map(String::as_str).collect();
        selected.sort_unstable();
        selected.dedup();

        if selected.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for chunk in selected.chunks(CLEAR_INVENTORY_CHUNK) {
            let mut builder =
                QueryBuilder::<Sqlite>::new("UPDATE products SET inventory = 0, last_update = ");
            builder.push_bind(now);
            builder.push(" WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            updated += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        info!(selected = selected.len(), updated, "Cleared product inventory");
        Ok(updated)
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKey)` - order items still reference it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Products whose title contains `term`, for autocomplete widgets.
    pub async fn autocomplete(&self, term: &str, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE p.title LIKE ?1 ESCAPE '\\' \
             ORDER BY p.title, p.id LIMIT ?2",
            PRODUCT_COLUMNS
        ))
        .bind(contains_pattern(term.trim()))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{collection, customer, order, product, test_db};
    use chrono::Duration;
    use storefront_core::InventoryFilter;

    #[tokio::test]
    async fn test_inventory_filter_matches_status_column() {
        let db = test_db().await;
        let col = collection(&db, "Stock").await;
        for inventory in 0..=20 {
            product(&db, &col.id, &format!("Item {:02}", inventory), inventory).await;
        }

        let query = ProductListQuery {
            inventory: InventoryFilter::parse(Some(InventoryFilter::LOW_LOOKUP)),
            page: PageRequest::new(1, 100),
            ..Default::default()
        };
        let low = db.products().list(&query).await.unwrap();

        assert_eq!(low.total, LOW_INVENTORY_THRESHOLD);
        assert!(low
            .rows
            .iter()
            .all(|row| row.product.inventory_status() == InventoryStatus::Low));

        let all = db
            .products()
            .list(&ProductListQuery {
                page: PageRequest::new(1, 100),
                ..Default::default()
            })
            .await
            .unwrap();
        let low_in_all = all
            .rows
            .iter()
            .filter(|row| row.product.inventory_status() == InventoryStatus::Low)
            .count() as i64;
        assert_eq!(low_in_all, low.total);
    }

    #[tokio::test]
    async fn test_clear_inventory_only_touches_selected() {
        let db = test_db().await;
        let col = collection(&db, "Snacks").await;
        let a = product(&db, &col.id, "Chips", 40).await;
        let b = product(&db, &col.id, "Pretzels", 7).await;
        let c = product(&db, &col.id, "Nuts", 15).await;

        let updated = db
            .products()
            .clear_inventory(&[a.id.clone(), b.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let repo = db.products();
        let a_after = repo.get_by_id(&a.id).await.unwrap().unwrap();
        let b_after = repo.get_by_id(&b.id).await.unwrap().unwrap();
        let c_after = repo.get_by_id(&c.id).await.unwrap().unwrap();

        assert_eq!(a_after.inventory, 0);
        assert_eq!(b_after.inventory, 0);
        assert!(a_after.last_update >= a.last_update);
        assert_eq!(c_after, c);

        assert_eq!(repo.clear_inventory(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_inventory_selection_larger_than_one_statement() {
        let db = test_db().await;
        let col = collection(&db, "Snacks").await;
        let a = product(&db, &col.id, "Chips", 40).await;
        let b = product(&db, &col.id, "Pretzels", 7).await;
        let c = product(&db, &col.id, "Nuts", 15).await;

        // Real ids at both ends, repeats, and far more ids than one IN list binds
        let mut ids = vec![a.id.clone(), a.id.clone()];
        ids.extend((0..40_000).map(|n| format!("missing-{}", n)));
        ids.push(b.id.clone());

        let updated = db.products().clear_inventory(&ids).await.unwrap();
        assert_eq!(updated, 2);

        let repo = db.products();
        assert_eq!(repo.get_by_id(&a.id).await.unwrap().unwrap().inventory, 0);
        assert_eq!(repo.get_by_id(&b.id).await.unwrap().unwrap().inventory, 0);
        assert_eq!(repo.get_by_id(&c.id).await.unwrap().unwrap().inventory, 15);
    }

    #[tokio::test]
    async fn test_list_joins_collection_title_and_filters_by_collection() {
        let db = test_db().await;
        let snacks = collection(&db, "Snacks").await;
        let dairy = collection(&db, "Dairy").await;
        product(&db, &snacks.id, "Chips", 3).await;
        product(&db, &dairy.id, "Milk", 30).await;

        let page = db
            .products()
            .list(&ProductListQuery {
                collection_id: Some(dairy.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].product.title, "Milk");
        assert_eq!(page.rows[0].collection_title, "Dairy");
    }

    #[tokio::test]
    async fn test_last_update_range_filter() {
        let db = test_db().await;
        let col = collection(&db, "Fresh").await;
        product(&db, &col.id, "Apples", 5).await;

        let now = Utc::now();
        let around_now = DateRange {
            since: now - Duration::hours(1),
            until: now + Duration::hours(1),
        };
        let last_year = DateRange {
            since: now - Duration::days(400),
            until: now - Duration::days(365),
        };

        let repo = db.products();
        let hit = repo
            .list(&ProductListQuery {
                last_update: Some(around_now),
                ..Default::default()
            })
            .await
            .unwrap();
        let miss = repo
            .list(&ProductListQuery {
                last_update: Some(last_year),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(hit.total, 1);
        assert_eq!(miss.total, 0);
    }

    #[tokio::test]
    async fn test_order_by_inventory_status_and_search() {
        let db = test_db().await;
        let col = collection(&db, "Mixed").await;
        product(&db, &col.id, "Cola Zero", 50).await;
        product(&db, &col.id, "Cola", 2).await;
        product(&db, &col.id, "Water", 9).await;

        let page = db
            .products()
            .list(&ProductListQuery {
                search: Some("COLA".to_string()),
                ordering: Some(SortOrder::asc("inventory_status")),
                ..Default::default()
            })
            .await
            .unwrap();

        let titles: Vec<&str> = page.rows.iter().map(|r| r.product.title.as_str()).collect();
        assert_eq!(titles, vec!["Cola", "Cola Zero"]);
    }

    #[tokio::test]
    async fn test_update_unit_prices_is_atomic() {
        let db = test_db().await;
        let col = collection(&db, "Bakery").await;
        let bread = product(&db, &col.id, "Bread", 5).await;
        let repo = db.products();

        let updated = repo
            .update_unit_prices(&[(bread.id.clone(), Money::from_cents(250))])
            .await
            .unwrap();
        assert_eq!(updated, 1);
        assert_eq!(
            repo.get_by_id(&bread.id).await.unwrap().unwrap().unit_price_cents,
            250
        );

        let err = repo
            .update_unit_prices(&[
                (bread.id.clone(), Money::from_cents(999)),
                ("missing".to_string(), Money::from_cents(999)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(
            repo.get_by_id(&bread.id).await.unwrap().unwrap().unit_price_cents,
            250
        );
    }

    #[tokio::test]
    async fn test_delete_is_refused_while_ordered() {
        let db = test_db().await;
        let col = collection(&db, "Bakery").await;
        let bread = product(&db, &col.id, "Bread", 5).await;
        let cake = product(&db, &col.id, "Cake", 5).await;
        let ada = customer(&db, "Ada", "Lovelace").await;
        order(&db, &ada.id, &[&bread.id]).await;

        let err = db.products().delete(&bread.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)));

        db.products().delete(&cake.id).await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_into_missing_collection() {
        let db = test_db().await;
        let draft = crate::repository::fixtures::product_draft("missing", "Orphan", 1);
        let err = db.products().insert(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)));
    }
}
