//! # storefront-db: Database Layer for the Storefront Admin
//!
//! This crate provides database access for the storefront admin site.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Admin Data Flow                         │
//! │                                                                         │
//! │  GET /admin/store/collection/?o=-products_count                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ CollectionRepo │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │   │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ CustomerRepo   │   │ ...          │  │   │
//! │  │   │ Management    │    │ OrderRepo      │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./storefront.db (path from AdminConfig)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (collection, product, customer, order)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig, ListQuery};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! // Changelist with the aggregate products_count column
//! let page = db.collections().list(&ListQuery::default()).await?;
//!
//! // Bulk action
//! let cleared = db.products().clear_inventory(&selected_ids).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};

// Repository re-exports for convenience
pub use repository::collection::{CollectionRepository, CollectionRow};
pub use repository::customer::{CustomerRepository, CustomerRow};
pub use repository::order::{OrderListQuery, OrderRepository, OrderRow};
pub use repository::product::{ProductListQuery, ProductRepository, ProductRow};
pub use repository::{ListQuery, Page, PageRequest, SortOrder};
