//! # storefront-core: Pure Domain Logic for the Storefront Admin
//!
//! This crate holds every rule the admin site applies to the store data,
//! expressed as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Admin Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin Frontend                               │   │
//! │  │   Changelists ──► Filters ──► Bulk actions ──► Edit forms       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    admin-server (axum)                          │   │
//! │  │   CollectionAdmin, ProductAdmin, CustomerAdmin, OrderAdmin      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌────────────────┐   │   │
//! │  │   │  types   │ │  money   │ │ inventory │ │ dates / links  │   │   │
//! │  │   │ Product  │ │  Money   │ │ Low / OK  │ │ filters, URLs  │   │   │
//! │  │   │ Order    │ │ parsing  │ │ filter    │ │ messages       │   │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └────────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db (Database Layer)                  │   │
//! │  │       SQLite queries, aggregate annotations, bulk updates       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Collection, Product, Customer, Order, OrderItem)
//! - [`money`] - Money type with integer arithmetic and decimal parsing
//! - [`inventory`] - Low/OK inventory classification and the inventory filter
//! - [`dates`] - Last-update date filter ranges
//! - [`links`] - Changelist URLs and filtered links
//! - [`messages`] - Admin user messages and their levels
//! - [`validation`] - Field validation and slug prepopulation
//! - [`forms`] - Add/change payloads and their `clean()` step
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::inventory::InventoryStatus;
//! use storefront_core::money::Money;
//!
//! assert_eq!(InventoryStatus::classify(9), InventoryStatus::Low);
//! assert_eq!(InventoryStatus::classify(10), InventoryStatus::Ok);
//!
//! let price: Money = "12.5".parse().unwrap();
//! assert_eq!(price.cents(), 1250);
//! ```

pub mod dates;
pub mod error;
pub mod forms;
pub mod inventory;
pub mod links;
pub mod messages;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use inventory::{InventoryFilter, InventoryStatus};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// App label every store model is registered under in the admin site.
pub const STORE_APP_LABEL: &str = "store";

/// Minimum number of items an order may hold in the inline editor.
pub const MIN_ORDER_ITEMS: usize = 1;

/// Maximum number of items an order may hold in the inline editor.
pub const MAX_ORDER_ITEMS: usize = 10;

/// Smallest accepted product unit price, in cents (1.00).
pub const MIN_UNIT_PRICE_CENTS: i64 = 100;

/// Largest quantity of one order line (a small positive integer column).
pub const MAX_ITEM_QUANTITY: i64 = 32_767;
