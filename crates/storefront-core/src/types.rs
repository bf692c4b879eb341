//! # Domain Types
//!
//! The store entities the admin site manages.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  1   n  ┌─────────────────┐                       │
//! │  │   Collection    │────────►│    Product      │                       │
//! │  │  ─────────────  │         │  ─────────────  │                       │
//! │  │  id (UUID)      │         │  id (UUID)      │                       │
//! │  │  title          │         │  title, slug    │                       │
//! │  │  featured (opt) │         │  unit_price     │                       │
//! │  └─────────────────┘         │  inventory      │                       │
//! │                              │  last_update    │                       │
//! │                              └────────▲────────┘                       │
//! │                                       │ n                              │
//! │  ┌─────────────────┐  1   n  ┌────────┴────────┐  1   n ┌───────────┐ │
//! │  │    Customer     │────────►│     Order       │───────►│ OrderItem │ │
//! │  │  ─────────────  │         │  ─────────────  │        │ ───────── │ │
//! │  │  names, email   │         │  placed_at      │        │ quantity  │ │
//! │  │  membership     │         │  payment_status │        │ unit_price│ │
//! │  └─────────────────┘         └─────────────────┘        └───────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by a UUID v4 string, generated before insert.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::inventory::InventoryStatus;
use crate::money::Money;

// =============================================================================
// Collection
// =============================================================================

/// A named group of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Collection {
    pub id: String,
    pub title: String,
    /// Product highlighted for this collection, if any.
    pub featured_product_id: Option<String>,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// URL slug, prepopulated from the title when left blank.
    pub slug: String,
    pub description: Option<String>,
    /// Price in cents.
    pub unit_price_cents: i64,
    /// Units on hand.
    pub inventory: i64,
    /// Refreshed on every write.
    #[ts(as = "String")]
    pub last_update: DateTime<Utc>,
    pub collection_id: String,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Low/OK classification shown in the changelist.
    #[inline]
    pub fn inventory_status(&self) -> InventoryStatus {
        InventoryStatus::classify(self.inventory)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

// =============================================================================
// Membership
// =============================================================================

/// Customer membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    Bronze,
    Silver,
    Gold,
}

impl Membership {
    /// Every tier, in display order.
    pub const ALL: [Membership; 3] = [Membership::Bronze, Membership::Silver, Membership::Gold];

    /// Stored value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Membership::Bronze => "bronze",
            Membership::Silver => "silver",
            Membership::Gold => "gold",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Membership::Bronze => "Bronze",
            Membership::Silver => "Silver",
            Membership::Gold => "Gold",
        }
    }
}

impl Default for Membership {
    fn default() -> Self {
        Membership::Bronze
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Membership {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Membership::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "membership".to_string(),
                allowed: Membership::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered store customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

impl Customer {
    /// "First Last", as shown in the order changelist.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Failed,
}

impl PaymentStatus {
    /// Stored value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Complete => "complete",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Complete => "Complete",
            PaymentStatus::Failed => "Failed",
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order placed by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Set once, when the order is created.
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub customer_id: String,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} (customer {}, {}, placed {})",
            self.id,
            self.customer_id,
            self.payment_status,
            self.placed_at.to_rfc3339()
        )
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of an order.
/// The unit price is a snapshot of the product price when the line was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Unit price × quantity; `None` if it overflows.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().checked_mul(self.quantity)
    }
}

/// An order together with its inline items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Sum of all line totals; `None` if any step overflows.
    pub fn total(&self) -> Option<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, item| {
            item.line_total().and_then(|line| acc.checked_add(line))
        })
    }
}

impl fmt::Display for OrderWithItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} item(s), ", self.order, self.items.len())?;
        match self.total() {
            Some(total) => write!(f, "total {}", total),
            None => f.write_str("total out of range"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(quantity: i64, unit_price_cents: i64) -> OrderItem {
        OrderItem {
            id: "item".to_string(),
            order_id: "order".to_string(),
            product_id: "product".to_string(),
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn test_membership_parsing() {
        assert_eq!("gold".parse::<Membership>().unwrap(), Membership::Gold);
        assert_eq!(" Silver ".parse::<Membership>().unwrap(), Membership::Silver);
        assert!("platinum".parse::<Membership>().is_err());
        assert_eq!(Membership::default(), Membership::Bronze);
    }

    #[test]
    fn test_payment_status_default() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_order_display_and_total() {
        let order = OrderWithItems {
            order: Order {
                id: "o-1".to_string(),
                placed_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                payment_status: PaymentStatus::Pending,
                customer_id: "c-1".to_string(),
            },
            items: vec![item(2, 150), item(1, 1000)],
        };

        assert_eq!(order.total(), Some(Money::from_cents(1300)));
        assert_eq!(
            order.to_string(),
            "Order o-1 (customer c-1, Pending, placed 2024-03-01T12:00:00+00:00) with 2 item(s), total 13.00"
        );
    }

    #[test]
    fn test_order_display_survives_overflowing_total() {
        let order = OrderWithItems {
            order: Order {
                id: "o-2".to_string(),
                placed_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                payment_status: PaymentStatus::Pending,
                customer_id: "c-1".to_string(),
            },
            items: vec![item(i64::MAX, 150), item(1, 1000)],
        };

        assert_eq!(order.items[0].line_total(), None);
        assert_eq!(order.total(), None);
        assert!(order.to_string().ends_with("with 2 item(s), total out of range"));

        // Each line fits, the sum does not
        let order = OrderWithItems {
            items: vec![item(1, i64::MAX), item(1, 1)],
            ..order
        };
        assert_eq!(order.total(), None);
    }

    #[test]
    fn test_order_serializes_flat() {
        let order = OrderWithItems {
            order: Order {
                id: "o-1".to_string(),
                placed_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
                payment_status: PaymentStatus::Complete,
                customer_id: "c-1".to_string(),
            },
            items: vec![],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], "o-1");
        assert_eq!(json["payment_status"], "complete");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
