//! # Admin Forms
//!
//! Raw add/change payloads as submitted by the admin frontend, and the
//! `clean()` step that turns them into validated drafts.
//!
//! ```text
//! ProductForm (JSON)  ──clean()──►  ProductDraft  ──►  ProductRepository
//!   unit_price: "12.5"                unit_price: Money(1250)
//!   slug: null                        slug: "title-derived"
//! ```
//!
//! Only the order forms can fail with a [`CoreError`] beyond plain field
//! validation: the inline item editor must hold between
//! [`MIN_ORDER_ITEMS`] and [`MAX_ORDER_ITEMS`] items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Membership, PaymentStatus};
use crate::validation::{
    order_item_count_in_bounds, prepopulate_slug, validate_email, validate_inventory,
    validate_quantity, validate_required_text, validate_unit_price, ValidationResult,
};
use crate::{MAX_ORDER_ITEMS, MIN_ORDER_ITEMS};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Collection
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CollectionForm {
    pub title: String,
    #[serde(default)]
    pub featured_product_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDraft {
    pub title: String,
    pub featured_product_id: Option<String>,
}

impl CollectionForm {
    pub fn clean(self) -> ValidationResult<CollectionDraft> {
        Ok(CollectionDraft {
            title: validate_required_text("title", &self.title)?,
            featured_product_id: non_blank(self.featured_product_id),
        })
    }
}

// =============================================================================
// Product
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductForm {
    pub title: String,
    /// Left blank to prepopulate from the title.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal text, e.g. `"12.50"`.
    pub unit_price: String,
    pub inventory: i64,
    pub collection_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub inventory: i64,
    pub collection_id: String,
}

impl ProductForm {
    pub fn clean(self) -> ValidationResult<ProductDraft> {
        let title = validate_required_text("title", &self.title)?;
        let slug = prepopulate_slug(self.slug.as_deref(), &title)?;
        let unit_price = validate_unit_price(self.unit_price.parse()?)?;

        Ok(ProductDraft {
            slug,
            title,
            description: non_blank(self.description),
            unit_price,
            inventory: validate_inventory(self.inventory)?,
            collection_id: validate_required_text("collection", &self.collection_id)?,
        })
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub membership: Option<Membership>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

impl CustomerForm {
    pub fn clean(self) -> ValidationResult<CustomerDraft> {
        Ok(CustomerDraft {
            first_name: validate_required_text("first_name", &self.first_name)?,
            last_name: validate_required_text("last_name", &self.last_name)?,
            email: validate_email(&self.email)?,
            phone: validate_required_text("phone", &self.phone)?,
            birth_date: self.birth_date,
            membership: self.membership.unwrap_or_default(),
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// One row of the inline order item editor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemForm {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemDraft {
    pub product_id: String,
    pub quantity: i64,
}

fn clean_items(items: Vec<OrderItemForm>) -> CoreResult<Vec<OrderItemDraft>> {
    if !order_item_count_in_bounds(items.len()) {
        return Err(CoreError::OrderItemCount {
            count: items.len(),
            min: MIN_ORDER_ITEMS,
            max: MAX_ORDER_ITEMS,
        });
    }

    items
        .into_iter()
        .map(|item| -> CoreResult<OrderItemDraft> {
            Ok(OrderItemDraft {
                product_id: validate_required_text("product", &item.product_id)?,
                quantity: validate_quantity(item.quantity)?,
            })
        })
        .collect()
}

/// Add form of the order admin.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderForm {
    pub customer_id: String,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    pub items: Vec<OrderItemForm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: String,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItemDraft>,
}

impl OrderForm {
    pub fn clean(self) -> CoreResult<OrderDraft> {
        Ok(OrderDraft {
            customer_id: validate_required_text("customer", &self.customer_id)?,
            payment_status: self.payment_status.unwrap_or_default(),
            items: clean_items(self.items)?,
        })
    }
}

/// Change form of the order admin: the editable fields plus, optionally,
/// a full replacement of the inline items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderChangeForm {
    pub payment_status: PaymentStatus,
    pub customer_id: String,
    #[serde(default)]
    pub items: Option<Vec<OrderItemForm>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderChange {
    pub payment_status: PaymentStatus,
    pub customer_id: String,
    pub items: Option<Vec<OrderItemDraft>>,
}

impl OrderChangeForm {
    pub fn clean(self) -> CoreResult<OrderChange> {
        Ok(OrderChange {
            payment_status: self.payment_status,
            customer_id: validate_required_text("customer", &self.customer_id)?,
            items: self.items.map(clean_items).transpose()?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn product_form(unit_price: &str) -> ProductForm {
        ProductForm {
            title: " Dark Roast Coffee ".to_string(),
            slug: None,
            description: Some("   ".to_string()),
            unit_price: unit_price.to_string(),
            inventory: 4,
            collection_id: "col-1".to_string(),
        }
    }

    fn items(n: usize) -> Vec<OrderItemForm> {
        (0..n)
            .map(|i| OrderItemForm {
                product_id: format!("p-{}", i),
                quantity: 1,
            })
            .collect()
    }

    #[test]
    fn test_product_form_clean() {
        let draft = product_form("12.5").clean().unwrap();
        assert_eq!(draft.title, "Dark Roast Coffee");
        assert_eq!(draft.slug, "dark-roast-coffee");
        assert_eq!(draft.description, None);
        assert_eq!(draft.unit_price.cents(), 1250);
    }

    #[test]
    fn test_product_form_rejects_cheap_price() {
        assert!(matches!(
            product_form("0.99").clean(),
            Err(ValidationError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_customer_form_defaults_membership() {
        let draft = CustomerForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            birth_date: None,
            membership: None,
        }
        .clean()
        .unwrap();
        assert_eq!(draft.membership, Membership::Bronze);
    }

    #[test]
    fn test_order_form_item_bounds() {
        let form = |n| OrderForm {
            customer_id: "c-1".to_string(),
            payment_status: None,
            items: items(n),
        };

        assert!(matches!(
            form(0).clean(),
            Err(CoreError::OrderItemCount { count: 0, .. })
        ));
        assert!(form(1).clean().is_ok());
        assert!(form(10).clean().is_ok());
        assert!(matches!(
            form(11).clean(),
            Err(CoreError::OrderItemCount { count: 11, .. })
        ));
        assert_eq!(form(1).clean().unwrap().payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_order_change_form_items_optional() {
        let change = OrderChangeForm {
            payment_status: PaymentStatus::Complete,
            customer_id: "c-1".to_string(),
            items: None,
        }
        .clean()
        .unwrap();
        assert!(change.items.is_none());

        let err = OrderChangeForm {
            payment_status: PaymentStatus::Complete,
            customer_id: "c-1".to_string(),
            items: Some(vec![]),
        }
        .clean();
        assert!(err.is_err());
    }

    #[test]
    fn test_order_item_quantity_validated() {
        let mut bad = items(1);
        bad[0].quantity = 0;
        let result = OrderForm {
            customer_id: "c-1".to_string(),
            payment_status: None,
            items: bad,
        }
        .clean();
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
