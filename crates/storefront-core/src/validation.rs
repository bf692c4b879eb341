//! # Validation Module
//!
//! Field-level validation used by the admin edit forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Shape and types of the submitted JSON                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + forms                                          │
//! │  ├── Required fields, lengths, minimums                                │
//! │  └── Slug prepopulation, inline item bounds                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK / UNIQUE constraints                                        │
//! │  └── Foreign keys (protected relations)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS, MIN_ORDER_ITEMS, MIN_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted title or name.
pub const MAX_TITLE_LEN: usize = 255;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required short text field and returns it trimmed.
///
/// ```rust
/// use storefront_core::validation::validate_required_text;
///
/// assert_eq!(validate_required_text("title", "  Snacks ").unwrap(), "Snacks");
/// assert!(validate_required_text("title", "   ").is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part and domain
/// - No whitespace
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required_text("email", email)?;

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format("email", "must not contain spaces"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(ValidationError::invalid_format(
            "email",
            "must look like name@example.com",
        )),
    }
}

/// Builds a URL slug from free text.
///
/// ASCII letters and digits are lowercased; every run of other characters
/// collapses to a single `-`; leading and trailing `-` are dropped.
///
/// ```rust
/// use storefront_core::validation::slugify;
///
/// assert_eq!(slugify("Coffee Beans (1kg)"), "coffee-beans-1kg");
/// assert_eq!(slugify("  --Hello,   World!-- "), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Returns the submitted slug, or one prepopulated from the title.
pub fn prepopulate_slug(slug: Option<&str>, title: &str) -> ValidationResult<String> {
    let slug = match slug.map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(title),
    };

    if slug.is_empty() {
        return Err(ValidationError::invalid_format(
            "slug",
            "must contain at least one letter or digit",
        ));
    }

    Ok(slug)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Unit prices start at 1.00.
pub fn validate_unit_price(price: Money) -> ValidationResult<Money> {
    if price.cents() < MIN_UNIT_PRICE_CENTS {
        return Err(ValidationError::BelowMinimum {
            field: "unit_price".to_string(),
            min: Money::from_cents(MIN_UNIT_PRICE_CENTS).to_string(),
        });
    }
    Ok(price)
}

/// Inventory can be zero but never negative.
pub fn validate_inventory(inventory: i64) -> ValidationResult<i64> {
    if inventory < 0 {
        return Err(ValidationError::BelowMinimum {
            field: "inventory".to_string(),
            min: "0".to_string(),
        });
    }
    Ok(inventory)
}

/// Order item quantities run from 1 to [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(quantity: i64) -> ValidationResult<i64> {
    if quantity < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "quantity".to_string(),
            min: "1".to_string(),
        });
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::AboveMaximum {
            field: "quantity".to_string(),
            max: MAX_ITEM_QUANTITY.to_string(),
        });
    }
    Ok(quantity)
}

/// Checks the inline item count against the order editor bounds.
pub fn order_item_count_in_bounds(count: usize) -> bool {
    (MIN_ORDER_ITEMS..=MAX_ORDER_ITEMS).contains(&count)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_length() {
        assert!(validate_required_text("title", &"a".repeat(255)).is_ok());
        assert!(matches!(
            validate_required_text("title", &"a".repeat(256)),
            Err(ValidationError::TooLong { max: 255, .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" ada@example.com ").unwrap(), "ada@example.com");
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("ada @example.com").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bread - Rye"), "bread-rye");
        assert_eq!(slugify("Évian Water"), "vian-water");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_prepopulate_slug() {
        assert_eq!(prepopulate_slug(None, "Milk 2%").unwrap(), "milk-2");
        assert_eq!(prepopulate_slug(Some("  "), "Milk 2%").unwrap(), "milk-2");
        assert_eq!(prepopulate_slug(Some("Custom Slug"), "Milk").unwrap(), "custom-slug");
        assert!(prepopulate_slug(None, "???").is_err());
    }

    #[test]
    fn test_numeric_minimums() {
        assert!(validate_unit_price(Money::from_cents(100)).is_ok());
        assert!(validate_unit_price(Money::from_cents(99)).is_err());
        assert!(validate_inventory(0).is_ok());
        assert!(validate_inventory(-1).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_quantity_maximum() {
        assert_eq!(validate_quantity(32_767).unwrap(), 32_767);
        assert!(matches!(
            validate_quantity(32_768),
            Err(ValidationError::AboveMaximum { .. })
        ));
        assert!(validate_quantity(i64::MAX).is_err());
    }

    #[test]
    fn test_order_item_bounds() {
        assert!(!order_item_count_in_bounds(0));
        assert!(order_item_count_in_bounds(1));
        assert!(order_item_count_in_bounds(10));
        assert!(!order_item_count_in_bounds(11));
    }
}
