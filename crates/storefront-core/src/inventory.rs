//! # Inventory Classification
//!
//! One threshold drives two admin features: the `inventory_status` column
//! of the product changelist and the "inventory" sidebar filter.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 LOW_INVENTORY_THRESHOLD = 10                            │
//! │                                                                         │
//! │   inventory:   0 1 2 ... 8 9 │ 10 11 12 ...                             │
//! │   status:      ─── Low ───── │ ──── OK ────                             │
//! │                              │                                          │
//! │   Display column → InventoryStatus::classify(inventory)                 │
//! │   Filter "<10"   → WHERE inventory < LOW_INVENTORY_THRESHOLD            │
//! │                                                                         │
//! │   A row is in the Low filter exactly when its column reads "Low".       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Inventory strictly below this value is low.
pub const LOW_INVENTORY_THRESHOLD: i64 = 10;

// =============================================================================
// Inventory Status
// =============================================================================

/// Derived stock level shown in the product changelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum InventoryStatus {
    Low,
    #[serde(rename = "OK")]
    Ok,
}

impl InventoryStatus {
    /// Classifies an inventory level.
    ///
    /// ```rust
    /// use storefront_core::inventory::InventoryStatus;
    ///
    /// assert_eq!(InventoryStatus::classify(0), InventoryStatus::Low);
    /// assert_eq!(InventoryStatus::classify(9), InventoryStatus::Low);
    /// assert_eq!(InventoryStatus::classify(10), InventoryStatus::Ok);
    /// ```
    #[inline]
    pub const fn classify(inventory: i64) -> Self {
        if inventory < LOW_INVENTORY_THRESHOLD {
            InventoryStatus::Low
        } else {
            InventoryStatus::Ok
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            InventoryStatus::Low => "Low",
            InventoryStatus::Ok => "OK",
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Inventory Filter
// =============================================================================

/// The "inventory" list filter of the product changelist.
///
/// Only one lookup exists: `<10` labelled "Low". Any other parameter value,
/// or no value at all, leaves the changelist unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryFilter;

impl InventoryFilter {
    /// Sidebar heading.
    pub const TITLE: &'static str = "inventory";

    /// Query string parameter.
    pub const PARAMETER: &'static str = "inventory";

    /// Parameter value selecting low-inventory rows.
    pub const LOW_LOOKUP: &'static str = "<10";

    /// `(value, label)` pairs offered in the sidebar.
    pub fn lookups() -> &'static [(&'static str, &'static str)] {
        &[(Self::LOW_LOOKUP, "Low")]
    }

    /// Resolves a raw parameter value into the status it restricts to.
    pub fn parse(value: Option<&str>) -> Option<InventoryStatus> {
        match value {
            Some(Self::LOW_LOOKUP) => Some(InventoryStatus::Low),
            _ => None,
        }
    }

    /// In-memory form of the filter predicate.
    pub fn matches(selected: Option<InventoryStatus>, inventory: i64) -> bool {
        match selected {
            Some(status) => InventoryStatus::classify(inventory) == status,
            None => true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(InventoryStatus::classify(-1), InventoryStatus::Low);
        assert_eq!(InventoryStatus::classify(9), InventoryStatus::Low);
        assert_eq!(InventoryStatus::classify(10), InventoryStatus::Ok);
        assert_eq!(InventoryStatus::classify(i64::MAX), InventoryStatus::Ok);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(InventoryFilter::parse(Some("<10")), Some(InventoryStatus::Low));
        assert_eq!(InventoryFilter::parse(Some("<5")), None);
        assert_eq!(InventoryFilter::parse(Some("")), None);
        assert_eq!(InventoryFilter::parse(None), None);
    }

    #[test]
    fn test_filter_agrees_with_column() {
        let low = InventoryFilter::parse(Some(InventoryFilter::LOW_LOOKUP));
        for inventory in -5..=200 {
            let in_filter = InventoryFilter::matches(low, inventory);
            let shows_low = InventoryStatus::classify(inventory).label() == "Low";
            assert_eq!(in_filter, shows_low, "inventory {}", inventory);
        }
    }

    #[test]
    fn test_status_serializes_as_label() {
        assert_eq!(serde_json::to_string(&InventoryStatus::Low).unwrap(), "\"Low\"");
        assert_eq!(serde_json::to_string(&InventoryStatus::Ok).unwrap(), "\"OK\"");
    }
}
