//! # Admin Links
//!
//! URL construction for the admin site.
//!
//! Every registered model lives under `/admin/{app_label}/{model}/`. The
//! count columns of the collection and customer changelists link to another
//! model's changelist narrowed by a query parameter:
//! ```text
//! Collection "Snacks" (12 products)
//!     └─► /admin/store/product/?collection_id=7f3c…
//! Customer "Ada Lovelace" (3 orders)
//!     └─► /admin/store/order/?customer_id=91ab…
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::form_urlencoded;

/// Root of the admin site.
pub const ADMIN_ROOT: &str = "/admin/";

/// A rendered hyperlink cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Link {
    pub href: String,
    pub label: String,
}

/// Changelist URL of a registered model.
///
/// ```rust
/// use storefront_core::links::changelist_url;
///
/// assert_eq!(changelist_url("store", "product"), "/admin/store/product/");
/// ```
pub fn changelist_url(app_label: &str, model: &str) -> String {
    format!("{}{}/{}/", ADMIN_ROOT, app_label, model)
}

/// Change (detail) URL of one object.
pub fn change_url(app_label: &str, model: &str, id: &str) -> String {
    format!("{}{}/", changelist_url(app_label, model), id)
}

/// Changelist URL with a form-urlencoded query string.
///
/// ```rust
/// use storefront_core::links::changelist_url_with_query;
///
/// let url = changelist_url_with_query("store", "product", &[("collection_id", "a b")]);
/// assert_eq!(url, "/admin/store/product/?collection_id=a+b");
/// ```
pub fn changelist_url_with_query(app_label: &str, model: &str, params: &[(&str, &str)]) -> String {
    let base = changelist_url(app_label, model);
    if params.is_empty() {
        return base;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().copied())
        .finish();
    format!("{}?{}", base, query)
}

/// A count cell linking to the filtered changelist of related rows.
pub fn filtered_count_link(
    app_label: &str,
    model: &str,
    param: &str,
    value: &str,
    count: i64,
) -> Link {
    Link {
        href: changelist_url_with_query(app_label, model, &[(param, value)]),
        label: count.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_url() {
        assert_eq!(change_url("store", "order", "o-1"), "/admin/store/order/o-1/");
    }

    #[test]
    fn test_query_is_encoded() {
        let url = changelist_url_with_query("store", "product", &[("inventory", "<10")]);
        assert_eq!(url, "/admin/store/product/?inventory=%3C10");
    }

    #[test]
    fn test_filtered_count_link() {
        let link = filtered_count_link("store", "order", "customer_id", "c-42", 3);
        assert_eq!(link.href, "/admin/store/order/?customer_id=c-42");
        assert_eq!(link.label, "3");
    }

    #[test]
    fn test_no_params_means_plain_changelist() {
        assert_eq!(
            changelist_url_with_query("store", "collection", &[]),
            "/admin/store/collection/"
        );
    }
}
