//! # Model Admins
//!
//! Declarative admin configuration per model plus the JSON shapes the
//! admin frontend renders.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /admin/{app}/{model}/                GET changelist   POST add        │
//! │                                       PATCH list-editable columns      │
//! │  /admin/{app}/{model}/actions/        POST bulk action                 │
//! │  /admin/{app}/{model}/autocomplete/   GET ?term=                       │
//! │  /admin/{app}/{model}/{id}/           GET change   PUT save   DELETE   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Changelist Query String
//! | param | meaning |
//! |-------|---------|
//! | `q`   | search term |
//! | `o`   | ordering, `-` prefix for descending (`o=-products_count`) |
//! | `p`   | page number, 1-based |
//! | other | list filters (`inventory=<10`, `collection_id=…`) |

mod collection;
mod customer;
mod order;
mod product;

pub use collection::CollectionAdmin;
pub use customer::CustomerAdmin;
pub use order::OrderAdmin;
pub use product::ProductAdmin;

use axum::Router;
use serde::{Deserialize, Serialize};

use storefront_core::messages::AdminMessage;
use storefront_core::{CoreError, STORE_APP_LABEL};
use storefront_db::{ListQuery, Page, PageRequest, SortOrder};

use crate::site::{AdminSite, SiteError};
use crate::SharedState;

/// Results per autocomplete request.
pub const AUTOCOMPLETE_LIMIT: u32 = 20;

// =============================================================================
// ModelAdmin
// =============================================================================

/// Admin configuration of one model.
pub trait ModelAdmin {
    const APP_LABEL: &'static str = STORE_APP_LABEL;
    const MODEL_NAME: &'static str;
    const VERBOSE_NAME: &'static str;
    const VERBOSE_NAME_PLURAL: &'static str;

    /// Changelist columns, in display order.
    const LIST_DISPLAY: &'static [Column];

    /// Fields the `q` parameter searches.
    const SEARCH_FIELDS: &'static [&'static str] = &[];

    /// Page size; `None` uses the site default.
    const LIST_PER_PAGE: Option<u32> = None;

    /// Bulk actions offered above the changelist.
    const ACTIONS: &'static [ActionSpec] = &[];

    /// HTTP routes of this admin.
    fn routes() -> Router<SharedState>;
}

/// Registers every model admin of the store app.
pub fn default_site(default_per_page: u32) -> Result<AdminSite, SiteError> {
    let mut site = AdminSite::new(default_per_page);
    site.register::<CollectionAdmin>()?;
    site.register::<ProductAdmin>()?;
    site.register::<CustomerAdmin>()?;
    site.register::<OrderAdmin>()?;
    Ok(site)
}

/// Routes of every model admin.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .merge(CollectionAdmin::routes())
        .merge(ProductAdmin::routes())
        .merge(CustomerAdmin::routes())
        .merge(OrderAdmin::routes())
}

/// A changelist column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub label: &'static str,
    /// Accepted as an `o` value
    pub sortable: bool,
    /// Editable in place (list_editable)
    pub editable: bool,
}

impl Column {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Column {
            name,
            label,
            sortable: false,
            editable: false,
        }
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }
}

/// A bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSpec {
    pub name: &'static str,
    pub description: &'static str,
}

// =============================================================================
// Changelist
// =============================================================================

/// Query string of a changelist request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangelistParams {
    pub q: Option<String>,
    pub o: Option<String>,
    pub p: Option<u32>,
    pub collection_id: Option<String>,
    pub last_update: Option<String>,
    pub inventory: Option<String>,
    pub customer_id: Option<String>,
}

impl ChangelistParams {
    pub fn ordering(&self) -> Option<SortOrder> {
        self.o.as_deref().and_then(SortOrder::parse)
    }

    pub fn page(&self, per_page: u32) -> PageRequest {
        PageRequest::new(self.p.unwrap_or(1), per_page)
    }

    /// Search, ordering and page for admins without filters.
    pub fn list_query(&self, per_page: u32) -> ListQuery {
        ListQuery {
            search: self.q.clone(),
            ordering: self.ordering(),
            page: self.page(per_page),
        }
    }

    /// Non-empty filter value.
    pub(crate) fn filter_value(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// One option of a sidebar filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChoice {
    pub label: String,
    /// Parameter value; `None` clears the filter
    pub value: Option<String>,
    pub selected: bool,
}

/// A sidebar filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub title: &'static str,
    pub parameter: &'static str,
    pub choices: Vec<FilterChoice>,
}

impl FilterSpec {
    /// Builds a filter whose first choice clears it.
    ///
    /// `selected` is the lookup value in effect. Lookups the filter ignores
    /// are passed as `None` so that "All" stays selected.
    pub fn new<I>(
        title: &'static str,
        parameter: &'static str,
        all_label: &str,
        selected: Option<&str>,
        lookups: I,
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut choices = vec![FilterChoice {
            label: all_label.to_string(),
            value: None,
            selected: selected.is_none(),
        }];

        choices.extend(lookups.into_iter().map(|(value, label)| FilterChoice {
            selected: selected == Some(value.as_str()),
            label,
            value: Some(value),
        }));

        FilterSpec {
            title,
            parameter,
            choices,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchBox {
    pub fields: &'static [&'static str],
    pub query: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub num_pages: u32,
    pub total: i64,
}

/// JSON body of a changelist page.
#[derive(Debug, Clone, Serialize)]
pub struct Changelist<R> {
    pub model_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub columns: &'static [Column],
    pub rows: Vec<R>,
    pub filters: Vec<FilterSpec>,
    pub actions: &'static [ActionSpec],
    pub search: Option<SearchBox>,
    pub ordering: Option<String>,
    pub pagination: Pagination,
}

impl<R> Changelist<R> {
    pub fn new<A: ModelAdmin>(page: Page<R>, params: &ChangelistParams) -> Self {
        let pagination = Pagination {
            page: page.page,
            per_page: page.per_page,
            num_pages: page.num_pages(),
            total: page.total,
        };

        let search = (!A::SEARCH_FIELDS.is_empty()).then(|| SearchBox {
            fields: A::SEARCH_FIELDS,
            query: params.q.clone(),
        });

        Changelist {
            model_name: A::MODEL_NAME,
            verbose_name_plural: A::VERBOSE_NAME_PLURAL,
            columns: A::LIST_DISPLAY,
            rows: page.rows,
            filters: Vec::new(),
            actions: A::ACTIONS,
            search,
            ordering: params.ordering().map(|o| o.to_param()),
            pagination,
        }
    }

    pub fn with_filters(mut self, filters: Vec<FilterSpec>) -> Self {
        self.filters = filters;
        self
    }
}

// =============================================================================
// List-editable and actions
// =============================================================================

/// Body of a list-editable save: one entry per changed row.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEdit<T> {
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEditResult {
    pub changed: u64,
    pub message: AdminMessage,
}

/// Body of a bulk action request.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub updated: u64,
    pub message: AdminMessage,
}

impl ActionRequest {
    /// Checks the action is declared by `A` and that rows are selected.
    pub fn check<A: ModelAdmin>(&self) -> Result<(), CoreError> {
        if !A::ACTIONS.iter().any(|a| a.name == self.action) {
            return Err(CoreError::UnknownAction(self.action.clone()));
        }
        if self.selected.is_empty() {
            return Err(CoreError::NothingSelected);
        }
        Ok(())
    }
}

impl ActionResult {
    /// Reply to an action submitted without a selection.
    pub fn nothing_selected() -> Self {
        ActionResult {
            updated: 0,
            message: AdminMessage::warning(format!(
                "{}. No items have been changed.",
                CoreError::NothingSelected
            )),
        }
    }
}

// =============================================================================
// Autocomplete
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteItem {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutocompleteMore {
    pub more: bool,
}

/// `{"results": [{"id", "text"}], "pagination": {"more": bool}}`
#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteResponse {
    pub results: Vec<AutocompleteItem>,
    pub pagination: AutocompleteMore,
}

impl AutocompleteResponse {
    /// Builds the response from up to `AUTOCOMPLETE_LIMIT + 1` fetched rows.
    pub fn new<T>(rows: Vec<T>, item: impl Fn(T) -> AutocompleteItem) -> Self {
        let more = rows.len() > AUTOCOMPLETE_LIMIT as usize;
        let results = rows
            .into_iter()
            .take(AUTOCOMPLETE_LIMIT as usize)
            .map(item)
            .collect();

        AutocompleteResponse {
            results,
            pagination: AutocompleteMore { more },
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
    fn test_filter_all_choice_selected_by_default() {
        let filter = FilterSpec::new(
            "inventory",
            "inventory",
            "All",
            None,
            [("<10".to_string(), "Low".to_string())],
        );

        assert_eq!(filter.choices.len(), 2);
        assert!(filter.choices[0].selected);
        assert!(!filter.choices[1].selected);
        assert_eq!(filter.choices[1].value.as_deref(), Some("<10"));
    }

    #[test]
    fn test_filter_marks_selected_lookup() {
        let filter = FilterSpec::new(
            "inventory",
            "inventory",
            "All",
            Some("<10"),
            [("<10".to_string(), "Low".to_string())],
        );

        assert!(!filter.choices[0].selected);
        assert!(filter.choices[1].selected);
    }

    #[test]
    fn test_unknown_action_is_rejected_first() {
        let request = ActionRequest {
            action: "delete_everything".to_string(),
            selected: vec![],
        };
        assert!(matches!(
            request.check::<ProductAdmin>(),
            Err(CoreError::UnknownAction(name)) if name == "delete_everything"
        ));
    }

    #[test]
    fn test_action_without_selection() {
        let request = ActionRequest {
            action: "clear_inventory".to_string(),
            selected: vec![],
        };
        assert!(matches!(
            request.check::<ProductAdmin>(),
            Err(CoreError::NothingSelected)
        ));

        let reply = ActionResult::nothing_selected();
        assert_eq!(reply.updated, 0);
        assert_eq!(
            reply.message.message,
            "Items must be selected in order to perform actions on them. No items have been changed."
        );
    }

    #[test]
    fn test_autocomplete_flags_more_results() {
        let rows: Vec<u32> = (0..=AUTOCOMPLETE_LIMIT).collect();
        let response = AutocompleteResponse::new(rows, |n| AutocompleteItem {
            id: n.to_string(),
            text: format!("#{}", n),
        });

        assert_eq!(response.results.len(), AUTOCOMPLETE_LIMIT as usize);
        assert!(response.pagination.more);

        let response = AutocompleteResponse::new(vec![1u32], |n| AutocompleteItem {
            id: n.to_string(),
            text: n.to_string(),
        });
        assert!(!response.pagination.more);
    }

    #[test]
    fn test_params_defaults() {
        let params = ChangelistParams {
            o: Some("-products_count".to_string()),
            ..Default::default()
        };
        let query = params.list_query(100);

        assert_eq!(query.page, PageRequest::new(1, 100));
        assert_eq!(query.ordering, Some(SortOrder::desc("products_count")));
        assert_eq!(ChangelistParams::filter_value(&Some("  ".to_string())), None);
    }
}
