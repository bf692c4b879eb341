//! # Repository Module
//!
//! Database repository implementations for the store models.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Changelist Query Shape                               │
//! │                                                                         │
//! │  Admin handler                                                         │
//! │       │                                                                 │
//! │       │  db.collections().list(&ListQuery { search, ordering, page })  │
//! │       ▼                                                                 │
//! │  CollectionRepository                                                  │
//! │  ├── WHERE   search / sidebar filters                                  │
//! │  ├── GROUP BY + COUNT(...)   aggregate annotation                      │
//! │  ├── ORDER BY whitelisted column, then id                              │
//! │  └── LIMIT / OFFSET          one page                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page<CollectionRow> { rows, total, page, per_page }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime with [`sqlx::QueryBuilder`]; only sortable
//! columns named in each repository's whitelist ever reach the SQL text.
//!
//! ## Available Repositories
//!
//! - [`collection::CollectionRepository`] - Collections and their product counts
//! - [`product::ProductRepository`] - Products, list-editable prices, clear inventory
//! - [`customer::CustomerRepository`] - Customers and their order counts
//! - [`order::OrderRepository`] - Orders with inline items

pub mod collection;
pub mod customer;
pub mod order;
pub mod product;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

/// Rows per page when the caller doesn't say.
pub const DEFAULT_PER_PAGE: u32 = 100;

// =============================================================================
// Pagination
// =============================================================================

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Both values are clamped to at least 1.
    pub fn new(page: u32, per_page: u32) -> Self {
        PageRequest {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of a changelist.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// Matching rows across all pages.
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total: i64, request: PageRequest) -> Self {
        Page {
            rows,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    /// Number of pages, never less than 1.
    pub fn num_pages(&self) -> u32 {
        let per_page = i64::from(self.per_page.max(1));
        let pages = (self.total + per_page - 1) / per_page;
        pages.clamp(1, i64::from(u32::MAX)) as u32
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// A requested sort column, `"-field"` meaning descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub descending: bool,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        SortOrder {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortOrder {
            field: field.into(),
            descending: true,
        }
    }

    /// Parses the `o` query parameter.
    ///
    /// ```rust
    /// use storefront_db::SortOrder;
    ///
    /// assert_eq!(SortOrder::parse("-products_count"), Some(SortOrder::desc("products_count")));
    /// assert_eq!(SortOrder::parse("title"), Some(SortOrder::asc("title")));
    /// assert_eq!(SortOrder::parse(" - "), None);
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (field, descending) = match value.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (value, false),
        };

        if field.is_empty() {
            return None;
        }

        Some(SortOrder {
            field: field.to_string(),
            descending,
        })
    }

    /// The query string form, inverse of [`SortOrder::parse`].
    pub fn to_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }
}

/// Appends `ORDER BY` for the requested field, falling back to `default`
/// when the field isn't sortable. `tiebreak` keeps pages stable.
pub(crate) fn push_order_by(
    builder: &mut QueryBuilder<'_, Sqlite>,
    requested: Option<&SortOrder>,
    sortable: &[(&str, &str)],
    default: &str,
    tiebreak: &str,
) {
    let resolved = requested.and_then(|order| {
        sortable
            .iter()
            .find(|(field, _)| *field == order.field)
            .map(|(_, column)| (*column, order.descending))
    });

    builder.push(" ORDER BY ");
    match resolved {
        Some((column, descending)) => {
            builder.push(column);
            builder.push(if descending { " DESC" } else { " ASC" });
        }
        None => {
            builder.push(default);
        }
    }
    builder.push(", ");
    builder.push(tiebreak);
}

/// Appends `LIMIT ? OFFSET ?` for the page.
pub(crate) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, page: PageRequest) {
    builder.push(" LIMIT ");
    builder.push_bind(page.limit());
    builder.push(" OFFSET ");
    builder.push_bind(page.offset());
}

// =============================================================================
// Search
// =============================================================================

/// The plain changelist query shared by collections and customers.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Free text from the search box.
    pub search: Option<String>,
    pub ordering: Option<SortOrder>,
    pub page: PageRequest,
}

impl ListQuery {
    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        search_term(self.search.as_deref())
    }
}

pub(crate) fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

/// Escapes `%`, `_` and `\` so user text matches literally under
/// `LIKE ... ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `LIKE` pattern matching the term anywhere.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// `LIKE` pattern matching values starting with the term.
pub(crate) fn prefix_pattern(term: &str) -> String {
    format!("{}%", escape_like(term))
}

// =============================================================================
// Unit Tests
// =============================================================================
