//! # Product Admin
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Products                                   [ search title ]            │
//! │                                                                         │
//! │ [Clear Inventory ▾] [Go]                          FILTER                │
//! │                                                   collection           │
//! │  ☐ Title        Unit price   Inventory  Collection   All / Snacks / …  │
//! │  ☐ Cola Small   [  2.99 ]    Low        Beverages  last update         │
//! │  ☐ Oats Bulk    [  9.49 ]    OK         Grocery      Any date / Today …│
//! │                                                   inventory            │
//! │                       [Save]                        All / Low          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The inventory column and the `inventory=<10` filter classify rows with
//! the same threshold, so every row of the filtered page shows "Low".

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_core::dates::LastUpdateFilter;
use storefront_core::forms::ProductForm;
use storefront_core::links::change_url;
use storefront_core::messages::{changed_message, clear_inventory_message};
use storefront_core::validation::validate_unit_price;
use storefront_core::{CoreError, InventoryFilter, InventoryStatus, Money, Product, STORE_APP_LABEL};
use storefront_db::{ProductListQuery, ProductRow};

use super::{
    ActionRequest, ActionResult, ActionSpec, AutocompleteItem, AutocompleteParams,
    AutocompleteResponse, Changelist, ChangelistParams, Column, FilterSpec, ListEdit,
    ListEditResult, ModelAdmin, AUTOCOMPLETE_LIMIT,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminJson;
use crate::SharedState;

pub struct ProductAdmin;

impl ProductAdmin {
    pub const CLEAR_INVENTORY: &'static str = "clear_inventory";
}

impl ModelAdmin for ProductAdmin {
    const MODEL_NAME: &'static str = "product";
    const VERBOSE_NAME: &'static str = "product";
    const VERBOSE_NAME_PLURAL: &'static str = "products";

    const LIST_DISPLAY: &'static [Column] = &[
        Column::new("title", "Title").sortable(),
        Column::new("unit_price", "Unit price").sortable().editable(),
        Column::new("inventory_status", "Inventory").sortable(),
        Column::new("collection_title", "Collection").sortable(),
    ];

    const SEARCH_FIELDS: &'static [&'static str] = &["title"];

    const LIST_PER_PAGE: Option<u32> = Some(10);

    const ACTIONS: &'static [ActionSpec] = &[ActionSpec {
        name: ProductAdmin::CLEAR_INVENTORY,
        description: "Clear Inventory",
    }];

    fn routes() -> Router<SharedState> {
        Router::new()
            .route(
                "/admin/store/product/",
                get(changelist).post(add).patch(edit_unit_prices),
            )
            .route("/admin/store/product/actions/", post(run_action))
            .route("/admin/store/product/autocomplete/", get(autocomplete))
            .route(
                "/admin/store/product/{id}/",
                get(detail).put(change).delete(delete),
            )
    }
}

/// A product changelist row.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListRow {
    pub id: String,
    pub title: String,
    /// Decimal text, as the editable input shows it
    pub unit_price: String,
    pub inventory_status: InventoryStatus,
    pub collection_title: String,
    pub change_url: String,
}

impl From<ProductRow> for ProductListRow {
    fn from(row: ProductRow) -> Self {
        let product = row.product;
        ProductListRow {
            change_url: change_url(STORE_APP_LABEL, ProductAdmin::MODEL_NAME, &product.id),
            unit_price: product.unit_price().to_string(),
            inventory_status: product.inventory_status(),
            id: product.id,
            title: product.title,
            collection_title: row.collection_title,
        }
    }
}

/// One edited row of the unit price column.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitPriceEdit {
    pub id: String,
    pub unit_price: String,
}

async fn changelist(
    State(state): State<SharedState>,
    Query(params): Query<ChangelistParams>,
) -> ApiResult<Json<Changelist<ProductListRow>>> {
    let collection_id = ChangelistParams::filter_value(&params.collection_id);
    let last_update = LastUpdateFilter::parse(ChangelistParams::filter_value(&params.last_update));
    let inventory = InventoryFilter::parse(ChangelistParams::filter_value(&params.inventory));

    let query = ProductListQuery {
        search: params.q.clone(),
        collection_id: collection_id.map(str::to_string),
        last_update: last_update.map(|f| f.range(Utc::now())),
        inventory,
        ordering: params.ordering(),
        page: params.page(state.site.per_page::<ProductAdmin>()),
    };

    let page = state.db.products().list(&query).await?;
    let collections = state.db.collections().all().await?;

    let filters = vec![
        FilterSpec::new(
            "collection",
            "collection_id",
            "All",
            collection_id,
            collections.into_iter().map(|c| (c.id, c.title)),
        ),
        FilterSpec::new(
            LastUpdateFilter::TITLE,
            LastUpdateFilter::PARAMETER,
            "Any date",
            last_update.map(|f| f.value()),
            LastUpdateFilter::ALL
                .iter()
                .map(|f| (f.value().to_string(), f.label().to_string())),
        ),
        FilterSpec::new(
            InventoryFilter::TITLE,
            InventoryFilter::PARAMETER,
            "All",
            inventory.map(|_| InventoryFilter::LOW_LOOKUP),
            InventoryFilter::lookups()
                .iter()
                .map(|(value, label)| (value.to_string(), label.to_string())),
        ),
    ];

    Ok(Json(
        Changelist::new::<ProductAdmin>(page.map(ProductListRow::from), &params)
            .with_filters(filters),
    ))
}

/// Saves the list-editable unit price column.
async fn edit_unit_prices(
    State(state): State<SharedState>,
    AdminJson(edit): AdminJson<ListEdit<UnitPriceEdit>>,
) -> ApiResult<Json<ListEditResult>> {
    let prices = edit
        .rows
        .into_iter()
        .map(|row| -> ApiResult<(String, Money)> {
            let price = row
                .unit_price
                .parse::<Money>()
                .and_then(validate_unit_price)
                .map_err(|e| ApiError::validation(format!("{}: {}", row.id, e)))?;
            Ok((row.id, price))
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let changed = state.db.products().update_unit_prices(&prices).await?;

    info!(changed, "Product unit prices changed");
    Ok(Json(ListEditResult {
        changed,
        message: changed_message(
            changed,
            ProductAdmin::VERBOSE_NAME,
            ProductAdmin::VERBOSE_NAME_PLURAL,
        ),
    }))
}

async fn run_action(
    State(state): State<SharedState>,
    AdminJson(request): AdminJson<ActionRequest>,
) -> ApiResult<Json<ActionResult>> {
    match request.check::<ProductAdmin>() {
        Ok(()) => {}
        Err(CoreError::NothingSelected) => return Ok(Json(ActionResult::nothing_selected())),
        Err(e) => return Err(e.into()),
    }

    // ACTIONS holds a single entry, so a checked request is clear_inventory
    let updated = state.db.products().clear_inventory(&request.selected).await?;

    Ok(Json(ActionResult {
        updated,
        message: clear_inventory_message(updated),
    }))
}

async fn detail(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

async fn add(
    State(state): State<SharedState>,
    AdminJson(form): AdminJson<ProductForm>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let draft = form.clean()?;
    let product = state.db.products().insert(&draft).await?;

    info!(id = %product.id, title = %product.title, "Product added");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn change(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AdminJson(form): AdminJson<ProductForm>,
) -> ApiResult<Json<Product>> {
    let draft = form.clean()?;
    let product = state.db.products().update(&id, &draft).await?;

    info!(id = %id, "Product changed");
    Ok(Json(product))
}

async fn delete(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;

    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn autocomplete(
    State(state): State<SharedState>,
    Query(params): Query<AutocompleteParams>,
) -> ApiResult<Json<AutocompleteResponse>> {
    let rows = state
        .db
        .products()
        .autocomplete(&params.term, AUTOCOMPLETE_LIMIT + 1)
        .await?;

    Ok(Json(AutocompleteResponse::new(rows, |p| AutocompleteItem {
        id: p.id,
        text: p.title,
    })))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{request, test_state};
    use axum::http::Method;
    use serde_json::json;
    use storefront_core::forms::{CollectionDraft, ProductDraft};

    async fn seed(state: &SharedState, inventories: &[i64]) -> (String, Vec<String>) {
        let collection = state
            .db
            .collections()
            .insert(&CollectionDraft {
                title: "Snacks".to_string(),
                featured_product_id: None,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (n, inventory) in inventories.iter().enumerate() {
            let title = format!("Product {:02}", n);
            let product = state
                .db
                .products()
                .insert(&ProductDraft {
                    slug: format!("product-{:02}", n),
                    title,
                    description: None,
                    unit_price: Money::from_cents(1000),
                    inventory: *inventory,
                    collection_id: collection.id.clone(),
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        (collection.id, ids)
    }

    #[tokio::test]
    async fn test_changelist_shape() {
        let state = test_state().await;
        seed(&state, &[3, 25]).await;

        let (status, body) = request(&state, Method::GET, "/admin/store/product/", None).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["pagination"]["per_page"], 10);
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["columns"][1]["name"], "unit_price");
        assert_eq!(body["columns"][1]["editable"], true);
        assert_eq!(body["actions"][0]["name"], "clear_inventory");
        assert_eq!(body["actions"][0]["description"], "Clear Inventory");

        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows[0]["unit_price"], "10.00");
        assert_eq!(rows[0]["inventory_status"], "Low");
        assert_eq!(rows[1]["inventory_status"], "OK");
        assert_eq!(rows[0]["collection_title"], "Snacks");

        let filters: Vec<&str> = body["filters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["parameter"].as_str().unwrap())
            .collect();
        assert_eq!(filters, vec!["collection_id", "last_update", "inventory"]);
    }

    #[tokio::test]
    async fn test_low_filter_rows_all_show_low() {
        let state = test_state().await;
        seed(&state, &[0, 5, 9, 10, 11, 40]).await;

        let (status, body) =
            request(&state, Method::GET, "/admin/store/product/?inventory=%3C10", None).await;
        assert_eq!(status, StatusCode::OK);

        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r["inventory_status"] == "Low"));

        let inventory_filter = &body["filters"][2];
        assert_eq!(inventory_filter["choices"][1]["label"], "Low");
        assert_eq!(inventory_filter["choices"][1]["selected"], true);
    }

    #[tokio::test]
    async fn test_unknown_inventory_lookup_is_ignored() {
        let state = test_state().await;
        seed(&state, &[0, 50]).await;

        let (_, body) =
            request(&state, Method::GET, "/admin/store/product/?inventory=%3C5", None).await;
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["filters"][2]["choices"][0]["selected"], true);
    }

    #[tokio::test]
    async fn test_clear_inventory_action() {
        let state = test_state().await;
        let (_, ids) = seed(&state, &[5, 15, 25]).await;

        let (status, body) = request(
            &state,
            Method::POST,
            "/admin/store/product/actions/",
            Some(json!({"action": "clear_inventory", "selected": [ids[0], ids[1]]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 2);
        assert_eq!(body["message"]["level"], "success");
        assert_eq!(body["message"]["message"], "2 products were successfully updated.");

        let products = state.db.products();
        assert_eq!(products.get_by_id(&ids[0]).await.unwrap().unwrap().inventory, 0);
        assert_eq!(products.get_by_id(&ids[1]).await.unwrap().unwrap().inventory, 0);
        assert_eq!(products.get_by_id(&ids[2]).await.unwrap().unwrap().inventory, 25);
    }

    #[tokio::test]
    async fn test_action_without_selection_changes_nothing() {
        let state = test_state().await;
        let (_, ids) = seed(&state, &[5]).await;

        let (status, body) = request(
            &state,
            Method::POST,
            "/admin/store/product/actions/",
            Some(json!({"action": "clear_inventory", "selected": []})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 0);
        assert_eq!(body["message"]["level"], "warning");
        let product = state.db.products().get_by_id(&ids[0]).await.unwrap().unwrap();
        assert_eq!(product.inventory, 5);
    }

    #[tokio::test]
    async fn test_unknown_action_is_400() {
        let state = test_state().await;
        let (_, ids) = seed(&state, &[5]).await;

        let (status, body) = request(
            &state,
            Method::POST,
            "/admin/store/product/actions/",
            Some(json!({"action": "delete_selected", "selected": [ids[0]]})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Unknown action: delete_selected");
    }

    #[tokio::test]
    async fn test_edit_unit_prices() {
        let state = test_state().await;
        let (_, ids) = seed(&state, &[5, 15]).await;

        let (status, body) = request(
            &state,
            Method::PATCH,
            "/admin/store/product/",
            Some(json!({"rows": [
                {"id": ids[0], "unit_price": "12.50"},
                {"id": ids[1], "unit_price": "3"},
            ]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], 2);
        assert_eq!(body["message"]["message"], "2 products were changed successfully.");

        let product = state.db.products().get_by_id(&ids[0]).await.unwrap().unwrap();
        assert_eq!(product.unit_price_cents, 1250);
    }

    #[tokio::test]
    async fn test_edit_rejects_price_below_minimum() {
        let state = test_state().await;
        let (_, ids) = seed(&state, &[5, 15]).await;

        let (status, _) = request(
            &state,
            Method::PATCH,
            "/admin/store/product/",
            Some(json!({"rows": [
                {"id": ids[0], "unit_price": "12.50"},
                {"id": ids[1], "unit_price": "0.99"},
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Nothing saved
        let product = state.db.products().get_by_id(&ids[0]).await.unwrap().unwrap();
        assert_eq!(product.unit_price_cents, 1000);
    }

    #[tokio::test]
    async fn test_add_prepopulates_slug() {
        let state = test_state().await;
        let (collection_id, _) = seed(&state, &[]).await;

        let (status, body) = request(
            &state,
            Method::POST,
            "/admin/store/product/",
            Some(json!({
                "title": "Sea Salt Chips",
                "unit_price": "2.49",
                "inventory": 12,
                "collection_id": collection_id,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["slug"], "sea-salt-chips");
        assert_eq!(body["unit_price_cents"], 249);
    }

    #[tokio::test]
    async fn test_missing_product_is_404() {
        let state = test_state().await;
        let (status, body) =
            request(&state, Method::GET, "/admin/store/product/nope/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
