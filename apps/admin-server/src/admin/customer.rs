//! Customer admin.
//!
//! Membership is editable in place; `orders_count` links to the order
//! changelist narrowed to the customer. The search box matches the start
//! of the first or last name.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use storefront_core::forms::CustomerForm;
use storefront_core::links::{change_url, filtered_count_link, Link};
use storefront_core::messages::changed_message;
use storefront_core::{Customer, Membership, STORE_APP_LABEL};
use storefront_db::CustomerRow;

use super::{
    AutocompleteItem, AutocompleteParams, AutocompleteResponse, Changelist, ChangelistParams,
    Column, ListEdit, ListEditResult, ModelAdmin, OrderAdmin, AUTOCOMPLETE_LIMIT,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminJson;
use crate::SharedState;

pub struct CustomerAdmin;

impl ModelAdmin for CustomerAdmin {
    const MODEL_NAME: &'static str = "customer";
    const VERBOSE_NAME: &'static str = "customer";
    const VERBOSE_NAME_PLURAL: &'static str = "customers";

    const LIST_DISPLAY: &'static [Column] = &[
        Column::new("first_name", "First name").sortable(),
        Column::new("last_name", "Last name").sortable(),
        Column::new("membership", "Membership").sortable().editable(),
        Column::new("orders_count", "Orders").sortable(),
    ];

    const SEARCH_FIELDS: &'static [&'static str] = &["first_name", "last_name"];

    const LIST_PER_PAGE: Option<u32> = Some(10);

    fn routes() -> Router<SharedState> {
        Router::new()
            .route(
                "/admin/store/customer/",
                get(changelist).post(add).patch(edit_memberships),
            )
            .route("/admin/store/customer/autocomplete/", get(autocomplete))
            .route(
                "/admin/store/customer/{id}/",
                get(detail).put(change).delete(delete),
            )
    }
}

/// A customer changelist row.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerListRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub membership: Membership,
    pub orders_count: Link,
    pub change_url: String,
}

impl From<CustomerRow> for CustomerListRow {
    fn from(row: CustomerRow) -> Self {
        let customer = row.customer;
        CustomerListRow {
            orders_count: filtered_count_link(
                STORE_APP_LABEL,
                OrderAdmin::MODEL_NAME,
                "customer_id",
                &customer.id,
                row.orders_count,
            ),
            change_url: change_url(STORE_APP_LABEL, CustomerAdmin::MODEL_NAME, &customer.id),
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            membership: customer.membership,
        }
    }
}

/// One edited row of the membership column.
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipEdit {
    pub id: String,
    pub membership: Membership,
}

async fn changelist(
    State(state): State<SharedState>,
    Query(params): Query<ChangelistParams>,
) -> ApiResult<Json<Changelist<CustomerListRow>>> {
    let per_page = state.site.per_page::<CustomerAdmin>();
    let page = state
        .db
        .customers()
        .list(&params.list_query(per_page))
        .await?;

    Ok(Json(Changelist::new::<CustomerAdmin>(
        page.map(CustomerListRow::from),
        &params,
    )))
}

async fn edit_memberships(
    State(state): State<SharedState>,
    AdminJson(edit): AdminJson<ListEdit<MembershipEdit>>,
) -> ApiResult<Json<ListEditResult>> {
    let memberships: Vec<(String, Membership)> = edit
        .rows
        .into_iter()
        .map(|row| (row.id, row.membership))
        .collect();

    let changed = state.db.customers().update_memberships(&memberships).await?;

    info!(changed, "Customer memberships changed");
    Ok(Json(ListEditResult {
        changed,
        message: changed_message(
            changed,
            CustomerAdmin::VERBOSE_NAME,
            CustomerAdmin::VERBOSE_NAME_PLURAL,
        ),
    }))
}

async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", &id))
}

async fn add(
    State(state): State<SharedState>,
    AdminJson(form): AdminJson<CustomerForm>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let draft = form.clean()?;
    let customer = state.db.customers().insert(&draft).await?;

    info!(id = %customer.id, "Customer added");
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn change(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AdminJson(form): AdminJson<CustomerForm>,
) -> ApiResult<Json<Customer>> {
    let draft = form.clean()?;
    let customer = state.db.customers().update(&id, &draft).await?;

    info!(id = %id, "Customer changed");
    Ok(Json(customer))
}

async fn delete(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.customers().delete(&id).await?;

    info!(id = %id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn autocomplete(
    State(state): State<SharedState>,
    Query(params): Query<AutocompleteParams>,
) -> ApiResult<Json<AutocompleteResponse>> {
    let rows = state
        .db
        .customers()
        .autocomplete(&params.term, AUTOCOMPLETE_LIMIT + 1)
        .await?;

    Ok(Json(AutocompleteResponse::new(rows, |c| AutocompleteItem {
        text: c.full_name(),
        id: c.id,
    })))
}

// =============================================================================
// Unit Tests
// =============================================================================
