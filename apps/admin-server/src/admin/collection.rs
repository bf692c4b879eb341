//! Collection admin: title plus a `products_count` column linking to the
//! product changelist narrowed to the collection.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use storefront_core::forms::CollectionForm;
use storefront_core::links::{change_url, filtered_count_link, Link};
use storefront_core::{Collection, STORE_APP_LABEL};
use storefront_db::CollectionRow;

use super::{
    AutocompleteItem, AutocompleteParams, AutocompleteResponse, Changelist, ChangelistParams,
    Column, ModelAdmin, ProductAdmin, AUTOCOMPLETE_LIMIT,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminJson;
use crate::SharedState;

pub struct CollectionAdmin;

impl ModelAdmin for CollectionAdmin {
    const MODEL_NAME: &'static str = "collection";
    const VERBOSE_NAME: &'static str = "collection";
    const VERBOSE_NAME_PLURAL: &'static str = "collections";

    const LIST_DISPLAY: &'static [Column] = &[
        Column::new("title", "Title").sortable(),
        Column::new("products_count", "Products count").sortable(),
    ];

    const SEARCH_FIELDS: &'static [&'static str] = &["title"];

    fn routes() -> Router<SharedState> {
        Router::new()
            .route("/admin/store/collection/", get(changelist).post(add))
            .route("/admin/store/collection/autocomplete/", get(autocomplete))
            .route(
                "/admin/store/collection/{id}/",
                get(detail).put(change).delete(delete),
            )
    }
}

/// A collection changelist row.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionListRow {
    pub id: String,
    pub title: String,
    pub products_count: Link,
    pub change_url: String,
}

impl From<CollectionRow> for CollectionListRow {
    fn from(row: CollectionRow) -> Self {
        let products_count = filtered_count_link(
            STORE_APP_LABEL,
            ProductAdmin::MODEL_NAME,
            "collection_id",
            &row.collection.id,
            row.products_count,
        );

        CollectionListRow {
            change_url: change_url(STORE_APP_LABEL, CollectionAdmin::MODEL_NAME, &row.collection.id),
            id: row.collection.id,
            title: row.collection.title,
            products_count,
        }
    }
}

async fn changelist(
    State(state): State<SharedState>,
    Query(params): Query<ChangelistParams>,
) -> ApiResult<Json<Changelist<CollectionListRow>>> {
    let per_page = state.site.per_page::<CollectionAdmin>();
    let page = state
        .db
        .collections()
        .list(&params.list_query(per_page))
        .await?;

    Ok(Json(Changelist::new::<CollectionAdmin>(
        page.map(CollectionListRow::from),
        &params,
    )))
}

async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Collection>> {
    state
        .db
        .collections()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Collection", &id))
}

async fn add(
    State(state): State<SharedState>,
    AdminJson(form): AdminJson<CollectionForm>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let draft = form.clean()?;
    let collection = state.db.collections().insert(&draft).await?;

    info!(id = %collection.id, title = %collection.title, "Collection added");
    Ok((StatusCode::CREATED, Json(collection)))
}

async fn change(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AdminJson(form): AdminJson<CollectionForm>,
) -> ApiResult<Json<Collection>> {
    let draft = form.clean()?;
    let collection = state.db.collections().update(&id, &draft).await?;

    info!(id = %id, "Collection changed");
    Ok(Json(collection))
}

async fn delete(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.collections().delete(&id).await?;

    info!(id = %id, "Collection deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn autocomplete(
    State(state): State<SharedState>,
    Query(params): Query<AutocompleteParams>,
) -> ApiResult<Json<AutocompleteResponse>> {
    let rows = state
        .db
        .collections()
        .autocomplete(&params.term, AUTOCOMPLETE_LIMIT + 1)
        .await?;

    Ok(Json(AutocompleteResponse::new(rows, |c| AutocompleteItem {
        id: c.id,
        text: c.title,
    })))
}
