//! # Order Admin
//!
//! Orders are edited together with their items (tabular inline, 1 to 10
//! rows, product picked through autocomplete).
//!
//! ```text
//! POST /admin/store/order/
//!   │
//!   ├─ OrderForm::clean ─────────── item count outside 1..=10 → 400
//!   ├─ OrderRepository::create ──── one transaction, prices snapshotted
//!   │                               failure → rollback, 4xx/5xx
//!   └─ OrderSignals::send ───────── only after commit
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use storefront_core::forms::{OrderChangeForm, OrderForm};
use storefront_core::links::change_url;
use storefront_core::{OrderWithItems, MAX_ORDER_ITEMS, MIN_ORDER_ITEMS, STORE_APP_LABEL};
use storefront_db::{OrderListQuery, OrderRow};

use super::{Changelist, ChangelistParams, Column, ModelAdmin};
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminJson;
use crate::SharedState;

pub struct OrderAdmin;

impl ModelAdmin for OrderAdmin {
    const MODEL_NAME: &'static str = "order";
    const VERBOSE_NAME: &'static str = "order";
    const VERBOSE_NAME_PLURAL: &'static str = "orders";

    const LIST_DISPLAY: &'static [Column] = &[
        Column::new("id", "ID").sortable(),
        Column::new("placed_at", "Placed at").sortable(),
        Column::new("customer", "Customer").sortable(),
    ];

    fn routes() -> Router<SharedState> {
        Router::new()
            .route("/admin/store/order/", get(changelist).post(add))
            .route(
                "/admin/store/order/{id}/",
                get(detail).put(change).delete(delete),
            )
    }
}

/// Inline editor of the order's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InlineSpec {
    pub model: &'static str,
    pub min_num: usize,
    pub max_num: usize,
    pub extra: usize,
    pub autocomplete_fields: &'static [&'static str],
}

pub const ORDER_ITEM_INLINE: InlineSpec = InlineSpec {
    model: "orderitem",
    min_num: MIN_ORDER_ITEMS,
    max_num: MAX_ORDER_ITEMS,
    extra: 0,
    autocomplete_fields: &["product"],
};

/// An order changelist row.
#[derive(Debug, Clone, Serialize)]
pub struct OrderListRow {
    pub id: String,
    pub placed_at: DateTime<Utc>,
    pub customer: String,
    pub change_url: String,
}

impl From<OrderRow> for OrderListRow {
    fn from(row: OrderRow) -> Self {
        OrderListRow {
            customer: row.customer_name(),
            change_url: change_url(STORE_APP_LABEL, OrderAdmin::MODEL_NAME, &row.order.id),
            id: row.order.id,
            placed_at: row.order.placed_at,
        }
    }
}

/// Change view of an order: the order, its items, and the inline bounds.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderWithItems,
    pub inline: InlineSpec,
}

impl From<OrderWithItems> for OrderDetail {
    fn from(order: OrderWithItems) -> Self {
        OrderDetail {
            order,
            inline: ORDER_ITEM_INLINE,
        }
    }
}

async fn changelist(
    State(state): State<SharedState>,
    Query(params): Query<ChangelistParams>,
) -> ApiResult<Json<Changelist<OrderListRow>>> {
    let query = OrderListQuery {
        customer_id: ChangelistParams::filter_value(&params.customer_id).map(str::to_string),
        ordering: params.ordering(),
        page: params.page(state.site.per_page::<OrderAdmin>()),
    };

    let page = state.db.orders().list(&query).await?;

    Ok(Json(Changelist::new::<OrderAdmin>(
        page.map(OrderListRow::from),
        &params,
    )))
}

async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    state
        .db
        .orders()
        .get_with_items(&id)
        .await?
        .map(|order| Json(order.into()))
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

/// Creates an order with its items, then fires `order_created`.
async fn add(
    State(state): State<SharedState>,
    AdminJson(form): AdminJson<OrderForm>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let draft = form.clean()?;
    let order = state.db.orders().create(&draft).await?;

    info!(
        id = %order.order.id,
        customer_id = %order.order.customer_id,
        items = order.items.len(),
        "Order added"
    );
    state.signals.send(order.clone());

    Ok((StatusCode::CREATED, Json(order.into())))
}

async fn change(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    AdminJson(form): AdminJson<OrderChangeForm>,
) -> ApiResult<Json<OrderDetail>> {
    let change = form.clean()?;
    let order = state.db.orders().update(&id, &change).await?;

    info!(id = %id, items = order.items.len(), "Order changed");
    Ok(Json(order.into()))
}

async fn delete(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.db.orders().delete(&id).await?;

    info!(id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::on_order_created;
    use crate::testing::{request, test_state};
    use axum::http::Method;
    use serde_json::{json, Value};
    use storefront_core::forms::{CollectionDraft, CustomerDraft, ProductDraft};
    use storefront_core::{Membership, Money};

    struct Fixture {
        customer_id: String,
        product_ids: Vec<String>,
    }

    async fn fixture(state: &SharedState, products: usize) -> Fixture {
        let collection = state
            .db
            .collections()
            .insert(&CollectionDraft {
                title: "Dairy".to_string(),
                featured_product_id: None,
            })
            .await
            .unwrap();

        let mut product_ids = Vec::new();
        for n in 0..products {
            let product = state
                .db
                .products()
                .insert(&ProductDraft {
                    title: format!("Cheese {}", n),
                    slug: format!("cheese-{}", n),
                    description: None,
                    unit_price: Money::from_cents(450),
                    inventory: 20,
                    collection_id: collection.id.clone(),
                })
                .await
                .unwrap();
            product_ids.push(product.id);
        }

        let customer = state
            .db
            .customers()
            .insert(&CustomerDraft {
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                email: "grace@example.com".to_string(),
                phone: "555-0101".to_string(),
                birth_date: None,
                membership: Membership::Gold,
            })
            .await
            .unwrap();

        Fixture {
            customer_id: customer.id,
            product_ids,
        }
    }

    fn order_body(customer_id: &str, product_ids: &[String]) -> Value {
        let items: Vec<Value> = product_ids
            .iter()
            .map(|id| json!({"product_id": id, "quantity": 2}))
            .collect();
        json!({"customer_id": customer_id, "items": items})
    }

    #[tokio::test]
    async fn test_add_fires_order_created_once() {
        let state = test_state().await;
        let fx = fixture(&state, 2).await;
        let mut rx = state.signals.subscribe();

        let (status, body) = request(
            &state,
            Method::POST,
            "/admin/store/order/",
            Some(order_body(&fx.customer_id, &fx.product_ids)),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][0]["unit_price_cents"], 450);
        assert_eq!(body["payment_status"], "pending");

        let event = rx.try_recv().unwrap();
        assert_eq!(event.order.order.id, body["id"].as_str().unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_item_count_bounds() {
        let state = test_state().await;
        let fx = fixture(&state, 11).await;
        let mut rx = state.signals.subscribe();

        for count in [0, 11] {
            let (status, body) = request(
                &state,
                Method::POST,
                "/admin/store/order/",
                Some(order_body(&fx.customer_id, &fx.product_ids[..count])),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} items", count);
            assert_eq!(body["error"], "validation_error");
        }

        for count in [1, 10] {
            let (status, _) = request(
                &state,
                Method::POST,
                "/admin/store/order/",
                Some(order_body(&fx.customer_id, &fx.product_ids[..count])),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED, "{} items", count);
        }

        assert_eq!(state.db.orders().count().await.unwrap(), 2);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_create_sends_nothing() {
        let state = test_state().await;
        let fx = fixture(&state, 1).await;
        let mut rx = state.signals.subscribe();

        let ids = vec![fx.product_ids[0].clone(), "no-such-product".to_string()];
        let (status, _) = request(
            &state,
            Method::POST,
            "/admin/store/order/",
            Some(order_body(&fx.customer_id, &ids)),
        )
        .await;

        assert!(status.is_client_error());
        assert_eq!(state.db.orders().count().await.unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_quantity_is_rejected_and_printing_continues() {
        let state = test_state().await;
        let fx = fixture(&state, 1).await;

        let (printed_tx, mut printed) = tokio::sync::mpsc::unbounded_channel();
        let printer = state.signals.connect(move |event| {
            let mut out = Vec::new();
            on_order_created(&event, &mut out).unwrap();
            let _ = printed_tx.send(String::from_utf8(out).unwrap());
        });

        let body = |quantity: Value| {
            json!({
                "customer_id": fx.customer_id,
                "items": [{"product_id": fx.product_ids[0], "quantity": quantity}],
            })
        };

        for quantity in [json!(i64::MAX), json!(32_768)] {
            let (status, response) =
                request(&state, Method::POST, "/admin/store/order/", Some(body(quantity))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "validation_error");
        }
        assert_eq!(state.db.orders().count().await.unwrap(), 0);

        let (status, created) =
            request(&state, Method::POST, "/admin/store/order/", Some(body(json!(32_767)))).await;
        assert_eq!(status, StatusCode::CREATED);

        // 32767 × 4.50
        let line = printed.recv().await.unwrap();
        assert!(line.contains(created["id"].as_str().unwrap()));
        assert!(line.ends_with("total 147451.50\n"));
        assert!(!printer.is_finished());
    }

    #[tokio::test]
    async fn test_changelist_filtered_by_customer() {
        let state = test_state().await;
        let fx = fixture(&state, 1).await;
        for _ in 0..2 {
            request(
                &state,
                Method::POST,
                "/admin/store/order/",
                Some(order_body(&fx.customer_id, &fx.product_ids)),
            )
            .await;
        }

        let uri = format!("/admin/store/order/?customer_id={}", fx.customer_id);
        let (status, body) = request(&state, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 2);
        assert_eq!(body["rows"][0]["customer"], "Grace Hopper");

        let (_, body) =
            request(&state, Method::GET, "/admin/store/order/?customer_id=nobody", None).await;
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_detail_includes_inline_bounds() {
        let state = test_state().await;
        let fx = fixture(&state, 1).await;
        let (_, created) = request(
            &state,
            Method::POST,
            "/admin/store/order/",
            Some(order_body(&fx.customer_id, &fx.product_ids)),
        )
        .await;

        let uri = format!("/admin/store/order/{}/", created["id"].as_str().unwrap());
        let (status, body) = request(&state, Method::GET, &uri, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inline"]["min_num"], 1);
        assert_eq!(body["inline"]["max_num"], 10);
        assert_eq!(body["inline"]["autocomplete_fields"][0], "product");
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_change_replaces_items() {
        let state = test_state().await;
        let fx = fixture(&state, 3).await;
        let (_, created) = request(
            &state,
            Method::POST,
            "/admin/store/order/",
            Some(order_body(&fx.customer_id, &fx.product_ids[..1])),
        )
        .await;
        let uri = format!("/admin/store/order/{}/", created["id"].as_str().unwrap());

        let mut body = order_body(&fx.customer_id, &fx.product_ids[1..]);
        body["payment_status"] = json!("complete");
        let (status, changed) = request(&state, Method::PUT, &uri, Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(changed["payment_status"], "complete");
        assert_eq!(changed["items"].as_array().unwrap().len(), 2);

        let mut empty = order_body(&fx.customer_id, &[]);
        empty["payment_status"] = json!("complete");
        let (status, _) = request(&state, Method::PUT, &uri, Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete() {
        let state = test_state().await;
        let fx = fixture(&state, 1).await;
        let (_, created) = request(
            &state,
            Method::POST,
            "/admin/store/order/",
            Some(order_body(&fx.customer_id, &fx.product_ids)),
        )
        .await;
        let uri = format!("/admin/store/order/{}/", created["id"].as_str().unwrap());

        let (status, _) = request(&state, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = request(&state, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
