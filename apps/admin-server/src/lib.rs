//! # Storefront Admin Server
//!
//! JSON admin site for the store: collections, products, customers and
//! orders, each behind a model admin.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Admin Server                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  AdminSite     │  │  Model admins  │  │  OrderSignals              ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • changelist   │  │ • order_created            ││
//! │  │ • index        │  │ • add / change │  │   (broadcast, fired after  ││
//! │  │                │  │ • delete       │  │    the order commits)      ││
//! │  │                │  │ • actions      │  │                            ││
//! │  │                │  │ • autocomplete │  │                            ││
//! │  └────────────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │                              │                                          │
//! │                      ┌───────▼────────┐                                 │
//! │                      │ storefront-db  │  SQLite                         │
//! │                      └────────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::AdminConfig`]; every field can be overridden with a
//! `STOREFRONT_*` environment variable.

pub mod admin;
pub mod config;
pub mod error;
pub mod extract;
pub mod signals;
pub mod site;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use storefront_db::Database;

pub use config::AdminConfig;
pub use error::{ApiError, ApiResult};
pub use signals::{OrderCreated, OrderSignals};
pub use site::{AdminSite, SiteError};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub site: AdminSite,
    pub signals: OrderSignals,
    pub config: AdminConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Registers the store's model admins and opens the order signal.
    pub fn new(db: Database, config: AdminConfig) -> Result<Self, SiteError> {
        Ok(AppState {
            db,
            site: admin::default_site(config.list_per_page)?,
            signals: OrderSignals::new(config.signal_capacity),
            config,
        })
    }
}

/// Builds the admin router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/admin/", get(site::index))
        .merge(admin::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_check(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({"status": "ok"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unavailable"})),
        )
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use storefront_db::DbConfig;
    use tower::ServiceExt;

    /// State over a fresh in-memory database.
    pub async fn test_state() -> SharedState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Arc::new(AppState::new(db, AdminConfig::default()).unwrap())
    }

    /// Sends one request through the full router; empty bodies come back
    /// as `Value::Null`.
    pub async fn request(
        state: &SharedState,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
