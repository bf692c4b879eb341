//! # Admin Site
//!
//! Registry of the model admins and the site index at `/admin/`.
//!
//! ```text
//! AdminSite
//!   └─ store
//!        ├─ Collections  /admin/store/collection/
//!        ├─ Customers    /admin/store/customer/
//!        ├─ Orders       /admin/store/order/
//!        └─ Products     /admin/store/product/
//! ```

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use storefront_core::links::changelist_url;

use crate::admin::ModelAdmin;
use crate::SharedState;

/// Site header shown on every admin page.
pub const SITE_HEADER: &str = "Storefront administration";

/// A registered model as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredModel {
    pub app_label: &'static str,
    pub model_name: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub changelist_url: String,
    pub list_per_page: u32,
}

/// One app section of the index page.
#[derive(Debug, Clone, Serialize)]
pub struct AppIndex {
    pub app_label: &'static str,
    pub models: Vec<RegisteredModel>,
}

/// JSON body of `GET /admin/`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteIndex {
    pub site_header: &'static str,
    pub apps: Vec<AppIndex>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SiteError {
    #[error("The model {app_label}.{model_name} is already registered")]
    AlreadyRegistered {
        app_label: &'static str,
        model_name: &'static str,
    },
}

/// Model admin registry.
#[derive(Debug, Clone)]
pub struct AdminSite {
    default_per_page: u32,
    models: Vec<RegisteredModel>,
}

impl AdminSite {
    /// Creates an empty site; admins without their own page size use
    /// `default_per_page`.
    pub fn new(default_per_page: u32) -> Self {
        AdminSite {
            default_per_page,
            models: Vec::new(),
        }
    }

    /// Registers a model admin. Each model can be registered once.
    pub fn register<A: ModelAdmin>(&mut self) -> Result<(), SiteError> {
        if self.get(A::APP_LABEL, A::MODEL_NAME).is_some() {
            return Err(SiteError::AlreadyRegistered {
                app_label: A::APP_LABEL,
                model_name: A::MODEL_NAME,
            });
        }

        let list_per_page = self.per_page::<A>();
        self.models.push(RegisteredModel {
            app_label: A::APP_LABEL,
            model_name: A::MODEL_NAME,
            verbose_name: A::VERBOSE_NAME,
            verbose_name_plural: A::VERBOSE_NAME_PLURAL,
            changelist_url: changelist_url(A::APP_LABEL, A::MODEL_NAME),
            list_per_page,
        });
        Ok(())
    }

    pub fn get(&self, app_label: &str, model_name: &str) -> Option<&RegisteredModel> {
        self.models
            .iter()
            .find(|m| m.app_label == app_label && m.model_name == model_name)
    }

    pub fn models(&self) -> &[RegisteredModel] {
        &self.models
    }

    /// Changelist page size of an admin.
    pub fn per_page<A: ModelAdmin>(&self) -> u32 {
        A::LIST_PER_PAGE.unwrap_or(self.default_per_page)
    }

    /// Registered models grouped by app, apps and models sorted by name.
    pub fn index(&self) -> SiteIndex {
        let mut apps: BTreeMap<&'static str, Vec<RegisteredModel>> = BTreeMap::new();
        for model in &self.models {
            apps.entry(model.app_label).or_default().push(model.clone());
        }

        SiteIndex {
            site_header: SITE_HEADER,
            apps: apps
                .into_iter()
                .map(|(app_label, mut models)| {
                    models.sort_by_key(|m| m.verbose_name_plural);
                    AppIndex { app_label, models }
                })
                .collect(),
        }
    }
}

/// `GET /admin/`
pub async fn index(State(state): State<SharedState>) -> Json<SiteIndex> {
    Json(state.site.index())
}

// =============================================================================
// Unit Tests
// =============================================================================
