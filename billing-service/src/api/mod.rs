use std::sync::Arc;

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use billing_core::auth::{AllowAll, Authorizer, SharedSecret};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, SharedStore};

pub mod error;
pub mod meters;
pub mod params;
pub mod providers;
pub mod users;

pub use error::ApiError;

/// Header carrying the admin shared secret.
pub const ADMIN_HEADER: &str = "x-admin-key";

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub authorizer: Arc<dyn Authorizer>,
    pub page_size: usize,
}

impl AppState {
    pub fn new(store: SharedStore, authorizer: Arc<dyn Authorizer>, page_size: usize) -> Self {
        Self {
            store,
            authorizer,
            page_size,
        }
    }

    pub fn from_config(cfg: &AppConfig, store: SharedStore) -> Self {
        let authorizer: Arc<dyn Authorizer> = match &cfg.auth.admin_key {
            Some(key) => Arc::new(SharedSecret::new(key.clone())),
            None => {
                tracing::warn!("no admin key configured; provider changes are unrestricted");
                Arc::new(AllowAll)
            }
        };
        Self::new(store, authorizer, cfg.pagination.page_size)
    }

    /// Precondition for admin-only operations.
    pub fn authorize_admin(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let credential = headers.get(ADMIN_HEADER).and_then(|v| v.to_str().ok());
        self.authorizer.authorize(credential).map_err(ApiError::from)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .merge(users::routes())
        .merge(providers::routes())
        .merge(meters::routes())
        .layer(middleware::from_fn(count_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "Up and Running" }))
}

async fn count_requests(request: Request, next: Next) -> Response {
    let method = request.method().as_str().to_owned();
    let response = next.run(request).await;
    metrics::counter!(
        "billing_http_requests_total",
        "method" => method,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    response
}
