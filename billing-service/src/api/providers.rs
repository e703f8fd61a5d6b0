use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use billing_core::{
    domain::{NewProvider, Provider, ProviderId, ProviderPatch},
    entities,
};
use serde_json::{json, Value};

use super::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/providers", get(list_providers).post(create_provider))
        .route(
            "/providers/:id",
            put(update_provider).get(get_provider).delete(delete_provider),
        )
}

async fn list_providers(State(state): State<AppState>) -> Json<Vec<Provider>> {
    let store = state.store.lock().await;
    Json(entities::list_providers(&*store))
}

async fn get_provider(
    State(state): State<AppState>,
    id: Result<Path<ProviderId>, PathRejection>,
) -> Result<Json<Provider>, ApiError> {
    let Path(id) = id?;
    let store = state.store.lock().await;
    Ok(Json(entities::provider(&*store, id)?))
}

async fn create_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewProvider>, JsonRejection>,
) -> Result<(StatusCode, Json<Provider>), ApiError> {
    state.authorize_admin(&headers)?;
    let Json(new) = payload?;

    let mut store = state.store.lock().await;
    let provider = entities::create_provider(&mut *store, new)?;
    tracing::info!(provider_id = provider.id, charge = provider.charge, "provider created");
    Ok((StatusCode::CREATED, Json(provider)))
}

async fn update_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<ProviderId>, PathRejection>,
    payload: Result<Json<ProviderPatch>, JsonRejection>,
) -> Result<Json<Provider>, ApiError> {
    state.authorize_admin(&headers)?;
    let Path(id) = id?;
    let Json(patch) = payload?;

    let mut store = state.store.lock().await;
    let provider = entities::update_provider(&mut *store, id, &patch)?;
    tracing::info!(provider_id = id, charge = provider.charge, "provider updated");
    Ok(Json(provider))
}

async fn delete_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<ProviderId>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    state.authorize_admin(&headers)?;
    let Path(id) = id?;

    let mut store = state.store.lock().await;
    entities::remove_provider(&mut *store, id)?;
    tracing::info!(provider_id = id, "provider deleted");
    Ok(Json(json!({ "message": "Provider successfully deleted" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use billing_core::auth::SharedSecret;
    use serde_json::json;

    use crate::api::{
        test_support::{app, app_with, seeded_store, send, send_with_headers},
        ADMIN_HEADER,
    };

    #[tokio::test]
    async fn seeded_providers_are_listed() {
        let app = app();
        let (status, body) = send(&app, "GET", "/providers", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "id": 1, "name": "Electro", "charge": 5.0 },
                { "id": 2, "name": "Magneto", "charge": 10.0 },
            ])
        );
    }

    #[tokio::test]
    async fn ids_continue_after_delete() {
        let app = app();
        let (status, _) = send(&app, "DELETE", "/providers/2", None).await;
        assert_eq!(status, StatusCode::OK);

        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let (status, body) = send(
                &app,
                "POST",
                "/providers",
                Some(json!({ "name": name, "charge": 1.5 })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            ids.push(body["id"].as_u64().unwrap());
        }
        assert_eq!(ids, vec![3, 4, 5]);

        let (status, _) = send(&app, "DELETE", "/providers/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_applies_zero_charge_but_not_blank_name() {
        let app = app();
        let (status, body) = send(
            &app,
            "PUT",
            "/providers/1",
            Some(json!({ "name": "", "charge": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": 1, "name": "Electro", "charge": 0.0 }));
    }

    #[tokio::test]
    async fn invalid_charge_is_rejected() {
        let app = app();
        let (status, _) = send(&app, "POST", "/providers", Some(json!({ "name": "x", "charge": -2 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "POST", "/providers", Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "POST", "/providers", Some(json!({ "name": "x", "charge": "ten" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_key_guards_mutations() {
        let app = app_with(seeded_store(), Arc::new(SharedSecret::new("s3cret")), 10);
        let body = json!({ "name": "Solar", "charge": 2.0 });

        let (status, resp) = send(&app, "POST", "/providers", Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp["error"], "unauthorized");

        let (status, _) = send_with_headers(
            &app,
            "DELETE",
            "/providers/1",
            None,
            &[(ADMIN_HEADER, "wrong")],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, resp) = send_with_headers(
            &app,
            "POST",
            "/providers",
            Some(body),
            &[(ADMIN_HEADER, "s3cret")],
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resp["id"], 3);

        let (status, _) = send(&app, "GET", "/providers/1", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
