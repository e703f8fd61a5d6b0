use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use billing_core::{
    bill,
    consumption,
    domain::{NewUser, ProviderId, Reading, User, UserId, UserPatch},
    entities, subscription, Bill, BillingError, DateRange, PageRequest,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;

use super::{
    params::{PageParams, RangeParams, ReadingParams},
    ApiError, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/subscribe", post(subscribe))
        .route("/users/:id/meters/readings", get(user_readings))
        .route("/users/:id/bill", get(user_bill))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeBody {
    provider_id: Option<ProviderId>,
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(new) = payload?;
    let mut store = state.store.lock().await;
    let user = entities::register_user(&mut *store, new)?;
    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<User>>, ApiError> {
    let Query(params) = params?;
    let page = PageRequest::from_param(params.page.as_deref());
    let store = state.store.lock().await;
    Ok(Json(entities::list_users(&*store, page, state.page_size)))
}

async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id?;
    let store = state.store.lock().await;
    Ok(Json(entities::user(&*store, id)?))
}

async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let mut store = state.store.lock().await;
    Ok(Json(entities::update_user(&mut *store, id, &patch)?))
}

async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let mut store = state.store.lock().await;
    entities::remove_user(&mut *store, id)?;
    tracing::info!(user_id = id, "user deleted");
    Ok(Json(json!({ "message": "User successfully deleted" })))
}

async fn subscribe(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<SubscribeBody>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(user_id) = id?;
    let Json(body) = payload?;
    let provider_id = body
        .provider_id
        .ok_or_else(|| BillingError::invalid("providerId is required"))?;

    let mut store = state.store.lock().await;
    let user = subscription::subscribe(&mut *store, user_id, provider_id)?;
    tracing::info!(user_id, provider_id, "user subscribed");
    Ok(Json(user))
}

async fn user_readings(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    params: Result<Query<ReadingParams>, QueryRejection>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let Path(user_id) = id?;
    let Query(params) = params?;
    let filter = params.filter(OffsetDateTime::now_utc())?;

    let store = state.store.lock().await;
    Ok(Json(consumption::user_readings(&*store, user_id, &filter)?))
}

async fn user_bill(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<Bill>, ApiError> {
    let Path(user_id) = id?;
    let Query(params) = params?;
    let range = DateRange::from_params(params.start_date.as_deref(), params.end_date.as_deref())?;

    let store = state.store.lock().await;
    match bill(&*store, user_id, range) {
        Ok(bill) => {
            metrics::counter!("bills_computed_total").increment(1);
            tracing::info!(
                user_id,
                provider_id = bill.provider_id,
                total_units = bill.total_units,
                amount = bill.amount,
                windowed = bill.period.is_some(),
                "bill computed"
            );
            Ok(Json(bill))
        }
        Err(e) => {
            metrics::counter!("bill_failures_total", "code" => e.code()).increment(1);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use billing_core::auth::AllowAll;
    use serde_json::json;

    use crate::api::test_support::{app, app_with, seeded_store, send};

    async fn create(app: &axum::Router, name: &str) -> u64 {
        let (status, body) = send(
            app,
            "POST",
            "/users",
            Some(json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "fullname": format!("{name} tester"),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_u64().unwrap()
    }

    async fn meter_with_readings(app: &axum::Router, user_id: u64, readings: &[(f64, &str)]) -> u64 {
        let (status, meter) = send(
            app,
            "POST",
            "/meters",
            Some(json!({ "userId": user_id, "name": "main" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let meter_id = meter["id"].as_u64().unwrap();
        for (units, time) in readings {
            let (status, _) = send(
                app,
                "POST",
                &format!("/meters/{meter_id}/readings"),
                Some(json!({ "units": units, "time": time })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        meter_id
    }

    #[tokio::test]
    async fn user_crud_round_trip() {
        let app = app();
        let id = create(&app, "ada").await;
        assert_eq!(id, 1);

        let (status, body) = send(&app, "GET", "/users/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada");
        assert!(body.get("subscribedProvider").is_none());

        let (status, body) = send(
            &app,
            "PUT",
            "/users/1",
            Some(json!({ "username": "", "fullname": "Ada King" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada");
        assert_eq!(body["fullname"], "Ada King");

        let (status, body) = send(&app, "DELETE", "/users/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User successfully deleted");

        let (status, body) = send(&app, "GET", "/users/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn registration_requires_all_fields() {
        let app = app();
        let (status, body) = send(&app, "POST", "/users", Some(json!({ "username": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let app = app();
        let (status, body) = send(&app, "GET", "/users/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn listing_is_paginated() {
        let app = app_with(seeded_store(), Arc::new(AllowAll), 5);
        for i in 0..7 {
            create(&app, &format!("u{i}")).await;
        }
        let ids = |body: serde_json::Value| -> Vec<u64> {
            body.as_array()
                .unwrap()
                .iter()
                .map(|u| u["id"].as_u64().unwrap())
                .collect()
        };

        let (_, first) = send(&app, "GET", "/users", None).await;
        assert_eq!(ids(first), vec![1, 2, 3, 4, 5]);
        let (_, second) = send(&app, "GET", "/users?page=2", None).await;
        assert_eq!(ids(second), vec![6, 7]);
        let (status, third) = send(&app, "GET", "/users?page=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(ids(third).is_empty());
        let (_, junk) = send(&app, "GET", "/users?page=abc", None).await;
        assert_eq!(ids(junk), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn subscribe_requires_existing_provider() {
        let app = app();
        create(&app, "ada").await;

        let (status, body) = send(&app, "POST", "/users/1/subscribe", Some(json!({ "providerId": 9 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "provider 9 not found");

        let (status, body) = send(&app, "POST", "/users/1/subscribe", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid input: providerId is required");

        let (status, body) = send(&app, "POST", "/users/1/subscribe", Some(json!({ "providerId": 2 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscribedProvider"], 2);
    }

    #[tokio::test]
    async fn bill_totals_and_windows() {
        let app = app();
        let user_id = create(&app, "ada").await;
        meter_with_readings(
            &app,
            user_id,
            &[(100.0, "2024-01-01"), (180.0, "2024-01-15"), (200.0, "2024-01-31")],
        )
        .await;
        send(&app, "POST", "/users/1/subscribe", Some(json!({ "providerId": 1 }))).await;

        let (status, body) = send(&app, "GET", "/users/1/bill", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], 1);
        assert_eq!(body["amount"], 2400.0);
        assert!(body.get("startDate").is_none());

        let (status, body) = send(
            &app,
            "GET",
            "/users/1/bill?startDate=2024-01-01&endDate=2024-01-15",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalUnits"], 280.0);
        assert_eq!(body["amount"], 1400.0);
        assert_eq!(body["startDate"], "2024-01-01T00:00:00Z");
        assert_eq!(body["endDate"], "2024-01-15T23:59:59.999999999Z");
    }

    #[tokio::test]
    async fn overflowing_bill_is_rejected() {
        let app = app();
        let user_id = create(&app, "ada").await;
        meter_with_readings(&app, user_id, &[(1e308, "2024-01-01"), (1e308, "2024-01-02")]).await;
        send(&app, "POST", "/users/1/subscribe", Some(json!({ "providerId": 2 }))).await;

        let (status, body) = send(&app, "GET", "/users/1/bill", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
        assert!(body.get("amount").is_none());
    }

    #[tokio::test]
    async fn bill_failures_are_not_found() {
        let app = app();
        let (status, _) = send(&app, "GET", "/users/1/bill", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        create(&app, "ada").await;
        let (status, body) = send(&app, "GET", "/users/1/bill", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "provider_not_found");
        assert!(body.get("amount").is_none());

        send(&app, "POST", "/users/1/subscribe", Some(json!({ "providerId": 1 }))).await;
        let (status, body) = send(&app, "GET", "/users/1/bill", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "meters_not_found");

        meter_with_readings(&app, 1, &[(1.0, "2024-01-01")]).await;
        send(&app, "DELETE", "/providers/1", None).await;
        let (status, body) = send(&app, "GET", "/users/1/bill", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "provider_not_found");
    }

    #[tokio::test]
    async fn bill_with_one_bound_is_rejected() {
        let app = app();
        let (status, body) = send(&app, "GET", "/users/1/bill?startDate=2024-01-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn user_readings_are_flattened_across_meters() {
        let app = app();
        let user_id = create(&app, "ada").await;

        let (status, body) = send(&app, "GET", "/users/1/meters/readings", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "meters_not_found");

        meter_with_readings(&app, user_id, &[(1.0, "2024-01-01")]).await;
        meter_with_readings(&app, user_id, &[(2.0, "2024-02-01"), (3.0, "2024-03-01")]).await;

        let (status, body) = send(&app, "GET", "/users/1/meters/readings", None).await;
        assert_eq!(status, StatusCode::OK);
        let units: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["units"].as_f64().unwrap())
            .collect();
        assert_eq!(units, vec![1.0, 2.0, 3.0]);

        let (_, body) = send(
            &app,
            "GET",
            "/users/1/meters/readings?startDate=2024-02-01&endDate=2024-03-01",
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = send(&app, "GET", "/users/1/meters/readings?days=soon", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
