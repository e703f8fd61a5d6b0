use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use billing_core::BillingError;
use serde_json::json;

/// Every failure a handler can report. Rejections from axum extractors are
/// folded into the same 400 response as domain validation errors.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error("malformed request: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Billing(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Billing(BillingError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            Self::Billing(_) | Self::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Billing(e) => e.code(),
            Self::Malformed(_) => "invalid_input",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = status.as_u16(), error = %self, "request failed");
        metrics::counter!("billing_http_errors_total", "code" => self.code()).increment(1);

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_core::EntityKind;

    #[test]
    fn status_follows_error_family() {
        let cases = [
            (
                ApiError::from(BillingError::not_found(EntityKind::User, 1)),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(BillingError::NoMeters { user_id: 1 }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(BillingError::NotSubscribed { user_id: 1 }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(BillingError::invalid("bad")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(BillingError::Unauthorized("no".into())),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::Malformed("oops".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn display_keeps_domain_message() {
        let err = ApiError::from(BillingError::not_found(EntityKind::Meter, 4));
        assert_eq!(err.to_string(), "meter 4 not found");
    }
}
