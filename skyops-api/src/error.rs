use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use skyops_core::ScheduleError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Edit secret missing or invalid")]
    Unauthorized,

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Invalid query parameters")]
    InvalidQuery(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidQuery(rejection.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<Value>) {
        match self {
            AppError::Schedule(err) => {
                if let ScheduleError::Storage { source, .. } = err {
                    tracing::error!("Internal Server Error: {}: {}", err, source);
                }
                let status =
                    StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, err.code(), err.details())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidBody(reason) | AppError::InvalidQuery(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid_data",
                Some(json!({ "description": reason })),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
                "details": details,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyops_core::{Resource, StoreError};

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_shape() {
        let err = AppError::from(ScheduleError::NotFound {
            resource: Resource::Pilot,
            id: "h-404".to_string(),
        });
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "Pilot not found");
        assert_eq!(body["error"]["details"]["pilot_id"], "h-404");
    }

    #[tokio::test]
    async fn test_storage_failure_is_opaque() {
        let err = AppError::from(ScheduleError::storage(
            "update flight",
            StoreError::backend("password authentication failed for user skyops"),
        ));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "db_error");
        assert_eq!(body["error"]["message"], "Failed to update flight");
        assert!(body["error"]["details"].is_null());
        assert!(!body.to_string().contains("password"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (status, body) = body_of(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");
    }
}
