use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

/// Outcome of a denied access-gate decision.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum GateError {
    /// No credential header, or a header without the `Bearer ` scheme.
    #[error("Admin password required via Authorization header")]
    MissingCredential,

    /// A credential was presented but did not match.
    #[error("Invalid admin password")]
    InvalidCredential,

    /// The comparison itself failed, e.g. the stored hash is unusable.
    #[error("credential comparison failed: {0}")]
    ComparisonFault(String),
}

#[derive(Debug, ThisError)]
pub enum ContactsError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Contact not found")]
    NotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathRejection),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<figment::Error> for ContactsError {
    fn from(e: figment::Error) -> Self {
        ContactsError::Config(e.to_string())
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            GateError::MissingCredential => StatusCode::UNAUTHORIZED,
            GateError::InvalidCredential => StatusCode::FORBIDDEN,
            GateError::ComparisonFault(_) => return internal_error(),
        };
        (
            status,
            Json(ApiErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for ContactsError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ContactsError::Gate(gate) => return gate.into_response(),
            ContactsError::NotFound | ContactsError::RouteNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ContactsError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ContactsError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ContactsError::InvalidPath(rejection) => (rejection.status(), rejection.body_text()),
            ContactsError::DatabaseError(_) | ContactsError::Config(_) => {
                return internal_error();
            }
        };
        (status, Json(ApiErrorResponse { error: message })).into_response()
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

/// Error body shared by every non-2xx response: `{"error": "..."}`.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(resp: axum::response::Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn gate_errors_map_to_distinct_statuses() {
        let resp = GateError::MissingCredential.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_of(resp).await,
            r#"{"error":"Admin password required via Authorization header"}"#
        );

        let resp = GateError::InvalidCredential.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_of(resp).await, r#"{"error":"Invalid admin password"}"#);
    }

    #[tokio::test]
    async fn comparison_fault_does_not_leak_details() {
        let resp = GateError::ComparisonFault("invalid cost: 99".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(resp).await;
        assert_eq!(body, r#"{"error":"Internal server error"}"#);
    }

    #[tokio::test]
    async fn database_errors_are_internal() {
        let resp = ContactsError::DatabaseError(SqlxError::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn not_found_body() {
        let resp = ContactsError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(resp).await, r#"{"error":"Contact not found"}"#);
    }
}
