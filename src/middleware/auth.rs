use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, HeaderName, header::AUTHORIZATION, request::Parts};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::GateError;
use crate::gate::AccessGate;

/// Pull the presented credential out of request headers.
/// Accepts either:
/// - the configured secret header, when present (preferred)
/// - Header: `Authorization: Bearer <token>`
///
/// An `Authorization` value without the `Bearer ` scheme counts as absent.
/// Only the single space after the scheme is stripped; the token is compared as sent.
pub fn extract_credential<'a>(
    headers: &'a HeaderMap,
    secret_header: Option<&HeaderName>,
) -> Option<&'a str> {
    // 1) dedicated secret header
    if let Some(name) = secret_header
        && let Some(secret) = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    {
        return Some(secret);
    }

    // 2) header: Authorization: Bearer <token>
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())?;
    let auth = auth.trim();
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .filter(|token| !token.is_empty())
}

/// Runs the [`AccessGate`] before the handler; rejects with the gate's outcome.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<AccessGate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = Arc::<AccessGate>::from_ref(state);
        match gate.check(&parts.method, &parts.headers).await {
            Ok(()) => Ok(Self),
            Err(err @ GateError::ComparisonFault(_)) => {
                error!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    error = %err,
                    "credential comparison failed"
                );
                Err(err)
            }
            Err(err) => {
                warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    reason = ?err,
                    "request denied by access gate"
                );
                Err(err)
            }
        }
    }
}
