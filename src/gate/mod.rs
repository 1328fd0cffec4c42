//! Access gate for the contacts resource.
//!
//! The gate is built once from [`Config`] and shared read-only across
//! requests. Each decision is independent of every other.

pub mod verifier;

pub use verifier::CredentialVerifier;

use crate::config::{AuthMode, Config};
use crate::error::{ContactsError, GateError};
use crate::middleware::auth::extract_credential;
use axum::http::{HeaderMap, HeaderName, Method};
use serde::{Deserialize, Serialize};

/// Which requests must present a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    /// GET and POST pass without a credential; PUT, PATCH and DELETE are checked.
    #[default]
    MethodExempt,
    /// Every request is checked.
    Always,
}

impl GatePolicy {
    pub fn exempts(&self, method: &Method) -> bool {
        match self {
            GatePolicy::MethodExempt => *method == Method::GET || *method == Method::POST,
            GatePolicy::Always => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessGate {
    policy: GatePolicy,
    verifier: CredentialVerifier,
    secret_header: Option<HeaderName>,
}

impl AccessGate {
    pub fn new(policy: GatePolicy, verifier: CredentialVerifier) -> Self {
        Self {
            policy,
            verifier,
            secret_header: None,
        }
    }

    /// Also accept the credential from `header`, preferred over `Authorization`.
    pub fn with_secret_header(mut self, header: HeaderName) -> Self {
        self.secret_header = Some(header);
        self
    }

    /// Build the gate from startup configuration, failing closed when the
    /// expected credential is missing or unusable.
    pub fn from_config(cfg: &Config) -> Result<Self, ContactsError> {
        let verifier = match cfg.auth_mode {
            AuthMode::Exact => {
                let secret = untrimmed("ADMIN_PASSWORD", cfg.admin_password.as_deref())?
                    .ok_or_else(|| {
                        ContactsError::Config(
                            "ADMIN_PASSWORD must be set when AUTH_MODE=exact".into(),
                        )
                    })?;
                CredentialVerifier::exact(secret)?
            }
            AuthMode::Hashed => {
                let hash = untrimmed("ADMIN_PASSWORD_HASH", cfg.admin_password_hash.as_deref())?
                    .ok_or_else(|| {
                        ContactsError::Config(
                            "ADMIN_PASSWORD_HASH must be set when AUTH_MODE=hashed".into(),
                        )
                    })?;
                CredentialVerifier::hashed(hash)?
            }
            AuthMode::Open => match non_empty(cfg.allowed_origin.as_deref()) {
                Some(origin) if origin != "*" => CredentialVerifier::Open,
                _ => {
                    return Err(ContactsError::Config(
                        "ALLOWED_ORIGIN must name a concrete origin when AUTH_MODE=open".into(),
                    ));
                }
            },
        };

        let mut gate = Self::new(cfg.gate_policy, verifier);
        if let Some(name) = non_empty(cfg.secret_header.as_deref()) {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ContactsError::Config(format!("invalid SECRET_HEADER `{name}`: {e}"))
            })?;
            gate = gate.with_secret_header(header);
        }
        Ok(gate)
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn secret_header(&self) -> Option<&HeaderName> {
        self.secret_header.as_ref()
    }

    /// Decide whether a request with `method` and the given credential may proceed.
    pub async fn authorize(
        &self,
        method: &Method,
        credential: Option<&str>,
    ) -> Result<(), GateError> {
        if self.verifier.is_open() || self.policy.exempts(method) {
            return Ok(());
        }
        let token = credential.ok_or(GateError::MissingCredential)?;
        if self.verifier.verify(token).await? {
            Ok(())
        } else {
            Err(GateError::InvalidCredential)
        }
    }

    /// [`authorize`](Self::authorize) with the credential taken from request headers.
    pub async fn check(&self, method: &Method, headers: &HeaderMap) -> Result<(), GateError> {
        let credential = extract_credential(headers, self.secret_header.as_ref());
        self.authorize(method, credential).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Secrets are used exactly as configured; surrounding whitespace is refused
/// rather than silently stripped.
fn untrimmed<'a>(key: &str, value: Option<&'a str>) -> Result<Option<&'a str>, ContactsError> {
    match value {
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) if v.trim() != v => Err(ContactsError::Config(format!(
            "{key} must not have leading or trailing whitespace"
        ))),
        other => Ok(other),
    }
}
