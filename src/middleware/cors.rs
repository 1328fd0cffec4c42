use axum::http::{
    HeaderName, HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::error::ContactsError;

/// CORS for the contacts API.
///
/// `ALLOWED_ORIGIN` pins a single origin (echoed only to that origin);
/// unset or `*` allows any origin.
/// The configured secret header is allowed alongside `Authorization`.
pub fn cors_layer(cfg: &Config) -> Result<CorsLayer, ContactsError> {
    let allow_origin = match cfg.allowed_origin.as_deref().map(str::trim) {
        None | Some("") | Some("*") => AllowOrigin::any(),
        Some(origin) => AllowOrigin::list([HeaderValue::from_str(origin).map_err(|e| {
            ContactsError::Config(format!("invalid ALLOWED_ORIGIN `{origin}`: {e}"))
        })?]),
    };

    let mut allow_headers = vec![CONTENT_TYPE, AUTHORIZATION];
    if let Some(name) = cfg.secret_header.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        allow_headers.push(HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ContactsError::Config(format!("invalid SECRET_HEADER `{name}`: {e}"))
        })?);
    }

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(allow_headers))
}
