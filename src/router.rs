use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware::from_extractor_with_state,
    routing::get,
};
use std::sync::Arc;

use crate::db::ContactsStorage;
use crate::gate::AccessGate;
use crate::handlers::contacts::{
    create_contact, delete_contact, get_contact, list_contacts, patch_contact, replace_contact,
    unknown_route,
};
use crate::middleware::auth::RequireAdmin;

/// Prefix of every gated route.
pub const CONTACTS_PATH: &str = "/api/contacts";

/// JSON body limit, matching the usual 100kb default of JSON body parsers.
pub const BODY_LIMIT: usize = 100 * 1024;

#[derive(Clone)]
pub struct ContactsState {
    pub storage: ContactsStorage,
    pub gate: Arc<AccessGate>,
}

impl ContactsState {
    pub fn new(storage: ContactsStorage, gate: Arc<AccessGate>) -> Self {
        Self { storage, gate }
    }
}

impl FromRef<ContactsState> for ContactsStorage {
    fn from_ref(state: &ContactsState) -> Self {
        state.storage.clone()
    }
}

impl FromRef<ContactsState> for Arc<AccessGate> {
    fn from_ref(state: &ContactsState) -> Self {
        Arc::clone(&state.gate)
    }
}

/// Contacts API. Every route under `/api/contacts`, matched or not, passes the
/// access gate before its handler runs; unmatched paths answer a JSON 404.
pub fn contacts_router(state: ContactsState) -> Router {
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/{id}",
            get(get_contact)
                .put(replace_contact)
                .patch(patch_contact)
                .delete(delete_contact),
        )
        .route_layer(from_extractor_with_state::<RequireAdmin, _>(state.clone()))
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
