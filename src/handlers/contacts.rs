use axum::{
    Json,
    extract::{
        FromRequestParts, Path, Request, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use tracing::info;

use crate::db::{Contact, ContactId, ContactsStorage};
use crate::error::ContactsError;
use crate::middleware::auth::RequireAdmin;
use crate::router::{CONTACTS_PATH, ContactsState};
use crate::types::ContactInput;

type ContactResult<T> = Result<Json<T>, ContactsError>;

/// GET /api/contacts
pub async fn list_contacts(State(storage): State<ContactsStorage>) -> ContactResult<Vec<Contact>> {
    Ok(Json(storage.list().await?))
}

/// GET /api/contacts/{id}
pub async fn get_contact(
    State(storage): State<ContactsStorage>,
    id: Result<Path<ContactId>, PathRejection>,
) -> ContactResult<Contact> {
    let Path(id) = id?;
    storage
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or(ContactsError::NotFound)
}

/// POST /api/contacts
pub async fn create_contact(
    State(storage): State<ContactsStorage>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ContactResult<Contact> {
    let Json(input) = body?;
    let contact = storage.insert(input.into_new()?).await?;
    info!(id = contact.id, "contact created");
    Ok(Json(contact))
}

/// PUT /api/contacts/{id} -> replaces name and phone.
pub async fn replace_contact(
    State(storage): State<ContactsStorage>,
    id: Result<Path<ContactId>, PathRejection>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ContactResult<Contact> {
    let Path(id) = id?;
    let Json(input) = body?;
    let contact = storage
        .replace(id, input.into_new()?)
        .await?
        .ok_or(ContactsError::NotFound)?;
    info!(id, "contact replaced");
    Ok(Json(contact))
}

/// PATCH /api/contacts/{id} -> updates only the supplied fields.
pub async fn patch_contact(
    State(storage): State<ContactsStorage>,
    id: Result<Path<ContactId>, PathRejection>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ContactResult<Contact> {
    let Path(id) = id?;
    let Json(input) = body?;
    let contact = storage
        .patch(id, input.into_patch()?)
        .await?
        .ok_or(ContactsError::NotFound)?;
    info!(id, "contact patched");
    Ok(Json(contact))
}

/// DELETE /api/contacts/{id} -> returns the removed contact.
pub async fn delete_contact(
    State(storage): State<ContactsStorage>,
    id: Result<Path<ContactId>, PathRejection>,
) -> ContactResult<Contact> {
    let Path(id) = id?;
    let contact = storage.delete(id).await?.ok_or(ContactsError::NotFound)?;
    info!(id, "contact deleted");
    Ok(Json(contact))
}

/// Fallback for unmatched paths. Anything under `/api/contacts` still passes
/// the access gate before getting a 404.
pub async fn unknown_route(State(state): State<ContactsState>, req: Request) -> ContactsError {
    let (mut parts, _body) = req.into_parts();
    let path = parts.uri.path();
    let under_contacts = path == CONTACTS_PATH
        || path
            .strip_prefix(CONTACTS_PATH)
            .is_some_and(|rest| rest.starts_with('/'));
    if under_contacts
        && let Err(err) = RequireAdmin::from_request_parts(&mut parts, &state).await
    {
        return err.into();
    }
    ContactsError::RouteNotFound
}
