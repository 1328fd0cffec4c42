use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type ContactId = i64;

/// A stored contact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
}
