use serde::Deserialize;

use crate::error::ContactsError;

/// Request body for POST, PUT and PATCH. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Both fields, validated; used for create and full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
}

/// Fields to change on a partial update; `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl ContactInput {
    /// Require both `name` and `phone`.
    pub fn into_new(self) -> Result<NewContact, ContactsError> {
        Ok(NewContact {
            name: required("name", self.name)?,
            phone: required("phone", self.phone)?,
        })
    }

    /// Accept any subset of fields, each non-blank when present.
    pub fn into_patch(self) -> Result<ContactPatch, ContactsError> {
        Ok(ContactPatch {
            name: self.name.map(|v| required("name", Some(v))).transpose()?,
            phone: self.phone.map(|v| required("phone", Some(v))).transpose()?,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ContactsError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ContactsError::Validation(format!("{field} is required"))),
    }
}
