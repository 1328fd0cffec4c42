use crate::db::models::{Contact, ContactId};
use crate::db::schema::SQLITE_INIT;
use crate::error::ContactsError;
use crate::types::{ContactPatch, NewContact};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ContactsStorage {
    pool: SqlitePool,
}

impl ContactsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, ContactsError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        info!(database_url = %database_url, "contacts database ready");
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ContactsError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Contact>, ContactsError> {
        let rows = sqlx::query_as::<_, Contact>("SELECT id, name, phone FROM contacts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>, ContactsError> {
        let row =
            sqlx::query_as::<_, Contact>("SELECT id, name, phone FROM contacts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn insert(&self, contact: NewContact) -> Result<Contact, ContactsError> {
        let row = sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (name, phone) VALUES (?, ?) RETURNING id, name, phone",
        )
        .bind(contact.name)
        .bind(contact.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrite both fields. `None` when no contact has `id`.
    pub async fn replace(
        &self,
        id: ContactId,
        contact: NewContact,
    ) -> Result<Option<Contact>, ContactsError> {
        let row = sqlx::query_as::<_, Contact>(
            r#"UPDATE contacts SET name = ?, phone = ?
               WHERE id = ?
               RETURNING id, name, phone"#,
        )
        .bind(contact.name)
        .bind(contact.phone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrite only the supplied fields. `None` when no contact has `id`.
    pub async fn patch(
        &self,
        id: ContactId,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, ContactsError> {
        let row = sqlx::query_as::<_, Contact>(
            r#"UPDATE contacts SET
                name = COALESCE(?, name),
                phone = COALESCE(?, phone)
               WHERE id = ?
               RETURNING id, name, phone"#,
        )
        .bind(patch.name)
        .bind(patch.phone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Remove and return the contact. `None` when no contact has `id`.
    pub async fn delete(&self, id: ContactId) -> Result<Option<Contact>, ContactsError> {
        let row = sqlx::query_as::<_, Contact>(
            "DELETE FROM contacts WHERE id = ? RETURNING id, name, phone",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
