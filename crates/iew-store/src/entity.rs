//! Row mapping for the persisted entities
//!
//! Each entity describes its table, how to read itself from a row and how
//! to write itself inside a transaction. The generic DAO builds every
//! statement from these pieces.
//!
//! ## Type Mapping
//!
//! | Domain Type      | SQL Type | Strategy                                  |
//! |------------------|----------|-------------------------------------------|
//! | ModelId          | INTEGER  | `AUTOINCREMENT`, NULL on insert           |
//! | DateTime<Utc>    | TEXT     | ISO 8601 via `to_rfc3339()`               |
//! | DataSourceKind   | TEXT     | variant name + serde_json payload         |
//! | ModelRef<M>      | INTEGER  | foreign key, read back as `Unloaded`      |
//! | bool             | INTEGER  | 0 / 1                                     |

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

use iew_core::domain::{
    Account, Authority, DataSource, DataSourceKind, DomainModel, MessageBundle, ModelId, ModelRef,
    TextItem, Tree,
};
use iew_core::ports::PersistenceError;

use crate::StoreError;

/// Relational mapping of a domain model
#[async_trait::async_trait]
pub trait SqlEntity: DomainModel {
    /// Table holding the rows of this entity
    const TABLE: &'static str;

    /// Identity column as it appears in [`SqlEntity::select_sql`]
    const ID_COLUMN: &'static str = "id";

    /// Other tables written when this entity is saved or removed
    const CASCADE_TABLES: &'static [&'static str] = &[];

    /// Base query selecting every column [`SqlEntity::from_row`] reads
    fn select_sql() -> String {
        format!("SELECT * FROM {}", Self::TABLE)
    }

    /// Maps one result row to the entity
    fn from_row(row: &SqliteRow) -> Result<Self, StoreError>;

    /// Inserts or updates the entity, assigning identities in place
    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError>;

    /// Deletes the row with the given identity, returning the affected row count
    async fn delete(&self, id: ModelId, conn: &mut SqliteConnection) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::TABLE);
        let result = sqlx::query(&sql).bind(id.value()).execute(conn).await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn raw_id<M: DomainModel>(model: &M) -> Option<i64> {
    model.id().map(|id| id.value())
}

fn invalid_row(table: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::SerializationError(format!("Invalid {} row: {}", table, e))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's CURRENT_TIMESTAMP format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

// ============================================================================
// TextItem
// ============================================================================

#[async_trait::async_trait]
impl SqlEntity for TextItem {
    const TABLE: &'static str = "text_item";

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: i64 = row.try_get("id")?;
        let language_code: String = row.try_get("language_code")?;
        let country_code: String = row.try_get("country_code")?;
        let content: String = row.try_get("content")?;

        let item = TextItem::new(language_code, country_code, content)
            .map_err(|e| invalid_row(Self::TABLE, e))?;
        Ok(item.with_id(ModelId::new(id)))
    }

    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO text_item (id, language_code, country_code, content)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                language_code = excluded.language_code,
                country_code = excluded.country_code,
                content = excluded.content
            RETURNING id
            "#,
        )
        .bind(raw_id(self))
        .bind(self.language_code())
        .bind(self.country_code())
        .bind(self.content())
        .fetch_one(conn)
        .await?;

        self.set_id(ModelId::new(id));
        Ok(())
    }
}

// ============================================================================
// MessageBundle
// ============================================================================

#[async_trait::async_trait]
impl SqlEntity for MessageBundle {
    const TABLE: &'static str = "message_bundle";
    const ID_COLUMN: &'static str = "mb.id";
    const CASCADE_TABLES: &'static [&'static str] = &["text_item"];

    fn select_sql() -> String {
        "SELECT mb.id, mb.text_key, mb.basename, \
                ti.id AS text_item_id, ti.language_code, ti.country_code, ti.content \
         FROM message_bundle mb \
         INNER JOIN text_item ti ON ti.id = mb.text_item_id"
            .to_string()
    }

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: i64 = row.try_get("id")?;
        let text_key: String = row.try_get("text_key")?;
        let basename: String = row.try_get("basename")?;
        let text_item_id: i64 = row.try_get("text_item_id")?;
        let language_code: String = row.try_get("language_code")?;
        let country_code: String = row.try_get("country_code")?;
        let content: String = row.try_get("content")?;

        let text_item = TextItem::new(language_code, country_code, content)
            .map_err(|e| invalid_row(TextItem::TABLE, e))?
            .with_id(ModelId::new(text_item_id));
        let bundle = MessageBundle::new(text_key, basename, text_item)
            .map_err(|e| invalid_row(Self::TABLE, e))?;
        Ok(bundle.with_id(ModelId::new(id)))
    }

    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError> {
        self.text_item_mut().upsert(&mut *conn).await?;
        let text_item_id = raw_id(self.text_item());

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO message_bundle (id, text_key, basename, text_item_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                text_key = excluded.text_key,
                basename = excluded.basename,
                text_item_id = excluded.text_item_id
            RETURNING id
            "#,
        )
        .bind(raw_id(self))
        .bind(self.text_key())
        .bind(self.basename())
        .bind(text_item_id)
        .fetch_one(conn)
        .await?;

        self.set_id(ModelId::new(id));
        Ok(())
    }

    /// Deletes the bundle row and the text item it owns
    async fn delete(&self, id: ModelId, conn: &mut SqliteConnection) -> Result<u64, StoreError> {
        let text_item_id: Option<i64> =
            sqlx::query_scalar("SELECT text_item_id FROM message_bundle WHERE id = ?")
                .bind(id.value())
                .fetch_optional(&mut *conn)
                .await?;

        let result = sqlx::query("DELETE FROM message_bundle WHERE id = ?")
            .bind(id.value())
            .execute(&mut *conn)
            .await?;

        if let Some(text_item_id) = text_item_id {
            sqlx::query("DELETE FROM text_item WHERE id = ?")
                .bind(text_item_id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(result.rows_affected())
    }
}

// ============================================================================
// DataSource
// ============================================================================

#[async_trait::async_trait]
impl SqlEntity for DataSource {
    const TABLE: &'static str = "data_source";

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: i64 = row.try_get("id")?;
        let payload: String = row.try_get("payload")?;

        let kind: DataSourceKind = serde_json::from_str(&payload).map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse data source payload: {}", e))
        })?;
        Ok(DataSource::new(kind).with_id(ModelId::new(id)))
    }

    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError> {
        let payload = serde_json::to_string(self.kind()).map_err(|e| {
            StoreError::SerializationError(format!("Failed to serialize data source: {}", e))
        })?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO data_source (id, kind, payload)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                payload = excluded.payload
            RETURNING id
            "#,
        )
        .bind(raw_id(self))
        .bind(self.variant_name())
        .bind(payload)
        .fetch_one(conn)
        .await?;

        self.set_id(ModelId::new(id));
        Ok(())
    }
}

// ============================================================================
// Account
// ============================================================================

#[async_trait::async_trait]
impl SqlEntity for Account {
    const TABLE: &'static str = "account";

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: i64 = row.try_get("id")?;
        let username: String = row.try_get("username")?;
        let password_hash: String = row.try_get("password_hash")?;
        let enabled: bool = row.try_get("enabled")?;
        let created_at_str: String = row.try_get("created_at")?;

        Ok(Account::reconstitute(
            ModelId::new(id),
            username,
            password_hash,
            enabled,
            parse_datetime(&created_at_str)?,
        ))
    }

    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO account (id, username, password_hash, enabled, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                password_hash = excluded.password_hash,
                enabled = excluded.enabled
            RETURNING id
            "#,
        )
        .bind(raw_id(self))
        .bind(self.username())
        .bind(self.password_hash())
        .bind(self.is_enabled())
        .bind(self.created_at().to_rfc3339())
        .fetch_one(conn)
        .await?;

        self.set_id(ModelId::new(id));
        Ok(())
    }
}

// ============================================================================
// Authority
// ============================================================================

#[async_trait::async_trait]
impl SqlEntity for Authority {
    const TABLE: &'static str = "authority";

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: i64 = row.try_get("id")?;
        let system_name: String = row.try_get("system_name")?;
        let name_key: String = row.try_get("name_key")?;

        let authority =
            Authority::new(system_name, name_key).map_err(|e| invalid_row(Self::TABLE, e))?;
        Ok(authority.with_id(ModelId::new(id)))
    }

    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO authority (id, system_name, name_key)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                system_name = excluded.system_name,
                name_key = excluded.name_key
            RETURNING id
            "#,
        )
        .bind(raw_id(self))
        .bind(self.system_name())
        .bind(self.name_key())
        .fetch_one(conn)
        .await?;

        self.set_id(ModelId::new(id));
        Ok(())
    }
}

// ============================================================================
// Tree
// ============================================================================

#[async_trait::async_trait]
impl SqlEntity for Tree {
    const TABLE: &'static str = "tree";

    fn from_row(row: &SqliteRow) -> Result<Self, StoreError> {
        let id: i64 = row.try_get("id")?;
        let lookup_key: String = row.try_get("lookup_key")?;
        let description: Option<String> = row.try_get("description")?;
        let data_source_id: Option<i64> = row.try_get("data_source_id")?;

        let mut tree = Tree::new(lookup_key)
            .map_err(|e| invalid_row(Self::TABLE, e))?
            .with_id(ModelId::new(id));
        tree.set_description(description);
        tree.set_data_source(data_source_id.map(|ds| ModelRef::Unloaded(ModelId::new(ds))));
        Ok(tree)
    }

    async fn upsert(&mut self, conn: &mut SqliteConnection) -> Result<(), StoreError> {
        // A referenced data source must have been saved first
        let data_source_id = match self.data_source() {
            Some(reference) => Some(reference.id().ok_or(PersistenceError::Transient)?.value()),
            None => None,
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tree (id, lookup_key, lookup_key_norm, description, data_source_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                lookup_key = excluded.lookup_key,
                lookup_key_norm = excluded.lookup_key_norm,
                description = excluded.description,
                data_source_id = excluded.data_source_id
            RETURNING id
            "#,
        )
        .bind(raw_id(self))
        .bind(self.lookup_key())
        .bind(Tree::normalize_lookup_key(self.lookup_key()))
        .bind(self.description())
        .bind(data_source_id)
        .fetch_one(conn)
        .await?;

        self.set_id(ModelId::new(id));
        Ok(())
    }
}
