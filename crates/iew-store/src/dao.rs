//! Generic SQLite DAO
//!
//! [`SqliteDomainModelDao`] implements the generic DAO port for every
//! [`SqlEntity`]. Entity finders are implemented on the concrete
//! instantiations in [`crate::finders`].

use std::marker::PhantomData;
use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use iew_core::domain::{
    Account, Authority, DataSource, DomainModel, MessageBundle, ModelId, TextItem, Tree,
};
use iew_core::ports::{DomainModelDao, PersistenceError};

use crate::entity::SqlEntity;
use crate::query_cache::QueryCache;
use crate::StoreError;

/// SQLite-backed DAO for one entity type
pub struct SqliteDomainModelDao<M> {
    pool: SqlitePool,
    cache: Arc<QueryCache>,
    _model: PhantomData<fn() -> M>,
}

impl<M: SqlEntity> SqliteDomainModelDao<M> {
    /// Creates a DAO on the given pool, sharing `cache` with sibling DAOs
    pub fn new(pool: SqlitePool, cache: Arc<QueryCache>) -> Self {
        Self {
            pool,
            cache,
            _model: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Maps a result set to entities
    pub(crate) fn map_rows(rows: &[SqliteRow]) -> Result<Vec<M>, StoreError> {
        let mut models = Vec::with_capacity(rows.len());
        for row in rows {
            models.push(M::from_row(row)?);
        }
        Ok(models)
    }

    /// Evicts cached results that read any table this entity writes
    fn invalidate_cache(&self) {
        self.cache.invalidate_table(M::TABLE);
        for table in M::CASCADE_TABLES {
            self.cache.invalidate_table(table);
        }
    }
}

impl<M> Clone for SqliteDomainModelDao<M> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            cache: Arc::clone(&self.cache),
            _model: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<M: SqlEntity> DomainModelDao<M> for SqliteDomainModelDao<M> {
    async fn save(&self, mut model: M) -> anyhow::Result<M> {
        let mut tx = self.pool.begin().await?;
        model
            .upsert(&mut *tx)
            .await
            .map_err(StoreError::into_port_error)?;
        tx.commit().await?;

        self.invalidate_cache();
        tracing::trace!(table = M::TABLE, id = ?model.id(), "Saved model");
        Ok(model)
    }

    async fn remove(&self, model: &M) -> anyhow::Result<()> {
        let id = model.id().ok_or(PersistenceError::Transient)?;

        let mut tx = self.pool.begin().await?;
        let removed = model.delete(id, &mut *tx).await?;
        tx.commit().await?;

        self.invalidate_cache();
        tracing::trace!(table = M::TABLE, %id, removed, "Removed model");
        Ok(())
    }

    async fn find_by_id(&self, id: ModelId) -> anyhow::Result<Option<M>> {
        let sql = format!("{} WHERE {} = ?", M::select_sql(), M::ID_COLUMN);
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(M::from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> anyhow::Result<Vec<M>> {
        let rows = sqlx::query(&M::select_sql()).fetch_all(&self.pool).await?;
        Ok(Self::map_rows(&rows)?)
    }

    async fn find_page(&self, first_result: u64, max_results: u64) -> anyhow::Result<Vec<M>> {
        let sql = format!(
            "{} ORDER BY {} ASC LIMIT ? OFFSET ?",
            M::select_sql(),
            M::ID_COLUMN
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(max_results).unwrap_or(i64::MAX))
            .bind(i64::try_from(first_result).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(Self::map_rows(&rows)?)
    }

    async fn find_all_ordered_ascending(&self) -> anyhow::Result<Vec<M>> {
        let sql = format!("{} ORDER BY {} ASC", M::select_sql(), M::ID_COLUMN);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(Self::map_rows(&rows)?)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", M::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn refresh(&self, model: &mut M) -> anyhow::Result<()> {
        let id = model.id().ok_or(PersistenceError::Transient)?;
        let fresh = self
            .find_by_id(id)
            .await?
            .ok_or(PersistenceError::NotFound(id))?;
        *model = fresh;
        Ok(())
    }
}

// ============================================================================
// SqliteStore
// ============================================================================

/// Hands out the SQLite DAOs of one database
///
/// All DAOs created by the same store share its [`QueryCache`].
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    cache: Arc<QueryCache>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            cache: Arc::new(QueryCache::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Creates the DAO for any mapped entity
    pub fn dao<M: SqlEntity>(&self) -> SqliteDomainModelDao<M> {
        SqliteDomainModelDao::new(self.pool.clone(), Arc::clone(&self.cache))
    }

    pub fn accounts(&self) -> SqliteDomainModelDao<Account> {
        self.dao()
    }

    pub fn authorities(&self) -> SqliteDomainModelDao<Authority> {
        self.dao()
    }

    pub fn data_sources(&self) -> SqliteDomainModelDao<DataSource> {
        self.dao()
    }

    pub fn message_bundles(&self) -> SqliteDomainModelDao<MessageBundle> {
        self.dao()
    }

    pub fn text_items(&self) -> SqliteDomainModelDao<TextItem> {
        self.dao()
    }

    pub fn trees(&self) -> SqliteDomainModelDao<Tree> {
        self.dao()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DatabasePool;

    async fn setup() -> (DatabasePool, SqliteStore) {
        let pool = DatabasePool::in_memory()
            .await
            .expect("Failed to create in-memory pool");
        let store = SqliteStore::new(pool.pool().clone());
        (pool, store)
    }

    #[tokio::test]
    async fn test_save_assigns_id() {
        let (_pool, store) = setup().await;
        let dao = store.authorities();

        let saved = dao
            .save(Authority::new("ROLE_ADMIN", "authority.admin").unwrap())
            .await
            .unwrap();
        assert!(!saved.is_new());
        assert_eq!(dao.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_existing_updates_in_place() {
        let (_pool, store) = setup().await;
        let dao = store.authorities();

        let mut saved = dao
            .save(Authority::new("ROLE_USER", "authority.user").unwrap())
            .await
            .unwrap();
        let id = saved.id();
        saved.set_name_key("authority.member");
        let updated = dao.save(saved).await.unwrap();

        assert_eq!(updated.id(), id);
        assert_eq!(dao.count().await.unwrap(), 1);
        let found = dao.find_by_id(id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.name_key(), "authority.member");
    }

    #[tokio::test]
    async fn test_remove_transient_fails() {
        let (_pool, store) = setup().await;
        let dao = store.authorities();

        let err = dao
            .remove(&Authority::new("ROLE_X", "x").unwrap())
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<PersistenceError>(),
            Some(&PersistenceError::Transient)
        );
    }

    #[tokio::test]
    async fn test_refresh_missing_fails_with_not_found() {
        let (_pool, store) = setup().await;
        let dao = store.authorities();

        let mut ghost = Authority::new("ROLE_GHOST", "ghost")
            .unwrap()
            .with_id(ModelId::new(77));
        let err = dao.refresh(&mut ghost).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PersistenceError>(),
            Some(&PersistenceError::NotFound(ModelId::new(77)))
        );
    }

    #[tokio::test]
    async fn test_store_daos_share_cache() {
        let (_pool, store) = setup().await;
        store.cache().put("q".to_string(), &["text_item"], 1_u8);

        let items = store.text_items();
        items
            .save(TextItem::new("de", "DE", "Hallo").unwrap())
            .await
            .unwrap();

        assert!(store.cache().is_empty());
    }
}
