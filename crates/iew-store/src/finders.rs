//! Entity finders on the SQLite DAOs
//!
//! Message bundle lookups and the supported-locale listing are served
//! through the store's [`crate::QueryCache`]; the other finders always hit
//! the database.

use iew_core::domain::{
    Account, Authority, DataSource, Locale, MessageBundle, TextItem, Tree,
};
use iew_core::ports::{
    AccountDao, AuthorityDao, DataSourceDao, MessageBundleDao, PersistenceError, TextItemDao,
    TreeDao,
};
use sqlx::Row;

use crate::dao::SqliteDomainModelDao;
use crate::entity::SqlEntity;
use crate::StoreError;

pub type SqliteAccountDao = SqliteDomainModelDao<Account>;
pub type SqliteAuthorityDao = SqliteDomainModelDao<Authority>;
pub type SqliteDataSourceDao = SqliteDomainModelDao<DataSource>;
pub type SqliteMessageBundleDao = SqliteDomainModelDao<MessageBundle>;
pub type SqliteTextItemDao = SqliteDomainModelDao<TextItem>;
pub type SqliteTreeDao = SqliteDomainModelDao<Tree>;

/// Tables read by the message bundle queries
const BUNDLE_TABLES: &[&str] = &["message_bundle", "text_item"];

/// Tables read by the supported-locale query
const LOCALE_TABLES: &[&str] = &["text_item"];

// ============================================================================
// Account / Authority
// ============================================================================

#[async_trait::async_trait]
impl AccountDao for SqliteDomainModelDao<Account> {
    async fn find_account_by_username(&self, username: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!("{} WHERE username = ?", Account::select_sql());
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(ref r) => Ok(Some(Account::from_row(r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl AuthorityDao for SqliteDomainModelDao<Authority> {
    async fn find_by_system_name(&self, system_name: &str) -> anyhow::Result<Option<Authority>> {
        let sql = format!("{} WHERE system_name = ?", Authority::select_sql());
        let row = sqlx::query(&sql)
            .bind(system_name)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(ref r) => Ok(Some(Authority::from_row(r)?)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Tree
// ============================================================================

#[async_trait::async_trait]
impl TreeDao for SqliteDomainModelDao<Tree> {
    async fn find_tree_by_lookup_key(&self, lookup_key: &str) -> anyhow::Result<Option<Tree>> {
        let sql = format!(
            "{} WHERE lookup_key_norm = ? ORDER BY id ASC LIMIT 1",
            Tree::select_sql()
        );
        let row = sqlx::query(&sql)
            .bind(Tree::normalize_lookup_key(lookup_key))
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(ref r) => Ok(Some(Tree::from_row(r)?)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// MessageBundle
// ============================================================================

impl SqliteDomainModelDao<MessageBundle> {
    /// Runs a bundle query with string parameters, consulting the cache first
    async fn cached_bundles(
        &self,
        query_name: &str,
        where_clause: &str,
        params: &[&str],
    ) -> Result<Vec<MessageBundle>, StoreError> {
        let key = crate::QueryCache::key(query_name, params);
        if let Some(hit) = self.cache().get::<Vec<MessageBundle>>(&key) {
            return Ok(hit);
        }
        let seen = self.cache().generation(BUNDLE_TABLES);

        let sql = format!(
            "{} WHERE {} ORDER BY mb.id ASC",
            MessageBundle::select_sql(),
            where_clause
        );
        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(self.pool()).await?;
        let bundles = Self::map_rows(&rows)?;

        self.cache()
            .put_if_unchanged(key, BUNDLE_TABLES, &seen, bundles.clone());
        Ok(bundles)
    }
}

#[async_trait::async_trait]
impl MessageBundleDao for SqliteDomainModelDao<MessageBundle> {
    async fn find_by_text_key_and_locale(
        &self,
        text_key: &str,
        language_code: &str,
        country_code: &str,
    ) -> anyhow::Result<Option<MessageBundle>> {
        let mut matches = self
            .cached_bundles(
                "find_by_text_key_and_locale",
                "mb.text_key = ? AND ti.language_code LIKE ? AND ti.country_code LIKE ?",
                &[text_key, language_code, country_code],
            )
            .await?;

        if matches.len() > 1 {
            tracing::debug!(
                text_key,
                language_code,
                country_code,
                matches = matches.len(),
                "Message lookup is ambiguous"
            );
            return Err(PersistenceError::NonUniqueResult.into());
        }
        Ok(matches.pop())
    }

    async fn find_by_locale(
        &self,
        language_code: &str,
        country_code: &str,
    ) -> anyhow::Result<Vec<MessageBundle>> {
        Ok(self
            .cached_bundles(
                "find_by_locale",
                "ti.language_code LIKE ? AND ti.country_code LIKE ?",
                &[language_code, country_code],
            )
            .await?)
    }

    async fn find_by_locale_and_basename(
        &self,
        language_code: &str,
        country_code: &str,
        basename: &str,
    ) -> anyhow::Result<Vec<MessageBundle>> {
        Ok(self
            .cached_bundles(
                "find_by_locale_and_basename",
                "ti.language_code LIKE ? AND ti.country_code LIKE ? AND mb.basename LIKE ?",
                &[language_code, country_code, basename],
            )
            .await?)
    }

    async fn supported_locales(&self) -> anyhow::Result<Vec<Locale>> {
        let key = crate::QueryCache::key("supported_locales", &[]);
        if let Some(hit) = self.cache().get::<Vec<Locale>>(&key) {
            return Ok(hit);
        }
        let seen = self.cache().generation(LOCALE_TABLES);

        let rows = sqlx::query(
            "SELECT DISTINCT language_code, country_code FROM text_item \
             ORDER BY language_code, country_code",
        )
        .fetch_all(self.pool())
        .await?;

        let mut locales = Vec::with_capacity(rows.len());
        for row in &rows {
            let language: String = row.try_get("language_code")?;
            let country: String = row.try_get("country_code")?;
            locales.push(Locale::new(language, country)?);
        }

        self.cache()
            .put_if_unchanged(key, LOCALE_TABLES, &seen, locales.clone());
        Ok(locales)
    }
}

// ============================================================================
// Marker DAOs
// ============================================================================

impl DataSourceDao for SqliteDomainModelDao<DataSource> {}

impl TextItemDao for SqliteDomainModelDao<TextItem> {}
