//! Entity-specific DAO ports
//!
//! Each trait extends [`DomainModelDao`] with the lookups a service needs
//! for that entity. Pattern arguments documented as "LIKE" accept the SQL
//! wildcards `%` and `_`; a plain value matches itself.

use crate::domain::{Account, Authority, DataSource, Locale, MessageBundle, TextItem, Tree};

use super::dao::DomainModelDao;

/// DAO for [`Account`]s
#[async_trait::async_trait]
pub trait AccountDao: DomainModelDao<Account> {
    /// Finds the account with exactly this username
    async fn find_account_by_username(&self, username: &str) -> anyhow::Result<Option<Account>>;
}

/// DAO for [`Authority`] records
#[async_trait::async_trait]
pub trait AuthorityDao: DomainModelDao<Authority> {
    /// Finds the authority with exactly this system name
    async fn find_by_system_name(&self, system_name: &str) -> anyhow::Result<Option<Authority>>;
}

/// DAO for [`MessageBundle`] entries
#[async_trait::async_trait]
pub trait MessageBundleDao: DomainModelDao<MessageBundle> {
    /// Finds the message for a key in a locale
    ///
    /// The text key must match exactly; language and country are LIKE
    /// patterns. Fails with `PersistenceError::NonUniqueResult` if more
    /// than one message matches.
    async fn find_by_text_key_and_locale(
        &self,
        text_key: &str,
        language_code: &str,
        country_code: &str,
    ) -> anyhow::Result<Option<MessageBundle>>;

    /// Finds all messages of a locale (LIKE patterns)
    async fn find_by_locale(
        &self,
        language_code: &str,
        country_code: &str,
    ) -> anyhow::Result<Vec<MessageBundle>>;

    /// Finds all messages of a locale within a bundle (LIKE patterns)
    async fn find_by_locale_and_basename(
        &self,
        language_code: &str,
        country_code: &str,
        basename: &str,
    ) -> anyhow::Result<Vec<MessageBundle>>;

    /// Lists every distinct locale that has at least one text item
    async fn supported_locales(&self) -> anyhow::Result<Vec<Locale>>;
}

/// DAO for [`Tree`]s
#[async_trait::async_trait]
pub trait TreeDao: DomainModelDao<Tree> {
    /// Finds a tree by lookup key, ignoring case
    ///
    /// If several trees match, the one with the lowest identity wins.
    async fn find_tree_by_lookup_key(&self, lookup_key: &str) -> anyhow::Result<Option<Tree>>;
}

/// DAO for [`DataSource`]s
pub trait DataSourceDao: DomainModelDao<DataSource> {}

/// DAO for [`TextItem`]s
pub trait TextItemDao: DomainModelDao<TextItem> {}
