//! In-memory DAOs for tests
//!
//! [`MockDomainModelDao`] keeps models in an ordered map keyed by a
//! sequential identity. It honours the DAO contracts without a query
//! engine: secondary finders are full scans, and the message bundle
//! filters reimplement SQL `LIKE` so results match the SQLite store.
//!
//! The mocks are meant for single-threaded tests. The internal `Mutex`
//! only satisfies the `Send + Sync` bound of the DAO traits.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use iew_core::domain::{
    Account, Authority, DataSource, DomainModel, Locale, MessageBundle, ModelId, TextItem, Tree,
};
use iew_core::ports::{
    AccountDao, AuthorityDao, DataSourceDao, DomainModelDao, MessageBundleDao, PersistenceError,
    TextItemDao, TreeDao,
};

pub type MockAccountDao = MockDomainModelDao<Account>;
pub type MockAuthorityDao = MockDomainModelDao<Authority>;
pub type MockDataSourceDao = MockDomainModelDao<DataSource>;
pub type MockMessageBundleDao = MockDomainModelDao<MessageBundle>;
pub type MockTextItemDao = MockDomainModelDao<TextItem>;
pub type MockTreeDao = MockDomainModelDao<Tree>;

struct MockState<M> {
    models: BTreeMap<ModelId, M>,
    last_id_used: i64,
}

/// In-memory DAO for one entity type
pub struct MockDomainModelDao<M> {
    state: Mutex<MockState<M>>,
}

impl<M: DomainModel> MockDomainModelDao<M> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                models: BTreeMap::new(),
                last_id_used: 0,
            }),
        }
    }

    /// Creates a DAO pre-populated with `models`, in iteration order
    pub fn with_models(models: impl IntoIterator<Item = M>) -> Result<Self, PersistenceError> {
        let dao = Self::new();
        for model in models {
            dao.store(model)?;
        }
        Ok(dao)
    }

    /// Identity most recently handed out (0 before the first save)
    pub fn last_id_used(&self) -> i64 {
        self.lock().last_id_used
    }

    fn lock(&self) -> MutexGuard<'_, MockState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces `model`, assigning the next identity if it has none
    fn store(&self, mut model: M) -> Result<M, PersistenceError> {
        let mut state = self.lock();
        let id = match model.id() {
            Some(id) => {
                state.last_id_used = state.last_id_used.max(id.value());
                id
            }
            None => {
                let next = state.last_id_used.checked_add(1).ok_or(
                    PersistenceError::IdentityExhausted(ModelId::new(state.last_id_used)),
                )?;
                state.last_id_used = next;
                let id = ModelId::new(next);
                model.set_id(id);
                id
            }
        };
        state.models.insert(id, model.clone());
        Ok(model)
    }

    /// Returns all models matching `predicate`, ascending by identity
    fn scan(&self, predicate: impl Fn(&M) -> bool) -> Vec<M> {
        self.lock()
            .models
            .values()
            .filter(|m| predicate(m))
            .cloned()
            .collect()
    }
}

impl<M: DomainModel> Default for MockDomainModelDao<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<M: DomainModel> DomainModelDao<M> for MockDomainModelDao<M> {
    async fn save(&self, model: M) -> anyhow::Result<M> {
        Ok(self.store(model)?)
    }

    async fn remove(&self, model: &M) -> anyhow::Result<()> {
        let id = model.id().ok_or(PersistenceError::Transient)?;
        self.lock().models.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: ModelId) -> anyhow::Result<Option<M>> {
        Ok(self.lock().models.get(&id).cloned())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<M>> {
        Ok(self.scan(|_| true))
    }

    /// Returns a page only if it lies completely within the stored models
    async fn find_page(&self, first_result: u64, max_results: u64) -> anyhow::Result<Vec<M>> {
        let state = self.lock();
        let count = state.models.len() as u64;
        let past_end = first_result
            .checked_add(max_results)
            .map_or(true, |end| end > count);
        if first_result >= count || past_end {
            return Ok(Vec::new());
        }

        Ok(state
            .models
            .values()
            .skip(first_result as usize)
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn find_all_ordered_ascending(&self) -> anyhow::Result<Vec<M>> {
        Err(PersistenceError::Unsupported("find_all_ordered_ascending").into())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.lock().models.len() as u64)
    }

    async fn refresh(&self, model: &mut M) -> anyhow::Result<()> {
        if let Some(stored) = model.id().and_then(|id| self.lock().models.get(&id).cloned()) {
            *model = stored;
        }
        Ok(())
    }
}

// ============================================================================
// SQL LIKE matching
// ============================================================================

/// Matches `value` against a SQL `LIKE` pattern
///
/// `%` matches any run of characters, `_` exactly one. Letters compare
/// ASCII case-insensitively, as SQLite does by default.
pub fn sql_like(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let value: Vec<char> = value.chars().collect();

    let (mut p, mut v) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, v));
            p += 1;
        } else if p < pattern.len()
            && (pattern[p] == '_' || pattern[p].eq_ignore_ascii_case(&value[v]))
        {
            p += 1;
            v += 1;
        } else if let Some((star, matched)) = backtrack {
            // Let the last % swallow one more character
            p = star + 1;
            v = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

fn matches_locale(bundle: &MessageBundle, language_code: &str, country_code: &str) -> bool {
    let text = bundle.text_item();
    sql_like(language_code, text.language_code()) && sql_like(country_code, text.country_code())
}

// ============================================================================
// Finders
// ============================================================================

#[async_trait::async_trait]
impl AccountDao for MockDomainModelDao<Account> {
    async fn find_account_by_username(&self, username: &str) -> anyhow::Result<Option<Account>> {
        Ok(self.scan(|a| a.username() == username).into_iter().next())
    }
}

#[async_trait::async_trait]
impl AuthorityDao for MockDomainModelDao<Authority> {
    async fn find_by_system_name(&self, system_name: &str) -> anyhow::Result<Option<Authority>> {
        Ok(self
            .scan(|a| a.system_name() == system_name)
            .into_iter()
            .next())
    }
}

#[async_trait::async_trait]
impl TreeDao for MockDomainModelDao<Tree> {
    async fn find_tree_by_lookup_key(&self, lookup_key: &str) -> anyhow::Result<Option<Tree>> {
        Ok(self
            .scan(|t| t.matches_lookup_key(lookup_key))
            .into_iter()
            .next())
    }
}

#[async_trait::async_trait]
impl MessageBundleDao for MockDomainModelDao<MessageBundle> {
    async fn find_by_text_key_and_locale(
        &self,
        text_key: &str,
        language_code: &str,
        country_code: &str,
    ) -> anyhow::Result<Option<MessageBundle>> {
        let mut matches = self.scan(|b| {
            b.text_key() == text_key && matches_locale(b, language_code, country_code)
        });
        if matches.len() > 1 {
            return Err(PersistenceError::NonUniqueResult.into());
        }
        Ok(matches.pop())
    }

    async fn find_by_locale(
        &self,
        language_code: &str,
        country_code: &str,
    ) -> anyhow::Result<Vec<MessageBundle>> {
        Ok(self.scan(|b| matches_locale(b, language_code, country_code)))
    }

    async fn find_by_locale_and_basename(
        &self,
        language_code: &str,
        country_code: &str,
        basename: &str,
    ) -> anyhow::Result<Vec<MessageBundle>> {
        Ok(self.scan(|b| {
            matches_locale(b, language_code, country_code) && sql_like(basename, b.basename())
        }))
    }

    /// Distinct locales of the text items owned by stored bundles
    ///
    /// This DAO only sees text items attached to a bundle. The SQLite store
    /// lists every row of `text_item`, including items saved on their own.
    async fn supported_locales(&self) -> anyhow::Result<Vec<Locale>> {
        let distinct: BTreeSet<(String, String)> = self
            .scan(|_| true)
            .iter()
            .map(|b| {
                let text = b.text_item();
                (
                    text.language_code().to_string(),
                    text.country_code().to_string(),
                )
            })
            .collect();

        let mut locales = Vec::with_capacity(distinct.len());
        for (language, country) in distinct {
            locales.push(Locale::new(language, country)?);
        }
        Ok(locales)
    }
}

impl DataSourceDao for MockDomainModelDao<DataSource> {}

impl TextItemDao for MockDomainModelDao<TextItem> {}
