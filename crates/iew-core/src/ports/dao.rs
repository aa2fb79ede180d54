//! Generic DAO port (driven/secondary port)
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//!   Failures the caller may want to react to are raised as
//!   [`PersistenceError`] and can be recovered with `downcast_ref`.
//! - Lookups that find nothing return `Ok(None)` or an empty `Vec`,
//!   never an error.
//! - `save` takes the model by value and hands back the persisted
//!   instance; implementations may return a copy rather than the argument.

use thiserror::Error;

use crate::domain::{DomainModel, ModelId, ModelRef};

/// Typed persistence failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The implementation does not provide this operation
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// The model has no identity yet
    #[error("Model has not been saved yet")]
    Transient,

    /// No stored row for the given identity
    #[error("No model with id {0}")]
    NotFound(ModelId),

    /// A unique lookup matched more than one row
    #[error("Query returned more than one result")]
    NonUniqueResult,

    /// No identity is left to assign
    #[error("Identity space exhausted after id {0}")]
    IdentityExhausted(ModelId),
}

/// Port trait for persisting one entity type
#[async_trait::async_trait]
pub trait DomainModelDao<M: DomainModel>: Send + Sync {
    /// Saves a model (insert or update)
    ///
    /// Assigns the next identity if the model has none and returns the
    /// persisted instance.
    async fn save(&self, model: M) -> anyhow::Result<M>;

    /// Removes a model by its identity
    ///
    /// Fails with [`PersistenceError::Transient`] if the model was never saved.
    async fn remove(&self, model: &M) -> anyhow::Result<()>;

    /// Retrieves a model by its identity
    async fn find_by_id(&self, id: ModelId) -> anyhow::Result<Option<M>>;

    /// Retrieves all models
    async fn find_all(&self) -> anyhow::Result<Vec<M>>;

    /// Retrieves one page of models, ascending by identity
    async fn find_page(&self, first_result: u64, max_results: u64) -> anyhow::Result<Vec<M>>;

    /// Retrieves all models, ascending by identity
    async fn find_all_ordered_ascending(&self) -> anyhow::Result<Vec<M>>;

    /// Counts the stored models
    async fn count(&self) -> anyhow::Result<u64>;

    /// Reloads the state of `model` from the store
    async fn refresh(&self, model: &mut M) -> anyhow::Result<()>;
}

impl<M: DomainModel> ModelRef<M> {
    /// Resolves the reference to the concrete entity
    ///
    /// Loaded references are returned as-is; unloaded ones are fetched
    /// through `dao`. Returns `None` if the target no longer exists.
    pub async fn resolve<D>(&self, dao: &D) -> anyhow::Result<Option<M>>
    where
        D: DomainModelDao<M> + ?Sized,
    {
        match self {
            ModelRef::Loaded(model) => Ok(Some(model.clone())),
            ModelRef::Unloaded(id) => dao.find_by_id(*id).await,
        }
    }

    /// Loads the reference in place and returns the entity
    ///
    /// Fails with [`PersistenceError::NotFound`] if the target is gone.
    pub async fn load<D>(&mut self, dao: &D) -> anyhow::Result<&M>
    where
        D: DomainModelDao<M> + ?Sized,
    {
        match *self {
            ModelRef::Loaded(ref model) => Ok(model),
            ModelRef::Unloaded(id) => {
                let model = dao
                    .find_by_id(id)
                    .await?
                    .ok_or(PersistenceError::NotFound(id))?;
                *self = ModelRef::Loaded(model);
                self.loaded()
                    .ok_or_else(|| PersistenceError::NotFound(id).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::DataSource;

    /// Minimal read-only DAO over a fixed map
    struct FixedDao {
        models: Mutex<BTreeMap<ModelId, DataSource>>,
    }

    #[async_trait::async_trait]
    impl DomainModelDao<DataSource> for FixedDao {
        async fn save(&self, model: DataSource) -> anyhow::Result<DataSource> {
            Ok(model)
        }
        async fn remove(&self, _model: &DataSource) -> anyhow::Result<()> {
            Ok(())
        }
        async fn find_by_id(&self, id: ModelId) -> anyhow::Result<Option<DataSource>> {
            Ok(self.models.lock().unwrap().get(&id).cloned())
        }
        async fn find_all(&self) -> anyhow::Result<Vec<DataSource>> {
            Ok(self.models.lock().unwrap().values().cloned().collect())
        }
        async fn find_page(&self, _first: u64, _max: u64) -> anyhow::Result<Vec<DataSource>> {
            Ok(vec![])
        }
        async fn find_all_ordered_ascending(&self) -> anyhow::Result<Vec<DataSource>> {
            Err(PersistenceError::Unsupported("find_all_ordered_ascending").into())
        }
        async fn count(&self) -> anyhow::Result<u64> {
            Ok(self.models.lock().unwrap().len() as u64)
        }
        async fn refresh(&self, _model: &mut DataSource) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn dao_with(id: i64) -> FixedDao {
        let mut models = BTreeMap::new();
        models.insert(
            ModelId::new(id),
            DataSource::simple_text("hello").with_id(ModelId::new(id)),
        );
        FixedDao {
            models: Mutex::new(models),
        }
    }

    #[tokio::test]
    async fn test_resolve_unloaded() {
        let dao = dao_with(3);
        let reference: ModelRef<DataSource> = ModelRef::Unloaded(ModelId::new(3));

        let resolved = reference.resolve(&dao).await.unwrap().unwrap();
        assert_eq!(resolved.variant_name(), "simple_text");
    }

    #[tokio::test]
    async fn test_resolve_missing_returns_none() {
        let dao = dao_with(3);
        let reference: ModelRef<DataSource> = ModelRef::Unloaded(ModelId::new(99));
        assert!(reference.resolve(&dao).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_in_place() {
        let dao = dao_with(3);
        let mut reference: ModelRef<DataSource> = ModelRef::Unloaded(ModelId::new(3));

        let loaded = reference.load(&dao).await.unwrap();
        assert_eq!(loaded.id(), Some(ModelId::new(3)));
        assert!(reference.is_loaded());
    }

    #[tokio::test]
    async fn test_load_already_loaded_skips_dao() {
        let dao = dao_with(3);
        let model = DataSource::simple_text("inline").with_id(ModelId::new(50));
        let mut reference = ModelRef::Loaded(model.clone());

        assert_eq!(reference.load(&dao).await.unwrap(), &model);
    }

    #[tokio::test]
    async fn test_load_missing_fails_with_not_found() {
        let dao = dao_with(3);
        let mut reference: ModelRef<DataSource> = ModelRef::Unloaded(ModelId::new(8));

        let err = reference.load(&dao).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PersistenceError>(),
            Some(&PersistenceError::NotFound(ModelId::new(8)))
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PersistenceError::Unsupported("find_all_ordered_ascending").to_string(),
            "Operation not supported: find_all_ordered_ascending"
        );
        assert_eq!(
            PersistenceError::NotFound(ModelId::new(4)).to_string(),
            "No model with id 4"
        );
    }
}
