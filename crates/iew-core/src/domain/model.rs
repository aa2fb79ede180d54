//! Identity capability shared by all persisted entities
//!
//! Every entity carries a nullable identity that the store assigns on
//! first save. `ModelRef` models an association that may not have been
//! loaded yet; the ports module provides its resolution against a DAO.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::newtypes::ModelId;

/// Capability contract of a persisted domain model
pub trait DomainModel: Clone + Send + Sync + 'static {
    /// Returns the identity, `None` until the model has been saved
    fn id(&self) -> Option<ModelId>;

    /// Assigns the identity (called by the store on save)
    fn set_id(&mut self, id: ModelId);

    /// Returns true if the model has never been saved
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}

/// Orders two models ascending by identity
///
/// Models without identity sort before persisted ones.
pub fn compare_by_id<M: DomainModel>(a: &M, b: &M) -> Ordering {
    a.id().cmp(&b.id())
}

/// Orders two models descending by identity
pub fn compare_by_id_desc<M: DomainModel>(a: &M, b: &M) -> Ordering {
    compare_by_id(b, a)
}

/// Reference to an associated entity that may still be unloaded
///
/// The relational store hands out `Unloaded` references for polymorphic
/// associations; callers that need the concrete entity resolve it first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRef<M> {
    /// Only the identity of the target is known
    Unloaded(ModelId),
    /// The target entity is available
    Loaded(M),
}

impl<M: DomainModel> ModelRef<M> {
    /// Returns the identity of the referenced entity
    ///
    /// `None` only for a loaded entity that was never saved.
    pub fn id(&self) -> Option<ModelId> {
        match self {
            ModelRef::Unloaded(id) => Some(*id),
            ModelRef::Loaded(model) => model.id(),
        }
    }

    /// Returns the entity if it is already loaded
    pub fn loaded(&self) -> Option<&M> {
        match self {
            ModelRef::Unloaded(_) => None,
            ModelRef::Loaded(model) => Some(model),
        }
    }

    /// Returns true if the entity is already loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelRef::Loaded(_))
    }
}

impl<M> From<M> for ModelRef<M> {
    fn from(model: M) -> Self {
        ModelRef::Loaded(model)
    }
}
