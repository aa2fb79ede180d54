//! Tree domain entity
//!
//! A named tree (navigation, category hierarchy) addressed by a unique
//! lookup key. The tree may point at the data source rendering its root.

use serde::{Deserialize, Serialize};

use super::{
    data_source::DataSource,
    errors::DomainError,
    model::{DomainModel, ModelRef},
    newtypes::ModelId,
};

/// A tree addressed by lookup key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    id: Option<ModelId>,
    lookup_key: String,
    description: Option<String>,
    data_source: Option<ModelRef<DataSource>>,
}

impl Tree {
    /// Creates a new unsaved tree
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BlankField` if the lookup key is blank.
    pub fn new(lookup_key: impl Into<String>) -> Result<Self, DomainError> {
        let lookup_key = lookup_key.into();
        if lookup_key.trim().is_empty() {
            return Err(DomainError::BlankField {
                field: "lookup_key",
            });
        }
        Ok(Self {
            id: None,
            lookup_key,
            description: None,
            data_source: None,
        })
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches a data source reference
    pub fn with_data_source(mut self, data_source: impl Into<ModelRef<DataSource>>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    /// Returns a copy carrying the given identity (for reconstitution)
    pub fn with_id(mut self, id: ModelId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn lookup_key(&self) -> &str {
        &self.lookup_key
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn data_source(&self) -> Option<&ModelRef<DataSource>> {
        self.data_source.as_ref()
    }

    /// Mutable access to the data source reference, e.g. to resolve it in place
    pub fn data_source_mut(&mut self) -> Option<&mut ModelRef<DataSource>> {
        self.data_source.as_mut()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_data_source(&mut self, data_source: Option<ModelRef<DataSource>>) {
        self.data_source = data_source;
    }

    /// Case-folded form of a lookup key, used for case-insensitive matching
    pub fn normalize_lookup_key(lookup_key: &str) -> String {
        lookup_key.to_lowercase()
    }

    /// Returns true if the lookup key matches, ignoring case
    pub fn matches_lookup_key(&self, lookup_key: &str) -> bool {
        Self::normalize_lookup_key(&self.lookup_key) == Self::normalize_lookup_key(lookup_key)
    }
}

impl DomainModel for Tree {
    fn id(&self) -> Option<ModelId> {
        self.id
    }

    fn set_id(&mut self, id: ModelId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree() {
        let tree = Tree::new("main-nav").unwrap().with_description("Main navigation");
        assert_eq!(tree.lookup_key(), "main-nav");
        assert_eq!(tree.description(), Some("Main navigation"));
        assert!(tree.data_source().is_none());
    }

    #[test]
    fn test_matches_lookup_key_ignores_case() {
        let tree = Tree::new("root").unwrap();
        assert!(tree.matches_lookup_key("ROOT"));
        assert!(tree.matches_lookup_key("Root"));
        assert!(!tree.matches_lookup_key("roots"));

        let umlaut = Tree::new("ärger").unwrap();
        assert!(umlaut.matches_lookup_key("ÄRGER"));
    }

    #[test]
    fn test_data_source_reference() {
        let tree = Tree::new("t")
            .unwrap()
            .with_data_source(ModelRef::Unloaded(ModelId::new(7)));
        assert_eq!(tree.data_source().and_then(|r| r.id()), Some(ModelId::new(7)));
    }
}
