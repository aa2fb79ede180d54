//! Authority domain entity
//!
//! A granted permission, identified by a unique system name such as
//! `ROLE_ADMIN`. The display name is looked up via `name_key`.

use serde::{Deserialize, Serialize};

use super::{errors::DomainError, model::DomainModel, newtypes::ModelId};

/// A named permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    id: Option<ModelId>,
    system_name: String,
    name_key: String,
}

impl Authority {
    /// Creates a new unsaved authority
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BlankField` if the system name is blank.
    pub fn new(
        system_name: impl Into<String>,
        name_key: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let system_name = system_name.into();
        if system_name.trim().is_empty() {
            return Err(DomainError::BlankField {
                field: "system_name",
            });
        }
        Ok(Self {
            id: None,
            system_name,
            name_key: name_key.into(),
        })
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Message key of the display name
    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    pub fn set_name_key(&mut self, name_key: impl Into<String>) {
        self.name_key = name_key.into();
    }

    /// Returns a copy carrying the given identity (for reconstitution)
    pub fn with_id(mut self, id: ModelId) -> Self {
        self.id = Some(id);
        self
    }
}

impl DomainModel for Authority {
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
    fn test_new_authority() {
        let authority = Authority::new("ROLE_ADMIN", "authority.admin").unwrap();
        assert_eq!(authority.system_name(), "ROLE_ADMIN");
        assert_eq!(authority.name_key(), "authority.admin");
    }

    #[test]
    fn test_blank_system_name_rejected() {
        assert!(Authority::new("", "x").is_err());
    }
}
