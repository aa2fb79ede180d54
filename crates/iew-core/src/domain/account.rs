//! Account domain entity
//!
//! A login account. The username is unique within the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{errors::DomainError, model::DomainModel, newtypes::ModelId};

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: Option<ModelId>,
    /// Unique login name
    username: String,
    /// Password hash as produced by the authentication layer
    password_hash: String,
    /// Disabled accounts cannot log in
    enabled: bool,
    /// When this account was created
    created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new, enabled account
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BlankField` if the username is blank.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::BlankField { field: "username" });
        }
        Ok(Self {
            id: None,
            username,
            password_hash: password_hash.into(),
            enabled: true,
            created_at: Utc::now(),
        })
    }

    /// Recreates an account from stored state
    pub fn reconstitute(
        id: ModelId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        enabled: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            username: username.into(),
            password_hash: password_hash.into(),
            enabled,
            created_at,
        }
    }

    // --- Getters ---

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // --- Mutations ---

    /// Replaces the stored password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

impl DomainModel for Account {
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
    fn test_new_account_is_enabled() {
        let account = Account::new("alice", "hash").unwrap();
        assert!(account.is_enabled());
        assert!(account.is_new());
        assert_eq!(account.username(), "alice");
    }

    #[test]
    fn test_blank_username_rejected() {
        assert_eq!(
            Account::new("  ", "hash"),
            Err(DomainError::BlankField { field: "username" })
        );
    }

    #[test]
    fn test_disable_and_enable() {
        let mut account = Account::new("bob", "hash").unwrap();
        account.disable();
        assert!(!account.is_enabled());
        account.enable();
        assert!(account.is_enabled());
    }
}
