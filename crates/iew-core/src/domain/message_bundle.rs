//! MessageBundle domain entity
//!
//! Binds a text key within a bundle basename to the localized text item
//! used for lookups like "`title` in `messages` for `de_DE`".

use serde::{Deserialize, Serialize};

use super::{errors::DomainError, model::DomainModel, newtypes::ModelId, text_item::TextItem};

/// A keyed, localized message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBundle {
    id: Option<ModelId>,
    /// Message key, e.g. `login.title`
    text_key: String,
    /// Bundle basename, e.g. `messages`
    basename: String,
    /// The localized text (always loaded together with the bundle)
    text_item: TextItem,
}

impl MessageBundle {
    /// Creates a new unsaved message bundle entry
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BlankField` if the text key or basename is blank.
    pub fn new(
        text_key: impl Into<String>,
        basename: impl Into<String>,
        text_item: TextItem,
    ) -> Result<Self, DomainError> {
        let text_key = text_key.into();
        let basename = basename.into();
        if text_key.trim().is_empty() {
            return Err(DomainError::BlankField { field: "text_key" });
        }
        if basename.trim().is_empty() {
            return Err(DomainError::BlankField { field: "basename" });
        }
        Ok(Self {
            id: None,
            text_key,
            basename,
            text_item,
        })
    }

    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn text_item(&self) -> &TextItem {
        &self.text_item
    }

    /// Mutable access to the text item, e.g. to assign its identity on save
    pub fn text_item_mut(&mut self) -> &mut TextItem {
        &mut self.text_item
    }

    /// Returns a copy carrying the given identity (for reconstitution)
    pub fn with_id(mut self, id: ModelId) -> Self {
        self.id = Some(id);
        self
    }
}

impl DomainModel for MessageBundle {
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
    fn test_new_bundle() {
        let text = TextItem::new("en", "US", "Sign in").unwrap();
        let bundle = MessageBundle::new("login.title", "messages", text).unwrap();
        assert_eq!(bundle.text_key(), "login.title");
        assert_eq!(bundle.basename(), "messages");
        assert_eq!(bundle.text_item().content(), "Sign in");
        assert!(bundle.is_new());
    }

    #[test]
    fn test_rejects_blank_key() {
        let text = TextItem::new("en", "", "x").unwrap();
        assert_eq!(
            MessageBundle::new(" ", "messages", text),
            Err(DomainError::BlankField { field: "text_key" })
        );
    }
}
