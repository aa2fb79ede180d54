//! TextItem domain entity
//!
//! One localized text fragment. Stored in table `text_item` with the
//! columns `language_code`, `country_code` and `content`.

use serde::{Deserialize, Serialize};

use super::{
    errors::DomainError,
    model::DomainModel,
    newtypes::{validate_country_code, validate_language_code, Locale, ModelId},
};

/// A localized piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    id: Option<ModelId>,
    /// Language code, 1 to 5 characters
    language_code: String,
    /// Country code, up to 5 characters; empty for language-only texts
    country_code: String,
    /// The text itself
    content: String,
}

impl TextItem {
    /// Creates a new unsaved text item
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLanguageCode` or
    /// `DomainError::InvalidCountryCode` for codes that do not fit the schema.
    pub fn new(
        language_code: impl Into<String>,
        country_code: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let language_code = language_code.into();
        let country_code = country_code.into();
        validate_language_code(&language_code)?;
        validate_country_code(&country_code)?;
        Ok(Self {
            id: None,
            language_code,
            country_code,
            content: content.into(),
        })
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the locale this text belongs to
    pub fn locale(&self) -> Locale {
        Locale::from_parts(self.language_code.clone(), self.country_code.clone())
    }

    /// Replaces the text content
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Moves the text to another locale
    pub fn set_locale(&mut self, locale: &Locale) {
        self.language_code = locale.language().to_string();
        self.country_code = locale.country().to_string();
    }

    /// Returns a copy carrying the given identity (for reconstitution)
    pub fn with_id(mut self, id: ModelId) -> Self {
        self.id = Some(id);
        self
    }
}

impl DomainModel for TextItem {
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
    fn test_new_text_item() {
        let item = TextItem::new("de", "DE", "Hallo Welt").unwrap();
        assert!(item.is_new());
        assert_eq!(item.language_code(), "de");
        assert_eq!(item.country_code(), "DE");
        assert_eq!(item.content(), "Hallo Welt");
        assert_eq!(item.locale().to_string(), "de_DE");
    }

    #[test]
    fn test_rejects_invalid_codes() {
        assert_eq!(
            TextItem::new("german", "DE", "x"),
            Err(DomainError::InvalidLanguageCode("german".to_string()))
        );
        assert_eq!(
            TextItem::new("de", "GERMANY", "x"),
            Err(DomainError::InvalidCountryCode("GERMANY".to_string()))
        );
    }

    #[test]
    fn test_set_locale() {
        let mut item = TextItem::new("de", "DE", "Hallo").unwrap();
        item.set_locale(&Locale::new("de", "AT").unwrap());
        assert_eq!(item.country_code(), "AT");
    }
}
