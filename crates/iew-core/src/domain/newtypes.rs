//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for identities and locale values.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Maximum length of the `language_code` and `country_code` columns.
pub const LOCALE_CODE_MAX_LEN: usize = 5;

// ============================================================================
// ModelId
// ============================================================================

/// Identity of a persisted domain model
///
/// Identities are assigned by the store on first save and grow strictly;
/// ordering by `ModelId` is ordering by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(i64);

impl ModelId {
    /// Wraps a raw identity value
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identity value
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns the identity that follows this one
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for ModelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ModelId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("{s}: {e}")))
    }
}

impl From<i64> for ModelId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

// ============================================================================
// Locale
// ============================================================================

/// A language/country pair as stored on text items
///
/// An empty country denotes the language-only locale (`de` rather than `de_DE`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    /// Creates a locale after validating both codes
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLanguageCode` if the language is empty or
    /// too long, `DomainError::InvalidCountryCode` if the country is too long.
    pub fn new(language: impl Into<String>, country: impl Into<String>) -> Result<Self, DomainError> {
        let language = language.into();
        let country = country.into();
        validate_language_code(&language)?;
        validate_country_code(&country)?;
        Ok(Self { language, country })
    }

    /// Builds a locale from codes that were validated elsewhere
    pub(crate) fn from_parts(language: String, country: String) -> Self {
        Self { language, country }
    }

    /// Returns the language code
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the country code (may be empty)
    pub fn country(&self) -> &str {
        &self.country
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            write!(f, "{}", self.language)
        } else {
            write!(f, "{}_{}", self.language, self.country)
        }
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, |c: char| c == '_' || c == '-');
        let language = parts.next().unwrap_or_default();
        let country = parts.next().unwrap_or_default();
        Self::new(language, country).map_err(|_| DomainError::InvalidLocale(s.to_string()))
    }
}

pub(crate) fn validate_language_code(code: &str) -> Result<(), DomainError> {
    if code.is_empty() || code.chars().count() > LOCALE_CODE_MAX_LEN {
        return Err(DomainError::InvalidLanguageCode(code.to_string()));
    }
    Ok(())
}

pub(crate) fn validate_country_code(code: &str) -> Result<(), DomainError> {
    if code.chars().count() > LOCALE_CODE_MAX_LEN {
        return Err(DomainError::InvalidCountryCode(code.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_ordering() {
        assert!(ModelId::new(1) < ModelId::new(2));
        assert_eq!(ModelId::new(41).next(), ModelId::new(42));
    }

    #[test]
    fn test_model_id_parse() {
        assert_eq!("17".parse::<ModelId>().unwrap(), ModelId::new(17));
        assert!("abc".parse::<ModelId>().is_err());
    }

    #[test]
    fn test_model_id_serializes_transparently() {
        let json = serde_json::to_string(&ModelId::new(5)).unwrap();
        assert_eq!(json, "5");
    }

    #[test]
    fn test_locale_display() {
        assert_eq!(Locale::new("de", "DE").unwrap().to_string(), "de_DE");
        assert_eq!(Locale::new("en", "").unwrap().to_string(), "en");
    }

    #[test]
    fn test_locale_parse() {
        let locale: Locale = "de_AT".parse().unwrap();
        assert_eq!(locale.language(), "de");
        assert_eq!(locale.country(), "AT");

        let locale: Locale = "fr-CA".parse().unwrap();
        assert_eq!(locale.country(), "CA");

        let locale: Locale = "it".parse().unwrap();
        assert_eq!(locale.country(), "");
    }

    #[test]
    fn test_locale_rejects_long_codes() {
        assert!(Locale::new("toolong", "DE").is_err());
        assert!(Locale::new("de", "TOOLONG").is_err());
        assert!(Locale::new("", "DE").is_err());
        assert!("".parse::<Locale>().is_err());
    }
}
