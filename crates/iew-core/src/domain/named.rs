//! Naming contracts for enumerations
//!
//! Enumerations that surface in storage or in the UI expose a stable
//! technical name and, when they are shown to users, a message key that
//! the message bundles translate.

/// An enumeration with a stable technical name
pub trait NamedEnum {
    /// Returns the technical name of the variant
    fn name(&self) -> &'static str;
}

/// An enumeration whose display name is looked up in the message bundles
pub trait I18nNamedEnum {
    /// Returns the message key of the variant's display name
    fn name_key(&self) -> String;
}
