//! DataSource domain entity
//!
//! A polymorphic content source. The concrete kind is a tagged union so
//! that callers match on the variant instead of inspecting runtime types.

use serde::{Deserialize, Serialize};

use super::{model::DomainModel, named::NamedEnum, newtypes::ModelId};

/// The concrete kind of content a data source provides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Inline, unlocalized text
    SimpleText {
        /// The text
        text: String,
    },
    /// Text resolved through the message bundles
    Localized {
        /// Message key
        text_key: String,
        /// Bundle basename
        basename: String,
    },
    /// External resource
    Link {
        /// Target URL
        href: String,
    },
}

impl NamedEnum for DataSourceKind {
    fn name(&self) -> &'static str {
        match self {
            DataSourceKind::SimpleText { .. } => "simple_text",
            DataSourceKind::Localized { .. } => "localized",
            DataSourceKind::Link { .. } => "link",
        }
    }
}

/// A persisted content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    id: Option<ModelId>,
    kind: DataSourceKind,
}

impl DataSource {
    /// Creates a new unsaved data source
    pub fn new(kind: DataSourceKind) -> Self {
        Self { id: None, kind }
    }

    /// Shorthand for a `SimpleText` source
    pub fn simple_text(text: impl Into<String>) -> Self {
        Self::new(DataSourceKind::SimpleText { text: text.into() })
    }

    pub fn kind(&self) -> &DataSourceKind {
        &self.kind
    }

    /// Replaces the content kind
    pub fn set_kind(&mut self, kind: DataSourceKind) {
        self.kind = kind;
    }

    /// Returns the name of the concrete variant
    pub fn variant_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns a copy carrying the given identity (for reconstitution)
    pub fn with_id(mut self, id: ModelId) -> Self {
        self.id = Some(id);
        self
    }
}

impl DomainModel for DataSource {
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
    fn test_variant_name() {
        assert_eq!(DataSource::simple_text("hi").variant_name(), "simple_text");
        let localized = DataSource::new(DataSourceKind::Localized {
            text_key: "k".into(),
            basename: "messages".into(),
        });
        assert_eq!(localized.variant_name(), "localized");
    }

    #[test]
    fn test_kind_serialization() {
        let kind = DataSourceKind::Link {
            href: "https://example.org".into(),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"link","href":"https://example.org"}"#);
        let back: DataSourceKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
