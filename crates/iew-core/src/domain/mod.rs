//! Domain entities
//!
//! This module contains the persisted domain types of the framework:
//! - Identity newtypes and the `DomainModel` capability trait
//! - Localization entities (`TextItem`, `MessageBundle`)
//! - Security entities (`Account`, `Authority`)
//! - Content entities (`DataSource`, `Tree`)
//! - Naming contracts for enumerations
//! - Domain-specific error types

pub mod account;
pub mod authority;
pub mod data_source;
pub mod errors;
pub mod message_bundle;
pub mod model;
pub mod named;
pub mod newtypes;
pub mod text_item;
pub mod tree;

// Re-export commonly used types
pub use account::Account;
pub use authority::Authority;
pub use data_source::{DataSource, DataSourceKind};
pub use errors::DomainError;
pub use message_bundle::MessageBundle;
pub use model::{compare_by_id, compare_by_id_desc, DomainModel, ModelRef};
pub use named::{I18nNamedEnum, NamedEnum};
pub use newtypes::{Locale, ModelId, LOCALE_CODE_MAX_LEN};
pub use text_item::TextItem;
pub use tree::Tree;
