//! Port definitions (persistence interfaces)
//!
//! The traits in this module are the boundary between services and
//! storage. Implementations live in `iew-store`.
//!
//! ## Ports Overview
//!
//! - [`DomainModelDao`] - Generic CRUD contract for one entity type
//! - [`AccountDao`], [`AuthorityDao`], [`MessageBundleDao`], [`TreeDao`],
//!   [`DataSourceDao`], [`TextItemDao`] - Entity-specific finders
//! - [`PersistenceError`] - Typed failures carried inside `anyhow::Error`

pub mod dao;
pub mod finders;

pub use dao::{DomainModelDao, PersistenceError};
pub use finders::{AccountDao, AuthorityDao, DataSourceDao, MessageBundleDao, TextItemDao, TreeDao};
