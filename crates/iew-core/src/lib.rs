//! IEW Core - Domain model and persistence ports
//!
//! This crate contains the storage-agnostic part of the framework:
//! - **Domain entities** - `TextItem`, `MessageBundle`, `DataSource`, `Account`, `Authority`, `Tree`
//! - **Identity** - `ModelId`, the `DomainModel` capability trait and lazy `ModelRef`s
//! - **Port definitions** - `DomainModelDao<M>` and the entity-specific finder traits
//! - **Configuration** - YAML-backed `Config` with validation and a builder
//!
//! # Architecture
//!
//! Adapters (the SQLite store and the in-memory mocks in `iew-store`)
//! implement the port traits defined here. Callers only ever depend on
//! the traits, so a service can be tested against the mocks and run
//! against the relational store without changes.

pub mod config;
pub mod domain;
pub mod ports;
