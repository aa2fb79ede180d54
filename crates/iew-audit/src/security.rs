//! Current-principal lookup
//!
//! Authentication itself happens elsewhere. The request-handling code
//! enters the authenticated principal into the [`SecurityContext`] of the
//! current thread; the audit appender reads it back through a
//! [`PrincipalProvider`].

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    name: String,
    authorities: Vec<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            authorities: Vec::new(),
        }
    }

    /// Adds granted authority names, e.g. `ROLE_ADMIN`
    pub fn with_authorities<I, S>(mut self, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorities
            .extend(authorities.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }
}

/// Source of the principal on whose behalf the current code runs
pub trait PrincipalProvider: Send + Sync {
    fn current_principal(&self) -> Option<Principal>;
}

thread_local! {
    static CURRENT: RefCell<Option<Principal>> = const { RefCell::new(None) };
}

/// Thread-local holder of the current principal
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityContext;

impl SecurityContext {
    /// Returns the principal of the current thread, if any
    pub fn current() -> Option<Principal> {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Makes `principal` current until the returned guard is dropped
    ///
    /// Scopes nest: dropping the guard restores the previous principal.
    #[must_use = "the principal is cleared again when the guard is dropped"]
    pub fn enter(principal: Principal) -> SecurityScope {
        let previous = CURRENT.with(|current| current.replace(Some(principal)));
        SecurityScope { previous }
    }
}

impl PrincipalProvider for SecurityContext {
    fn current_principal(&self) -> Option<Principal> {
        SecurityContext::current()
    }
}

/// Guard returned by [`SecurityContext::enter`]
#[derive(Debug)]
pub struct SecurityScope {
    previous: Option<Principal>,
}

impl Drop for SecurityScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Provider for contexts without authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrincipal;

impl PrincipalProvider for NoPrincipal {
    fn current_principal(&self) -> Option<Principal> {
        None
    }
}
