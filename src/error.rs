//! Error types for site construction and lookup.
//!
//! Structural problems in site data are fatal and surface as [`SiteError`]
//! from the construction entry points. Everything else (unknown component
//! types, out-of-range queries, use-before-wiring) degrades locally and is
//! reported through `Option` returns instead.

/// Errors raised while building a [`Website`](crate::website::Website) or
/// resolving a route.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Site data defined no routable pages. A site with zero pages is not a
    /// valid runtime state.
    #[error("site data has no routable pages")]
    NoPages,

    /// Two routable pages share the same route.
    #[error("duplicate page route {0:?}")]
    DuplicateRoute(String),

    /// No page matches the requested route. Callers own the 404 policy.
    #[error("no page matches route {0:?}")]
    PageNotFound(String),

    /// Raw site data did not deserialize into the expected records.
    #[error("malformed site data: {0}")]
    Malformed(#[from] serde_json::Error),
}
