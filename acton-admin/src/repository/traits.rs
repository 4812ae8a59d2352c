//! Repository trait definitions
//!
//! The admin consumes two narrow contracts, both using RPITIT
//! (Return Position Impl Trait In Traits) for async methods:
//!
//! - [`Repository`]: list/get/update/create over one model type
//! - [`RepositoryProvider`]: request-scoped acquisition and release
//!
//! Views follow an explicit acquire → use → release sequence. `release` runs
//! on every path once `acquire` has succeeded, including when the handler
//! fails; if the request future itself is dropped, the repository is dropped
//! with it.

use std::collections::BTreeMap;
use std::future::Future;

use http::request::Parts;

use super::error::RepositoryError;
use crate::sorting::SortSpec;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Field changes submitted through an edit form, keyed by attribute name
pub type Changes = BTreeMap<String, serde_json::Value>;

/// Data-access collaborator for one model type
///
/// # List contract
///
/// `list` must return `total >= items.len()` and `items.len() <= limit`.
/// The admin trusts this; wrap an implementation in
/// [`ValidatingRepository`](super::ValidatingRepository) to check it.
///
/// Sort keys in `sorting` are column names, already filtered against the
/// view's allow-list. `query_fields` is only meaningful together with
/// `query`; implementations filter when both are present.
pub trait Repository: Send + Sync {
    /// Entity type served by this repository
    type Model: Send + Sync;

    /// Fetch one page and the total number of matching entities
    fn list(
        &self,
        sorting: &SortSpec,
        offset: u64,
        limit: u64,
        query: Option<&str>,
        query_fields: Option<&[String]>,
    ) -> impl Future<Output = RepositoryResult<(u64, Vec<Self::Model>)>> + Send;

    /// Find an entity by its primary key
    ///
    /// Returns `Ok(None)` if not found.
    fn get_by_key(
        &self,
        key: &str,
    ) -> impl Future<Output = RepositoryResult<Option<Self::Model>>> + Send;

    /// Apply `changes` to `item` and return the stored result
    fn update(
        &self,
        item: Self::Model,
        changes: Changes,
    ) -> impl Future<Output = RepositoryResult<Self::Model>> + Send;

    /// Store a new entity
    fn create(&self, item: Self::Model) -> impl Future<Output = RepositoryResult<Self::Model>> + Send;
}

/// How a repository scope ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// The handler completed successfully
    Success,
    /// The handler returned an error
    Failure,
}

impl ScopeOutcome {
    /// Outcome of a handler result
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Hands out a request-scoped [`Repository`]
///
/// A provider typically owns a connection pool; `acquire` checks out a
/// session and `release` commits or rolls back depending on the outcome.
pub trait RepositoryProvider: Send + Sync + 'static {
    /// Repository handed to views
    type Repository: Repository;

    /// Obtain a repository for the current request
    fn acquire(
        &self,
        parts: &Parts,
    ) -> impl Future<Output = RepositoryResult<Self::Repository>> + Send;

    /// Return the repository at the end of the request
    ///
    /// The default implementation drops it.
    fn release(
        &self,
        repository: Self::Repository,
        outcome: ScopeOutcome,
    ) -> impl Future<Output = ()> + Send {
        let _ = outcome;
        async move { drop(repository) }
    }
}

/// Model type served by a provider
pub type ProviderModel<P> = <<P as RepositoryProvider>::Repository as Repository>::Model;
