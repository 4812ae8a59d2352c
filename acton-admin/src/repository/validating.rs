//! List-contract checking wrapper

use http::request::Parts;

use super::error::RepositoryError;
use super::traits::{Changes, Repository, RepositoryProvider, RepositoryResult, ScopeOutcome};
use crate::sorting::SortSpec;

/// Wraps a repository and verifies every `list` result
///
/// Reports `total < items.len()` or `items.len() > limit` as a
/// [`ContractViolation`](super::RepositoryErrorKind::ContractViolation)
/// instead of rendering an inconsistent page. Other operations pass through.
///
/// Wrapping a [`RepositoryProvider`] wraps every repository it hands out.
#[derive(Debug, Clone)]
pub struct ValidatingRepository<R> {
    inner: R,
}

impl<R> ValidatingRepository<R> {
    /// Wrap `inner`
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// The wrapped value
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Repository> Repository for ValidatingRepository<R> {
    type Model = R::Model;

    async fn list(
        &self,
        sorting: &SortSpec,
        offset: u64,
        limit: u64,
        query: Option<&str>,
        query_fields: Option<&[String]>,
    ) -> RepositoryResult<(u64, Vec<R::Model>)> {
        let (total, items) = self
            .inner
            .list(sorting, offset, limit, query, query_fields)
            .await?;

        let returned = items.len() as u64;
        if returned > limit {
            return Err(RepositoryError::contract_violation(format!(
                "returned {returned} items for limit {limit}"
            )));
        }
        if total < returned {
            return Err(RepositoryError::contract_violation(format!(
                "reported total {total} but returned {returned} items"
            )));
        }
        Ok((total, items))
    }

    fn get_by_key(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = RepositoryResult<Option<R::Model>>> + Send {
        self.inner.get_by_key(key)
    }

    fn update(
        &self,
        item: R::Model,
        changes: Changes,
    ) -> impl std::future::Future<Output = RepositoryResult<R::Model>> + Send {
        self.inner.update(item, changes)
    }

    fn create(
        &self,
        item: R::Model,
    ) -> impl std::future::Future<Output = RepositoryResult<R::Model>> + Send {
        self.inner.create(item)
    }
}

impl<P: RepositoryProvider> RepositoryProvider for ValidatingRepository<P> {
    type Repository = ValidatingRepository<P::Repository>;

    async fn acquire(&self, parts: &Parts) -> RepositoryResult<Self::Repository> {
        self.inner.acquire(parts).await.map(ValidatingRepository::new)
    }

    async fn release(&self, repository: Self::Repository, outcome: ScopeOutcome) {
        self.inner.release(repository.into_inner(), outcome).await;
    }
}
