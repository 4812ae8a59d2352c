//! Repository contracts consumed by admin views
//!
//! The admin never talks to a data store directly. Model views receive a
//! [`RepositoryProvider`] and, for each request, acquire a [`Repository`],
//! call it, and release it again.
//!
//! # Features
//!
//! - **Repository**: [`Repository`] list/get/update/create contract
//! - **Scoped acquisition**: [`RepositoryProvider`] with explicit release
//! - **In-memory backend**: [`InMemoryRepository`] for demos and tests
//! - **Contract checking**: [`ValidatingRepository`] verifies list results
//!
//! # Example
//!
//! ```rust
//! use acton_admin::repository::{InMemoryRepository, Repository};
//! use acton_admin::sorting::{SortDirection, SortSpec};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Tag {
//!     slug: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tags = InMemoryRepository::new(
//!     ["rust", "axum", "tokio"].map(|slug| Tag { slug: slug.into() }),
//!     |tag: &Tag| tag.slug.clone(),
//! );
//! let sorting = SortSpec::new().then("slug", SortDirection::Ascending);
//! let (total, page) = tags.list(&sorting, 0, 2, None, None).await.unwrap();
//! assert_eq!(total, 3);
//! assert_eq!(page[0].slug, "axum");
//! # }
//! ```

mod error;
mod memory;
mod traits;
mod validating;

// Re-export all public types
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::InMemoryRepository;
pub use traits::{
    Changes, ProviderModel, Repository, RepositoryProvider, RepositoryResult, ScopeOutcome,
};
pub use validating::ValidatingRepository;
