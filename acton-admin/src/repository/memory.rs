//! In-memory repository
//!
//! [`InMemoryRepository`] keeps entities in insertion order behind a
//! `tokio::sync::RwLock`. Filtering and sorting work on the serde JSON form of
//! each entity, so any `Serialize + DeserializeOwned` model can be used
//! without extra glue. Useful for demos, prototypes and tests.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use http::request::Parts;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Changes, Repository, RepositoryProvider, RepositoryResult};
use crate::naming::short_type_name;
use crate::sorting::{SortDirection, SortSpec};

type KeyFn<M> = Arc<dyn Fn(&M) -> String + Send + Sync>;

/// Insertion-ordered repository held in process memory
///
/// Cloning is cheap and clones share storage, so the repository acts as its
/// own [`RepositoryProvider`].
pub struct InMemoryRepository<M> {
    items: Arc<RwLock<Vec<M>>>,
    key: KeyFn<M>,
    entity_type: Arc<str>,
}

impl<M> Clone for InMemoryRepository<M> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            key: Arc::clone(&self.key),
            entity_type: Arc::clone(&self.entity_type),
        }
    }
}

impl<M> fmt::Debug for InMemoryRepository<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("entity_type", &self.entity_type)
            .finish_non_exhaustive()
    }
}

impl<M> InMemoryRepository<M>
where
    M: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a repository seeded with `items`
    ///
    /// `key` extracts the primary key used by `get_by_key`, `update` and
    /// `create`.
    pub fn new<I, K>(items: I, key: K) -> Self
    where
        I: IntoIterator<Item = M>,
        K: Fn(&M) -> String + Send + Sync + 'static,
    {
        Self {
            items: Arc::new(RwLock::new(items.into_iter().collect())),
            key: Arc::new(key),
            entity_type: Arc::from(short_type_name::<M>()),
        }
    }

    /// Override the entity name reported in errors
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl AsRef<str>) -> Self {
        self.entity_type = Arc::from(entity_type.as_ref());
        self
    }

    /// Number of stored entities
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the repository is empty
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Copy of all entities in insertion order
    pub async fn snapshot(&self) -> Vec<M> {
        self.items.read().await.clone()
    }

    fn to_value(&self, item: &M, operation: RepositoryOperation) -> RepositoryResult<Value> {
        serde_json::to_value(item).map_err(|e| {
            RepositoryError::serialization_error(operation, e.to_string())
                .with_entity(self.entity_type.as_ref(), (self.key)(item))
        })
    }
}

impl<M> Repository for InMemoryRepository<M>
where
    M: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Model = M;

    async fn list(
        &self,
        sorting: &SortSpec,
        offset: u64,
        limit: u64,
        query: Option<&str>,
        query_fields: Option<&[String]>,
    ) -> RepositoryResult<(u64, Vec<M>)> {
        let items = self.items.read().await;

        let mut rows = Vec::with_capacity(items.len());
        for item in items.iter() {
            rows.push((self.to_value(item, RepositoryOperation::List)?, item));
        }

        if let (Some(query), Some(fields)) = (query, query_fields) {
            if !fields.is_empty() {
                let needle = query.to_lowercase();
                rows.retain(|(value, _)| matches_query(value, fields, &needle));
            }
        }

        if !sorting.is_empty() {
            // sort_by is stable, ties keep insertion order
            rows.sort_by(|(a, _), (b, _)| compare_rows(a, b, sorting));
        }

        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|(_, item)| item.clone())
            .collect();

        Ok((total, page))
    }

    async fn get_by_key(&self, key: &str) -> RepositoryResult<Option<M>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| (self.key)(item) == key).cloned())
    }

    async fn update(&self, item: M, changes: Changes) -> RepositoryResult<M> {
        let key = (self.key)(&item);
        let mut value = self.to_value(&item, RepositoryOperation::Update)?;

        let Value::Object(fields) = &mut value else {
            return Err(RepositoryError::serialization_error(
                RepositoryOperation::Update,
                "model does not serialize to an object",
            )
            .with_entity(self.entity_type.as_ref(), key));
        };
        fields.extend(changes);

        let updated: M = serde_json::from_value(value).map_err(|e| {
            RepositoryError::serialization_error(RepositoryOperation::Update, e.to_string())
                .with_entity(self.entity_type.as_ref(), key.clone())
        })?;

        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|stored| (self.key)(stored) == key)
            .ok_or_else(|| {
                RepositoryError::not_found(self.entity_type.as_ref(), key.clone())
                    .with_operation(RepositoryOperation::Update)
            })?;
        *slot = updated.clone();

        tracing::debug!(entity_type = %self.entity_type, key = %key, "updated entity");
        Ok(updated)
    }

    async fn create(&self, item: M) -> RepositoryResult<M> {
        let key = (self.key)(&item);
        let mut items = self.items.write().await;
        if items.iter().any(|stored| (self.key)(stored) == key) {
            return Err(RepositoryError::already_exists(
                self.entity_type.as_ref(),
                key,
            ));
        }
        items.push(item.clone());

        tracing::debug!(entity_type = %self.entity_type, key = %key, "created entity");
        Ok(item)
    }
}

impl<M> RepositoryProvider for InMemoryRepository<M>
where
    M: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Repository = Self;

    async fn acquire(&self, _parts: &Parts) -> RepositoryResult<Self> {
        Ok(self.clone())
    }
}

fn matches_query(row: &Value, fields: &[String], needle: &str) -> bool {
    fields.iter().any(|field| {
        row.get(field)
            .and_then(searchable_text)
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn compare_rows(a: &Value, b: &Value, sorting: &SortSpec) -> Ordering {
    for (column, direction) in sorting.iter() {
        let ordering = compare_values(
            a.get(column).unwrap_or(&Value::Null),
            b.get(column).unwrap_or(&Value::Null),
        );
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Total order over JSON values: null < bool < number < string < composite
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ if rank(a) == rank(b) => a.to_string().cmp(&b.to_string()),
        _ => rank(a).cmp(&rank(b)),
    }
}
