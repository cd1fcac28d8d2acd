use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProductResult;
use crate::models::{Product, ProductFields, ProductId};

/// Outcome of a store operation keyed by identifier.
///
/// Absence is reported explicitly so that callers never have to infer
/// "not found" from an empty value.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
}

impl<T> Lookup<T> {
    /// Turns `Missing` into the error produced by `err`.
    pub fn found_or<E>(self, err: impl FnOnce() -> E) -> Result<T, E> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::Missing => Err(err()),
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Lookup::Missing, Lookup::Found)
    }
}

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every stored product, in store order
    async fn list(&self) -> ProductResult<Vec<Product>>;

    /// Insert a new product; the store assigns the identifier
    async fn insert(
        &self,
        fields: ProductFields,
        create_date: DateTime<Utc>,
    ) -> ProductResult<Product>;

    /// Get a product by ID
    async fn find_by_id(&self, id: ProductId) -> ProductResult<Lookup<Product>>;

    /// Replace every field of a product except its identifier and creation time
    async fn replace(&self, id: ProductId, fields: ProductFields) -> ProductResult<Lookup<()>>;

    /// Delete a product by ID
    async fn delete(&self, id: ProductId) -> ProductResult<Lookup<()>>;
}
