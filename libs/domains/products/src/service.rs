//! Product Service - Business logic layer

use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductFields, ProductId, ProductInput};
use crate::repository::ProductRepository;

/// Client-facing messages for store failures, per operation
pub mod messages {
    pub const LIST_FAILED: &str = "Failed to get products.";
    pub const CREATE_FAILED: &str = "Failed to create new product.";
    pub const GET_FAILED: &str = "Failed to get product";
    pub const UPDATE_FAILED: &str = "Failed to update product";
    pub const DELETE_FAILED: &str = "Failed to delete product";
}

/// Product service providing business logic operations
///
/// Input is validated before the repository is touched; store errors leave
/// with the message of the operation that failed.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List every product
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository
            .list()
            .await
            .map_err(|e| e.context(messages::LIST_FAILED))
    }

    /// Create a new product stamped with the current time
    #[instrument(skip(self, input), fields(product_name = ?input.name))]
    pub async fn create_product(&self, input: ProductInput) -> ProductResult<Product> {
        let fields = ProductFields::try_from(input)?;

        // The store keeps milliseconds; truncate so the response matches later reads.
        let create_date = Utc::now().trunc_subsecs(3);

        self.repository
            .insert(fields, create_date)
            .await
            .map_err(|e| e.context(messages::CREATE_FAILED))
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.context(messages::GET_FAILED))?
            .found_or(|| ProductError::NotFound(id))
    }

    /// Replace a product with `input`, keeping its identifier and creation time
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> ProductResult<()> {
        let fields = ProductFields::try_from(input)?;

        self.repository
            .replace(id, fields)
            .await
            .map_err(|e| e.context(messages::UPDATE_FAILED))?
            .found_or(|| ProductError::NotFound(id))
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> ProductResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.context(messages::DELETE_FAILED))?
            .found_or(|| ProductError::NotFound(id))
    }
}
