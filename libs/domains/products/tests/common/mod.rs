//! Repositories used by handler tests in place of MongoDB

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_products::*;
use std::sync::Mutex;

/// Keeps products in insertion order, like a collection scan would.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.lock().unwrap().len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> ProductResult<Vec<Product>> {
        Ok(self.products.lock().unwrap().clone())
    }

    async fn insert(
        &self,
        fields: ProductFields,
        create_date: DateTime<Utc>,
    ) -> ProductResult<Product> {
        let product = fields.into_product(ProductId::new(), create_date);
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: ProductId) -> ProductResult<Lookup<Product>> {
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id == id).cloned().into())
    }

    async fn replace(&self, id: ProductId, fields: ProductFields) -> ProductResult<Lookup<()>> {
        let mut products = self.products.lock().unwrap();
        let Some(existing) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(Lookup::Missing);
        };
        *existing = fields.into_product(id, existing.create_date);
        Ok(Lookup::Found(()))
    }

    async fn delete(&self, id: ProductId) -> ProductResult<Lookup<()>> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            Ok(Lookup::Missing)
        } else {
            Ok(Lookup::Found(()))
        }
    }
}

/// Every call fails the way an unreachable server would.
pub struct UnavailableProductRepository;

fn unavailable() -> ProductError {
    ProductError::database("server selection timeout")
}

#[async_trait]
impl ProductRepository for UnavailableProductRepository {
    async fn list(&self) -> ProductResult<Vec<Product>> {
        Err(unavailable())
    }

    async fn insert(&self, _: ProductFields, _: DateTime<Utc>) -> ProductResult<Product> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _: ProductId) -> ProductResult<Lookup<Product>> {
        Err(unavailable())
    }

    async fn replace(&self, _: ProductId, _: ProductFields) -> ProductResult<Lookup<()>> {
        Err(unavailable())
    }

    async fn delete(&self, _: ProductId) -> ProductResult<Lookup<()>> {
        Err(unavailable())
    }
}
