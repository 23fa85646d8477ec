//! Pet-product catalog management.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use pawcase_core::{Money, PetProductId};

use crate::db::{ProductStore, RepositoryError};
use crate::models::{CoverLayout, NewPetProduct, PetProduct};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product input is invalid.
    #[error("{0}")]
    Invalid(String),

    /// The product does not exist.
    #[error("product not found")]
    NotFound,

    /// The product key is already used by another product.
    #[error("product key already exists")]
    DuplicateKey,

    /// Storage failure.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::DuplicateKey,
            other => Self::Repository(other),
        }
    }
}

/// Product create/replace body.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub key: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub templates: Vec<String>,
    pub layout: Option<CoverLayout>,
}

impl ProductInput {
    /// Validate and normalize the input.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for blank required fields, a negative
    /// price, or a key containing whitespace.
    pub fn validate(self) -> Result<NewPetProduct, CatalogError> {
        let name = non_blank(self.name, "name")?;
        let category = non_blank(self.category, "category")?;
        let key = non_blank(self.key, "key")?;
        if key.chars().any(char::is_whitespace) {
            return Err(CatalogError::Invalid(
                "key must not contain whitespace".to_owned(),
            ));
        }

        let price = self
            .price
            .ok_or_else(|| CatalogError::Invalid("price is required".to_owned()))?;
        let price = Money::new(price).map_err(|e| CatalogError::Invalid(e.to_string()))?;

        Ok(NewPetProduct {
            name,
            category,
            key,
            price,
            images: self.images,
            templates: self.templates,
            layout: self.layout,
        })
    }
}

fn non_blank(value: Option<String>, field: &str) -> Result<String, CatalogError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CatalogError::Invalid(format!("{field} is required")))
}

/// Catalog operations over a [`ProductStore`].
pub struct CatalogService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: &'a dyn ProductStore) -> Self {
        Self { products }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` on storage failure.
    pub async fn list(&self) -> Result<Vec<PetProduct>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such product.
    pub async fn get(&self, id: PetProductId) -> Result<PetProduct, CatalogError> {
        self.products.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// One product by its storefront key.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such product.
    pub async fn get_by_key(&self, key: &str) -> Result<PetProduct, CatalogError> {
        self.products
            .get_by_key(key)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` or `CatalogError::DuplicateKey`.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ProductInput) -> Result<PetProduct, CatalogError> {
        let product = input.validate()?;
        let created = self.products.create(&product).await?;
        info!(product_id = %created.id, key = %created.key, "Product created");
        Ok(created)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid`, `CatalogError::NotFound`, or
    /// `CatalogError::DuplicateKey`.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: PetProductId,
        input: ProductInput,
    ) -> Result<PetProduct, CatalogError> {
        let product = input.validate()?;
        let updated = self.products.update(id, &product).await?;
        info!(key = %updated.key, "Product updated");
        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: PetProductId) -> Result<(), CatalogError> {
        if self.products.delete(id).await? {
            info!("Product deleted");
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }

    /// Append template images to a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if `templates` is empty or holds a
    /// blank entry, and `CatalogError::NotFound` for unknown products.
    #[instrument(skip(self, templates), fields(product_id = %id, count = templates.len()))]
    pub async fn add_templates(
        &self,
        id: PetProductId,
        templates: Vec<String>,
    ) -> Result<PetProduct, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Invalid("templates are required".to_owned()));
        }
        if templates.iter().any(|t| t.trim().is_empty()) {
            return Err(CatalogError::Invalid(
                "templates must not be blank".to_owned(),
            ));
        }
        Ok(self.products.append_templates(id, &templates).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn input(key: &str) -> ProductInput {
        ProductInput {
            name: Some("  Corgi Case ".to_owned()),
            category: Some("dog".to_owned()),
            key: Some(key.to_owned()),
            price: Some(Decimal::new(2999, 2)),
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_validate_trims_and_requires_fields() {
        let product = input("corgi").validate().unwrap();
        assert_eq!(product.name, "Corgi Case");

        let mut missing = input("corgi");
        missing.category = None;
        assert!(matches!(missing.validate(), Err(CatalogError::Invalid(_))));

        let mut negative = input("corgi");
        negative.price = Some(Decimal::new(-1, 0));
        assert!(matches!(negative.validate(), Err(CatalogError::Invalid(_))));

        assert!(matches!(
            input("corgi case").validate(),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_price_outside_stored_precision() {
        for price in [Decimal::new(5, 3), Decimal::new(10_000_000_000, 0)] {
            let mut product = input("corgi");
            product.price = Some(price);
            assert!(matches!(product.validate(), Err(CatalogError::Invalid(_))));
        }
    }

    #[tokio::test]
    async fn test_crud_and_templates() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(&store);

        let created = catalog.create(input("corgi")).await.unwrap();
        assert!(matches!(
            catalog.create(input("corgi")).await,
            Err(CatalogError::DuplicateKey)
        ));

        let with_templates = catalog
            .add_templates(created.id, vec!["data:image/png;base64,AAAA".to_owned()])
            .await
            .unwrap();
        assert_eq!(with_templates.templates.len(), 1);
        assert!(matches!(
            catalog.add_templates(created.id, Vec::new()).await,
            Err(CatalogError::Invalid(_))
        ));

        assert_eq!(catalog.get_by_key("corgi").await.unwrap().id, created.id);

        catalog.delete(created.id).await.unwrap();
        assert!(matches!(
            catalog.delete(created.id).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            catalog.update(created.id, input("corgi")).await,
            Err(CatalogError::NotFound)
        ));
    }
}
