//! Product persistence seam.
//!
//! Handlers never talk to the document database directly; they go through
//! [`crate::catalog::Catalog`], which caches reads from a [`ProductStore`].

use async_trait::async_trait;
use thiserror::Error;
use zym_power_core::{Product, ProductDraft, ProductId};

use crate::services::auth::IdToken;

/// Boolean product fields the home page filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFlag {
    OnSale,
    New,
}

impl ProductFlag {
    /// Stored field name.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::OnSale => "onSale",
            Self::New => "isNew",
        }
    }
}

/// Errors that can occur when reading or writing products.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The caller's token was rejected.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Product does not exist.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Read and write access to the `products` collection.
///
/// Writes carry the signed-in administrator's token; the database's own
/// security rules decide whether they succeed.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, in store order.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Products whose `flag` field is `true`, at most `limit` of them.
    async fn query_flag(&self, flag: ProductFlag, limit: u32) -> Result<Vec<Product>, StoreError>;

    /// A single product, or `None` if it does not exist.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Create a product under a store-generated id.
    async fn create_product(
        &self,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<ProductId, StoreError>;

    /// Overwrite the editable fields of an existing product.
    async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<(), StoreError>;

    /// Delete a product.
    async fn delete_product(&self, id: &ProductId, token: &IdToken) -> Result<(), StoreError>;
}
