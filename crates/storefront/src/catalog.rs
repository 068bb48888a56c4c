//! Cached product reads and cache-invalidating writes.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;
use zym_power_core::{Product, ProductDraft, ProductId};

use crate::cache::QueryCache;
use crate::services::auth::IdToken;
use crate::store::{ProductFlag, ProductStore, StoreError};

/// Cache key for the full product listing.
pub const ALL_PRODUCTS_KEY: &str = "products";
/// Cache key for the home page sale strip.
pub const HOMEPAGE_SALE_KEY: &str = "homepage-sale";
/// Cache key for the home page new-arrivals strip.
pub const HOMEPAGE_NEW_KEY: &str = "homepage-new";

/// Products shown in each home page strip.
pub const HOMEPAGE_LIMIT: u32 = 12;

/// Product catalogue backed by a [`ProductStore`].
pub struct Catalog {
    store: Arc<dyn ProductStore>,
    cache: QueryCache<Vec<Product>>,
}

impl Catalog {
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>, ttl: Duration) -> Self {
        Self {
            store,
            cache: QueryCache::new(ttl),
        }
    }

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the listing is not cached and the store read fails.
    pub async fn all_products(&self) -> Result<Arc<Vec<Product>>, StoreError> {
        self.cache
            .get_or_fetch_default(ALL_PRODUCTS_KEY, || self.store.list_products())
            .await
    }

    /// Products on sale, for the home page.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store read fails.
    pub async fn on_sale(&self) -> Result<Arc<Vec<Product>>, StoreError> {
        self.flagged(HOMEPAGE_SALE_KEY, ProductFlag::OnSale).await
    }

    /// New products, for the home page.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store read fails.
    pub async fn new_arrivals(&self) -> Result<Arc<Vec<Product>>, StoreError> {
        self.flagged(HOMEPAGE_NEW_KEY, ProductFlag::New).await
    }

    async fn flagged(&self, key: &str, flag: ProductFlag) -> Result<Arc<Vec<Product>>, StoreError> {
        self.cache
            .get_or_fetch_default(key, || self.store.query_flag(flag, HOMEPAGE_LIMIT))
            .await
    }

    /// Products in a category, compared on the normalised slug.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store read fails.
    pub async fn by_category(&self, slug: &str) -> Result<Vec<Product>, StoreError> {
        let products = self.all_products().await?;
        Ok(products
            .iter()
            .filter(|p| p.in_category(slug))
            .cloned()
            .collect())
    }

    /// One product, from the cached listing when possible.
    ///
    /// Ids that cannot name a product document are never looked up.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store read fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn find(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        if !id.is_document_id() {
            return Ok(None);
        }
        let products = self.all_products().await?;
        if let Some(product) = products.iter().find(|p| &p.id == id) {
            return Ok(Some(product.clone()));
        }
        self.store.get_product(id).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    pub async fn create(&self, draft: &ProductDraft, token: &IdToken) -> Result<ProductId, StoreError> {
        let id = self.store.create_product(draft, token).await?;
        self.invalidate_listings().await;
        Ok(id)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    pub async fn update(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        token: &IdToken,
    ) -> Result<(), StoreError> {
        ensure_document_id(id)?;
        self.store.update_product(id, draft, token).await?;
        self.invalidate_listings().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    pub async fn delete(&self, id: &ProductId, token: &IdToken) -> Result<(), StoreError> {
        ensure_document_id(id)?;
        self.store.delete_product(id, token).await?;
        self.invalidate_listings().await;
        Ok(())
    }

    /// Drop every cached listing a product write can affect.
    pub async fn invalidate_listings(&self) {
        for key in [ALL_PRODUCTS_KEY, HOMEPAGE_SALE_KEY, HOMEPAGE_NEW_KEY] {
            self.cache.invalidate(key).await;
        }
    }
}

fn ensure_document_id(id: &ProductId) -> Result<(), StoreError> {
    if id.is_document_id() {
        Ok(())
    } else {
        Err(StoreError::NotFound(id.clone()))
    }
}
