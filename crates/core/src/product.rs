//! Product records and the admin product form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, slugify};

/// Image shown when a product has no image URL.
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.svg";

/// Discount assumed on the home page when an on-sale product has none recorded.
pub const DEFAULT_SALE_DISCOUNT: u8 = 15;

/// A product as stored in the `products` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Normalised (trimmed, lower-case) category slug.
    pub category_slug: String,
    /// `None` when the document has no `priceDa` field.
    pub price: Option<Price>,
    pub brand: String,
    pub image_url: Option<String>,
    pub discount: Option<u8>,
    pub on_sale: bool,
    pub is_new: bool,
    pub is_pack: bool,
}

impl Product {
    /// Price used when the product goes into the cart.
    #[must_use]
    pub fn cart_price(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }

    /// Image URL, or the placeholder.
    #[must_use]
    pub fn image_or_placeholder(&self) -> &str {
        self.image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Whether the product belongs to the category, comparing slugs case-insensitively.
    #[must_use]
    pub fn in_category(&self, slug: &str) -> bool {
        self.category_slug.eq_ignore_ascii_case(slug.trim())
    }

    /// Discount shown on sale cards.
    #[must_use]
    pub fn sale_discount(&self) -> u8 {
        self.discount.unwrap_or(DEFAULT_SALE_DISCOUNT)
    }

    /// Editable fields, for pre-filling the admin form.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            slug: self.slug.clone(),
            category_slug: self.category_slug.clone(),
            price: self.cart_price(),
            brand: self.brand.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
            discount: self.discount.unwrap_or(0),
            on_sale: self.on_sale,
            is_new: self.is_new,
            is_pack: self.is_pack,
        }
    }
}

/// Errors raised when an admin product form cannot be saved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductFormError {
    #[error("le nom est obligatoire")]
    MissingName,
    #[error("la catégorie est obligatoire")]
    MissingCategory,
    #[error("le prix doit être un nombre positif")]
    InvalidPrice,
    #[error("la remise doit être comprise entre 0 et 100")]
    InvalidDiscount,
}

/// Raw admin form submission.
///
/// Numeric fields arrive as text so an empty input can fall back to its
/// default instead of failing form decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category_slug: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub on_sale: Option<String>,
    #[serde(default)]
    pub is_new: Option<String>,
    #[serde(default)]
    pub is_pack: Option<String>,
}

/// A validated product ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub slug: String,
    pub category_slug: String,
    pub price: Price,
    pub brand: String,
    pub image_url: String,
    pub discount: u8,
    pub on_sale: bool,
    pub is_new: bool,
    pub is_pack: bool,
}

impl ProductForm {
    /// Normalise and validate the submission.
    ///
    /// # Errors
    ///
    /// Returns [`ProductFormError`] if the name or category is blank, the price
    /// is not a non-negative number, or the discount is outside 0-100.
    pub fn normalize(&self) -> Result<ProductDraft, ProductFormError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }

        let slug_source = if self.slug.trim().is_empty() {
            &name
        } else {
            &self.slug
        };

        let category_slug = self.category_slug.trim().to_lowercase();
        if category_slug.is_empty() {
            return Err(ProductFormError::MissingCategory);
        }

        let price = match self.price.trim() {
            "" => Price::ZERO,
            raw => raw
                .parse::<Decimal>()
                .ok()
                .and_then(|amount| Price::new(amount).ok())
                .ok_or(ProductFormError::InvalidPrice)?,
        };

        let discount = match self.discount.trim() {
            "" => 0,
            raw => raw
                .parse::<u8>()
                .ok()
                .filter(|d| *d <= 100)
                .ok_or(ProductFormError::InvalidDiscount)?,
        };

        Ok(ProductDraft {
            slug: slugify(slug_source),
            name,
            category_slug,
            price,
            brand: self.brand.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            discount,
            on_sale: is_checked(self.on_sale.as_deref()),
            is_new: is_checked(self.is_new.as_deref()),
            is_pack: is_checked(self.is_pack.as_deref()),
        })
    }
}

/// HTML checkbox and `<select>` yes/no values.
fn is_checked(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "on" | "1"))
}
