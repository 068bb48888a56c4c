//! Product listing and category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;
use zym_power_core::{Category, Product};

use crate::filters;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub brand: String,
    /// Formatted price, or "-" when the product has none.
    pub price: String,
    /// Pre-discount price for sale cards.
    pub original_price: Option<String>,
    pub discount: Option<u8>,
    pub image: String,
    pub category: String,
    pub is_new: bool,
    pub is_pack: bool,
    /// Home page strips let the visitor pick a quantity before adding.
    pub quantity_picker: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product
                .price
                .map_or_else(|| "-".to_string(), |p| p.display()),
            original_price: None,
            discount: None,
            image: product.image_or_placeholder().to_string(),
            category: Category::label_for(&product.category_slug),
            is_new: product.is_new,
            is_pack: product.is_pack,
            quantity_picker: false,
        }
    }
}

impl ProductCard {
    /// Card for the home page new-arrivals strip.
    #[must_use]
    pub fn in_strip(product: &Product) -> Self {
        Self {
            quantity_picker: true,
            ..Self::from(product)
        }
    }

    /// Card for the sale strip, showing the price before discount.
    #[must_use]
    pub fn on_sale(product: &Product) -> Self {
        let discount = product.sale_discount();
        Self {
            original_price: product
                .price
                .and_then(|p| p.before_discount(discount))
                .map(|p| p.display()),
            discount: Some(discount),
            ..Self::in_strip(product)
        }
    }
}

/// Cards for a product list.
fn cards(products: &[Product]) -> Vec<ProductCard> {
    products.iter().map(ProductCard::from).collect()
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCard>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/category.html")]
pub struct CategoryTemplate {
    pub slug: String,
    pub label: String,
    pub products: Vec<ProductCard>,
}

/// Display every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let products = match state.catalog().all_products().await {
        Ok(products) => cards(&products),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            Vec::new()
        }
    };

    ProductsIndexTemplate { products }
}

/// Display the products of one category.
#[instrument(skip(state))]
pub async fn category(State(state): State<AppState>, Path(slug): Path<String>) -> impl IntoResponse {
    let slug = slug.trim().to_lowercase();
    let products = match state.catalog().by_category(&slug).await {
        Ok(products) => cards(&products),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load category products");
            Vec::new()
        }
    };

    CategoryTemplate {
        label: Category::label_for(&slug),
        slug,
        products,
    }
}

#[cfg(test)]
mod tests {
    use zym_power_core::{Price, ProductId};

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Whey".to_string(),
            slug: "whey".to_string(),
            category_slug: "proteines".to_string(),
            price: Some(Price::from_dinars(8500)),
            brand: "ON".to_string(),
            image_url: None,
            discount: None,
            on_sale: true,
            is_new: false,
            is_pack: false,
        }
    }

    #[test]
    fn test_card_labels_category() {
        let card = ProductCard::from(&product());
        assert_eq!(card.category, "Protéines");
        assert_eq!(card.price, "8\u{202f}500 DA");
        assert!(card.original_price.is_none());
        assert!(!card.quantity_picker);
    }

    #[test]
    fn test_sale_card_uses_default_discount() {
        let card = ProductCard::on_sale(&product());
        assert_eq!(card.discount, Some(15));
        assert_eq!(card.original_price.as_deref(), Some("10\u{202f}000 DA"));
        assert!(card.quantity_picker);
    }

    #[test]
    fn test_missing_price_shows_dash() {
        let card = ProductCard::from(&Product {
            price: None,
            ..product()
        });
        assert_eq!(card.price, "-");
    }
}
