//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;
use zym_power_core::Category;

use crate::filters;
use crate::routes::products::ProductCard;
use crate::state::AppState;

/// Category tile display data.
#[derive(Clone)]
pub struct CategoryTile {
    pub slug: &'static str,
    pub label: &'static str,
    pub image: &'static str,
}

impl From<Category> for CategoryTile {
    fn from(category: Category) -> Self {
        Self {
            slug: category.slug(),
            label: category.label(),
            image: category.image(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<CategoryTile>,
    pub sale_products: Vec<ProductCard>,
    pub new_products: Vec<ProductCard>,
}

/// Display home page.
///
/// The sale and new-arrival strips are read independently; a failure in
/// one leaves that strip empty.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let sale_products = match state.catalog().on_sale().await {
        Ok(products) => products.iter().map(ProductCard::on_sale).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load sale products");
            Vec::new()
        }
    };
    let new_products = match state.catalog().new_arrivals().await {
        Ok(products) => products.iter().map(ProductCard::in_strip).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load new products");
            Vec::new()
        }
    };

    HomeTemplate {
        categories: Category::ALL.into_iter().map(CategoryTile::from).collect(),
        sale_products,
        new_products,
    }
}
