//! Admin product management route handlers.
//!
//! Every handler requires a signed-in administrator. Writes go through the
//! catalogue with the administrator's token, which also refreshes the cached
//! listings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tracing::instrument;
use zym_power_core::{Category, Product, ProductForm, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::AdminSession;
use crate::routes::auth::ADMIN_HOME;
use crate::routes::is_htmx;
use crate::state::AppState;
use crate::store::StoreError;

/// Admin list row display data.
#[derive(Clone)]
pub struct AdminProductRow {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    pub discount: u8,
    pub on_sale: bool,
    pub is_new: bool,
    pub is_pack: bool,
}

impl From<&Product> for AdminProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: Category::label_for(&product.category_slug),
            price: product
                .price
                .map_or_else(|| "-".to_string(), |p| p.display()),
            discount: product.discount.unwrap_or(0),
            on_sale: product.on_sale,
            is_new: product.is_new,
            is_pack: product.is_pack,
        }
    }
}

/// Category `<option>` display data.
#[derive(Clone)]
pub struct CategoryOption {
    pub slug: &'static str,
    pub label: &'static str,
}

/// Admin products page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct AdminProductsTemplate {
    pub admin_email: String,
    pub products: Vec<AdminProductRow>,
    pub categories: Vec<CategoryOption>,
    /// Id of the product being edited; `None` for the create form.
    pub editing: Option<String>,
    pub form: ProductForm,
    /// Yes/no selects, resolved from the form.
    pub on_sale: bool,
    pub is_new: bool,
    pub is_pack: bool,
    pub error: Option<String>,
}

/// Whether a yes/no form field is set.
fn checked(value: Option<&String>) -> bool {
    matches!(value.map(|v| v.trim()), Some("true" | "on" | "1"))
}

/// Render the admin page around a form.
async fn admin_page(
    state: &AppState,
    admin: &AdminSession,
    editing: Option<&ProductId>,
    form: ProductForm,
    error: Option<String>,
) -> AdminProductsTemplate {
    let products = match state.catalog().all_products().await {
        Ok(products) => products.iter().map(AdminProductRow::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products for admin");
            Vec::new()
        }
    };

    AdminProductsTemplate {
        admin_email: admin.email.clone(),
        products,
        categories: Category::ALL
            .into_iter()
            .map(|c| CategoryOption {
                slug: c.slug(),
                label: c.label(),
            })
            .collect(),
        editing: editing.map(ToString::to_string),
        on_sale: checked(form.on_sale.as_ref()),
        is_new: checked(form.is_new.as_ref()),
        is_pack: checked(form.is_pack.as_ref()),
        form,
        error,
    }
}

/// Text form pre-filled from a stored product.
fn form_for(product: &Product) -> ProductForm {
    let draft = product.to_draft();
    let flag = |set: bool| Some(set.to_string());
    ProductForm {
        name: draft.name,
        slug: draft.slug,
        category_slug: draft.category_slug,
        price: draft.price.amount().normalize().to_string(),
        brand: draft.brand,
        image_url: draft.image_url,
        discount: draft.discount.to_string(),
        on_sale: flag(draft.on_sale),
        is_new: flag(draft.is_new),
        is_pack: flag(draft.is_pack),
    }
}

/// Banner text for a failed write.
fn write_error_message(err: &StoreError) -> String {
    match err {
        StoreError::PermissionDenied(_) => {
            "Accès refusé. Reconnectez-vous puis réessayez.".to_string()
        }
        StoreError::NotFound(_) => "Ce produit n'existe plus.".to_string(),
        _ => "Erreur lors de l'enregistrement du produit.".to_string(),
    }
}

/// Product list with the create form.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    admin_page(&state, &admin, None, ProductForm::default(), None).await
}

/// Product list with the edit form for one product.
#[instrument(skip(state, admin))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .find(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(admin_page(&state, &admin, Some(&id), form_for(&product), None)
        .await
        .into_response())
}

/// Create a product.
#[instrument(skip(state, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Response {
    save(&state, &admin, None, form).await
}

/// Update a product.
#[instrument(skip(state, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Response {
    save(&state, &admin, Some(ProductId::new(id)), form).await
}

async fn save(
    state: &AppState,
    admin: &AdminSession,
    id: Option<ProductId>,
    form: ProductForm,
) -> Response {
    let draft = match form.normalize() {
        Ok(draft) => draft,
        Err(e) => {
            let page = admin_page(state, admin, id.as_ref(), form, Some(e.to_string())).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    let token = admin.id_token();
    let result = match &id {
        Some(id) => state.catalog().update(id, &draft, &token).await,
        None => state.catalog().create(&draft, &token).await.map(|_| ()),
    };

    match result {
        Ok(()) => Redirect::to(ADMIN_HOME).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save product");
            let message = write_error_message(&e);
            let page = admin_page(state, admin, id.as_ref(), form, Some(message)).await;
            (StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

/// Delete a product.
///
/// The list page confirms through htmx, which is sent an `HX-Redirect`.
#[instrument(skip(state, admin, headers))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let id = ProductId::new(id);
    match state.catalog().delete(&id, &admin.id_token()).await {
        Ok(()) if is_htmx(&headers) => AppendHeaders([("HX-Redirect", ADMIN_HOME)]).into_response(),
        Ok(()) => Redirect::to(ADMIN_HOME).into_response(),
        Err(e) => {
            tracing::error!(error = %e, id = %id, "Failed to delete product");
            let page = admin_page(
                &state,
                &admin,
                None,
                ProductForm::default(),
                Some(write_error_message(&e)),
            )
            .await;
            (StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use zym_power_core::Price;

    use super::*;

    #[test]
    fn test_form_for_round_trips_through_normalize() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Créatine Monohydrate".to_string(),
            slug: "creatine-monohydrate".to_string(),
            category_slug: "creatines".to_string(),
            price: Some(Price::from_dinars(3200)),
            brand: "Biotech".to_string(),
            image_url: None,
            discount: Some(10),
            on_sale: true,
            is_new: false,
            is_pack: false,
        };

        let form = form_for(&product);
        assert_eq!(form.price, "3200");
        assert!(checked(form.on_sale.as_ref()));
        assert!(!checked(form.is_new.as_ref()));

        let draft = form.normalize().unwrap_or_default();
        assert_eq!(draft, product.to_draft());
    }

    #[test]
    fn test_write_error_messages() {
        assert!(
            write_error_message(&StoreError::PermissionDenied("denied".to_string()))
                .starts_with("Accès refusé")
        );
        assert_eq!(
            write_error_message(&StoreError::Parse("bad".to_string())),
            "Erreur lors de l'enregistrement du produit."
        );
    }
}
