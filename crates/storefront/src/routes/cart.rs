//! Cart route handlers.
//!
//! The cart lives in the visitor's session. htmx requests get fragments back
//! with an `HX-Trigger: cart-updated` header so the header badge refreshes;
//! plain form posts are redirected.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use zym_power_core::{Cart, CartItem, CartProduct, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{SessionCart, load_cart, save_cart};
use crate::routes::is_htmx;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.product.id.to_string(),
            name: item.product.name.clone(),
            brand: item.product.brand.clone(),
            image: item.product.image.clone(),
            quantity: item.quantity,
            unit_price: item.product.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().map(CartLineView::from).collect(),
            total: cart.total_price().display(),
            item_count: cart.total_items(),
        }
    }
}

/// Most units a single add can put in the cart.
pub const MAX_ADD_QUANTITY: u32 = 99;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Text so an empty picker falls back to one unit.
    pub quantity: Option<String>,
    /// Present when the visitor clicked "buy now".
    pub buy_now: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

async fn store_cart(session: &Session, cart: &Cart) -> Result<()> {
    save_cart(session, cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to save cart: {e}")))
}

/// Fragment or redirect after a change made from the cart page.
fn cart_page_response(headers: &HeaderMap, cart: &Cart) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(cart))]
pub async fn show(SessionCart(cart): SessionCart) -> impl IntoResponse {
    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Cart count badge (htmx).
#[instrument(skip(cart))]
pub async fn count(SessionCart(cart): SessionCart) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.total_items(),
    }
}

/// Quantity picked for an add: blank means one, numbers are clamped to
/// `1..=MAX_ADD_QUANTITY`, anything else is rejected.
fn add_quantity(raw: Option<&str>) -> Result<u32> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(1);
    }
    let quantity = raw
        .parse::<u64>()
        .map_err(|_| AppError::BadRequest("invalid quantity".to_string()))?;
    let quantity = u32::try_from(quantity).unwrap_or(MAX_ADD_QUANTITY);
    Ok(quantity.clamp(1, MAX_ADD_QUANTITY))
}

/// Add a product to the cart.
///
/// The product is looked up in the catalogue and snapshotted onto the line.
/// "Buy now" sends the visitor straight to the cart page.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = add_quantity(form.quantity.as_deref())?;
    let id = ProductId::new(form.product_id.trim());
    let product = state
        .catalog()
        .find(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut cart = load_cart(&session).await;
    cart.add_quantity(CartProduct::from(&product), quantity);
    store_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", id.as_str())]),
    );
    tracing::info!(product_id = %id, quantity, "Added to cart");

    let htmx = is_htmx(&headers);
    let response = match (form.buy_now.is_some(), htmx) {
        (true, true) => AppendHeaders([("HX-Redirect", "/cart")]).into_response(),
        (true, false) | (false, false) => Redirect::to("/cart").into_response(),
        (false, true) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.total_items(),
            },
        )
            .into_response(),
    };
    Ok(response)
}

/// Set the quantity of a cart line. Zero removes the line.
#[instrument(skip(session, headers))]
pub async fn update(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let quantity = form
        .quantity
        .trim()
        .parse::<u32>()
        .map_err(|_| AppError::BadRequest("invalid quantity".to_string()))?;

    let mut cart = load_cart(&session).await;
    cart.update_quantity(&ProductId::new(form.product_id.trim()), quantity);
    store_cart(&session, &cart).await?;

    Ok(cart_page_response(&headers, &cart))
}

/// Remove a cart line.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    if cart.remove(&ProductId::new(form.product_id.trim())).is_some() {
        store_cart(&session, &cart).await?;
    }

    Ok(cart_page_response(&headers, &cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quantity_defaults_and_clamps() {
        assert_eq!(add_quantity(None).unwrap(), 1);
        assert_eq!(add_quantity(Some(" ")).unwrap(), 1);
        assert_eq!(add_quantity(Some("3")).unwrap(), 3);
        assert_eq!(add_quantity(Some("0")).unwrap(), 1);
        assert_eq!(add_quantity(Some("150")).unwrap(), MAX_ADD_QUANTITY);
        assert_eq!(add_quantity(Some("4000000000")).unwrap(), MAX_ADD_QUANTITY);
        assert_eq!(add_quantity(Some("99999999999999")).unwrap(), MAX_ADD_QUANTITY);
    }

    #[test]
    fn test_add_quantity_rejects_text() {
        assert!(matches!(
            add_quantity(Some("beaucoup")),
            Err(AppError::BadRequest(_))
        ));
        assert!(add_quantity(Some("-2")).is_err());
    }
}
