//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (categories, sale and new strips)
//! GET  /health                    - Health check
//!
//! # Catalogue
//! GET  /products                  - Every product
//! GET  /category/{slug}           - Products of one category
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart (count fragment, triggers cart-updated)
//! POST /cart/update               - Update quantity (cart_items fragment)
//! POST /cart/remove               - Remove item (cart_items fragment)
//! GET  /cart/count                - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                  - Order form
//! POST /checkout                  - Submit order
//! GET  /checkout/communes         - Commune choices and totals (fragment)
//!
//! # Auth
//! GET  /login                     - Sign-in page
//! POST /login                     - Sign in (rate limited)
//! POST /logout                    - Sign out
//!
//! # Admin (requires sign-in)
//! GET  /admin/products            - Product list and create form
//! POST /admin/products            - Create product
//! GET  /admin/products/{id}/edit  - Product list and edit form
//! POST /admin/products/{id}       - Update product
//! POST /admin/products/{id}/delete - Delete product
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Whether the request was issued by htmx.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/communes", get(checkout::communes))
}

/// Create the auth routes router.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page)
                .merge(post(auth::login).layer(login_rate_limiter(trust_proxy_headers))),
        )
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::index).post(admin::create))
        .route("/products/{id}", post(admin::update))
        .route("/products/{id}/edit", get(admin::edit))
        .route("/products/{id}/delete", post(admin::delete))
}

/// Create all routes for the storefront.
///
/// `trust_proxy_headers` decides where the login rate limiter reads the
/// client IP from.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/category/{slug}", get(products::category))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/admin", admin_routes())
        .merge(auth_routes(trust_proxy_headers))
}
