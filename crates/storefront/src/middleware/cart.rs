//! Session cart extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use zym_power_core::Cart;

use crate::models::session_keys;

/// The visitor's cart, empty when the session has none.
pub struct SessionCart(pub Cart);

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cart = match parts.extensions.get::<Session>() {
            Some(session) => load_cart(session).await,
            None => Cart::new(),
        };
        Ok(Self(cart))
    }
}

/// Read the cart from the session. An unreadable cart is treated as empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            Cart::new()
        }
    }
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}
