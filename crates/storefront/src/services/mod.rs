//! Services backed by external systems.
//!
//! - `auth` - Administrator sign-in against the identity service
//! - `order_form` - Checkout order submission

pub mod auth;
pub mod order_form;
