//! Zym Power Core - Domain types for the storefront.
//!
//! This crate holds the parts of the storefront that carry rules of their own:
//! - [`cart`] - The shopping cart state container and its totals
//! - [`checkout`] - Delivery zones, order validation and order summaries
//! - [`product`] - The product record and the admin form normalisation
//! - [`category`] - The fixed category table
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session handling. The storefront crate owns all of that.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod category;
pub mod checkout;
pub mod product;
pub mod types;

pub use cart::{Cart, CartItem, CartProduct};
pub use category::Category;
pub use checkout::{
    CheckoutError, CustomerDetails, DeliveryType, DeliveryZones, OrderSummary, ValidatedOrder,
    Wilaya,
};
pub use product::{Product, ProductDraft, ProductForm, ProductFormError};
pub use types::*;
