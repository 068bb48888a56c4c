//! Session models for storefront.

pub mod session;

pub use session::AdminSession;
pub use session::keys as session_keys;
