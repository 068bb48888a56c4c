//! Application state shared across handlers.

use std::sync::Arc;

use zym_power_core::DeliveryZones;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::firebase::{FirebaseAuthClient, FirestoreClient};
use crate::services::auth::IdentityProvider;
use crate::services::order_form::{GoogleFormClient, OrderSink};
use crate::store::ProductStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalogue, the external services, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    identity: Arc<dyn IdentityProvider>,
    orders: Arc<dyn OrderSink>,
    zones: DeliveryZones,
}

impl AppState {
    /// Create the application state with the Firebase and order form clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, zones: DeliveryZones) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("zym-power-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let store = Arc::new(FirestoreClient::new(client.clone(), &config.firebase));
        let identity = Arc::new(FirebaseAuthClient::new(client.clone(), &config.firebase));
        let orders = Arc::new(GoogleFormClient::new(client, config.order_form_url.clone()));

        Ok(Self::from_parts(config, store, identity, orders, zones))
    }

    /// Assemble state from explicit service implementations.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        store: Arc<dyn ProductStore>,
        identity: Arc<dyn IdentityProvider>,
        orders: Arc<dyn OrderSink>,
        zones: DeliveryZones,
    ) -> Self {
        let catalog = Catalog::new(store, config.cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                identity,
                orders,
                zones,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cached product catalogue.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get a reference to the order destination.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderSink {
        self.inner.orders.as_ref()
    }

    /// Get a reference to the delivery zone table.
    #[must_use]
    pub fn zones(&self) -> &DeliveryZones {
        &self.inner.zones
    }
}
