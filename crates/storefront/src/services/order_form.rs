//! Order submission to a hosted form.
//!
//! Checkout has no order database: each order is posted as a
//! URL-encoded form submission whose field names are the form's entry ids.

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;
use url::Url;
use zym_power_core::{OrderSummary, ValidatedOrder};

/// Form entry ids.
pub mod entries {
    pub const CART_SUMMARY: &str = "entry.1758731177";
    pub const LAST_NAME: &str = "entry.1773261467";
    pub const FIRST_NAME: &str = "entry.2110847750";
    pub const PHONE: &str = "entry.100431033";
    pub const WILAYA: &str = "entry.1775619348";
    pub const ADDRESS: &str = "entry.400694937";
    pub const COMMUNE: &str = "entry.1470719156";
    pub const DELIVERY: &str = "entry.37834111";
    pub const TOTAL: &str = "entry.1217057388";
}

/// Errors that can occur when submitting an order.
#[derive(Debug, Error)]
pub enum OrderFormError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The form endpoint answered with a non-success status.
    #[error("form rejected submission with status {0}")]
    Rejected(u16),
}

/// One order, flattened into form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmission {
    pub fields: Vec<(&'static str, String)>,
}

impl OrderSubmission {
    /// Build the submission for a validated order and its cart summary.
    #[must_use]
    pub fn new(order: &ValidatedOrder, summary: &OrderSummary) -> Self {
        let fields = vec![
            (entries::CART_SUMMARY, summary.cart_summary.clone()),
            (entries::LAST_NAME, order.last_name.clone()),
            (entries::FIRST_NAME, order.first_name.clone()),
            (entries::PHONE, order.phone.clone()),
            (entries::WILAYA, order.wilaya_name.clone()),
            (entries::ADDRESS, order.address.clone()),
            (entries::COMMUNE, order.commune.clone()),
            (entries::DELIVERY, order.delivery.label().to_string()),
            (entries::TOTAL, summary.total.display()),
        ];
        Self { fields }
    }

    /// Value of a field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Destination for checkout orders.
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn submit(&self, submission: &OrderSubmission) -> Result<(), OrderFormError>;
}

/// Posts orders to a Google Form `formResponse` endpoint.
#[derive(Clone)]
pub struct GoogleFormClient {
    client: reqwest::Client,
    url: Url,
}

impl GoogleFormClient {
    #[must_use]
    pub const fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl OrderSink for GoogleFormClient {
    #[instrument(skip(self, submission))]
    async fn submit(&self, submission: &OrderSubmission) -> Result<(), OrderFormError> {
        let response = self
            .client
            .post(self.url.clone())
            .form(&submission.fields)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Order form rejected submission");
            return Err(OrderFormError::Rejected(status.as_u16()));
        }

        tracing::info!("Order submitted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use zym_power_core::{Cart, CartProduct, DeliveryType, Price, ProductId};

    use super::*;

    fn order() -> ValidatedOrder {
        ValidatedOrder {
            last_name: "Benali".to_string(),
            first_name: "Yacine".to_string(),
            phone: "0555123456".to_string(),
            address: "12 rue Didouche".to_string(),
            wilaya_name: "Alger".to_string(),
            commune: "Bab Ezzouar".to_string(),
            delivery: DeliveryType::StopDesk,
            shipping: Price::from_dinars(400),
        }
    }

    #[test]
    fn test_fields_carry_order_and_totals() {
        let mut cart = Cart::new();
        cart.add_quantity(
            CartProduct {
                id: ProductId::new("whey"),
                name: "Whey".to_string(),
                brand: "ON".to_string(),
                price: Price::from_dinars(12000),
                image: String::new(),
                category: "proteines".to_string(),
            },
            2,
        );
        let summary = OrderSummary::new(&cart, Price::from_dinars(400));
        let submission = OrderSubmission::new(&order(), &summary);

        assert_eq!(submission.fields.len(), 9);
        assert_eq!(submission.field(entries::LAST_NAME), Some("Benali"));
        assert_eq!(submission.field(entries::FIRST_NAME), Some("Yacine"));
        assert_eq!(submission.field(entries::WILAYA), Some("Alger"));
        assert_eq!(submission.field(entries::DELIVERY), Some("agence"));
        assert_eq!(submission.field(entries::TOTAL), Some("24\u{202f}400 DA"));
        assert!(
            submission
                .field(entries::CART_SUMMARY)
                .unwrap()
                .starts_with("Whey x2 - ")
        );
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = OrderSummary::new(&Cart::new(), Price::ZERO);
        let submission = OrderSubmission::new(&order(), &summary);
        assert_eq!(submission.field(entries::CART_SUMMARY), Some("Panier vide"));
        assert_eq!(submission.field(entries::TOTAL), Some("0 DA"));
    }
}
