//! Checkout: delivery zones, order validation and the order summary.
//!
//! Orders are not stored here. A validated order is summarised into plain
//! strings and handed to an external form endpoint by the storefront.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::Price;

/// Summary text sent for an empty cart.
pub const EMPTY_CART_SUMMARY: &str = "Panier vide";

/// How the parcel reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryType {
    /// Delivered to the customer's address.
    #[default]
    Home,
    /// Picked up at the carrier's agency.
    StopDesk,
}

impl DeliveryType {
    /// Parse the form code: `2` is stop desk, anything else is home delivery.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "2" => Self::StopDesk,
            _ => Self::Home,
        }
    }

    /// Form code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Home => 1,
            Self::StopDesk => 2,
        }
    }

    /// Label sent with the order.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "domicile",
            Self::StopDesk => "agence",
        }
    }
}

/// A delivery zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wilaya {
    pub code: u8,
    pub name: String,
    pub home_fee: Price,
    pub desk_fee: Price,
    #[serde(default)]
    pub communes: Vec<String>,
}

impl Wilaya {
    /// Fee for a delivery type.
    #[must_use]
    pub const fn fee(&self, delivery: DeliveryType) -> Price {
        match delivery {
            DeliveryType::Home => self.home_fee,
            DeliveryType::StopDesk => self.desk_fee,
        }
    }

    /// Whether the commune can be chosen for this wilaya.
    ///
    /// A wilaya without a commune list accepts any commune.
    #[must_use]
    pub fn accepts_commune(&self, commune: &str) -> bool {
        self.communes.is_empty() || self.communes.iter().any(|c| c == commune)
    }
}

/// The delivery-zone table, ordered by wilaya code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryZones {
    wilayas: BTreeMap<u8, Wilaya>,
}

impl DeliveryZones {
    /// Build the table. A later entry with the same code replaces an earlier one.
    #[must_use]
    pub fn new(wilayas: impl IntoIterator<Item = Wilaya>) -> Self {
        Self {
            wilayas: wilayas.into_iter().map(|w| (w.code, w)).collect(),
        }
    }

    /// Wilayas in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Wilaya> {
        self.wilayas.values()
    }

    #[must_use]
    pub fn get(&self, code: u8) -> Option<&Wilaya> {
        self.wilayas.get(&code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wilayas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wilayas.is_empty()
    }

    /// Shipping fee; zero when no wilaya or an unknown one is selected.
    #[must_use]
    pub fn shipping_fee(&self, code: Option<u8>, delivery: DeliveryType) -> Price {
        code.and_then(|c| self.get(c))
            .map_or(Price::ZERO, |w| w.fee(delivery))
    }

    /// Communes of a wilaya; empty when unknown.
    #[must_use]
    pub fn communes(&self, code: u8) -> &[String] {
        self.get(code).map_or(&[][..], |w| w.communes.as_slice())
    }

    /// Display name of a wilaya, falling back to its code.
    #[must_use]
    pub fn name_of(&self, code: u8) -> String {
        self.get(code)
            .map_or_else(|| code.to_string(), |w| w.name.clone())
    }
}

/// Errors raised by checkout validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// One or more required fields are blank.
    #[error("يرجى ملء جميع الحقول المطلوبة.")]
    MissingFields(Vec<&'static str>),
    /// The wilaya code is not in the delivery table.
    #[error("الولاية المختارة غير متوفرة.")]
    UnknownWilaya(String),
    /// The commune does not belong to the selected wilaya.
    #[error("البلدية المختارة غير موجودة في هذه الولاية.")]
    UnknownCommune(String),
}

/// Customer details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub wilaya: String,
    #[serde(default)]
    pub commune: String,
    #[serde(default)]
    pub delivery_type: String,
}

impl CustomerDetails {
    /// Parsed wilaya code, if any.
    #[must_use]
    pub fn wilaya_code(&self) -> Option<u8> {
        self.wilaya.trim().parse().ok()
    }

    #[must_use]
    pub fn delivery(&self) -> DeliveryType {
        DeliveryType::from_code(&self.delivery_type)
    }

    /// Check the form against the delivery table.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingFields`] listing every blank required
    /// field, [`CheckoutError::UnknownWilaya`] for a wilaya outside the table,
    /// and [`CheckoutError::UnknownCommune`] for a commune outside the
    /// wilaya's list.
    pub fn validate(&self, zones: &DeliveryZones) -> Result<ValidatedOrder, CheckoutError> {
        let required = [
            ("last_name", &self.last_name),
            ("first_name", &self.first_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("wilaya", &self.wilaya),
            ("commune", &self.commune),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingFields(missing));
        }

        let wilaya = self
            .wilaya_code()
            .and_then(|code| zones.get(code))
            .ok_or_else(|| CheckoutError::UnknownWilaya(self.wilaya.trim().to_string()))?;

        let commune = self.commune.trim();
        if !wilaya.accepts_commune(commune) {
            return Err(CheckoutError::UnknownCommune(commune.to_string()));
        }

        Ok(ValidatedOrder {
            last_name: self.last_name.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            wilaya_name: wilaya.name.clone(),
            commune: commune.to_string(),
            delivery: self.delivery(),
            shipping: wilaya.fee(self.delivery()),
        })
    }
}

/// Customer details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub address: String,
    pub wilaya_name: String,
    pub commune: String,
    pub delivery: DeliveryType,
    pub shipping: Price,
}

/// Amounts and cart text for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    /// One `"{name} x{qty} - {line total} DA"` entry per line, joined by `" | "`.
    pub cart_summary: String,
    /// Cart total rounded to whole dinars.
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Summarise a cart with a shipping fee.
    #[must_use]
    pub fn new(cart: &Cart, shipping: Price) -> Self {
        let cart_summary = if cart.is_empty() {
            EMPTY_CART_SUMMARY.to_string()
        } else {
            cart.items()
                .map(|item| {
                    format!(
                        "{} x{} - {}",
                        item.product.name,
                        item.quantity,
                        item.line_total().display()
                    )
                })
                .collect::<Vec<_>>()
                .join(" | ")
        };
        let subtotal = cart.total_price().rounded();
        Self {
            cart_summary,
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartProduct;
    use crate::types::ProductId;

    fn zones() -> DeliveryZones {
        DeliveryZones::new([
            Wilaya {
                code: 16,
                name: "Alger".to_string(),
                home_fee: Price::from_dinars(500),
                desk_fee: Price::from_dinars(350),
                communes: vec!["Chéraga".to_string(), "Hydra".to_string()],
            },
            Wilaya {
                code: 11,
                name: "Tamanrasset".to_string(),
                home_fee: Price::from_dinars(1500),
                desk_fee: Price::from_dinars(1000),
                communes: vec![],
            },
        ])
    }

    fn details() -> CustomerDetails {
        CustomerDetails {
            last_name: " Benali ".to_string(),
            first_name: "Karim".to_string(),
            phone: "0550 00 00 00".to_string(),
            address: "12 rue des Roses".to_string(),
            wilaya: "16".to_string(),
            commune: "Chéraga".to_string(),
            delivery_type: "1".to_string(),
        }
    }

    #[test]
    fn test_delivery_type_codes() {
        assert_eq!(DeliveryType::from_code("2"), DeliveryType::StopDesk);
        assert_eq!(DeliveryType::from_code("1"), DeliveryType::Home);
        assert_eq!(DeliveryType::from_code("7"), DeliveryType::Home);
        assert_eq!(DeliveryType::from_code(""), DeliveryType::Home);
        assert_eq!(DeliveryType::StopDesk.label(), "agence");
        assert_eq!(DeliveryType::Home.code(), 1);
    }

    #[test]
    fn test_shipping_fee() {
        let zones = zones();
        assert_eq!(
            zones.shipping_fee(Some(16), DeliveryType::Home),
            Price::from_dinars(500)
        );
        assert_eq!(
            zones.shipping_fee(Some(16), DeliveryType::StopDesk),
            Price::from_dinars(350)
        );
        assert_eq!(zones.shipping_fee(Some(99), DeliveryType::Home), Price::ZERO);
        assert_eq!(zones.shipping_fee(None, DeliveryType::Home), Price::ZERO);
    }

    #[test]
    fn test_zones_ordered_and_named() {
        let zones = zones();
        let codes: Vec<u8> = zones.iter().map(|w| w.code).collect();
        assert_eq!(codes, [11, 16]);
        assert_eq!(zones.name_of(16), "Alger");
        assert_eq!(zones.name_of(42), "42");
        assert!(zones.communes(42).is_empty());
    }

    #[test]
    fn test_validate_ok() {
        let order = details().validate(&zones()).unwrap();
        assert_eq!(order.last_name, "Benali");
        assert_eq!(order.wilaya_name, "Alger");
        assert_eq!(order.delivery, DeliveryType::Home);
        assert_eq!(order.shipping, Price::from_dinars(500));
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let form = CustomerDetails {
            first_name: "  ".to_string(),
            commune: String::new(),
            ..details()
        };
        assert_eq!(
            form.validate(&zones()),
            Err(CheckoutError::MissingFields(vec!["first_name", "commune"]))
        );
    }

    #[test]
    fn test_validate_wilaya_and_commune() {
        let unknown = CustomerDetails {
            wilaya: "99".to_string(),
            ..details()
        };
        assert!(matches!(
            unknown.validate(&zones()),
            Err(CheckoutError::UnknownWilaya(_))
        ));

        let wrong_commune = CustomerDetails {
            commune: "Oran".to_string(),
            ..details()
        };
        assert!(matches!(
            wrong_commune.validate(&zones()),
            Err(CheckoutError::UnknownCommune(_))
        ));

        let free_commune = CustomerDetails {
            wilaya: "11".to_string(),
            commune: "In Guezzam".to_string(),
            delivery_type: "2".to_string(),
            ..details()
        };
        let order = free_commune.validate(&zones()).unwrap();
        assert_eq!(order.shipping, Price::from_dinars(1000));
    }

    #[test]
    fn test_summary() {
        let mut cart = Cart::new();
        cart.add_quantity(
            CartProduct {
                id: ProductId::new("w"),
                name: "Whey".to_string(),
                brand: String::new(),
                price: Price::from_dinars(4500),
                image: String::new(),
                category: String::new(),
            },
            2,
        );
        cart.add(CartProduct {
            id: ProductId::new("c"),
            name: "Creatine".to_string(),
            brand: String::new(),
            price: Price::from_dinars(3000),
            image: String::new(),
            category: String::new(),
        });

        let summary = OrderSummary::new(&cart, Price::from_dinars(500));
        assert_eq!(
            summary.cart_summary,
            "Whey x2 - 9\u{202f}000 DA | Creatine x1 - 3\u{202f}000 DA"
        );
        assert_eq!(summary.subtotal, Price::from_dinars(12000));
        assert_eq!(summary.total, Price::from_dinars(12500));
    }

    #[test]
    fn test_summary_empty_cart() {
        let summary = OrderSummary::new(&Cart::new(), Price::ZERO);
        assert_eq!(summary.cart_summary, EMPTY_CART_SUMMARY);
        assert_eq!(summary.total, Price::ZERO);
    }
}
