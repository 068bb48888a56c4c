//! Firestore REST document encoding.
//!
//! Firestore wraps every field in a single-key object naming its type,
//! e.g. `{"integerValue": "4500"}`. This module maps product documents to
//! and from [`Product`] and [`ProductDraft`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use zym_power_core::{Price, Product, ProductDraft, ProductId};

/// A typed Firestore field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(serde_json::Value),
    BooleanValue(bool),
    /// 64-bit integers travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Value {
    fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric value; strings holding a number are accepted too.
    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::IntegerValue(s) | Self::StringValue(s) => s.trim().parse().ok(),
            Self::DoubleValue(f) => Decimal::from_f64(*f),
            _ => None,
        }
    }
}

/// A Firestore document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name; the last path segment is the document id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Document {
    /// The document id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    fn flag(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn decimal(&self, key: &str) -> Option<Decimal> {
        self.fields.get(key).and_then(Value::as_decimal)
    }
}

/// Field names written for every product.
pub const PRODUCT_FIELDS: [&str; 10] = [
    "name",
    "slug",
    "categorySlug",
    "priceDa",
    "brand",
    "imageUrl",
    "discount",
    "onSale",
    "isNew",
    "isPack",
];

/// Older documents carry this misspelt category key.
const LEGACY_CATEGORY_FIELD: &str = "categorySLug";

/// Decode a product document.
///
/// Missing or mistyped fields fall back to empty values rather than failing,
/// so one malformed document cannot hide the rest of the catalogue.
#[must_use]
pub fn decode_product(doc: &Document) -> Product {
    let category_slug = doc
        .string("categorySlug")
        .or_else(|| doc.string(LEGACY_CATEGORY_FIELD))
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let price = doc.decimal("priceDa").and_then(|amount| {
        Price::new(amount)
            .map_err(|e| tracing::warn!(id = doc.id(), error = %e, "Ignoring invalid price"))
            .ok()
    });

    let discount = doc
        .decimal("discount")
        .and_then(|d| d.round().to_u8())
        .filter(|d| *d <= 100);

    let image_url = doc
        .string("imageUrl")
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Product {
        id: ProductId::new(doc.id()),
        name: doc.string("name").unwrap_or_default().to_string(),
        slug: doc.string("slug").unwrap_or_default().to_string(),
        category_slug,
        price,
        brand: doc.string("brand").unwrap_or_default().to_string(),
        image_url,
        discount,
        on_sale: doc.flag("onSale"),
        is_new: doc.flag("isNew"),
        is_pack: doc.flag("isPack"),
    }
}

/// Encode a draft as document fields.
#[must_use]
pub fn encode_draft(draft: &ProductDraft) -> Document {
    let string = |s: &str| Value::StringValue(s.to_string());
    let fields = HashMap::from([
        ("name".to_string(), string(&draft.name)),
        ("slug".to_string(), string(&draft.slug)),
        ("categorySlug".to_string(), string(&draft.category_slug)),
        ("priceDa".to_string(), number(draft.price.amount())),
        ("brand".to_string(), string(&draft.brand)),
        ("imageUrl".to_string(), string(&draft.image_url)),
        (
            "discount".to_string(),
            Value::IntegerValue(draft.discount.to_string()),
        ),
        ("onSale".to_string(), Value::BooleanValue(draft.on_sale)),
        ("isNew".to_string(), Value::BooleanValue(draft.is_new)),
        ("isPack".to_string(), Value::BooleanValue(draft.is_pack)),
    ]);
    Document {
        name: String::new(),
        fields,
    }
}

/// Whole amounts are stored as integers, anything else as a double.
fn number(amount: Decimal) -> Value {
    if amount.fract().is_zero() {
        Value::IntegerValue(amount.trunc().to_string())
    } else {
        Value::DoubleValue(amount.to_f64().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn document(json: serde_json::Value) -> Document {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_decode_full_document() {
        let doc = document(serde_json::json!({
            "name": "projects/zym/databases/(default)/documents/products/abc123",
            "fields": {
                "name": {"stringValue": "Whey Isolate"},
                "slug": {"stringValue": "whey-isolate"},
                "categorySlug": {"stringValue": " Proteines "},
                "priceDa": {"integerValue": "12500"},
                "brand": {"stringValue": "Biotech"},
                "imageUrl": {"stringValue": "https://cdn.example/whey.jpg"},
                "discount": {"integerValue": "20"},
                "onSale": {"booleanValue": true},
                "isNew": {"booleanValue": false}
            },
            "createTime": "2024-01-01T00:00:00Z"
        }));

        let product = decode_product(&doc);
        assert_eq!(product.id.as_str(), "abc123");
        assert_eq!(product.name, "Whey Isolate");
        assert_eq!(product.category_slug, "proteines");
        assert_eq!(product.price, Some(Price::from_dinars(12500)));
        assert_eq!(product.discount, Some(20));
        assert!(product.on_sale);
        assert!(!product.is_new);
        assert!(!product.is_pack);
    }

    #[test]
    fn test_decode_legacy_category_and_loose_numbers() {
        let doc = document(serde_json::json!({
            "name": "projects/zym/databases/(default)/documents/products/old",
            "fields": {
                "name": {"stringValue": "Gainer"},
                "categorySLug": {"stringValue": "MASS-GAINERS"},
                "priceDa": {"stringValue": "4999.5"},
                "imageUrl": {"stringValue": "   "}
            }
        }));

        let product = decode_product(&doc);
        assert_eq!(product.category_slug, "mass-gainers");
        assert_eq!(
            product.price.unwrap().amount(),
            Decimal::from_str("4999.5").unwrap()
        );
        assert_eq!(product.image_url, None);
        assert_eq!(product.discount, None);
    }

    #[test]
    fn test_decode_missing_price() {
        let doc = document(serde_json::json!({
            "name": "products/x",
            "fields": {"priceDa": {"nullValue": null}}
        }));
        assert_eq!(decode_product(&doc).price, None);
    }

    #[test]
    fn test_encode_draft() {
        let draft = ProductDraft {
            name: "Creatine".to_string(),
            slug: "creatine".to_string(),
            category_slug: "creatines".to_string(),
            price: Price::from_dinars(3500),
            discount: 10,
            on_sale: true,
            ..ProductDraft::default()
        };

        let doc = encode_draft(&draft);
        assert_eq!(doc.fields.len(), PRODUCT_FIELDS.len());
        assert_eq!(
            doc.fields["priceDa"],
            Value::IntegerValue("3500".to_string())
        );
        assert_eq!(doc.fields["onSale"], Value::BooleanValue(true));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["fields"]["discount"]["integerValue"], "10");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_fractional_price_is_double() {
        let amount = Decimal::from_str("12.5").unwrap();
        assert_eq!(number(amount), Value::DoubleValue(12.5));
    }
}
