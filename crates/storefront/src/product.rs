// ABOUTME: Typed Product view over a Record produced by the amazon-product schema.
// ABOUTME: Serializes camelCase so it matches the generic record's JSON shape.

use serde::{Deserialize, Serialize};

use crate::record::{Attribute, Record};

/// A product listing as extracted from a detail page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    pub price: Option<f64>,
    pub list_price: Option<f64>,
    pub review_rating: Option<f64>,
    pub review_count: Option<f64>,
    pub image_urls: Vec<String>,
    pub attributes: Vec<Attribute>,
}

impl Product {
    /// Maps the record's fields by name; missing or mistyped fields fall back to defaults.
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record.text("title").unwrap_or_default().to_string(),
            price: record.number("price"),
            list_price: record.number("listPrice"),
            review_rating: record.number("reviewRating"),
            review_count: record.number("reviewCount"),
            image_urls: record.list("imageUrls").unwrap_or_default().to_vec(),
            attributes: record.table("attributes").unwrap_or_default().to_vec(),
        }
    }

    /// Returns true if the listing shows a discount against its list price.
    pub fn is_discounted(&self) -> bool {
        matches!((self.price, self.list_price), (Some(p), Some(l)) if p < l)
    }

    /// Value of the first attribute with the given label.
    pub fn attribute(&self, label: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.label == label)
            .map(|a| a.value.as_str())
    }
}

impl From<&Record> for Product {
    fn from(record: &Record) -> Self {
        Product::from_record(record)
    }
}
