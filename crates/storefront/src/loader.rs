// ABOUTME: Loader for built-in extraction schemas embedded as JSON at compile time.
// ABOUTME: Provides load_builtin_schema() and the list of shipped schema names.

//! Built-in schema loader.
//!
//! Each built-in lives in `data/<name>.json` and is embedded into the binary;
//! loading parses and validates it like any user-supplied schema.

use crate::error::ExtractError;
use crate::schema::ExtractionSchema;

/// The schema used when the caller does not pick one.
pub const DEFAULT_SCHEMA: &str = "amazon-product";

const BUILTIN_SCHEMAS: &[(&str, &str)] = &[(
    "amazon-product",
    include_str!("../data/amazon-product.json"),
)];

/// Names of all built-in schemas.
pub fn builtin_schema_names() -> Vec<&'static str> {
    BUILTIN_SCHEMAS.iter().map(|(name, _)| *name).collect()
}

/// Loads and validates a built-in schema by name.
pub fn load_builtin_schema(name: &str) -> Result<ExtractionSchema, ExtractError> {
    let (_, json) = BUILTIN_SCHEMAS
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| {
            ExtractError::schema(
                "load builtin",
                Some(anyhow::anyhow!(
                    "unknown schema `{}` (available: {})",
                    name,
                    builtin_schema_names().join(", ")
                )),
            )
        })?;
    ExtractionSchema::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cardinality, FieldRule};
    use pretty_assertions::assert_eq;

    #[test]
    fn load_amazon_product_succeeds() {
        let schema = load_builtin_schema("amazon-product").unwrap();
        assert_eq!(schema.name, "amazon-product");
        assert_eq!(
            schema.block_marker.as_deref(),
            Some("form[action=\"/errors/validateCaptcha\"]")
        );
    }

    #[test]
    fn amazon_product_field_shape() {
        let schema = load_builtin_schema("amazon-product").unwrap();
        let shape: Vec<(&str, Cardinality)> = schema
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.rule.cardinality()))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("title", Cardinality::Single),
                ("price", Cardinality::Single),
                ("listPrice", Cardinality::Single),
                ("reviewRating", Cardinality::Single),
                ("reviewCount", Cardinality::Single),
                ("imageUrls", Cardinality::List),
                ("attributes", Cardinality::Rows),
            ]
        );
        assert!(matches!(schema.get("price"), Some(FieldRule::Number { .. })));
        assert!(matches!(schema.get("title"), Some(FieldRule::Text { .. })));
    }

    #[test]
    fn every_builtin_loads() {
        for name in builtin_schema_names() {
            assert!(load_builtin_schema(name).is_ok(), "{} failed to load", name);
        }
    }

    #[test]
    fn unknown_builtin_lists_available() {
        let err = load_builtin_schema("nope").unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("amazon-product"));
    }
}
