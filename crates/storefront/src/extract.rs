// ABOUTME: Field extraction: applies an ExtractionSchema to a parsed document and builds a Record.
// ABOUTME: Block/challenge pages are detected first and surface as a retryable Blocked error.

//! The field extractor.
//!
//! [`extract`] is a pure function of a parsed document and a schema. The
//! [`Extractor`] wraps a validated schema with its [`Options`] and adds the
//! entry points callers use in practice: raw HTML in, record out, plus the
//! retry loop in [`crate::retry`].

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::compiled::{get_or_compile, precompile_selectors};
use crate::error::ExtractError;
use crate::numeric::parse_number;
use crate::options::{ExtractorBuilder, Options};
use crate::record::{FieldValue, Record};
use crate::schema::{ExtractionSchema, FieldRule};
use crate::select::{all_values, element_value, exists, first_value, rows, select_first};

/// Returns true when the document carries the schema's block marker.
pub fn is_blocked(document: &Html, schema: &ExtractionSchema) -> bool {
    schema
        .block_marker
        .as_deref()
        .is_some_and(|marker| exists(document, marker))
}

/// Extracts one record from a parsed document.
///
/// Fails with a Blocked error before any field is read, or with a Schema
/// error when the block marker is not a valid selector. Missing elements
/// degrade to empty values.
pub fn extract(document: &Html, schema: &ExtractionSchema) -> Result<Record, ExtractError> {
    extract_with_base(document, schema, None)
}

/// Like [`extract`], but records `base` as the record URL and resolves
/// `absolute` list values against it.
pub fn extract_with_base(
    document: &Html,
    schema: &ExtractionSchema,
    base: Option<&Url>,
) -> Result<Record, ExtractError> {
    let url = base.map(Url::to_string);
    if let Some(marker) = schema.block_marker.as_deref() {
        if get_or_compile(marker).is_none() {
            return Err(ExtractError::schema(
                "extract",
                Some(anyhow::anyhow!("invalid block marker `{}`", marker)),
            ));
        }
    }
    if is_blocked(document, schema) {
        return Err(ExtractError::blocked(url.unwrap_or_default(), "extract"));
    }

    let fields = schema
        .fields
        .iter()
        .map(|field| (field.name.clone(), extract_field(document, &field.rule, base)))
        .collect();
    let record = Record::new(url, fields);

    debug!(schema = %schema.name, fields = record.len(), "extracted record");
    Ok(record)
}

fn extract_field(doc: &Html, rule: &FieldRule, base: Option<&Url>) -> FieldValue {
    match rule {
        FieldRule::Text { selector, attr } => {
            FieldValue::Text(first_value(doc, selector, attr.as_deref()))
        }
        FieldRule::Number {
            selector,
            attr,
            decimal,
        } => {
            let raw = select_first(doc, selector).and_then(|el| element_value(el, attr.as_deref()));
            FieldValue::Number(raw.and_then(|text| parse_number(&text, *decimal)))
        }
        FieldRule::List {
            selector,
            attr,
            absolute,
        } => {
            let values = all_values(doc, selector, attr.as_deref());
            match base {
                Some(base) if *absolute => FieldValue::List(
                    values
                        .into_iter()
                        .map(|v| base.join(&v).map(|u| u.to_string()).unwrap_or(v))
                        .collect(),
                ),
                _ => FieldValue::List(values),
            }
        }
        FieldRule::Table {
            selector,
            label,
            value,
        } => FieldValue::Table(rows(doc, selector, label, value)),
    }
}

/// A validated schema plus options; cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    schema: ExtractionSchema,
    opts: Options,
}

impl Extractor {
    /// Create a new ExtractorBuilder.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Validates the schema and warms the selector cache with its selectors.
    pub fn new(schema: ExtractionSchema, opts: Options) -> Result<Self, ExtractError> {
        schema.validate()?;
        precompile_selectors(schema_selectors(&schema));
        Ok(Self { schema, opts })
    }

    pub fn schema(&self) -> &ExtractionSchema {
        &self.schema
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn is_blocked(&self, document: &Html) -> bool {
        is_blocked(document, &self.schema)
    }

    /// Extracts from an already parsed document.
    pub fn extract_document(
        &self,
        document: &Html,
        url: Option<&str>,
    ) -> Result<Record, ExtractError> {
        let base = url
            .map(|u| {
                Url::parse(u)
                    .map_err(|e| ExtractError::invalid_url(u, "extract", Some(e.into())))
            })
            .transpose()?;
        extract_with_base(document, &self.schema, base.as_ref())
    }

    /// Parses raw HTML and extracts from it.
    pub fn extract_html(&self, html: &str, url: Option<&str>) -> Result<Record, ExtractError> {
        let document = Html::parse_document(html);
        self.extract_document(&document, url)
    }
}

fn schema_selectors(schema: &ExtractionSchema) -> Vec<&str> {
    schema
        .block_marker
        .as_deref()
        .into_iter()
        .chain(schema.fields.iter().flat_map(|f| f.rule.all_selectors()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Attribute;
    use crate::schema::{DecimalMark, SelectorSpec};
    use pretty_assertions::assert_eq;

    const PRODUCT_HTML: &str = r#"
        <html><body>
            <h1 id="title"> Test Product </h1>
            <span class="price">$10.00</span>
            <span class="rating" title="4.3 out of 5 stars">4.3</span>
            <span class="reviews">1,234 ratings</span>
            <div class="gallery">
                <img src="a.jpg">
                <img src="b.jpg">
            </div>
            <table class="specs">
                <tr><td class="k">Brand</td><td class="v">Acme</td></tr>
            </table>
        </body></html>
    "#;

    const CAPTCHA_HTML: &str = r#"
        <html><body>
            <h1 id="title">Test Product</h1>
            <form method="get" action="/errors/validateCaptcha"><input name="field-keywords"></form>
        </body></html>
    "#;

    fn schema() -> ExtractionSchema {
        ExtractionSchema::new("test")
            .block_marker("form[action='/errors/validateCaptcha']")
            .field("title", FieldRule::text("#title"))
            .field("price", FieldRule::number(".price"))
            .field(
                "reviewRating",
                FieldRule::Number {
                    selector: ".rating".into(),
                    attr: Some("title".to_string()),
                    decimal: DecimalMark::Dot,
                },
            )
            .field("reviewCount", FieldRule::number(".reviews"))
            .field("imageUrls", FieldRule::list_attr(".gallery img", "src"))
            .field("attributes", FieldRule::table(".specs tr", ".k", ".v"))
    }

    #[test]
    fn test_extract_synthetic_product() {
        let doc = Html::parse_document(PRODUCT_HTML);
        let record = extract(&doc, &schema()).unwrap();

        assert_eq!(record.text("title"), Some("Test Product"));
        assert_eq!(record.number("price"), Some(10.0));
        assert_eq!(record.number("reviewRating"), Some(4.3));
        assert_eq!(record.number("reviewCount"), Some(1234.0));
        assert_eq!(
            record.list("imageUrls"),
            Some(&["a.jpg".to_string(), "b.jpg".to_string()][..])
        );
        assert_eq!(
            record.table("attributes"),
            Some(
                &[Attribute {
                    label: "Brand".to_string(),
                    value: "Acme".to_string(),
                }][..]
            )
        );
        assert_eq!(record.url, None);
    }

    #[test]
    fn test_blocked_document_yields_no_record() {
        let doc = Html::parse_document(CAPTCHA_HTML);
        let err = extract(&doc, &schema()).unwrap_err();
        assert!(err.is_blocked());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_schema_without_marker_never_blocks() {
        let doc = Html::parse_document(CAPTCHA_HTML);
        let mut schema = schema();
        schema.block_marker = None;
        let record = extract(&doc, &schema).unwrap();
        assert_eq!(record.text("title"), Some("Test Product"));
    }

    #[test]
    fn test_missing_fields_degrade() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        let record = extract(&doc, &schema()).unwrap();
        assert_eq!(record.text("title"), Some(""));
        assert_eq!(record.get("price"), Some(&FieldValue::Number(None)));
        assert_eq!(record.list("imageUrls"), Some(&[][..]));
        assert_eq!(record.table("attributes"), Some(&[][..]));
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = Html::parse_document(PRODUCT_HTML);
        let schema = schema();
        let first = extract(&doc, &schema).unwrap();
        let second = extract(&doc, &schema).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_absolute_list_values_resolve_against_url() {
        let schema = ExtractionSchema::new("abs").field(
            "imageUrls",
            FieldRule::List {
                selector: SelectorSpec::Css(".gallery img".to_string()),
                attr: Some("src".to_string()),
                absolute: true,
            },
        );
        let extractor = Extractor::new(schema, Options::default()).unwrap();
        let record = extractor
            .extract_html(PRODUCT_HTML, Some("https://shop.example/dp/B0TEST/"))
            .unwrap();
        assert_eq!(
            record.list("imageUrls"),
            Some(
                &[
                    "https://shop.example/dp/B0TEST/a.jpg".to_string(),
                    "https://shop.example/dp/B0TEST/b.jpg".to_string(),
                ][..]
            )
        );
        assert_eq!(record.url.as_deref(), Some("https://shop.example/dp/B0TEST/"));
    }

    #[test]
    fn test_absolute_without_url_keeps_values() {
        let schema = ExtractionSchema::new("abs").field(
            "imageUrls",
            FieldRule::List {
                selector: ".gallery img".into(),
                attr: Some("src".to_string()),
                absolute: true,
            },
        );
        let doc = Html::parse_document(PRODUCT_HTML);
        let record = extract(&doc, &schema).unwrap();
        assert_eq!(record.list("imageUrls").map(<[String]>::len), Some(2));
        assert_eq!(record.list("imageUrls").unwrap()[0], "a.jpg");
    }

    #[test]
    fn test_extract_html_rejects_bad_url() {
        let extractor = Extractor::new(schema(), Options::default()).unwrap();
        let err = extractor.extract_html(PRODUCT_HTML, Some("not a url")).unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn test_blocked_error_carries_url() {
        let extractor = Extractor::new(schema(), Options::default()).unwrap();
        let err = extractor
            .extract_html(CAPTCHA_HTML, Some("https://shop.example/dp/1"))
            .unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(err.url, "https://shop.example/dp/1");
        assert!(extractor.is_blocked(&Html::parse_document(CAPTCHA_HTML)));
    }

    #[test]
    fn test_schema_selectors_include_rows_and_marker() {
        let schema = schema();
        let selectors = schema_selectors(&schema);
        assert_eq!(selectors[0], "form[action='/errors/validateCaptcha']");
        assert!(selectors.contains(&".k"));
        assert!(selectors.contains(&".v"));
    }

    #[test]
    fn test_malformed_block_marker_is_a_schema_error() {
        let schema = ExtractionSchema::new("unquoted")
            .block_marker("form[action=/errors/validateCaptcha]")
            .field("title", FieldRule::text("#title"));
        let doc = Html::parse_document(CAPTCHA_HTML);
        let err = extract(&doc, &schema).unwrap_err();
        assert!(err.is_schema());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_extractor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Extractor>();
    }
}
