// ABOUTME: Main library entry point for the storefront listing-page field extractor.
// ABOUTME: Re-exports the public API: Extractor, ExtractionSchema, FieldRule, Record, ExtractError.

//! Storefront - schema-driven field extraction for product listing pages.
//!
//! A declarative [`ExtractionSchema`] maps field names to selector rules; the
//! extractor applies it to a parsed HTML document and returns a [`Record`], or
//! a retryable Blocked error when the page is a challenge page. Fetching is
//! left to the caller.
//!
//! # Example
//!
//! ```
//! use storefront::{ExtractError, Extractor, ExtractionSchema, FieldRule};
//!
//! fn main() -> Result<(), ExtractError> {
//!     let schema = ExtractionSchema::new("demo")
//!         .block_marker("form.captcha")
//!         .field("title", FieldRule::text("h1"))
//!         .field("price", FieldRule::number(".price"));
//!     let extractor = Extractor::builder().schema(schema).build()?;
//!
//!     let record = extractor.extract_html(
//!         r#"<h1>Desk Lamp</h1><span class="price">$1,799.99</span>"#,
//!         None,
//!     )?;
//!     assert_eq!(record.text("title"), Some("Desk Lamp"));
//!     assert_eq!(record.number("price"), Some(1799.99));
//!     Ok(())
//! }
//! ```

pub mod compiled;
pub mod error;
pub mod extract;
pub mod loader;
pub mod numeric;
pub mod options;
pub mod product;
pub mod record;
pub mod retry;
pub mod schema;
pub mod select;

pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extract::{extract, extract_with_base, is_blocked, Extractor};
pub use crate::loader::{builtin_schema_names, load_builtin_schema};
pub use crate::numeric::parse_number;
pub use crate::options::{ExtractorBuilder, Options, RetryPolicy};
pub use crate::product::Product;
pub use crate::record::{Attribute, FieldValue, Record};
pub use crate::schema::{Cardinality, DecimalMark, ExtractionSchema, Field, FieldRule, SelectorSpec};
