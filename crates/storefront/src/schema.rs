// ABOUTME: Declarative extraction schema: named fields mapped to selector-driven FieldRules.
// ABOUTME: Schemas deserialize from JSON and are validated before any document is touched.

//! Extraction schema definitions.
//!
//! An [`ExtractionSchema`] is an ordered list of named fields, each carrying a
//! [`FieldRule`] that says where the raw value lives and how to interpret it,
//! plus an optional block marker selector identifying challenge pages.
//!
//! ```json
//! {
//!   "name": "example",
//!   "block_marker": "form.captcha",
//!   "fields": [
//!     { "name": "title", "kind": "text", "selector": "h1" },
//!     { "name": "images", "kind": "list", "selector": "img", "attr": "src" }
//!   ]
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::compiled::get_or_compile;
use crate::error::ExtractError;

/// One CSS selector, or an ordered list of fallbacks where the first selector
/// matching at least one element wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    Css(String),
    Fallback(Vec<String>),
}

impl SelectorSpec {
    /// Returns the selectors in the order they should be tried.
    pub fn candidates(&self) -> &[String] {
        match self {
            SelectorSpec::Css(css) => std::slice::from_ref(css),
            SelectorSpec::Fallback(list) => list,
        }
    }
}

impl Default for SelectorSpec {
    fn default() -> Self {
        SelectorSpec::Css(String::new())
    }
}

impl From<&str> for SelectorSpec {
    fn from(css: &str) -> Self {
        SelectorSpec::Css(css.to_string())
    }
}

/// Which character separates the integer and fractional parts of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalMark {
    /// `1,799.99`
    #[default]
    Dot,
    /// `1.799,99`
    Comma,
}

/// How many values a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    List,
    Rows,
}

/// Describes how to obtain one field's value from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRule {
    /// Trimmed text (or attribute) of the first matching element.
    Text {
        selector: SelectorSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
    },
    /// Number cleaned out of the first matching element's text (or attribute).
    Number {
        selector: SelectorSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
        #[serde(default)]
        decimal: DecimalMark,
    },
    /// One value per matching element, in document order.
    List {
        selector: SelectorSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
        /// Resolve values against the document URL when one is known.
        #[serde(default)]
        absolute: bool,
    },
    /// One label/value pair per matching row; `label` and `value` are
    /// selectors evaluated inside each row.
    Table {
        selector: SelectorSpec,
        label: String,
        value: String,
    },
}

impl FieldRule {
    pub fn text(selector: impl Into<SelectorSpec>) -> Self {
        FieldRule::Text {
            selector: selector.into(),
            attr: None,
        }
    }

    pub fn number(selector: impl Into<SelectorSpec>) -> Self {
        FieldRule::Number {
            selector: selector.into(),
            attr: None,
            decimal: DecimalMark::Dot,
        }
    }

    pub fn list_attr(selector: impl Into<SelectorSpec>, attr: &str) -> Self {
        FieldRule::List {
            selector: selector.into(),
            attr: Some(attr.to_string()),
            absolute: false,
        }
    }

    pub fn table(selector: impl Into<SelectorSpec>, label: &str, value: &str) -> Self {
        FieldRule::Table {
            selector: selector.into(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    pub fn selector(&self) -> &SelectorSpec {
        match self {
            FieldRule::Text { selector, .. }
            | FieldRule::Number { selector, .. }
            | FieldRule::List { selector, .. }
            | FieldRule::Table { selector, .. } => selector,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            FieldRule::Text { .. } | FieldRule::Number { .. } => Cardinality::Single,
            FieldRule::List { .. } => Cardinality::List,
            FieldRule::Table { .. } => Cardinality::Rows,
        }
    }

    /// Every CSS selector string this rule will compile, including row sub-selectors.
    pub(crate) fn all_selectors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .selector()
            .candidates()
            .iter()
            .map(String::as_str)
            .collect();
        if let FieldRule::Table { label, value, .. } = self {
            out.push(label);
            out.push(value);
        }
        out
    }
}

/// A named field within a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub rule: FieldRule,
}

/// Ordered mapping from field name to rule, defining the shape of one record type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionSchema {
    #[serde(default)]
    pub name: String,
    /// Selector whose presence marks a block/challenge page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_marker: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl ExtractionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the block marker selector.
    pub fn block_marker(mut self, css: impl Into<String>) -> Self {
        self.block_marker = Some(css.into());
        self
    }

    /// Appends a field; order of calls is the order of the record.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push(Field {
            name: name.into(),
            rule,
        });
        self
    }

    /// Parses a schema from JSON text and validates it.
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let schema: ExtractionSchema = serde_json::from_str(json)
            .map_err(|e| ExtractError::schema("parse schema", Some(e.into())))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Looks up a field rule by name.
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.rule)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks that field names are non-empty and unique and that every
    /// selector compiles.
    pub fn validate(&self) -> Result<(), ExtractError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ExtractError::schema(
                    "validate",
                    Some(anyhow::anyhow!("field with empty name")),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ExtractError::schema(
                    "validate",
                    Some(anyhow::anyhow!("duplicate field `{}`", field.name)),
                ));
            }
            if field.rule.selector().candidates().is_empty() {
                return Err(ExtractError::schema(
                    "validate",
                    Some(anyhow::anyhow!("field `{}` has no selector", field.name)),
                ));
            }
            for css in field.rule.all_selectors() {
                check_selector(css, &field.name)?;
            }
        }
        if let Some(ref marker) = self.block_marker {
            check_selector(marker, "block_marker")?;
        }
        Ok(())
    }
}

fn check_selector(css: &str, owner: &str) -> Result<(), ExtractError> {
    if get_or_compile(css).is_none() {
        return Err(ExtractError::schema(
            "validate",
            Some(anyhow::anyhow!("invalid selector `{}` in `{}`", css, owner)),
        ));
    }
    Ok(())
}
