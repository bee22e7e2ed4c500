// ABOUTME: Record struct holding the values extracted for one document, in schema order.
// ABOUTME: Serializes as a flat JSON object keyed by field name.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One label/value pair from a tabular field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribute {
    pub label: String,
    pub value: String,
}

/// The value of one extracted field.
///
/// `Number(None)` is the not-a-number sentinel for numeric fields whose text
/// was absent or could not be cleaned into a number; it serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    List(Vec<String>),
    Table(Vec<Attribute>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => *n,
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&[Attribute]> {
        match self {
            FieldValue::Table(v) => Some(v),
            _ => None,
        }
    }
}

/// The structured output of one extraction pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// The URL the document was fetched from, when the caller knew it.
    pub url: Option<String>,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub(crate) fn new(url: Option<String>, fields: Vec<(String, FieldValue)>) -> Self {
        Self { url, fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Text of a text field, or `None` if the field is missing or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Value of a numeric field; `None` for the not-a-number sentinel too.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    pub fn table(&self, name: &str) -> Option<&[Attribute]> {
        self.get(name).and_then(FieldValue::as_table)
    }

    /// Iterates fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
