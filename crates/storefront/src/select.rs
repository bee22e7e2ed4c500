// ABOUTME: Selector primitives over a parsed document: first text, all values, and key/value rows.
// ABOUTME: Fallback selectors are tried in order and the first one with any match wins.

//! Selector-based value lookup.
//!
//! Key behaviors:
//! - A [`SelectorSpec`] with fallbacks tries each selector in order; the first
//!   selector matching at least one element decides the result, even when that
//!   element's value turns out to be empty.
//! - Text is the element's visible text (script and style contents skipped)
//!   with whitespace runs collapsed and the ends trimmed.
//! - Attribute values are trimmed.
//! - Nothing here fails: absent elements become empty strings or empty lists.

use scraper::{ElementRef, Html};

use crate::compiled::get_or_compile;
use crate::record::Attribute;
use crate::schema::SelectorSpec;

const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the visible text of an element, whitespace-normalized.
///
/// Text nodes are concatenated as-is, so inline markup splits nothing.
pub fn element_text(el: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in el.descendants() {
        let Some(t) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != el.id())
            .any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| INVISIBLE_TAGS.contains(&e.name()))
            });
        if !hidden {
            text.push_str(t);
        }
    }
    normalize_whitespace(&text)
}

/// Returns the trimmed attribute when `attr` is given, otherwise the element text.
///
/// `None` only when the named attribute is absent.
pub fn element_value(el: ElementRef<'_>, attr: Option<&str>) -> Option<String> {
    match attr {
        Some(name) => el.value().attr(name).map(|v| v.trim().to_string()),
        None => Some(element_text(el)),
    }
}

/// Returns all elements matched by the first selector in `spec` that matches anything.
pub fn select_all<'a>(doc: &'a Html, spec: &SelectorSpec) -> Vec<ElementRef<'a>> {
    for css in spec.candidates() {
        let Some(selector) = get_or_compile(css) else {
            continue;
        };
        let found: Vec<ElementRef<'a>> = doc.select(&selector).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Returns the first element matched by the first selector in `spec` that matches anything.
pub fn select_first<'a>(doc: &'a Html, spec: &SelectorSpec) -> Option<ElementRef<'a>> {
    spec.candidates().iter().find_map(|css| {
        let selector = get_or_compile(css)?;
        doc.select(&selector).next()
    })
}

/// Returns true when any element in the document matches `css`.
pub fn exists(doc: &Html, css: &str) -> bool {
    get_or_compile(css).is_some_and(|selector| doc.select(&selector).next().is_some())
}

/// Text (or attribute) of the first matching element; empty when nothing matches.
pub fn first_value(doc: &Html, spec: &SelectorSpec, attr: Option<&str>) -> String {
    select_first(doc, spec)
        .and_then(|el| element_value(el, attr))
        .unwrap_or_default()
}

/// One value per matching element in document order.
///
/// Elements lacking `attr` are skipped, as are empty values.
pub fn all_values(doc: &Html, spec: &SelectorSpec, attr: Option<&str>) -> Vec<String> {
    select_all(doc, spec)
        .into_iter()
        .filter_map(|el| element_value(el, attr))
        .filter(|v| !v.is_empty())
        .collect()
}

/// One label/value pair per matching row; a missing side becomes an empty string.
pub fn rows(doc: &Html, spec: &SelectorSpec, label_css: &str, value_css: &str) -> Vec<Attribute> {
    let label_sel = get_or_compile(label_css);
    let value_sel = get_or_compile(value_css);

    select_all(doc, spec)
        .into_iter()
        .map(|row| {
            let cell = |sel: &Option<scraper::Selector>| {
                sel.as_ref()
                    .and_then(|s| row.select(s).next())
                    .map(element_text)
                    .unwrap_or_default()
            };
            Attribute {
                label: cell(&label_sel),
                value: cell(&value_sel),
            }
        })
        .collect()
}
