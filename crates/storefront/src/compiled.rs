// ABOUTME: Pre-compiled CSS selector cache shared by schema validation and extraction.
// ABOUTME: Invalid selectors are cached as None so they are parsed only once.

//! Selector caching for repeated extraction against the same schema.
//!
//! A schema is validated once and then applied to many documents; compiling
//! each selector string once and reusing it keeps per-document work to the
//! actual DOM matching.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `Some(Selector)` if the selector is valid, `None` if invalid.
/// A poisoned lock falls back to compiling without the cache.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        // Another thread may have inserted while we were compiling.
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
        cache.insert(css.to_string(), compiled.clone());
    }
    compiled
}

/// Warms the cache with every selector in the iterator.
pub fn precompile_selectors<I, S>(selectors: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Ok(mut cache) = SELECTOR_CACHE.write() else {
        return;
    };
    for css in selectors {
        let css = css.as_ref();
        if !cache.contains_key(css) {
            cache.insert(css.to_string(), Selector::parse(css).ok());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_selector_is_cached() {
        assert!(get_or_compile("span#productTitle").is_some());
        assert!(get_or_compile("span#productTitle").is_some());
    }

    #[test]
    fn test_invalid_selector_returns_none() {
        assert!(get_or_compile("[[[invalid").is_none());
        assert!(get_or_compile("[[[invalid").is_none());
    }

    #[test]
    fn test_precompile_selectors() {
        precompile_selectors(["#altImages img", "tr > td:first-child", "[[["]);
        assert!(get_or_compile("#altImages img").is_some());
        assert!(get_or_compile("tr > td:first-child").is_some());
        assert!(get_or_compile("[[[").is_none());
    }
}
