// ABOUTME: Retry contract at the fetch boundary: re-fetch blocked pages under a RetryPolicy.
// ABOUTME: The caller supplies the fetch closure; fetch failures are surfaced, never retried here.

use std::thread;

use tracing::{info, warn};

use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::record::Record;

impl Extractor {
    /// Fetches `url` through `fetch`, extracts, and re-fetches while the page is blocked.
    ///
    /// `fetch` receives the 1-based attempt number and returns the page HTML.
    /// Its errors end the loop immediately as a Fetch error. When every
    /// attempt permitted by the retry policy comes back blocked the result is
    /// an Exhausted error wrapping the last Blocked one.
    pub fn extract_with_retry<F, E>(&self, url: &str, mut fetch: F) -> Result<Record, ExtractError>
    where
        F: FnMut(u32) -> Result<String, E>,
        E: Into<anyhow::Error>,
    {
        let policy = &self.options().retry;
        let attempts = policy.attempts();
        let mut last_blocked = None;

        for attempt in 1..=attempts {
            let html = fetch(attempt)
                .map_err(|e| ExtractError::fetch(url, "fetch", Some(e.into())))?;

            match self.extract_html(&html, Some(url)) {
                Ok(record) => {
                    if attempt > 1 {
                        info!(url, attempt, "extracted after retry");
                    }
                    return Ok(record);
                }
                Err(err) if err.is_retryable() => {
                    warn!(url, attempt, max_attempts = attempts, "page blocked");
                    last_blocked = Some(err);
                    if attempt < attempts {
                        let delay = policy.delay_after(attempt);
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let last = last_blocked.unwrap_or_else(|| ExtractError::blocked(url, "extract"));
        Err(ExtractError::exhausted(url, "extract_with_retry", last))
    }
}
