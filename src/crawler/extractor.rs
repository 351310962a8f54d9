//! Href scanning and URL resolution
//!
//! Link extraction is a textual scan for `href="..."` attributes, not an HTML
//! parse. Markup that builds links from script, uses single quotes, or splits
//! an attribute across lines is not seen. Every captured reference is resolved
//! against the page URL with standard URL-join rules; references that cannot
//! be resolved are logged and skipped.

use crate::ResolutionError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(.*?)""#).expect("hardcoded regex pattern is valid"));

/// Extracts the set of absolute URLs referenced by `page_text`
///
/// # Arguments
///
/// * `page_text` - Raw page markup
/// * `base_url` - The page's own URL, used to resolve relative references
///
/// # Returns
///
/// The distinct absolute URLs found. Order carries no meaning. An unparseable
/// `base_url` yields an empty set.
///
/// # Example
///
/// ```
/// use link_harvest::crawler::extract_links;
///
/// let links = extract_links(r#"<a href="/b">b</a>"#, "http://x.test/a");
/// assert!(links.contains("http://x.test/b"));
/// ```
pub fn extract_links(page_text: &str, base_url: &str) -> HashSet<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            let error = ResolutionError::InvalidBase {
                base: base_url.to_string(),
                message: e.to_string(),
            };
            tracing::warn!(error = %error, "Cannot resolve links for page");
            return HashSet::new();
        }
    };

    let mut found = HashSet::new();
    for reference in href_references(page_text) {
        match resolve_reference(&base, reference) {
            Ok(url) => {
                found.insert(url.to_string());
            }
            Err(e) => {
                tracing::warn!(base = %base, error = %e, "Error parsing URL: {}", reference);
            }
        }
    }
    found
}

/// Iterates over the raw values of every `href="..."` in the text
pub fn href_references(page_text: &str) -> impl Iterator<Item = &str> {
    HREF_RE
        .captures_iter(page_text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolves one reference against a base URL
///
/// Absolute references come back unchanged (modulo URL serialization);
/// relative ones are joined onto `base`. A reference whose leading
/// `name:` part is not a legal scheme (for example `ht!tp://`) is rejected
/// rather than silently treated as a relative path.
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url, ResolutionError> {
    check_scheme(reference)?;

    base.join(reference).map_err(|e| ResolutionError::Join {
        reference: reference.to_string(),
        message: e.to_string(),
    })
}

fn check_scheme(reference: &str) -> Result<(), ResolutionError> {
    // Same leading/trailing trimming the URL parser applies
    let trimmed = reference.trim_matches(|c: char| c <= ' ');
    let head_end = trimmed
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(trimmed.len());

    let Some(colon) = trimmed[..head_end].find(':') else {
        return Ok(());
    };

    let mut chars = trimmed[..colon].chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(ResolutionError::InvalidScheme {
            reference: reference.to_string(),
        })
    }
}
