//! Message-to-link extraction: candidate scan, redirect unwrapping,
//! canonicalization.

use super::html::html_to_text;
use super::sites::{JOB_URL_RE, JobSite};
use crate::error::MessageError;
use crate::message::{Message, flatten};
use percent_encoding::percent_decode_str;
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

/// LinkedIn's link-wrapping redirector; the real target is in `?url=`.
const SAFETY_REDIRECT: &str = "linkedin.com/safety/go";

/// Stripped repeatedly from the right of a candidate.
const TRAILING_CHARS: &[char] = &[
    '>', '/', ')', '.', ',', '\'', '"', '\u{2019}', '\u{201D}',
];

#[derive(Debug, Error)]
enum RedirectError {
    #[error("unparseable redirect: {0}")]
    Parse(#[from] url::ParseError),
    #[error("redirect has no `url` parameter")]
    MissingTarget,
}

/// Canonical job URLs referenced by one message, sorted and unique.
///
/// `html` is scanned twice: raw, so `href` attributes are seen, and projected
/// to text, so links that only exist as rendered text are seen too.
pub fn extract_job_urls(subject: &str, plain: &str, html: &str) -> Vec<String> {
    let projected = (!html.is_empty()).then(|| html_to_text(html));
    let mut sections = vec![subject, plain];
    if let Some(projected) = projected.as_deref() {
        sections.push(html);
        sections.push(projected);
    }
    let blob = sections.join("\n");

    let raw: BTreeSet<&str> = JOB_URL_RE
        .find_iter(&blob)
        .map(|m| m.as_str().trim())
        .collect();

    let cleaned: BTreeSet<String> = raw
        .into_iter()
        .map(resolve_redirect)
        .filter_map(|resolved| {
            let canonical = canonicalize(&resolved);
            JobSite::classify(canonical).map(|_| canonical.to_string())
        })
        .collect();

    cleaned.into_iter().collect()
}

/// Flatten `message` and extract from its subject and bodies.
pub fn extract_from_message(message: &Message) -> Result<Vec<String>, MessageError> {
    let body = flatten(message)?;
    Ok(extract_job_urls(message.subject(), &body.plain, &body.html))
}

/// Drop query and fragment, then trailing punctuation, then a trailing `/`.
///
/// Idempotent: the result contains no `?`/`#` and ends in none of the
/// trailing characters.
pub fn canonicalize(url: &str) -> &str {
    let url = url.split_once('?').map_or(url, |(head, _)| head);
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    url.trim_end_matches(TRAILING_CHARS).trim_end_matches('/')
}

/// Replace a safety-redirect wrapper by its decoded target. Anything else,
/// including a wrapper that cannot be unwrapped, is returned unchanged.
fn resolve_redirect(candidate: &str) -> String {
    if !candidate.contains(SAFETY_REDIRECT) {
        return candidate.to_string();
    }
    match unwrap_safety_redirect(candidate) {
        Ok(target) => target,
        Err(e) => {
            tracing::debug!(candidate, error = %e, "keeping unresolved redirect");
            candidate.to_string()
        }
    }
}

fn unwrap_safety_redirect(candidate: &str) -> Result<String, RedirectError> {
    let parsed = Url::parse(candidate)?;
    let target = parsed
        .query_pairs()
        .find(|(key, value)| key == "url" && !value.is_empty())
        .map(|(_, value)| value)
        .ok_or(RedirectError::MissingTarget)?;
    // `query_pairs` already decoded once; wrapped targets are often encoded twice.
    let decoded = percent_decode_str(&target).decode_utf8_lossy();
    Ok(decoded.trim().to_string())
}
