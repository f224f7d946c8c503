//! Content normalization
//!
//! Guarantees that both an HTML and a plain text body exist before dispatch,
//! and rewrites absolute links in the HTML body to carry the primary
//! recipient's address as an engagement tracking marker.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::domain::dispatch::value_objects::EmailAddress;

lazy_static! {
    static ref HREF_REGEX: Regex =
        Regex::new(r#"(?i)href=(["'])(https?://[^"'#\s]+)(#[^"']*)?(["'])"#).unwrap();
    static ref STYLE_REGEX: Regex = Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// An email body with both representations populated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedContent {
    /// The HTML body, with tracking markers applied to its links
    pub html: String,

    /// The plain text body
    pub text: String,
}

impl NormalizedContent {
    /// Normalize the raw body pair for the given primary recipient.
    ///
    /// A missing representation is synthesized from the other one. Supplied
    /// text is assumed trusted; no tag escaping is attempted when converting
    /// it to HTML.
    pub fn new(html: Option<&str>, text: Option<&str>, primary: &EmailAddress) -> Self {
        let html = html.filter(|html| !html.is_empty());
        let text = text.filter(|text| !text.is_empty());

        match (html, text) {
            (Some(html), Some(text)) => Self {
                html: tag_links(html, primary),
                text: text.to_string(),
            },
            (Some(html), None) => Self {
                html: tag_links(html, primary),
                text: html_to_text(html),
            },
            (None, Some(text)) => Self {
                html: text_to_html(text),
                text: text.to_string(),
            },
            // Unreachable after validation, which requires at least one body
            (None, None) => Self {
                html: String::new(),
                text: String::new(),
            },
        }
    }
}

/// Append the recipient's address to every absolute http(s) `href`: as an
/// extra query parameter when the URL already has a query string, as a URL
/// fragment otherwise. An existing fragment is replaced. Attribute quoting
/// style is preserved; mismatched quotes, relative URLs and non-http schemes
/// are left untouched.
fn tag_links(html: &str, recipient: &EmailAddress) -> String {
    HREF_REGEX
        .replace_all(html, |caps: &Captures<'_>| {
            let quote = &caps[1];
            let url = &caps[2];

            if quote != &caps[4] {
                return caps[0].to_string();
            }

            let separator = if url.contains('?') { '&' } else { '#' };

            format!("href={quote}{url}{separator}{recipient}{quote}")
        })
        .to_string()
}

/// Strip `<style>` blocks and all remaining tags, collapse whitespace runs
/// to single spaces and trim the ends.
fn html_to_text(html: &str) -> String {
    let without_styles = STYLE_REGEX.replace_all(html, "");
    let without_tags = TAG_REGEX.replace_all(&without_styles, "");

    WHITESPACE_REGEX
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

fn text_to_html(text: &str) -> String {
    text.replace('\n', "<br>")
}
