//! CSRF token extraction from index HTML pages
//!
//! The only capability needed is "find the `csrf_token` input inside the form
//! whose action is X". Other forms on the same page are ignored.

use regex::Regex;
use std::sync::OnceLock;

/// Name of the hidden input carrying the token
pub const CSRF_FIELD: &str = "csrf_token";

/// Extracts the CSRF token of one form from an HTML page.
pub trait CsrfExtractor: Send + Sync {
    /// Returns `None` when the page has no matching form or the form has no token.
    fn extract(&self, html: &str, form_action: &str) -> Option<String>;
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<\s*(/?)\s*([A-Za-z][A-Za-z0-9-]*)([^>]*)>").expect("tag pattern is valid")
    })
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
            .expect("attribute pattern is valid")
    })
}

/// Tag scanner for the form layout served by the index
#[derive(Debug, Default, Clone, Copy)]
pub struct FormTokenParser;

impl FormTokenParser {
    pub fn new() -> Self {
        FormTokenParser
    }
}

impl CsrfExtractor for FormTokenParser {
    fn extract(&self, html: &str, form_action: &str) -> Option<String> {
        let mut in_target_form = false;

        for tag in tag_pattern().captures_iter(html) {
            let closing = !tag[1].is_empty();
            let name = tag[2].to_ascii_lowercase();

            match (name.as_str(), closing) {
                ("form", false) => {
                    in_target_form = attribute(&tag[3], "action").as_deref() == Some(form_action);
                }
                ("form", true) => in_target_form = false,
                ("input", false) if in_target_form => {
                    if attribute(&tag[3], "name").as_deref() == Some(CSRF_FIELD) {
                        if let Some(value) = attribute(&tag[3], "value") {
                            return Some(value);
                        }
                    }
                }
                _ => {}
            }
        }

        None
    }
}

fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    attribute_pattern().captures_iter(attrs).find_map(|cap| {
        if !cap[1].eq_ignore_ascii_case(wanted) {
            return None;
        }
        let raw = cap
            .get(2)
            .or_else(|| cap.get(3))
            .or_else(|| cap.get(4))
            .map_or("", |m| m.as_str());
        Some(unescape(raw))
    })
}

fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
