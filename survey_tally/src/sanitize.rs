//! Cleaning of submitted values before they are stored.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)[^>]*?>.*?</(script|style)\s*>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)</?[a-zA-Z!?][^>]*>").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t ]+").unwrap());
static OCTET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").unwrap());

fn strip_tags(s: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(s, "");
    TAG.replace_all(&without_scripts, "").into_owned()
}

fn strip_octets(s: &str) -> String {
    // Removing one octet may join two halves into a new one.
    let mut cur = s.to_string();
    while OCTET.is_match(&cur) {
        cur = OCTET.replace_all(&cur, "").into_owned();
    }
    cur
}

fn sanitize_field(s: &str, keep_newlines: bool) -> String {
    let stripped = strip_tags(s);
    let no_controls: String = stripped
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || (*c == '\r' && keep_newlines))
        .collect();
    let collapsed = if keep_newlines {
        no_controls.replace("\r\n", "\n")
    } else {
        WHITESPACE_RUN.replace_all(&no_controls, " ").into_owned()
    };
    strip_octets(&collapsed).trim().to_string()
}

/// Single-line text: markup, control characters, line breaks and
/// percent-encoded octets are removed.
pub fn sanitize_text_field(s: &str) -> String {
    sanitize_field(s, false)
}

/// Multi-line text: like [sanitize_text_field] but line breaks are kept.
pub fn sanitize_textarea_field(s: &str) -> String {
    sanitize_field(s, true)
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c)
}

/// Returns the cleaned address, or an empty string if the value cannot be
/// an email address.
pub fn sanitize_email(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() < 6 {
        return String::new();
    }
    let (local, domain) = match trimmed.split_once('@') {
        Some((l, d)) if !l.is_empty() => (l, d),
        _ => return String::new(),
    };
    let local: String = local.chars().filter(|c| is_local_char(*c)).collect();
    if local.is_empty() {
        return String::new();
    }
    let domain = domain.trim_matches(|c| c == '.' || c == '-' || char::is_whitespace(c));
    let labels: Vec<String> = domain
        .split('.')
        .map(|sub| {
            sub.trim_matches(|c| c == '-' || char::is_whitespace(c))
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|sub| !sub.is_empty())
        .collect();
    if labels.len() < 2 {
        return String::new();
    }
    format!("{}@{}", local, labels.join("."))
}

/// Identifiers: lowercase ASCII letters, digits, `_` and `-` only.
pub fn sanitize_key(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}
