//! Bundled predicate factories: presence, email shape, and length bounds.
//!
//! Each factory returns a concrete type implementing [`Predicate`], usable
//! directly with `using` or through the standard helpers.

use crate::predicate::{Predicate, PredicateResult};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

// Pre-compiled patterns
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static STRICT_CHARS_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        // http://stackoverflow.com/a/46181/11236
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .unwrap()
    })
}

fn strict_chars_regex() -> &'static Regex {
    STRICT_CHARS_REGEX.get_or_init(|| Regex::new(r"^[\x20-\x7F]*$").unwrap())
}

fn first(values: &[Value]) -> &Value {
    values.first().unwrap_or(&Value::Null)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Length of a measurable value: character count for strings, element count
/// for arrays. Everything else has no length.
fn measure(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Presence check. Strings are trimmed first; null never counts as present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Present;

/// Presence check factory.
pub fn present() -> Present {
    Present
}

#[async_trait]
impl<T: Sync> Predicate<T> for Present {
    async fn check(&self, values: &[Value], _attribute: &str, _object: &T) -> PredicateResult {
        Ok(is_present(first(values)))
    }
}

/// Options for the bundled email check.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EmailOptions {
    /// Reject addresses containing anything outside printable ASCII.
    pub strict_characters: bool,
}

/// Email-shape check over the trimmed string value. Non-strings never match.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email {
    options: EmailOptions,
}

/// Email check factory.
pub fn email(options: EmailOptions) -> Email {
    Email { options }
}

#[async_trait]
impl<T: Sync> Predicate<T> for Email {
    async fn check(&self, values: &[Value], _attribute: &str, _object: &T) -> PredicateResult {
        let Value::String(raw) = first(values) else {
            return Ok(false);
        };
        let value = raw.trim();

        if self.options.strict_characters && !strict_chars_regex().is_match(value) {
            return Ok(false);
        }

        Ok(email_regex().is_match(value))
    }
}

/// Minimum-length check. Null and unmeasurable values fail.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    min: usize,
}

/// Minimum-length check factory.
pub fn min_length(min: usize) -> MinLength {
    MinLength { min }
}

#[async_trait]
impl<T: Sync> Predicate<T> for MinLength {
    async fn check(&self, values: &[Value], _attribute: &str, _object: &T) -> PredicateResult {
        Ok(measure(first(values)).is_some_and(|len| len >= self.min))
    }
}

/// Maximum-length check. Null and unmeasurable values fail.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    max: usize,
}

/// Maximum-length check factory.
pub fn max_length(max: usize) -> MaxLength {
    MaxLength { max }
}

#[async_trait]
impl<T: Sync> Predicate<T> for MaxLength {
    async fn check(&self, values: &[Value], _attribute: &str, _object: &T) -> PredicateResult {
        Ok(measure(first(values)).is_some_and(|len| len <= self.max))
    }
}
