//! Placeholder masking for scalar leaves of the feed.

use serde_json::Value;

/// Literal markers the feed uses instead of leaving a value empty.
const PLACEHOLDERS: [&str; 2] = ["N/A", "Lanes Closed"];

/// Report whether `text` is one of the feed's placeholder markers.
///
/// Comparison ignores surrounding whitespace and ASCII case. Blank text
/// counts as a placeholder.
///
/// # Examples
///
/// ```
/// use border_wait_core::is_placeholder;
///
/// assert!(is_placeholder(" n/a "));
/// assert!(is_placeholder(""));
/// assert!(!is_placeholder("0"));
/// ```
#[must_use]
pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(trimmed))
}

/// Normalise a scalar leaf, masking placeholders to `None`.
///
/// Missing values, JSON `null`, blank strings and placeholder markers become
/// `None`. Other strings are trimmed. Numbers, booleans and containers pass
/// through unchanged, so a zero delay stays a zero delay.
///
/// # Examples
///
/// ```
/// use border_wait_core::sanitize;
/// use serde_json::json;
///
/// assert_eq!(sanitize(Some(&json!("Lanes Closed"))), None);
/// assert_eq!(sanitize(Some(&json!(0))), Some(json!(0)));
/// assert_eq!(sanitize(Some(&json!(" 45 "))), Some(json!("45")));
/// assert_eq!(sanitize(None), None);
/// ```
#[must_use]
pub fn sanitize(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(text) if is_placeholder(text) => None,
        Value::String(text) => Some(Value::String(text.trim().to_owned())),
        other => Some(other.clone()),
    }
}

/// Sanitise a leaf and render it as text.
///
/// Numbers and booleans are formatted; an XML element that carried
/// attributes contributes its `#text` content. Arrays and other objects have
/// no textual form and yield `None`.
#[must_use]
pub fn sanitize_text(value: Option<&Value>) -> Option<String> {
    match sanitize(value)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => sanitize_text(map.get("#text")),
        Value::Array(_) | Value::Null => None,
    }
}
