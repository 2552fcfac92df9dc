use border_wait_core::RawCrossing;
use border_wait_core::schema::is_known_top_level_key;
use roxmltree::Document;
use serde_json::Value;

use super::FeedDecodeError;
use super::xml::document_to_value;

/// Root element names used by feed revisions.
const ROOT_KEYS: [&str; 2] = ["border_wait_time", "border_wait_times"];

/// Keys holding the port list under a root.
const PORT_KEYS: [&str; 2] = ["port", "ports"];

/// Wire format of a feed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// XML document.
    Xml,
    /// JSON document.
    Json,
}

impl FeedFormat {
    /// Guess the format from the first non-whitespace byte.
    ///
    /// Returns `None` for empty payloads. Anything not starting like XML is
    /// treated as JSON and left to the JSON parser to reject.
    ///
    /// # Examples
    ///
    /// ```
    /// use border_wait_data::FeedFormat;
    ///
    /// assert_eq!(FeedFormat::sniff(b"  <border_wait_time/>"), Some(FeedFormat::Xml));
    /// assert_eq!(FeedFormat::sniff(b"[]"), Some(FeedFormat::Json));
    /// assert_eq!(FeedFormat::sniff(b" \n"), None);
    /// ```
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let first = bytes
            .strip_prefix(b"\xEF\xBB\xBF")
            .unwrap_or(bytes)
            .iter()
            .find(|byte| !byte.is_ascii_whitespace())?;
        Some(if *first == b'<' { Self::Xml } else { Self::Json })
    }
}

/// Decode a feed payload into raw crossings, in feed order.
///
/// # Errors
///
/// Returns [`FeedDecodeError`] when the payload is empty, malformed, lacks a
/// port list, or contains a scalar or list where a port belongs. An empty
/// port element decodes to an empty crossing.
///
/// # Examples
///
/// ```
/// use border_wait_data::decode_feed;
///
/// let xml = b"<border_wait_time><port><port_number>250401</port_number></port></border_wait_time>";
/// let crossings = decode_feed(xml)?;
/// assert_eq!(crossings.len(), 1);
/// assert_eq!(crossings[0]["port_number"], "250401");
/// # Ok::<(), border_wait_data::FeedDecodeError>(())
/// ```
pub fn decode_feed(bytes: &[u8]) -> Result<Vec<RawCrossing>, FeedDecodeError> {
    let document = match FeedFormat::sniff(bytes).ok_or(FeedDecodeError::Empty)? {
        FeedFormat::Xml => {
            let text =
                std::str::from_utf8(bytes).map_err(|source| FeedDecodeError::Utf8 { source })?;
            let parsed = Document::parse(text.trim_start_matches('\u{feff}'))
                .map_err(|source| FeedDecodeError::Xml { source })?;
            document_to_value(&parsed)
        }
        FeedFormat::Json => {
            serde_json::from_slice(bytes).map_err(|source| FeedDecodeError::Json { source })?
        }
    };
    locate_ports(document)?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(RawCrossing::new()),
            other => Err(FeedDecodeError::InvalidPort {
                index,
                found: json_type(&other),
            }),
        })
        .collect()
}

fn locate_ports(document: Value) -> Result<Vec<Value>, FeedDecodeError> {
    match document {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => {
            if let Some(root) = ROOT_KEYS.iter().find_map(|key| map.remove(*key)) {
                return Ok(ports_under_root(root));
            }
            if let Some(ports) = PORT_KEYS.iter().find_map(|key| map.remove(*key)) {
                return Ok(listify(ports));
            }
            if map.keys().any(|key| is_known_top_level_key(key)) {
                return Ok(vec![Value::Object(map)]);
            }
            Err(FeedDecodeError::MissingPorts)
        }
        _ => Err(FeedDecodeError::MissingPorts),
    }
}

/// Ports beneath a recognised root; a root without ports is an empty feed.
fn ports_under_root(root: Value) -> Vec<Value> {
    match root {
        Value::Object(mut map) => PORT_KEYS
            .iter()
            .find_map(|key| map.remove(*key))
            .map(listify)
            .unwrap_or_default(),
        Value::Array(entries) => entries,
        _ => Vec::new(),
    }
}

/// A single repeated element decodes as a mapping rather than a list.
fn listify(value: Value) -> Vec<Value> {
    match value {
        Value::Array(entries) => entries,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
