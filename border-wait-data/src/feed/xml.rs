//! Map an XML document onto the generic tree shape used for JSON.
//!
//! The mapping follows the conventions of common XML-to-dict decoders so
//! both wire formats produce the same raw crossing:
//! - an element with only text becomes a string (trimmed);
//! - an empty element becomes `null`;
//! - child elements become keys, and repeated siblings become an array;
//! - attributes become `@name` keys, with text moved to `#text`.

use roxmltree::{Document, Node};
use serde_json::map::Entry;
use serde_json::{Map, Value};

/// Convert the document into `{root_name: tree}`.
pub(super) fn document_to_value(document: &Document<'_>) -> Value {
    let root = document.root_element();
    let mut map = Map::new();
    map.insert(root.tag_name().name().to_owned(), element_to_value(root));
    Value::Object(map)
}

fn element_to_value(element: Node<'_, '_>) -> Value {
    let mut map = Map::new();
    for attribute in element.attributes() {
        map.insert(
            format!("@{}", attribute.name()),
            Value::String(attribute.value().to_owned()),
        );
    }

    let mut text = String::new();
    for child in element.children() {
        if child.is_element() {
            insert_child(&mut map, child.tag_name().name(), element_to_value(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    let trimmed = text.trim();
    match (map.is_empty(), trimmed.is_empty()) {
        (true, true) => Value::Null,
        (true, false) => Value::String(trimmed.to_owned()),
        (false, true) => Value::Object(map),
        (false, false) => {
            map.insert("#text".to_owned(), Value::String(trimmed.to_owned()));
            Value::Object(map)
        }
    }
}

fn insert_child(map: &mut Map<String, Value>, name: &str, value: Value) {
    match map.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Value::Array(items) => items.push(value),
            existing => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}
