//! Dotted-path lookups into nested JSON (`org.0.company_name`).

// self
use crate::_prelude::*;

/// Looks up `key` in `data`.
///
/// The key is split on `.` and each segment indexes an object by name or an array by
/// decimal position, so a top-level key that itself contains a dot is never matched.
/// Missing segments and JSON `null` yield `None`.
pub fn value_by_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
	let mut cursor = data;

	for segment in key.split('.') {
		cursor = match cursor {
			Value::Object(map) => map.get(segment)?,
			Value::Array(items) => items.get(parse_index(segment)?)?,
			_ => return None,
		};
	}

	non_null(cursor)
}

fn parse_index(segment: &str) -> Option<usize> {
	if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}

	segment.parse().ok()
}

fn non_null(value: &Value) -> Option<&Value> {
	if value.is_null() { None } else { Some(value) }
}
