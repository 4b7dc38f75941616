//! Type coercion for the MBTiles `metadata` table.
//!
//! Metadata values are always stored as text, but are logically typed per
//! key: `minzoom`/`maxzoom` are integers, `bounds`/`center` are
//! comma-separated float lists, `json` is a JSON object whose top-level keys
//! merge flat into the document, and everything else stays verbatim text.
//! [`MetadataValue`] is the tagged union holding the result of that
//! coercion; a whole document is a [`Metadata`] map.
//!
//! The flat `json` merge can silently overwrite any other top-level key,
//! including `name` or `minzoom`, depending on row order. That is the
//! documented MBTiles behavior and is kept as is.

use crate::error::MetadataError;
use serde::Serialize;
use std::collections::BTreeMap;

/// The parsed metadata document: one entry per metadata name, plus any keys
/// merged in from a `json` row. Last write wins when a name repeats.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single coerced metadata value.
///
/// Serializes untagged, so a [`Metadata`] document serializes to plain
/// TileJSON-style JSON (`{"bounds":[...],"minzoom":0,...}`).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
	Integer(i64),
	Floats(Vec<f64>),
	Text(String),
	Json(serde_json::Value),
}

impl MetadataValue {
	fn from_json(value: serde_json::Value) -> MetadataValue {
		// Strings from a merged JSON object are indistinguishable from
		// plain metadata rows, so they get the same representation.
		match value {
			serde_json::Value::String(text) => MetadataValue::Text(text),
			other => MetadataValue::Json(other),
		}
	}
}

/// Coerces one metadata row and stores it in `doc`, dispatching on `name`.
///
/// # Errors
/// Returns [`MetadataError::ParseFailed`] naming the key when the value does
/// not parse under that key's rule.
pub(crate) fn coerce_entry(doc: &mut Metadata, name: &str, value: &str) -> Result<(), MetadataError> {
	match name {
		"minzoom" | "maxzoom" => {
			let zoom = value.parse::<i64>().map_err(|e| parse_failed(name, &e))?;
			doc.insert(name.to_string(), MetadataValue::Integer(zoom));
		}
		"bounds" | "center" => {
			doc.insert(name.to_string(), MetadataValue::Floats(parse_floats(name, value)?));
		}
		"json" => {
			let object: serde_json::Map<String, serde_json::Value> =
				serde_json::from_str(value).map_err(|e| parse_failed(name, &e))?;
			for (key, val) in object {
				doc.insert(key, MetadataValue::from_json(val));
			}
		}
		_ => {
			doc.insert(name.to_string(), MetadataValue::Text(value.to_string()));
		}
	}
	Ok(())
}

/// Parses a comma-separated float list, trimming whitespace around each
/// element. Purely a CSV-of-floats parser: arity is not enforced.
fn parse_floats(name: &str, value: &str) -> Result<Vec<f64>, MetadataError> {
	value
		.split(',')
		.map(|element| element.trim().parse::<f64>().map_err(|e| parse_failed(name, &e)))
		.collect()
}

fn parse_failed(key: &str, reason: &dyn std::fmt::Display) -> MetadataError {
	MetadataError::ParseFailed {
		key: key.to_string(),
		reason: reason.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn should_coerce_zoom_keys_to_integers() {
		let mut doc = Metadata::new();
		coerce_entry(&mut doc, "minzoom", "3").unwrap();
		coerce_entry(&mut doc, "maxzoom", "14").unwrap();
		assert_eq!(doc.get("minzoom"), Some(&MetadataValue::Integer(3)));
		assert_eq!(doc.get("maxzoom"), Some(&MetadataValue::Integer(14)));
	}

	#[test]
	fn should_coerce_bounds_to_floats_trimming_whitespace() {
		let mut doc = Metadata::new();
		coerce_entry(&mut doc, "bounds", "-1.0, 2.5,3.0, 4.25").unwrap();
		assert_eq!(
			doc.get("bounds"),
			Some(&MetadataValue::Floats(vec![-1.0, 2.5, 3.0, 4.25]))
		);
	}

	#[test]
	fn should_not_enforce_arity_on_float_lists() {
		let mut doc = Metadata::new();
		coerce_entry(&mut doc, "center", "13.4").unwrap();
		assert_eq!(doc.get("center"), Some(&MetadataValue::Floats(vec![13.4])));
	}

	#[test]
	fn should_store_unknown_keys_verbatim() {
		let mut doc = Metadata::new();
		coerce_entry(&mut doc, "attribution", "OpenStreetMap contributors").unwrap();
		assert_eq!(
			doc.get("attribution"),
			Some(&MetadataValue::Text("OpenStreetMap contributors".to_string()))
		);
	}

	#[test]
	fn should_merge_json_keys_flat_into_the_document() {
		let mut doc = Metadata::new();
		coerce_entry(&mut doc, "attribution", "row value").unwrap();
		coerce_entry(&mut doc, "json", r#"{"attribution":"X","vector_layers":[]}"#).unwrap();
		// The merge overwrites the earlier top-level entry. Order-dependent,
		// but that is the documented behavior.
		assert_eq!(doc.get("attribution"), Some(&MetadataValue::Text("X".to_string())));
		assert_eq!(
			doc.get("vector_layers"),
			Some(&MetadataValue::Json(serde_json::json!([])))
		);
	}

	#[test]
	fn should_name_the_offending_key_on_parse_failure() {
		let mut doc = Metadata::new();

		let err = coerce_entry(&mut doc, "minzoom", "three").unwrap_err();
		assert!(matches!(&err, MetadataError::ParseFailed { key, .. } if key == "minzoom"));

		let err = coerce_entry(&mut doc, "bounds", "1.0,north,3.0").unwrap_err();
		assert!(matches!(&err, MetadataError::ParseFailed { key, .. } if key == "bounds"));

		let err = coerce_entry(&mut doc, "json", "not json").unwrap_err();
		assert!(matches!(&err, MetadataError::ParseFailed { key, .. } if key == "json"));
	}

	#[test]
	fn should_reject_json_values_that_are_not_objects() {
		let mut doc = Metadata::new();
		let err = coerce_entry(&mut doc, "json", "[1,2,3]").unwrap_err();
		assert!(matches!(&err, MetadataError::ParseFailed { key, .. } if key == "json"));
	}

	#[test]
	fn should_serialize_untagged_to_tilejson_style_json() {
		let mut doc = Metadata::new();
		coerce_entry(&mut doc, "minzoom", "0").unwrap();
		coerce_entry(&mut doc, "center", "13.4, 52.5").unwrap();
		coerce_entry(&mut doc, "name", "test").unwrap();
		assert_eq!(
			serde_json::to_string(&doc).unwrap(),
			r#"{"center":[13.4,52.5],"minzoom":0,"name":"test"}"#
		);
	}
}
