// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Diagnostic metadata attached to reports and breadcrumbs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata value: a scalar or a nested mapping of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
	String(String),
	Number(f64),
	Bool(bool),
	Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
	/// Returns the string payload, if this is a string value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}
}

impl From<&str> for MetadataValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for MetadataValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for MetadataValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for MetadataValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<f32> for MetadataValue {
	fn from(value: f32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<i32> for MetadataValue {
	fn from(value: i32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<u32> for MetadataValue {
	fn from(value: u32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<i64> for MetadataValue {
	fn from(value: i64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<u64> for MetadataValue {
	fn from(value: u64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<BTreeMap<String, MetadataValue>> for MetadataValue {
	fn from(value: BTreeMap<String, MetadataValue>) -> Self {
		Self::Map(value)
	}
}

/// Report metadata grouped into named sections.
///
/// Sections accumulate: adding a key never clears the other keys of its
/// section, and a section is never replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, BTreeMap<String, MetadataValue>>);

impl Metadata {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key` in `section`, creating the section if needed.
	pub fn add(
		&mut self,
		section: impl Into<String>,
		key: impl Into<String>,
		value: impl Into<MetadataValue>,
	) {
		self
			.0
			.entry(section.into())
			.or_default()
			.insert(key.into(), value.into());
	}

	pub fn section(&self, name: &str) -> Option<&BTreeMap<String, MetadataValue>> {
		self.0.get(name)
	}

	pub fn get(&self, section: &str, key: &str) -> Option<&MetadataValue> {
		self.0.get(section).and_then(|s| s.get(key))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of sections.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, MetadataValue>)> {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn add_accumulates_keys_in_section() {
		let mut metadata = Metadata::new();
		metadata.add("device", "battery", 42);
		metadata.add("device", "os", "x");

		assert_eq!(metadata.len(), 1);
		let device = metadata.section("device").unwrap();
		assert_eq!(device.len(), 2);
		assert_eq!(device.get("battery"), Some(&MetadataValue::Number(42.0)));
		assert_eq!(device.get("os"), Some(&MetadataValue::String("x".to_string())));
	}

	#[test]
	fn add_overwrites_existing_key_only() {
		let mut metadata = Metadata::new();
		metadata.add("app", "mode", "light");
		metadata.add("app", "locale", "en");
		metadata.add("app", "mode", "dark");

		assert_eq!(metadata.get("app", "mode").and_then(|v| v.as_str()), Some("dark"));
		assert_eq!(metadata.get("app", "locale").and_then(|v| v.as_str()), Some("en"));
	}

	#[test]
	fn serializes_as_plain_json_object() {
		let mut metadata = Metadata::new();
		metadata.add("device", "battery", 42);
		metadata.add("device", "charging", true);

		let json = serde_json::to_value(&metadata).unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "device": { "battery": 42.0, "charging": true } })
		);
	}

	#[test]
	fn nested_values_deserialize() {
		let value: MetadataValue =
			serde_json::from_value(serde_json::json!({ "inner": { "flag": false } })).unwrap();
		let MetadataValue::Map(map) = value else {
			panic!("expected map");
		};
		assert!(matches!(map.get("inner"), Some(MetadataValue::Map(_))));
	}

	proptest! {
		#[test]
		fn distinct_keys_all_retained(keys in proptest::collection::btree_set("[a-z]{1,8}", 1..20)) {
			let mut metadata = Metadata::new();
			for key in &keys {
				metadata.add("section", key.clone(), key.as_str());
			}
			prop_assert_eq!(metadata.section("section").unwrap().len(), keys.len());
		}
	}
}
