// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types (events leading up to a report).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;
use crate::metadata::MetadataValue;

/// Key under which a plain string label is stored.
pub const MESSAGE_KEY: &str = "message";
/// Metadata key that selects the breadcrumb type.
pub const TYPE_KEY: &str = "type";

/// A breadcrumb left by the application before an error occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
	pub timestamp: DateTime<Utc>,
	pub name: String,
	#[serde(rename = "type")]
	pub breadcrumb_type: BreadcrumbType,
	#[serde(rename = "metaData")]
	pub metadata: BTreeMap<String, MetadataValue>,
}

impl Breadcrumb {
	/// Creates a breadcrumb stamped with the current time.
	///
	/// A `"type"` entry in map metadata that names a valid [`BreadcrumbType`]
	/// selects the type and is removed from the map. Anything else defaults
	/// to [`BreadcrumbType::Manual`].
	pub fn new(name: impl Into<String>, metadata: Option<BreadcrumbMetadata>) -> Self {
		let mut breadcrumb_type = BreadcrumbType::Manual;
		let metadata = match metadata {
			None => BTreeMap::new(),
			Some(BreadcrumbMetadata::Label(label)) => {
				BTreeMap::from([(MESSAGE_KEY.to_string(), MetadataValue::String(label))])
			}
			Some(BreadcrumbMetadata::Map(mut map)) => {
				let parsed = map
					.get(TYPE_KEY)
					.and_then(MetadataValue::as_str)
					.and_then(|s| s.parse::<BreadcrumbType>().ok());
				if let Some(t) = parsed {
					breadcrumb_type = t;
					map.remove(TYPE_KEY);
				}
				map
			}
		};

		Self {
			timestamp: Utc::now(),
			name: name.into(),
			breadcrumb_type,
			metadata,
		}
	}
}

/// Metadata supplied with a breadcrumb: a free-form mapping or a plain label.
#[derive(Debug, Clone, PartialEq)]
pub enum BreadcrumbMetadata {
	Label(String),
	Map(BTreeMap<String, MetadataValue>),
}

impl From<&str> for BreadcrumbMetadata {
	fn from(value: &str) -> Self {
		Self::Label(value.to_string())
	}
}

impl From<String> for BreadcrumbMetadata {
	fn from(value: String) -> Self {
		Self::Label(value)
	}
}

impl From<BTreeMap<String, MetadataValue>> for BreadcrumbMetadata {
	fn from(value: BTreeMap<String, MetadataValue>) -> Self {
		Self::Map(value)
	}
}

/// Category of a breadcrumb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbType {
	Error,
	Log,
	Navigation,
	Process,
	Request,
	State,
	User,
	#[default]
	Manual,
}

impl fmt::Display for BreadcrumbType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error => write!(f, "error"),
			Self::Log => write!(f, "log"),
			Self::Navigation => write!(f, "navigation"),
			Self::Process => write!(f, "process"),
			Self::Request => write!(f, "request"),
			Self::State => write!(f, "state"),
			Self::User => write!(f, "user"),
			Self::Manual => write!(f, "manual"),
		}
	}
}

impl FromStr for BreadcrumbType {
	type Err = ReportError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"error" => Ok(Self::Error),
			"log" => Ok(Self::Log),
			"navigation" => Ok(Self::Navigation),
			"process" => Ok(Self::Process),
			"request" => Ok(Self::Request),
			"state" => Ok(Self::State),
			"user" => Ok(Self::User),
			"manual" => Ok(Self::Manual),
			_ => Err(ReportError::InvalidBreadcrumbType(s.to_string())),
		}
	}
}
