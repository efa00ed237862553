// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error reports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::breadcrumb::Breadcrumb;
use crate::error::{ReportError, Result};
use crate::metadata::{Metadata, MetadataValue};
use crate::severity::Severity;
use crate::user::User;

/// Payload version understood by the notify endpoint.
pub const PAYLOAD_VERSION: &str = "4";

/// The identifying parts of an error: class, message and formatted stacktrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
	pub error_class: String,
	pub error_message: String,
	pub stacktrace: String,
}

impl ErrorDetails {
	pub fn new(
		error_class: impl Into<String>,
		error_message: impl Into<String>,
		stacktrace: impl Into<String>,
	) -> Self {
		Self {
			error_class: error_class.into(),
			error_message: error_message.into(),
			stacktrace: stacktrace.into(),
		}
	}

	/// Derives the class from the concrete type name of `error` and the
	/// message from its `Display` output.
	pub fn from_error<E>(error: &E, stacktrace: impl Into<String>) -> Self
	where
		E: std::error::Error + ?Sized,
	{
		Self {
			error_class: short_type_name(std::any::type_name::<E>()),
			error_message: error.to_string(),
			stacktrace: stacktrace.into(),
		}
	}
}

/// Strips the module path and generic arguments from a type name.
///
/// `std::io::error::Error` becomes `Error`, `my_app::Failure<u8>` becomes
/// `Failure`, `dyn core::error::Error` becomes `Error`.
fn short_type_name(full: &str) -> String {
	let full = full.strip_prefix("dyn ").unwrap_or(full);
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base).trim().to_string()
}

/// Application details copied from the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub release_stage: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code_bundle_id: Option<String>,
}

/// A single error occurrence packaged with diagnostic context.
///
/// The API key, error class, message and stacktrace are fixed at
/// construction. Everything else can be changed by callbacks before the
/// report is dispatched.
#[derive(Clone)]
pub struct Report {
	api_key: String,
	error_class: String,
	error_message: String,
	stacktrace: String,
	timestamp: DateTime<Utc>,
	pub context: Option<String>,
	pub grouping_hash: Option<String>,
	pub severity: Severity,
	pub metadata: Metadata,
	pub user: Option<User>,
	pub breadcrumbs: Vec<Breadcrumb>,
	pub app: AppInfo,
	/// Set for reports captured automatically (panics).
	pub unhandled: bool,
}

impl Report {
	/// Builds a report for `details`.
	///
	/// Fails with [`ReportError::InvalidErrorKind`] when the class or message
	/// is blank. A blank stacktrace is accepted since backtraces may be
	/// unavailable in stripped builds.
	pub fn new(api_key: impl Into<String>, details: ErrorDetails) -> Result<Self> {
		if details.error_class.trim().is_empty() {
			return Err(ReportError::InvalidErrorKind(
				"error has no class name".to_string(),
			));
		}
		if details.error_message.trim().is_empty() {
			return Err(ReportError::InvalidErrorKind(format!(
				"{} has no message",
				details.error_class
			)));
		}

		Ok(Self {
			api_key: api_key.into(),
			error_class: details.error_class,
			error_message: details.error_message,
			stacktrace: details.stacktrace,
			timestamp: Utc::now(),
			context: None,
			grouping_hash: None,
			severity: Severity::default(),
			metadata: Metadata::new(),
			user: None,
			breadcrumbs: Vec::new(),
			app: AppInfo::default(),
			unhandled: false,
		})
	}

	pub fn api_key(&self) -> &str {
		&self.api_key
	}

	pub fn error_class(&self) -> &str {
		&self.error_class
	}

	pub fn error_message(&self) -> &str {
		&self.error_message
	}

	pub fn stacktrace(&self) -> &str {
		&self.stacktrace
	}

	pub fn timestamp(&self) -> DateTime<Utc> {
		self.timestamp
	}

	/// Attaches a key/value pair to a metadata section.
	pub fn add_metadata(
		&mut self,
		section: impl Into<String>,
		key: impl Into<String>,
		value: impl Into<MetadataValue>,
	) {
		self.metadata.add(section, key, value);
	}

	/// Serializes the report into the event shape sent to the notify endpoint.
	pub fn to_json(&self) -> Result<serde_json::Value> {
		let event = EventPayload {
			api_key: &self.api_key,
			payload_version: PAYLOAD_VERSION,
			exceptions: [ExceptionPayload {
				error_class: &self.error_class,
				message: &self.error_message,
				stacktrace: &self.stacktrace,
			}],
			severity: self.severity,
			context: self.context.as_deref(),
			grouping_hash: self.grouping_hash.as_deref(),
			metadata: &self.metadata,
			user: self.user.as_ref(),
			breadcrumbs: &self.breadcrumbs,
			app: &self.app,
			unhandled: self.unhandled,
			device_time: self.timestamp.to_rfc3339(),
		};
		Ok(serde_json::to_value(event)?)
	}
}

impl fmt::Debug for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Report")
			.field("api_key", &"[REDACTED]")
			.field("error_class", &self.error_class)
			.field("error_message", &self.error_message)
			.field("stacktrace", &self.stacktrace)
			.field("timestamp", &self.timestamp)
			.field("context", &self.context)
			.field("grouping_hash", &self.grouping_hash)
			.field("severity", &self.severity)
			.field("metadata", &self.metadata)
			.field("user", &self.user)
			.field("breadcrumbs", &self.breadcrumbs)
			.field("app", &self.app)
			.field("unhandled", &self.unhandled)
			.finish()
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventPayload<'a> {
	api_key: &'a str,
	payload_version: &'static str,
	exceptions: [ExceptionPayload<'a>; 1],
	severity: Severity,
	#[serde(skip_serializing_if = "Option::is_none")]
	context: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	grouping_hash: Option<&'a str>,
	#[serde(rename = "metaData")]
	metadata: &'a Metadata,
	#[serde(skip_serializing_if = "Option::is_none")]
	user: Option<&'a User>,
	breadcrumbs: &'a [Breadcrumb],
	app: &'a AppInfo,
	unhandled: bool,
	device_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExceptionPayload<'a> {
	error_class: &'a str,
	message: &'a str,
	stacktrace: &'a str,
}
