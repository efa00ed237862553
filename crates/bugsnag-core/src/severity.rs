// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report severity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// How severe a reported error is.
///
/// Handled errors default to [`Severity::Warning`]; panics captured by the
/// panic hook are reported as [`Severity::Error`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Error,
	#[default]
	Warning,
	Info,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error => write!(f, "error"),
			Self::Warning => write!(f, "warning"),
			Self::Info => write!(f, "info"),
		}
	}
}

impl FromStr for Severity {
	type Err = ReportError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"error" => Ok(Self::Error),
			"warning" => Ok(Self::Warning),
			"info" => Ok(Self::Info),
			_ => Err(ReportError::InvalidSeverity(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn default_is_warning() {
		assert_eq!(Severity::default(), Severity::Warning);
	}

	#[test]
	fn rejects_unknown_severity() {
		let result: Result<Severity, _> = "fatal".parse();
		assert!(matches!(result, Err(ReportError::InvalidSeverity(s)) if s == "fatal"));
	}

	#[test]
	fn serializes_lowercase() {
		let json = serde_json::to_string(&Severity::Info).unwrap();
		assert_eq!(json, "\"info\"");
	}

	proptest! {
		#[test]
		fn severity_roundtrip(severity in prop_oneof![
			Just(Severity::Error),
			Just(Severity::Warning),
			Just(Severity::Info),
		]) {
			let s = severity.to_string();
			let parsed: Severity = s.parse().unwrap();
			prop_assert_eq!(severity, parsed);
		}
	}
}
