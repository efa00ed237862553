// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identity attached to reports.

use serde::{Deserialize, Serialize};

/// Identity of the user affected by an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

impl User {
	pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			name: Some(name.into()),
			email: Some(email.into()),
		}
	}

	/// The anonymous identity of a device: only the id is set.
	pub fn device(device_id: impl Into<String>) -> Self {
		Self {
			id: Some(device_id.into()),
			name: None,
			email: None,
		}
	}
}
