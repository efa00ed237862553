// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for report construction.

use thiserror::Error;

/// Errors that can occur while building or serializing a report.
#[derive(Debug, Error)]
pub enum ReportError {
	#[error("invalid error kind: {0}")]
	InvalidErrorKind(String),

	#[error("invalid severity: {0}")]
	InvalidSeverity(String),

	#[error("invalid breadcrumb type: {0}")]
	InvalidBreadcrumbType(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
