// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the notifier SDK.

use bugsnag_core::ReportError;
use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, BugsnagError>;

/// Errors that can occur in the notifier SDK.
#[derive(Debug, Error)]
pub enum BugsnagError {
	/// The error value could not be turned into a report.
	#[error(transparent)]
	Report(#[from] ReportError),

	/// The client has been shut down.
	#[error("bugsnag client has been shut down")]
	ClientShutdown,

	/// No API key is configured.
	#[error("no API key configured")]
	MissingApiKey,

	/// The delivery endpoint is not a valid URL.
	#[error("invalid delivery endpoint: {0}")]
	InvalidEndpoint(String),

	/// Configuration could not be loaded.
	#[error("configuration error: {0}")]
	Config(String),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Rate limited by server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited {
		/// Optional retry-after header value.
		retry_after_secs: Option<u64>,
	},

	/// Failed to serialize the payload.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),

	/// The delivery task did not complete.
	#[error("delivery interrupted: {0}")]
	DeliveryInterrupted(String),
}

impl BugsnagError {
	/// Whether this error came from building the report rather than sending it.
	pub fn is_invalid_error_kind(&self) -> bool {
		matches!(self, Self::Report(ReportError::InvalidErrorKind(_)))
	}
}
