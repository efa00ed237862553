// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report delivery: the transport capability and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use bugsnag_core::{Report, PAYLOAD_VERSION};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{BugsnagError, Result};

/// Notifier name sent in the payload envelope.
pub const NOTIFIER_NAME: &str = "Bugsnag Rust";
/// Notifier homepage sent in the payload envelope.
pub const NOTIFIER_URL: &str = "https://github.com/bugsnag";
/// Time allowed for delivering a panic report before the process moves on.
pub const PANIC_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Moves a serialized report to the remote service.
///
/// Implementations own transport concerns such as timeouts. The client only
/// interprets the outcome: `Ok` means delivered, any error means not sent.
#[async_trait]
pub trait Delivery: Send + Sync {
	async fn deliver(&self, endpoint: &str, payload: &serde_json::Value) -> Result<()>;
}

/// Wraps a report in the notify envelope.
pub fn notify_payload(report: &Report, notifier_version: &str) -> Result<serde_json::Value> {
	let envelope = NotifyEnvelope {
		api_key: report.api_key(),
		notifier: NotifierInfo {
			name: NOTIFIER_NAME,
			version: notifier_version,
			url: NOTIFIER_URL,
		},
		events: [report.to_json()?],
	};
	Ok(serde_json::to_value(envelope)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotifyEnvelope<'a> {
	api_key: &'a str,
	notifier: NotifierInfo<'a>,
	events: [serde_json::Value; 1],
}

#[derive(Serialize)]
struct NotifierInfo<'a> {
	name: &'static str,
	version: &'a str,
	url: &'static str,
}

/// Delivers reports with an HTTP POST to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
	http_client: Client,
}

impl HttpDelivery {
	/// Creates a delivery with its own HTTP client.
	pub fn new(request_timeout: Duration) -> Result<Self> {
		let http_client = bugsnag_common_http::new_client_with_timeout(request_timeout)
			.map_err(BugsnagError::RequestFailed)?;
		Ok(Self { http_client })
	}

	/// Creates a delivery that reuses an existing HTTP client.
	pub fn with_client(http_client: Client) -> Self {
		Self { http_client }
	}

	/// Creates a delivery that opens a fresh connection for every request.
	///
	/// Pooled connections are driven by the runtime that opened them, so a
	/// delivery used from a short-lived runtime must not keep any.
	pub fn unpooled(request_timeout: Duration) -> Result<Self> {
		let http_client = bugsnag_common_http::builder()
			.timeout(request_timeout)
			.pool_max_idle_per_host(0)
			.build()
			.map_err(BugsnagError::RequestFailed)?;
		Ok(Self::with_client(http_client))
	}
}

#[async_trait]
impl Delivery for HttpDelivery {
	async fn deliver(&self, endpoint: &str, payload: &serde_json::Value) -> Result<()> {
		let api_key = payload
			.get("apiKey")
			.and_then(|v| v.as_str())
			.ok_or(BugsnagError::MissingApiKey)?;

		debug!(endpoint = %endpoint, "Sending report");

		let response = self
			.http_client
			.post(endpoint)
			.header("Bugsnag-Api-Key", api_key)
			.header("Bugsnag-Payload-Version", PAYLOAD_VERSION)
			.header("Bugsnag-Sent-At", Utc::now().to_rfc3339())
			.json(payload)
			.send()
			.await?;

		if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
			let retry_after = response
				.headers()
				.get("Retry-After")
				.and_then(|v| v.to_str().ok())
				.and_then(|s| s.parse().ok());
			return Err(BugsnagError::RateLimited {
				retry_after_secs: retry_after,
			});
		}

		if !response.status().is_success() {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			error!(status, message = %message, "Notify endpoint rejected report");
			return Err(BugsnagError::ServerError { status, message });
		}

		debug!("Report delivered");
		Ok(())
	}
}
