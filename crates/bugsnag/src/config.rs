// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notifier configuration and the before-send callback registry.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use bugsnag_core::Report;
use serde::Serialize;

use crate::error::{BugsnagError, Result};

/// Default notify endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://notify.bugsnag.com";
/// Default breadcrumb history capacity.
pub const DEFAULT_MAX_BREADCRUMBS: usize = 32;
/// Notifier version reported with every payload.
pub const NOTIFIER_VERSION: &str = env!("CARGO_PKG_VERSION");

const ENV_API_KEY: &str = "BUGSNAG_API_KEY";
const ENV_API_KEY_FILE: &str = "BUGSNAG_API_KEY_FILE";
const ENV_RELEASE_STAGE: &str = "BUGSNAG_RELEASE_STAGE";
const ENV_NOTIFY_RELEASE_STAGES: &str = "BUGSNAG_NOTIFY_RELEASE_STAGES";
const ENV_APP_VERSION: &str = "BUGSNAG_APP_VERSION";
const ENV_ENDPOINT: &str = "BUGSNAG_ENDPOINT";

/// A registered before-send callback. Returning `false` vetoes the report.
pub type BeforeSendCallback = Arc<dyn Fn(&mut Report) -> bool + Send + Sync>;

/// Token identifying one callback registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

/// Where reports are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardDelivery {
	pub endpoint: String,
}

impl StandardDelivery {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
		}
	}
}

impl Default for StandardDelivery {
	fn default() -> Self {
		Self::new(DEFAULT_ENDPOINT)
	}
}

#[derive(Default)]
struct CallbackRegistry {
	next_id: u64,
	entries: Vec<(CallbackId, BeforeSendCallback)>,
}

/// Configuration options for a Bugsnag client.
///
/// Scalar options are plain fields and are fixed once the configuration is
/// handed to a [`Client`](crate::Client). The callback registry is internally
/// synchronized and may be changed at any time through `&self`.
pub struct Configuration {
	/// Notifier version.
	pub version: String,
	/// Project API key. Reports are dropped while this is unset.
	pub api_key: Option<String>,
	pub delivery: StandardDelivery,
	/// Release stages allowed to send reports; `None` allows every stage.
	pub notify_release_stages: Option<Vec<String>>,
	pub release_stage: Option<String>,
	pub app_version: Option<String>,
	pub code_bundle_id: Option<String>,
	/// Report panics automatically once the panic hook is installed.
	pub auto_notify: bool,
	/// Serialized for parity with the other notifiers; unused in Rust.
	pub handle_promise_rejections: bool,
	pub max_breadcrumbs: usize,
	/// Timeout for each delivery request.
	pub request_timeout: Duration,
	callbacks: RwLock<CallbackRegistry>,
}

impl Configuration {
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: Some(api_key.into()),
			..Self::default()
		}
	}

	/// Loads configuration from `BUGSNAG_*` environment variables.
	///
	/// `BUGSNAG_API_KEY_FILE` is read when `BUGSNAG_API_KEY` is unset.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads configuration from an arbitrary variable source.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

		let api_key = match non_empty(ENV_API_KEY) {
			Some(key) => Some(key.trim().to_string()),
			None => match non_empty(ENV_API_KEY_FILE) {
				Some(path) => {
					let contents = std::fs::read_to_string(path.trim()).map_err(|e| {
						BugsnagError::Config(format!("failed to read {ENV_API_KEY_FILE} ({path}): {e}"))
					})?;
					Some(contents.trim().to_string())
				}
				None => None,
			},
		};

		let mut config = Self {
			api_key,
			release_stage: non_empty(ENV_RELEASE_STAGE),
			notify_release_stages: non_empty(ENV_NOTIFY_RELEASE_STAGES).map(|stages| {
				stages
					.split(',')
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(String::from)
					.collect()
			}),
			app_version: non_empty(ENV_APP_VERSION),
			..Self::default()
		};
		if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
			config.delivery = StandardDelivery::new(endpoint);
		}
		Ok(config)
	}

	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.delivery = StandardDelivery::new(endpoint);
		self
	}

	pub fn with_release_stage(mut self, stage: impl Into<String>) -> Self {
		self.release_stage = Some(stage.into());
		self
	}

	pub fn with_notify_release_stages<I, S>(mut self, stages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.notify_release_stages = Some(stages.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
		self.app_version = Some(version.into());
		self
	}

	pub fn with_code_bundle_id(mut self, id: impl Into<String>) -> Self {
		self.code_bundle_id = Some(id.into());
		self
	}

	pub fn with_auto_notify(mut self, enabled: bool) -> Self {
		self.auto_notify = enabled;
		self
	}

	pub fn with_max_breadcrumbs(mut self, max: usize) -> Self {
		self.max_breadcrumbs = max;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Whether reports should be sent, based on the release stage configuration.
	pub fn should_notify(&self) -> bool {
		match (&self.release_stage, &self.notify_release_stages) {
			(Some(stage), Some(allowed)) => allowed.iter().any(|s| s == stage),
			_ => true,
		}
	}

	/// Adds a callback run on every report before it is sent.
	///
	/// Callbacks run in registration order. Registering the same function
	/// twice yields two independent registrations.
	pub fn register_before_send_callback<F>(&self, callback: F) -> CallbackId
	where
		F: Fn(&mut Report) -> bool + Send + Sync + 'static,
	{
		let mut registry = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
		let id = CallbackId(registry.next_id);
		registry.next_id += 1;
		registry.entries.push((id, Arc::new(callback)));
		id
	}

	/// Removes the callback registered under `id`. Returns whether one was removed.
	pub fn unregister_before_send_callback(&self, id: CallbackId) -> bool {
		let mut registry = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
		match registry.entries.iter().position(|(entry_id, _)| *entry_id == id) {
			Some(index) => {
				registry.entries.remove(index);
				true
			}
			None => false,
		}
	}

	/// Removes every registered callback.
	pub fn clear_before_send_callbacks(&self) {
		self
			.callbacks
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.entries
			.clear();
	}

	pub fn before_send_callback_count(&self) -> usize {
		self
			.callbacks
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.entries
			.len()
	}

	/// Snapshot of the registered callbacks in registration order.
	pub(crate) fn before_send_callbacks(&self) -> Vec<BeforeSendCallback> {
		self
			.callbacks
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.entries
			.iter()
			.map(|(_, cb)| Arc::clone(cb))
			.collect()
	}

	/// Serializable snapshot of the scalar options. Callbacks are excluded.
	pub fn to_json(&self) -> Result<serde_json::Value> {
		let snapshot = ConfigSnapshot {
			version: &self.version,
			api_key: self.api_key.as_deref(),
			endpoint: &self.delivery.endpoint,
			release_stage: self.release_stage.as_deref(),
			notify_release_stages: self.notify_release_stages.as_deref(),
			app_version: self.app_version.as_deref(),
			code_bundle_id: self.code_bundle_id.as_deref(),
			auto_notify: self.auto_notify,
			handle_promise_rejections: self.handle_promise_rejections,
		};
		Ok(serde_json::to_value(snapshot)?)
	}
}

impl Default for Configuration {
	fn default() -> Self {
		Self {
			version: NOTIFIER_VERSION.to_string(),
			api_key: None,
			delivery: StandardDelivery::default(),
			notify_release_stages: None,
			release_stage: None,
			app_version: None,
			code_bundle_id: None,
			auto_notify: true,
			handle_promise_rejections: true,
			max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
			request_timeout: Duration::from_secs(30),
			callbacks: RwLock::new(CallbackRegistry::default()),
		}
	}
}

impl From<&str> for Configuration {
	fn from(api_key: &str) -> Self {
		Self::new(api_key)
	}
}

impl From<String> for Configuration {
	fn from(api_key: String) -> Self {
		Self::new(api_key)
	}
}

impl fmt::Debug for Configuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Configuration")
			.field("version", &self.version)
			.field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
			.field("delivery", &self.delivery)
			.field("notify_release_stages", &self.notify_release_stages)
			.field("release_stage", &self.release_stage)
			.field("app_version", &self.app_version)
			.field("code_bundle_id", &self.code_bundle_id)
			.field("auto_notify", &self.auto_notify)
			.field("handle_promise_rejections", &self.handle_promise_rejections)
			.field("max_breadcrumbs", &self.max_breadcrumbs)
			.field("request_timeout", &self.request_timeout)
			.field("before_send_callbacks", &self.before_send_callback_count())
			.finish()
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigSnapshot<'a> {
	version: &'a str,
	api_key: Option<&'a str>,
	endpoint: &'a str,
	release_stage: Option<&'a str>,
	notify_release_stages: Option<&'a [String]>,
	app_version: Option<&'a str>,
	code_bundle_id: Option<&'a str>,
	auto_notify: bool,
	handle_promise_rejections: bool,
}
