// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bugsnag client for building, filtering and delivering error reports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bugsnag_core::{
	AppInfo, Breadcrumb, BreadcrumbMetadata, ErrorDetails, Report, Severity, User,
};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backtrace::capture_stacktrace;
use crate::config::Configuration;
use crate::delivery::{notify_payload, Delivery, HttpDelivery, PANIC_DELIVERY_TIMEOUT};
use crate::error::{BugsnagError, Result};
use crate::panic_hook::{block_on_delivery, install_panic_hook, run_callback, run_detached};

/// One-shot callback run on a single report before the registered callbacks.
pub type OneShotCallback = Box<dyn FnOnce(&mut Report) + Send>;
/// Callback told whether a report was sent.
pub type PostSendCallback = Box<dyn FnOnce(bool) + Send>;

/// Per-call options for [`Client::notify`].
#[derive(Default)]
pub struct NotifyOptions {
	before_send: Option<OneShotCallback>,
	blocking: bool,
	post_send: Option<PostSendCallback>,
}

impl NotifyOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a callback that can change this report only. It always runs
	/// before the callbacks registered on the configuration.
	pub fn before_send<F>(mut self, callback: F) -> Self
	where
		F: FnOnce(&mut Report) + Send + 'static,
	{
		self.before_send = Some(Box::new(callback));
		self
	}

	/// When true, `notify` returns only after the delivery attempt finishes.
	pub fn blocking(mut self, blocking: bool) -> Self {
		self.blocking = blocking;
		self
	}

	/// Adds a callback invoked exactly once with whether the report was sent.
	pub fn post_send<F>(mut self, callback: F) -> Self
	where
		F: FnOnce(bool) + Send + 'static,
	{
		self.post_send = Some(Box::new(callback));
		self
	}
}

fn complete(post_send: Option<PostSendCallback>, sent: bool) {
	if let Some(callback) = post_send {
		callback(sent);
	}
}

/// Internal client state.
pub(crate) struct ClientInner {
	config: Configuration,
	delivery: Arc<dyn Delivery>,
	panic_delivery: Arc<dyn Delivery>,
	device_id: String,
	user: RwLock<User>,
	breadcrumbs: RwLock<VecDeque<Breadcrumb>>,
	tasks: TaskTracker,
	closed: AtomicBool,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
	lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
	lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl ClientInner {
	/// Builds and filters a report. `Ok(None)` means it was dropped or vetoed.
	fn prepare<F>(
		&self,
		details: ErrorDetails,
		initial: F,
		before_send: Option<OneShotCallback>,
	) -> Result<Option<serde_json::Value>>
	where
		F: FnOnce(&mut Report),
	{
		let api_key = self.config.api_key.clone().unwrap_or_default();
		let mut report = Report::new(api_key, details)?;

		if report.api_key().is_empty() {
			warn!(error_class = %report.error_class(), "No API key configured, report dropped");
			return Ok(None);
		}

		report.breadcrumbs = read(&self.breadcrumbs).iter().cloned().collect();
		report.user = Some(read(&self.user).clone());
		report.app = AppInfo {
			version: self.config.app_version.clone(),
			release_stage: self.config.release_stage.clone(),
			code_bundle_id: self.config.code_bundle_id.clone(),
		};
		initial(&mut report);

		if let Some(callback) = before_send {
			if run_callback(|| callback(&mut report)).is_err() {
				error!("One-shot before-send callback panicked, report dropped");
				return Ok(None);
			}
		}

		for (index, callback) in self.config.before_send_callbacks().iter().enumerate() {
			match run_callback(|| callback(&mut report)) {
				Ok(true) => {}
				Ok(false) => {
					debug!(index, error_class = %report.error_class(), "Report vetoed by before-send callback");
					return Ok(None);
				}
				Err(_) => {
					error!(index, "Before-send callback panicked, report dropped");
					return Ok(None);
				}
			}
		}

		if !self.config.should_notify() {
			debug!(
				release_stage = ?self.config.release_stage,
				"Release stage not in notify_release_stages, report dropped"
			);
			return Ok(None);
		}

		match notify_payload(&report, &self.config.version) {
			Ok(payload) => Ok(Some(payload)),
			Err(e) => {
				error!(error = %e, "Failed to serialize report");
				Ok(None)
			}
		}
	}

	async fn send(&self, payload: &serde_json::Value) -> bool {
		match self
			.delivery
			.deliver(&self.config.delivery.endpoint, payload)
			.await
		{
			Ok(()) => {
				info!(endpoint = %self.config.delivery.endpoint, "Report sent");
				true
			}
			Err(e) => {
				error!(error = %e, "Failed to deliver report");
				false
			}
		}
	}

	/// Reports a panic synchronously. Called from the panic hook.
	///
	/// Only the stacktrace and thread name are taken on the panicking thread.
	/// Callbacks and delivery run on a dedicated thread.
	pub(crate) fn notify_panic(self: &Arc<Self>, message: &str, location: Option<String>) {
		if self.closed.load(Ordering::SeqCst) {
			return;
		}

		let message = if message.trim().is_empty() {
			"explicit panic"
		} else {
			message
		};
		let details = ErrorDetails::new("panic", message, capture_stacktrace());
		let thread = std::thread::current().name().map(String::from);

		let inner = Arc::clone(self);
		let sent = run_detached(move || {
			let prepared = inner.prepare(
				details,
				|report| {
					report.severity = Severity::Error;
					report.unhandled = true;
					if let Some(location) = location {
						report.add_metadata("panic", "location", location);
					}
					if let Some(thread) = thread {
						report.add_metadata("panic", "thread", thread);
					}
				},
				None,
			);

			let payload = match prepared {
				Ok(Some(payload)) => payload,
				Ok(None) => return false,
				Err(e) => {
					warn!(error = %e, "Could not build panic report");
					return false;
				}
			};

			match block_on_delivery(
				inner.panic_delivery.as_ref(),
				&inner.config.delivery.endpoint,
				&payload,
				PANIC_DELIVERY_TIMEOUT,
			) {
				Ok(()) => true,
				Err(e) => {
					error!(error = %e, "Failed to deliver panic report");
					false
				}
			}
		});
		debug!(sent, "Panic report attempt finished");
	}
}

/// Client for reporting errors to Bugsnag.
///
/// Create one per process and pass it where needed; clones share state.
///
/// # Example
///
/// ```ignore
/// use bugsnag::{Client, Configuration, NotifyOptions};
///
/// let client = Client::new(
///     Configuration::new("your-api-key")
///         .with_release_stage("production")
///         .with_notify_release_stages(["production"]),
/// )?;
///
/// client.install_panic_hook();
/// client.set_user("42", "Ada", "ada@example.com");
/// client.leave_breadcrumb("loaded settings", None);
///
/// if let Err(e) = do_something() {
///     client
///         .notify(&e, NotifyOptions::new().before_send(|report| {
///             report.add_metadata("job", "id", 7);
///         }))
///         .await?;
/// }
///
/// client.shutdown().await;
/// ```
#[derive(Clone)]
pub struct Client {
	inner: Arc<ClientInner>,
}

impl Client {
	/// Creates a client from an API key or a [`Configuration`], delivering
	/// over HTTP.
	pub fn new(config: impl Into<Configuration>) -> Result<Self> {
		let config = config.into();
		let delivery = HttpDelivery::new(config.request_timeout)?;
		let panic_delivery = HttpDelivery::unpooled(PANIC_DELIVERY_TIMEOUT)?;
		Self::build(config, Arc::new(delivery), Arc::new(panic_delivery))
	}

	/// Creates a client that hands reports to a custom [`Delivery`].
	///
	/// Panic reports go through the same delivery from a short-lived runtime.
	pub fn with_delivery(
		config: impl Into<Configuration>,
		delivery: Arc<dyn Delivery>,
	) -> Result<Self> {
		Self::build(config.into(), Arc::clone(&delivery), delivery)
	}

	fn build(
		config: Configuration,
		delivery: Arc<dyn Delivery>,
		panic_delivery: Arc<dyn Delivery>,
	) -> Result<Self> {

		reqwest::Url::parse(&config.delivery.endpoint)
			.map_err(|_| BugsnagError::InvalidEndpoint(config.delivery.endpoint.clone()))?;

		if config.api_key.is_none() {
			warn!("Bugsnag client created without an API key, reports will be dropped");
		}

		let device_id = Uuid::new_v4().to_string();
		let user = User::device(device_id.clone());

		info!(
			endpoint = %config.delivery.endpoint,
			release_stage = ?config.release_stage,
			"Bugsnag client initialized"
		);

		Ok(Self {
			inner: Arc::new(ClientInner {
				config,
				delivery,
				panic_delivery,
				device_id,
				user: RwLock::new(user),
				breadcrumbs: RwLock::new(VecDeque::new()),
				tasks: TaskTracker::new(),
				closed: AtomicBool::new(false),
			}),
		})
	}

	pub fn config(&self) -> &Configuration {
		&self.inner.config
	}

	/// Anonymous identifier used as the default user id.
	pub fn device_id(&self) -> &str {
		&self.inner.device_id
	}

	/// Reports an error.
	///
	/// The report carries the current breadcrumbs and user. The one-shot
	/// `before_send` from `options` runs first, then every registered
	/// callback in order; a callback returning `false` stops the report.
	/// Reports are also dropped when the release stage is filtered out.
	///
	/// Delivery failures never surface here; they reach the `post_send`
	/// callback as `false`. An error is returned only when `error` cannot be
	/// turned into a report or the client is shut down.
	pub async fn notify<E>(&self, error: &E, options: NotifyOptions) -> Result<()>
	where
		E: std::error::Error + ?Sized,
	{
		let details = ErrorDetails::from_error(error, capture_stacktrace());
		self.notify_details(details, options).await
	}

	/// Reports an error given its class, message and stacktrace directly.
	pub async fn notify_details(&self, details: ErrorDetails, options: NotifyOptions) -> Result<()> {
		let NotifyOptions {
			before_send,
			blocking,
			post_send,
		} = options;

		if self.is_closed() {
			complete(post_send, false);
			return Err(BugsnagError::ClientShutdown);
		}

		let payload = match self.inner.prepare(details, |_| {}, before_send) {
			Ok(Some(payload)) => payload,
			Ok(None) => {
				complete(post_send, false);
				return Ok(());
			}
			Err(e) => {
				warn!(error = %e, "Could not build report");
				complete(post_send, false);
				return Err(e);
			}
		};

		if blocking {
			let sent = self.inner.send(&payload).await;
			complete(post_send, sent);
		} else {
			let inner = Arc::clone(&self.inner);
			self.inner.tasks.spawn(async move {
				let sent = inner.send(&payload).await;
				complete(post_send, sent);
			});
		}

		Ok(())
	}

	/// Replaces the current user identity.
	pub fn set_user(&self, id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) {
		let user = User::new(id, name, email);
		*write(&self.inner.user) = user;
	}

	/// Resets the user identity to the device identity.
	pub fn clear_user(&self) {
		*write(&self.inner.user) = User::device(self.inner.device_id.clone());
	}

	pub fn user(&self) -> User {
		read(&self.inner.user).clone()
	}

	/// Leaves a breadcrumb. The most recent breadcrumbs are attached to
	/// subsequent reports; the oldest is evicted once the history is full.
	pub fn leave_breadcrumb(&self, name: impl Into<String>, metadata: Option<BreadcrumbMetadata>) {
		let name = name.into();
		if name.trim().is_empty() {
			warn!("Breadcrumb name must not be empty, breadcrumb ignored");
			return;
		}

		let max = self.inner.config.max_breadcrumbs;
		if max == 0 {
			return;
		}

		let breadcrumb = Breadcrumb::new(name, metadata);
		let mut breadcrumbs = write(&self.inner.breadcrumbs);
		breadcrumbs.push_back(breadcrumb);
		while breadcrumbs.len() > max {
			breadcrumbs.pop_front();
		}
	}

	/// Snapshot of the breadcrumb history, oldest first.
	pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		read(&self.inner.breadcrumbs).iter().cloned().collect()
	}

	pub fn clear_breadcrumbs(&self) {
		write(&self.inner.breadcrumbs).clear();
	}

	/// Installs a panic hook that reports panics as unhandled errors.
	///
	/// Does nothing and returns `false` when `auto_notify` is disabled. The
	/// previously installed hook still runs after the report is sent.
	pub fn install_panic_hook(&self) -> bool {
		if !self.inner.config.auto_notify {
			debug!("auto_notify disabled, panic hook not installed");
			return false;
		}
		install_panic_hook(Arc::clone(&self.inner));
		info!("Panic hook installed");
		true
	}

	/// Waits for in-flight deliveries and rejects further reports.
	pub async fn shutdown(&self) {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return;
		}

		self.inner.tasks.close();
		self.inner.tasks.wait().await;
		info!("Bugsnag client shutdown");
	}

	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}
}
