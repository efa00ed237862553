// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic hook for automatic reporting of unhandled panics.

use std::any::Any;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::client::ClientInner;
use crate::delivery::Delivery;
use crate::error::{BugsnagError, Result};

thread_local! {
	static REPORTING: Cell<bool> = const { Cell::new(false) };
	static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

/// Installs a hook that reports panics before running the previous hook.
pub(crate) fn install_panic_hook(inner: Arc<ClientInner>) {
	let previous = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		// Callback panics are caught by the caller and never reported
		let in_callback = IN_CALLBACK.with(Cell::get);
		if !in_callback && !REPORTING.with(|r| r.replace(true)) {
			let message = payload_message(info.payload());
			let location = info
				.location()
				.map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
			inner.notify_panic(&message, location);
			REPORTING.with(|r| r.set(false));
		}
		previous(info);
	}));
}

/// Runs a user callback, catching any panic it raises.
///
/// The panic hook ignores panics raised inside `callback`.
pub(crate) fn run_callback<R>(callback: impl FnOnce() -> R) -> std::thread::Result<R> {
	let outer = IN_CALLBACK.with(|c| c.replace(true));
	let result = catch_unwind(AssertUnwindSafe(callback));
	IN_CALLBACK.with(|c| c.set(outer));
	result
}

/// Extracts the message from a panic payload.
fn payload_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		s.to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"Box<dyn Any>".to_string()
	}
}

/// Runs `task` on a dedicated thread and waits for it.
///
/// The panicking thread may be inside a runtime, and a second panic on it
/// aborts the process, so report building and delivery happen elsewhere.
pub(crate) fn run_detached<F>(task: F) -> bool
where
	F: FnOnce() -> bool + Send + 'static,
{
	let spawned = std::thread::Builder::new()
		.name("bugsnag-delivery".to_string())
		.spawn(task);

	let handle = match spawned {
		Ok(handle) => handle,
		Err(e) => {
			error!(error = %e, "Failed to spawn delivery thread");
			return false;
		}
	};

	match handle.join() {
		Ok(sent) => sent,
		Err(_) => {
			error!("Delivery thread panicked");
			false
		}
	}
}

/// Delivers a payload on a fresh current-thread runtime.
pub(crate) fn block_on_delivery(
	delivery: &dyn Delivery,
	endpoint: &str,
	payload: &serde_json::Value,
	timeout: Duration,
) -> Result<()> {
	let runtime = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.map_err(|e| BugsnagError::DeliveryInterrupted(e.to_string()))?;
	runtime.block_on(async {
		tokio::time::timeout(timeout, delivery.deliver(endpoint, payload))
			.await
			.map_err(|_| BugsnagError::DeliveryInterrupted("timed out".to_string()))?
	})
}
