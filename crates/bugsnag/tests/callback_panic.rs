// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bugsnag::{Client, Configuration, Delivery, NotifyOptions, Result};
use tokio::sync::oneshot;

#[derive(Default)]
struct RecordingDelivery {
	payloads: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl Delivery for RecordingDelivery {
	async fn deliver(&self, _endpoint: &str, payload: &serde_json::Value) -> Result<()> {
		self.payloads.lock().unwrap().push(payload.clone());
		Ok(())
	}
}

#[derive(Debug)]
struct Timeout;

impl fmt::Display for Timeout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "operation timed out")
	}
}

impl std::error::Error for Timeout {}

fn client_with_panicking_callback() -> (Client, Arc<RecordingDelivery>) {
	let delivery = Arc::new(RecordingDelivery::default());
	let client = Client::with_delivery(Configuration::new("key"), delivery.clone()).unwrap();
	client
		.config()
		.register_before_send_callback(|_| panic!("callback bug"));
	assert!(client.install_panic_hook());
	(client, delivery)
}

#[tokio::test]
async fn panicking_callback_vetoes_notify_with_hook_installed() {
	let (client, delivery) = client_with_panicking_callback();
	let (tx, rx) = oneshot::channel();

	client
		.notify(
			&Timeout,
			NotifyOptions::new().blocking(true).post_send(move |sent| {
				let _ = tx.send(sent);
			}),
		)
		.await
		.unwrap();

	assert!(!rx.await.unwrap());
	assert!(delivery.payloads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn panicking_one_shot_callback_is_not_reported_as_panic() {
	let delivery = Arc::new(RecordingDelivery::default());
	let client = Client::with_delivery(Configuration::new("key"), delivery.clone()).unwrap();
	assert!(client.install_panic_hook());
	let (tx, rx) = oneshot::channel();

	client
		.notify(
			&Timeout,
			NotifyOptions::new()
				.blocking(true)
				.before_send(|_| panic!("one-shot bug"))
				.post_send(move |sent| {
					let _ = tx.send(sent);
				}),
		)
		.await
		.unwrap();

	assert!(!rx.await.unwrap());
	let payloads = delivery.payloads.lock().unwrap();
	assert!(payloads
		.iter()
		.all(|p| p["events"][0]["exceptions"][0]["message"] != "one-shot bug"));
}

#[test]
fn thread_panic_survives_panicking_callback() {
	let (_client, delivery) = client_with_panicking_callback();

	let result = std::thread::Builder::new()
		.name("worker".to_string())
		.spawn(|| panic!("worker exploded"))
		.unwrap()
		.join();

	assert!(result.is_err());
	assert!(delivery.payloads.lock().unwrap().is_empty());
}
