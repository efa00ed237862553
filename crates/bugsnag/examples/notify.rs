// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Report an error using the bugsnag SDK.
//!
//! Run with:
//!   BUGSNAG_API_KEY=... cargo run --example notify -p bugsnag

use std::collections::BTreeMap;

use bugsnag::{Client, Configuration, MetadataValue, NotifyOptions, Severity};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = Configuration::from_env()?
		.with_app_version("0.1.0-example")
		.with_release_stage("development");

	println!("Initializing Bugsnag client...");
	println!("  Endpoint: {}", config.delivery.endpoint);

	let client = Client::new(config)?;
	client.install_panic_hook();

	client.config().register_before_send_callback(|report| {
		report.add_metadata("example", "filtered", false);
		true
	});

	client.set_user("user_example_123", "Example User", "example@example.com");
	client.leave_breadcrumb("Application started", None);
	client.leave_breadcrumb(
		"Loaded settings",
		Some(
			BTreeMap::from([
				("type".to_string(), MetadataValue::from("state")),
				("theme".to_string(), MetadataValue::from("dark")),
			])
			.into(),
		),
	);

	let error = std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml not found");

	client
		.notify(
			&error,
			NotifyOptions::new()
				.blocking(true)
				.before_send(|report| {
					report.severity = Severity::Error;
					report.context = Some("settings".to_string());
				})
				.post_send(|sent| println!("Report sent: {sent}")),
		)
		.await?;

	client.shutdown().await;
	Ok(())
}
