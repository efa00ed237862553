// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use bugsnag::{
	BugsnagError, Client, Configuration, Delivery, ErrorDetails, HttpDelivery, NotifyOptions,
};
use tokio::sync::oneshot;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn delivery() -> HttpDelivery {
	HttpDelivery::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn posts_payload_with_notify_headers() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/"))
		.and(header("Bugsnag-Api-Key", "key"))
		.and(header("Bugsnag-Payload-Version", "4"))
		.and(header_exists("Bugsnag-Sent-At"))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(&server)
		.await;

	let payload = serde_json::json!({ "apiKey": "key", "events": [] });
	delivery().deliver(&server.uri(), &payload).await.unwrap();
}

#[tokio::test]
async fn server_error_is_reported() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
		.mount(&server)
		.await;

	let payload = serde_json::json!({ "apiKey": "key", "events": [] });
	let result = delivery().deliver(&server.uri(), &payload).await;

	match result {
		Err(BugsnagError::ServerError { status, message }) => {
			assert_eq!(status, 400);
			assert_eq!(message, "bad payload");
		}
		other => panic!("expected server error, got {other:?}"),
	}
}

#[tokio::test]
async fn rate_limit_reads_retry_after() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
		.mount(&server)
		.await;

	let payload = serde_json::json!({ "apiKey": "key", "events": [] });
	let result = delivery().deliver(&server.uri(), &payload).await;

	assert!(matches!(
		result,
		Err(BugsnagError::RateLimited {
			retry_after_secs: Some(30)
		})
	));
}

#[tokio::test]
async fn client_notify_reaches_endpoint() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(&server)
		.await;

	let config = Configuration::new("key")
		.with_endpoint(server.uri())
		.with_release_stage("production");
	let client = Client::with_delivery(config, Arc::new(delivery())).unwrap();
	client.leave_breadcrumb("opened invoice", Some("invoice 17".into()));

	let (tx, rx) = oneshot::channel();
	client
		.notify_details(
			ErrorDetails::new("InvoiceError", "total mismatch", "* billing::total"),
			NotifyOptions::new()
				.before_send(|report| report.add_metadata("invoice", "id", 17))
				.post_send(move |sent| {
					let _ = tx.send(sent);
				}),
		)
		.await
		.unwrap();

	let sent = tokio::time::timeout(Duration::from_secs(5), rx)
		.await
		.unwrap()
		.unwrap();
	assert!(sent);

	let requests = server.received_requests().await.unwrap();
	assert_eq!(requests.len(), 1);
	let body: serde_json::Value = requests[0].body_json().unwrap();
	let event = &body["events"][0];
	assert_eq!(body["apiKey"], "key");
	assert_eq!(event["exceptions"][0]["errorClass"], "InvoiceError");
	assert_eq!(event["metaData"]["invoice"]["id"], 17.0);
	assert_eq!(event["breadcrumbs"][0]["metaData"]["message"], "invoice 17");
	assert_eq!(event["app"]["releaseStage"], "production");
}

#[tokio::test]
async fn unreachable_endpoint_reports_not_sent() {
	let config = Configuration::new("key").with_endpoint("http://127.0.0.1:9");
	let client = Client::with_delivery(
		config,
		Arc::new(HttpDelivery::new(Duration::from_secs(2)).unwrap()),
	)
	.unwrap();

	let (tx, rx) = oneshot::channel();
	client
		.notify_details(
			ErrorDetails::new("Failure", "boom", ""),
			NotifyOptions::new().blocking(true).post_send(move |sent| {
				let _ = tx.send(sent);
			}),
		)
		.await
		.unwrap();

	assert!(!rx.await.unwrap());
}
