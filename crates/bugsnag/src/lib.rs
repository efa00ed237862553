// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bugsnag error reporting SDK for Rust applications.
//!
//! The [`Client`] builds a [`Report`] for each error, attaches the current
//! breadcrumbs and user, runs before-send callbacks, applies release-stage
//! filtering and hands the payload to a [`Delivery`].
//!
//! Delivery failures never propagate to the caller: they are logged and
//! passed to the optional post-send callback as `false`.

pub mod backtrace;
mod client;
pub mod config;
pub mod delivery;
mod error;
mod panic_hook;

pub use client::{Client, NotifyOptions, OneShotCallback, PostSendCallback};
pub use config::{
	BeforeSendCallback, CallbackId, Configuration, StandardDelivery, DEFAULT_ENDPOINT,
	DEFAULT_MAX_BREADCRUMBS, NOTIFIER_VERSION,
};
pub use delivery::{notify_payload, Delivery, HttpDelivery, PANIC_DELIVERY_TIMEOUT};
pub use error::{BugsnagError, Result};

pub use bugsnag_core::{
	AppInfo, Breadcrumb, BreadcrumbMetadata, BreadcrumbType, ErrorDetails, Metadata,
	MetadataValue, Report, ReportError, Severity, User,
};
