// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Bugsnag notifier.
//!
//! This crate provides the report model shared by the client SDK: reports,
//! severities, metadata sections, breadcrumbs and user identity. It performs
//! no I/O; building, filtering and delivering reports lives in `bugsnag`.
//!
//! # Overview
//!
//! - [`Report`] snapshots one error occurrence. Its class, message and
//!   stacktrace are fixed at construction; context, grouping hash, severity,
//!   metadata and user may be changed before dispatch.
//! - [`Metadata`] groups [`MetadataValue`]s into named sections.
//! - [`Breadcrumb`] records an event that happened before the error.

pub mod breadcrumb;
pub mod error;
pub mod metadata;
pub mod report;
pub mod severity;
pub mod user;

pub use breadcrumb::{Breadcrumb, BreadcrumbMetadata, BreadcrumbType};
pub use error::{ReportError, Result};
pub use metadata::{Metadata, MetadataValue};
pub use report::{AppInfo, ErrorDetails, Report, PAYLOAD_VERSION};
pub use severity::Severity;
pub use user::User;
