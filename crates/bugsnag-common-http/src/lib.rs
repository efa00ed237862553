// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the Bugsnag notifier.
//!
//! Provides a pre-configured `reqwest` client builder with a consistent
//! User-Agent header.

mod client;

pub use client::{builder, new_client_with_timeout, user_agent, NOTIFIER_NAME};
