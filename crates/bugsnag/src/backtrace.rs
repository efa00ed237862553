// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and formatting for reports.

use rustc_demangle::demangle;
use std::backtrace::Backtrace;

/// A single parsed backtrace frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	pub function: String,
	pub module: Option<String>,
	pub location: Option<String>,
	pub in_project: bool,
}

/// Leading frames that belong to the capture machinery itself.
const CAPTURE_PREFIXES: &[&str] = &[
	"std::backtrace",
	"<std::backtrace",
	"std::panicking",
	"core::panicking",
	"bugsnag::backtrace",
	"bugsnag::client",
	"bugsnag::panic_hook",
	"<alloc::boxed::Box<F,A> as core::ops::function::Fn",
];

/// Parse a Rust backtrace into frames.
pub fn parse_backtrace(backtrace: &Backtrace) -> Vec<Frame> {
	parse_backtrace_string(&backtrace.to_string())
}

/// Parse backtrace output into frames.
///
/// Function lines look like `  3: my_app::main`; the optional following
/// `at src/main.rs:10:5` line is attached to that frame.
fn parse_backtrace_string(bt_string: &str) -> Vec<Frame> {
	let mut frames: Vec<Frame> = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(last) = frames.last_mut() {
				if last.location.is_none() {
					last.location = Some(location.trim().to_string());
				}
			}
			continue;
		}

		if let Some(frame) = parse_frame_line(line) {
			frames.push(frame);
		}
	}

	let skip = frames
		.iter()
		.take_while(|f| CAPTURE_PREFIXES.iter().any(|p| f.function.starts_with(p)))
		.count();
	frames.split_off(skip)
}

/// Parse a single function line into a Frame.
fn parse_frame_line(line: &str) -> Option<Frame> {
	let line = line.trim();

	let function_part = match line.split_once(':') {
		Some((prefix, rest)) if prefix.trim().parse::<u32>().is_ok() => rest.trim(),
		_ => line,
	};

	if function_part.is_empty() {
		return None;
	}

	// `{:#}` drops the trailing hash
	let function = format!("{:#}", demangle(function_part));

	// e.g., "my_app::handlers::process" -> "my_app::handlers"
	let module = function.rfind("::").map(|idx| function[..idx].to_string());
	let in_project = is_in_project_frame(&function);

	Some(Frame {
		function,
		module,
		location: None,
		in_project,
	})
}

/// Determine if a frame is from application code vs the standard library.
fn is_in_project_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"futures::",
		"<futures::",
		"async_trait::",
		"tracing::",
		"<tracing::",
		"bugsnag::",
		"<bugsnag::",
		"panic_unwind::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
		"__libc_start",
		"_start",
	];

	const SYSTEM_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::rt::",
		"::sys_common::",
	];

	!SYSTEM_PREFIXES.iter().any(|p| function.starts_with(p))
		&& !SYSTEM_CONTAINS.iter().any(|c| function.contains(c))
}

/// Render frames as a newline separated trace.
///
/// Application frames are marked with a leading `*`.
pub fn format_frames(frames: &[Frame]) -> String {
	frames
		.iter()
		.map(|frame| {
			let marker = if frame.in_project { "*" } else { " " };
			match &frame.location {
				Some(location) => format!("{marker} {} ({location})", frame.function),
				None => format!("{marker} {}", frame.function),
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Capture a fresh backtrace and format it.
pub fn capture_stacktrace() -> String {
	let backtrace = Backtrace::force_capture();
	format_frames(&parse_backtrace(&backtrace))
}
