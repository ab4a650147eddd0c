// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ordered narration of the workload into a single log stream.
//!
//! ```text
//!   TelemetryEmitter
//!         │ append(severity, message)
//!         v
//!   LogStreamWriter ── cursor k ──> LogBackend::put_record
//!         ^                               │
//!         └──────── cursor k+1 ───────────┘
//! ```

pub mod backend;
pub mod record;
pub mod writer;

pub use backend::{HttpLogBackend, LogBackend, PutOutcome, StreamCreation};
pub use record::{LogRecord, SequencingCursor, Severity};
pub use writer::{AppendOutcome, LogStreamWriter};
