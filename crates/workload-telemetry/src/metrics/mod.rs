// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod observation;
pub mod sink;

pub use observation::{MetricObservation, Unit};
pub use sink::{HttpMetricSink, MetricSink};
