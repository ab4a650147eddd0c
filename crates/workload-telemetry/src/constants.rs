// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub const DEFAULT_LOG_GROUP: &str = "/aws/application/logs";
pub const DEFAULT_METRIC_NAMESPACE: &str = "Application/Custom";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_ITERATIONS: u32 = 100;
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

pub const STREAM_NAME_PREFIX: &str = "app-instance";

/// Backend naming and payload limits.
pub const MAX_LOG_GROUP_NAME_LEN: usize = 512;
pub const MAX_METRIC_NAMESPACE_LEN: usize = 255;
pub const MAX_METRIC_DATUMS_PER_REQUEST: usize = 1000;

pub const PROCESSING_TIME: &str = "ProcessingTime";
pub const REQUEST_COUNT: &str = "RequestCount";
pub const ERROR_COUNT: &str = "ErrorCount";
pub const SUCCESS_COUNT: &str = "SuccessCount";
pub const MEMORY_UTILIZATION: &str = "MemoryUtilization";
