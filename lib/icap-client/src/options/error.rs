/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IcapOptionsParseError {
    #[error("request failed: {0} {1}")]
    RequestFailed(u16, String),
    #[error("method not match")]
    MethodNotMatch,
    #[error("no ISTag set")]
    NoServiceTagSet,
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(&'static str),
}
