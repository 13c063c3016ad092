/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IcapRequestError {
    #[error("invalid icap method {0}")]
    InvalidMethod(String),
    #[error("invalid icap url: {0}")]
    InvalidUrl(url::ParseError),
    #[error("unsupported url scheme {0}, expect icap")]
    InvalidScheme(String),
    #[error("no host found in icap url")]
    InvalidHost,
    #[error("REQMOD request without embedded http request")]
    ReqmodMissingRequest,
    #[error("REQMOD request should not carry an http response")]
    ReqmodHasResponse,
    #[error("RESPMOD request without embedded http response")]
    RespmodMissingResponse,
    #[error("OPTIONS request should not carry embedded http messages")]
    OptionsHasPayload,
}

impl From<url::ParseError> for IcapRequestError {
    fn from(e: url::ParseError) -> Self {
        match e {
            url::ParseError::EmptyHost => IcapRequestError::InvalidHost,
            e => IcapRequestError::InvalidUrl(e),
        }
    }
}
