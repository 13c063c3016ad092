/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::response::IcapResponseParseError;

#[derive(Debug, Error)]
pub enum IcapDriverError {
    #[error("no open connection to close")]
    ConnectionNotOpen,
    #[error("connection already open")]
    ConnectionAlreadyOpen,
    #[error("failed to resolve {0}: {1:?}")]
    ResolveFailed(String, io::Error),
    #[error("no resolved socket address for {0}")]
    NoResolvedAddress(String),
    #[error("dial failed: {0:?}")]
    DialFailed(io::Error),
    #[error("dial timed out")]
    DialTimeout,
    #[error("dial cancelled")]
    DialCancelled,
    #[error("socket setup failed: {0:?}")]
    SocketSetupFailed(io::Error),
    #[error("tls setup failed: {0:?}")]
    TlsSetupFailed(anyhow::Error),
    #[error("tls handshake failed: {0:?}")]
    TlsHandshakeFailed(io::Error),
    #[error("tls handshake timed out")]
    TlsHandshakeTimeout,
    #[error("write to icap server failed: {0:?}")]
    WriteFailed(io::Error),
    #[error("close failed: {0:?}")]
    CloseFailed(io::Error),
}

#[derive(Debug, Error)]
pub enum IcapClientError {
    #[error("transport error: {0}")]
    Driver(#[from] IcapDriverError),
    #[error("invalid icap response: {0}")]
    InvalidResponse(#[from] IcapResponseParseError),
}
