/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::embedded::HttpHeaderParseError;
use crate::parse::{EncapsulatedParseError, IcapLineParseError};

#[derive(Debug, Error)]
pub enum IcapResponseParseError {
    #[error("remote closed")]
    RemoteClosed,
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("too large header, should be less than {0}")]
    TooLargeHeader(usize),
    #[error("invalid status line: {0}")]
    InvalidStatusLine(IcapLineParseError),
    #[error("invalid header line: {0}")]
    InvalidHeaderLine(IcapLineParseError),
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(&'static str),
    #[error("malformed Encapsulated header: {0}")]
    MalformedEncapsulated(EncapsulatedParseError),
    #[error("unknown Encapsulated key {0}")]
    UnknownEncapsulatedKey(String),
    #[error("invalid embedded http header: {0}")]
    InvalidHttpHeader(HttpHeaderParseError),
    #[error("invalid chunk size line: {0}")]
    InvalidChunkSize(IcapLineParseError),
    #[error("invalid chunked body: {0}")]
    InvalidChunkedBody(&'static str),
    #[error("io failed: {0:?}")]
    IoFailed(#[from] io::Error),
}

impl From<EncapsulatedParseError> for IcapResponseParseError {
    fn from(e: EncapsulatedParseError) -> Self {
        match e {
            EncapsulatedParseError::UnknownKey(key) => {
                IcapResponseParseError::UnknownEncapsulatedKey(key)
            }
            e => IcapResponseParseError::MalformedEncapsulated(e),
        }
    }
}

pub(super) fn map_read_exact(e: io::Error) -> IcapResponseParseError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        IcapResponseParseError::UnexpectedEof
    } else {
        IcapResponseParseError::IoFailed(e)
    }
}
