/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::Utf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IcapLineParseError {
    #[error("not long enough")]
    NotLongEnough,
    #[error("no delimiter '{0}' found")]
    NoDelimiterFound(char),
    #[error("missing header name")]
    MissingHeaderName,
    #[error("invalid utf8 encoding: {0}")]
    InvalidUtf8Encoding(#[from] Utf8Error),
    #[error("invalid icap version")]
    InvalidIcapVersion,
    #[error("invalid status code")]
    InvalidStatusCode,
    #[error("missing reason phrase")]
    MissingReason,
    #[error("invalid chunk size")]
    InvalidChunkSize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncapsulatedParseError {
    #[error("empty value")]
    Empty,
    #[error("no '=' found in entry {0}")]
    NoDelimiter(String),
    #[error("unknown key {0}")]
    UnknownKey(String),
    #[error("invalid offset value in entry {0}")]
    InvalidOffset(String),
    #[error("duplicate key {0}")]
    DuplicateKey(&'static str),
    #[error("{0} must be the last entry")]
    BodyNotLast(&'static str),
    #[error("no body class entry at the end")]
    MissingBodyEntry,
    #[error("offset of {0} goes backwards")]
    OffsetNotIncreasing(&'static str),
}
