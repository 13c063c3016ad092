/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod embedded;
mod hostname;
mod parse;
mod serialize;

mod header;
pub use header::IcapHeaderMap;

pub use embedded::HttpHeaderParseError;
pub use parse::{
    Encapsulated, EncapsulatedEntry, EncapsulatedKey, EncapsulatedParseError, IcapLineParseError,
};

mod request;
pub use request::{
    DEFAULT_CHUNK_LENGTH, DEFAULT_ICAP_PORT, IcapPreview, IcapRequest, IcapRequestError,
};

mod response;
pub use response::{IcapResponse, IcapResponseParseError};

mod options;
pub use options::{IcapOptionsParseError, IcapServiceOptions};

mod service;
pub use service::{
    DEFAULT_IO_TIMEOUT, DialCancelToken, IcapClient, IcapClientError, IcapClientReader, IcapDriver,
    IcapDriverError, IcapMethod, IcapServiceConfig, IcapStream, IcapTlsClientConfig, IcapTlsTrust,
    TcpKeepAliveConfig,
};
