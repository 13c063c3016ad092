/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

mod config;
pub use config::{DEFAULT_IO_TIMEOUT, IcapServiceConfig, TcpKeepAliveConfig};

mod tls;
pub use tls::{IcapTlsClientConfig, IcapTlsTrust};

mod error;
pub use error::{IcapClientError, IcapDriverError};

mod cancel;
pub use cancel::DialCancelToken;

mod connection;
pub use connection::{IcapClientReader, IcapStream};
use connection::{IcapClientConnection, IcapConnector};

mod driver;
pub use driver::IcapDriver;

mod client;
pub use client::IcapClient;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IcapMethod {
    Options,
    Reqmod,
    Respmod,
}

impl IcapMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcapMethod::Options => "OPTIONS",
            IcapMethod::Reqmod => "REQMOD",
            IcapMethod::Respmod => "RESPMOD",
        }
    }
}

impl fmt::Display for IcapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IcapMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPTIONS" => Ok(IcapMethod::Options),
            "REQMOD" => Ok(IcapMethod::Reqmod),
            "RESPMOD" => Ok(IcapMethod::Respmod),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_case() {
        assert_eq!(IcapMethod::from_str("respmod"), Ok(IcapMethod::Respmod));
        assert_eq!(IcapMethod::from_str("ReqMod"), Ok(IcapMethod::Reqmod));
        assert_eq!(IcapMethod::from_str("OPTIONS"), Ok(IcapMethod::Options));
        assert!(IcapMethod::from_str("GET").is_err());
        assert_eq!(IcapMethod::Respmod.to_string(), "RESPMOD");
    }
}
