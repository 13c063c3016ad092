/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;
use std::sync::Arc;

use super::{
    DialCancelToken, IcapClientConnection, IcapClientReader, IcapConnector, IcapDriverError,
    IcapServiceConfig,
};

/// Blocking transport for one ICAP service endpoint.
///
/// A driver owns at most one connection. Connecting twice without a close in
/// between is an error.
pub struct IcapDriver {
    host: String,
    port: u16,
    config: Arc<IcapServiceConfig>,
    conn: Option<IcapClientConnection>,
}

impl IcapDriver {
    pub fn new(host: &str, port: u16, config: Arc<IcapServiceConfig>) -> Self {
        IcapDriver {
            host: host.to_string(),
            port,
            config,
            conn: None,
        }
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub(crate) fn config(&self) -> &Arc<IcapServiceConfig> {
        &self.config
    }

    /// Dial bounded by the configured dial timeout.
    pub fn connect(&mut self) -> Result<(), IcapDriverError> {
        self.do_connect(None)
    }

    /// Dial bounded by the configured dial timeout, aborting early once
    /// `token` is cancelled.
    pub fn connect_with_cancel(&mut self, token: &DialCancelToken) -> Result<(), IcapDriverError> {
        self.do_connect(Some(token))
    }

    fn do_connect(&mut self, token: Option<&DialCancelToken>) -> Result<(), IcapDriverError> {
        if self.conn.is_some() {
            return Err(IcapDriverError::ConnectionAlreadyOpen);
        }

        let connector = IcapConnector::new(&self.host, self.port, &self.config);
        match connector.create(token) {
            Ok(conn) => {
                if let Some(logger) = self.config.logger() {
                    slog::debug!(logger, "connected to icap server";
                        "host" => &self.host,
                        "port" => self.port,
                        "tls" => self.config.tls_client.is_some(),
                    );
                }
                self.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                if let Some(logger) = self.config.logger() {
                    slog::info!(logger, "failed to connect to icap server: {}", e;
                        "host" => &self.host,
                        "port" => self.port,
                    );
                }
                Err(e)
            }
        }
    }

    pub fn send(&mut self, data: &[u8]) -> Result<(), IcapDriverError> {
        let Some(conn) = &mut self.conn else {
            return Err(IcapDriverError::ConnectionNotOpen);
        };
        let writer = conn.writer();
        writer
            .write_all(data)
            .map_err(IcapDriverError::WriteFailed)?;
        writer.flush().map_err(IcapDriverError::WriteFailed)?;
        if let Some(logger) = self.config.logger() {
            slog::debug!(logger, "sent icap data";
                "bytes" => data.len(),
                "data" => String::from_utf8_lossy(data).as_ref(),
            );
        }
        Ok(())
    }

    /// The buffered reader over the live connection.
    ///
    /// Buffered data survives between calls, so bytes that arrived ahead of
    /// a parse are still there for the next one.
    pub fn receive(&mut self) -> Result<&mut IcapClientReader, IcapDriverError> {
        match &mut self.conn {
            Some(conn) => Ok(&mut conn.reader),
            None => Err(IcapDriverError::ConnectionNotOpen),
        }
    }

    pub fn close(&mut self) -> Result<(), IcapDriverError> {
        let Some(mut conn) = self.conn.take() else {
            return Err(IcapDriverError::ConnectionNotOpen);
        };
        let stream = conn.writer();
        stream.flush().map_err(IcapDriverError::CloseFailed)?;
        stream.shutdown().map_err(IcapDriverError::CloseFailed)?;
        if let Some(logger) = self.config.logger() {
            slog::debug!(logger, "closed icap connection";
                "host" => &self.host,
                "port" => self.port,
            );
        }
        Ok(())
    }
}
