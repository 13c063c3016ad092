/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use super::{DialCancelToken, IcapClientError, IcapDriver, IcapMethod, IcapServiceConfig};
use crate::request::IcapRequest;
use crate::response::IcapResponse;

/// Progress of one request exchange.
enum ExchangeState {
    Idle,
    Connected,
    ResponseReceived(IcapResponse),
    /// Holds the encoded remainder of a preview body.
    AwaitingContinuation(Vec<u8>),
    Done(IcapResponse),
}

/// Runs request/response exchanges with an ICAP service, one connection per
/// exchange.
pub struct IcapClient {
    config: Arc<IcapServiceConfig>,
    driver: Option<IcapDriver>,
}

impl IcapClient {
    /// The connection target is taken from each request's url.
    pub fn new(config: Arc<IcapServiceConfig>) -> Self {
        IcapClient {
            config,
            driver: None,
        }
    }

    /// Use `driver` for every exchange instead of dialing the request url.
    /// A driver that is already connected is used as is.
    pub fn with_driver(driver: IcapDriver) -> Self {
        IcapClient {
            config: driver.config().clone(),
            driver: Some(driver),
        }
    }

    pub fn execute(&mut self, req: &mut IcapRequest) -> Result<IcapResponse, IcapClientError> {
        self.do_execute(req, None)
    }

    /// Like [`IcapClient::execute`], but the dial can be aborted through
    /// `token`.
    pub fn execute_with_cancel(
        &mut self,
        req: &mut IcapRequest,
        token: &DialCancelToken,
    ) -> Result<IcapResponse, IcapClientError> {
        self.do_execute(req, Some(token))
    }

    fn do_execute(
        &mut self,
        req: &mut IcapRequest,
        token: Option<&DialCancelToken>,
    ) -> Result<IcapResponse, IcapClientError> {
        let (mut driver, injected) = match self.driver.take() {
            Some(driver) => (driver, true),
            None => (
                IcapDriver::new(req.host(), req.port(), self.config.clone()),
                false,
            ),
        };

        let r = self.run_exchange(&mut driver, req, token);

        if driver.is_connected() {
            if let Err(e) = driver.close() {
                if let Some(logger) = self.config.logger() {
                    slog::info!(logger, "failed to close icap connection: {}", e;
                        "host" => driver.host(),
                        "port" => driver.port(),
                    );
                }
            }
        }
        if injected {
            self.driver = Some(driver);
        }
        r
    }

    fn run_exchange(
        &self,
        driver: &mut IcapDriver,
        req: &mut IcapRequest,
        token: Option<&DialCancelToken>,
    ) -> Result<IcapResponse, IcapClientError> {
        let mut state = ExchangeState::Idle;
        loop {
            state = match state {
                ExchangeState::Idle => {
                    if !driver.is_connected() {
                        match token {
                            Some(token) => driver.connect_with_cancel(token)?,
                            None => driver.connect()?,
                        }
                    }
                    ExchangeState::Connected
                }
                ExchangeState::Connected => {
                    req.set_default_headers();
                    driver.send(&req.encode())?;
                    let rsp = self.receive_response(driver, req.method())?;
                    ExchangeState::ResponseReceived(rsp)
                }
                ExchangeState::ResponseReceived(rsp) => match req.encode_remainder() {
                    Some(data) if rsp.is_continue() => ExchangeState::AwaitingContinuation(data),
                    _ => ExchangeState::Done(rsp),
                },
                ExchangeState::AwaitingContinuation(data) => {
                    driver.send(&data)?;
                    let rsp = self.receive_response(driver, req.method())?;
                    ExchangeState::Done(rsp)
                }
                ExchangeState::Done(rsp) => return Ok(rsp),
            };
        }
    }

    fn receive_response(
        &self,
        driver: &mut IcapDriver,
        method: IcapMethod,
    ) -> Result<IcapResponse, IcapClientError> {
        let reader = driver.receive()?;
        let rsp = IcapResponse::parse(reader, method, self.config.max_header_size())?;
        if let Some(logger) = self.config.logger() {
            slog::debug!(logger, "received icap response";
                "method" => method.as_str(),
                "code" => rsp.code,
                "reason" => &rsp.reason,
                "body_bytes" => rsp.body.len(),
            );
        }
        Ok(rsp)
    }
}
