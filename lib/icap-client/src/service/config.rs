/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use slog::Logger;

use super::IcapTlsClientConfig;

/// Used for every dial/read/write timeout that is not set explicitly.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_TCP_KEEPALIVE_IDLE: Duration = Duration::from_secs(60);
const DEFAULT_MAX_HEADER_SIZE: usize = 8192;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TcpKeepAliveConfig {
    enabled: bool,
    idle_time: Duration,
    probe_interval: Option<Duration>,
}

impl Default for TcpKeepAliveConfig {
    fn default() -> Self {
        TcpKeepAliveConfig {
            enabled: false,
            idle_time: DEFAULT_TCP_KEEPALIVE_IDLE,
            probe_interval: None,
        }
    }
}

impl TcpKeepAliveConfig {
    pub fn default_enabled() -> Self {
        TcpKeepAliveConfig {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn set_enable(&mut self, enable: bool) {
        self.enabled = enable;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_idle_time(&mut self, idle_time: Duration) {
        self.idle_time = idle_time;
    }

    #[inline]
    pub fn idle_time(&self) -> Duration {
        self.idle_time
    }

    pub fn set_probe_interval(&mut self, probe_interval: Duration) {
        self.probe_interval = Some(probe_interval);
    }

    #[inline]
    pub fn probe_interval(&self) -> Option<Duration> {
        self.probe_interval
    }
}

/// Settings for talking to one ICAP service.
///
/// Host and port come from the request URL, everything else lives here.
pub struct IcapServiceConfig {
    dial_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    pub(crate) tcp_keepalive: TcpKeepAliveConfig,
    pub(crate) tls_client: Option<IcapTlsClientConfig>,
    pub(crate) max_header_size: usize,
    pub(crate) logger: Option<Logger>,
}

impl Default for IcapServiceConfig {
    fn default() -> Self {
        IcapServiceConfig {
            dial_timeout: None,
            read_timeout: None,
            write_timeout: None,
            tcp_keepalive: TcpKeepAliveConfig::default_enabled(),
            tls_client: None,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            logger: None,
        }
    }
}

impl IcapServiceConfig {
    pub fn set_dial_timeout(&mut self, timeout: Duration) {
        self.dial_timeout = Some(timeout);
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = Some(timeout);
    }

    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = Some(timeout);
    }

    pub fn set_tcp_keepalive(&mut self, config: TcpKeepAliveConfig) {
        self.tcp_keepalive = config;
    }

    pub fn set_tls_client(&mut self, config: IcapTlsClientConfig) {
        self.tls_client = Some(config);
    }

    pub fn set_max_header_size(&mut self, max_size: usize) {
        self.max_header_size = max_size;
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = Some(logger);
    }

    #[inline]
    pub fn dial_timeout(&self) -> Duration {
        self.dial_timeout.unwrap_or(DEFAULT_IO_TIMEOUT)
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout.unwrap_or(DEFAULT_IO_TIMEOUT)
    }

    #[inline]
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout.unwrap_or(DEFAULT_IO_TIMEOUT)
    }

    #[inline]
    pub fn max_header_size(&self) -> usize {
        self.max_header_size
    }

    #[inline]
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_fallback() {
        let mut config = IcapServiceConfig::default();
        assert_eq!(config.dial_timeout(), DEFAULT_IO_TIMEOUT);
        assert_eq!(config.read_timeout(), DEFAULT_IO_TIMEOUT);

        config.set_read_timeout(Duration::from_secs(2));
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.write_timeout(), DEFAULT_IO_TIMEOUT);
        assert!(config.tcp_keepalive.is_enabled());
    }
}
