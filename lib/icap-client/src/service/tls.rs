/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Which server certificates a TLS connection accepts.
#[derive(Clone, Debug)]
pub enum IcapTlsTrust {
    /// The Mozilla root set bundled through `webpki-roots`.
    WebPkiRoots,
    /// Only chains ending at one of these CA certificates.
    Certificates(Vec<CertificateDer<'static>>),
    /// Accept any certificate.
    Insecure,
}

#[derive(Clone, Debug)]
pub struct IcapTlsClientConfig {
    trust: IcapTlsTrust,
    server_name: Option<String>,
    pub(crate) handshake_timeout: Duration,
}

impl IcapTlsClientConfig {
    pub fn new(trust: IcapTlsTrust) -> Self {
        IcapTlsClientConfig {
            trust,
            server_name: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Override the name used for SNI and certificate verification.
    pub fn set_server_name(&mut self, name: String) {
        self.server_name = Some(name);
    }

    pub fn set_handshake_timeout(&mut self, timeout: Duration) {
        self.handshake_timeout = timeout;
    }

    pub(crate) fn server_name(&self, host: &str) -> anyhow::Result<ServerName<'static>> {
        let name = self.server_name.as_deref().unwrap_or(host);
        ServerName::try_from(name.to_string())
            .map_err(|e| anyhow!("invalid tls server name {name}: {e}"))
    }

    pub(crate) fn build(&self) -> anyhow::Result<Arc<ClientConfig>> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .context("failed to set tls protocol versions")?;

        let config = match &self.trust {
            IcapTlsTrust::WebPkiRoots => {
                let roots = RootCertStore {
                    roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
                };
                builder.with_root_certificates(roots).with_no_client_auth()
            }
            IcapTlsTrust::Certificates(certs) => {
                let mut roots = RootCertStore::empty();
                for cert in certs {
                    roots
                        .add(cert.clone())
                        .context("failed to add ca certificate")?;
                }
                builder.with_root_certificates(roots).with_no_client_auth()
            }
            IcapTlsTrust::Insecure => builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoServerCertVerifier::new(&provider)))
                .with_no_client_auth(),
        };
        Ok(Arc::new(config))
    }
}

#[derive(Debug)]
struct NoServerCertVerifier {
    schemes: Vec<SignatureScheme>,
}

impl NoServerCertVerifier {
    fn new(provider: &CryptoProvider) -> Self {
        NoServerCertVerifier {
            schemes: provider
                .signature_verification_algorithms
                .supported_schemes(),
        }
    }
}

impl ServerCertVerifier for NoServerCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_configs() {
        let config = IcapTlsClientConfig::new(IcapTlsTrust::WebPkiRoots);
        assert!(config.build().is_ok());

        let config = IcapTlsClientConfig::new(IcapTlsTrust::Insecure);
        assert!(config.build().is_ok());

        let config = IcapTlsClientConfig::new(IcapTlsTrust::Certificates(vec![
            CertificateDer::from(vec![0u8; 4]),
        ]));
        assert!(config.build().is_err());
    }

    #[test]
    fn server_name() {
        let mut config = IcapTlsClientConfig::new(IcapTlsTrust::Insecure);
        assert!(config.server_name("icap.example.net").is_ok());
        assert!(config.server_name("127.0.0.1").is_ok());
        config.set_server_name("scanner.example.net".to_string());
        let name = config.server_name("127.0.0.1").unwrap();
        assert_eq!(name.to_str(), "scanner.example.net");
    }
}
