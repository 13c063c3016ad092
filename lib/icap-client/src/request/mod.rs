/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use bytes::Bytes;
use http::{Request, Response};
use url::{Host, Url};

use crate::header::IcapHeaderMap;
use crate::service::IcapMethod;

mod error;
pub use error::IcapRequestError;

mod encode;

mod preview;
pub use preview::IcapPreview;

pub const DEFAULT_ICAP_PORT: u16 = 1344;
pub const DEFAULT_CHUNK_LENGTH: usize = 512;

/// One ICAP request, optionally carrying the http messages to adapt.
///
/// The method/payload combination and the url are checked on construction.
#[derive(Debug)]
pub struct IcapRequest {
    method: IcapMethod,
    url: Url,
    host: String,
    headers: IcapHeaderMap,
    http_request: Option<Request<Bytes>>,
    http_response: Option<Response<Bytes>>,
    chunk_length: usize,
    preview: Option<IcapPreview>,
}

impl IcapRequest {
    pub fn new(
        method: &str,
        url: &str,
        http_request: Option<Request<Bytes>>,
        http_response: Option<Response<Bytes>>,
    ) -> Result<Self, IcapRequestError> {
        let method = IcapMethod::from_str(method)
            .map_err(|_| IcapRequestError::InvalidMethod(method.to_string()))?;

        let url = Url::parse(url)?;
        if !url.scheme().eq_ignore_ascii_case("icap") {
            return Err(IcapRequestError::InvalidScheme(url.scheme().to_string()));
        }
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => String::new(),
        };
        if host.is_empty() {
            return Err(IcapRequestError::InvalidHost);
        }

        match method {
            IcapMethod::Reqmod => {
                if http_request.is_none() {
                    return Err(IcapRequestError::ReqmodMissingRequest);
                }
                if http_response.is_some() {
                    return Err(IcapRequestError::ReqmodHasResponse);
                }
            }
            IcapMethod::Respmod => {
                if http_response.is_none() {
                    return Err(IcapRequestError::RespmodMissingResponse);
                }
            }
            IcapMethod::Options => {
                if http_request.is_some() || http_response.is_some() {
                    return Err(IcapRequestError::OptionsHasPayload);
                }
            }
        }

        Ok(IcapRequest {
            method,
            url,
            host,
            headers: IcapHeaderMap::new(),
            http_request,
            http_response,
            chunk_length: DEFAULT_CHUNK_LENGTH,
            preview: None,
        })
    }

    #[inline]
    pub fn method(&self) -> IcapMethod {
        self.method
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The host to dial, without the brackets of an IPv6 literal.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.url.port().unwrap_or(DEFAULT_ICAP_PORT)
    }

    #[inline]
    pub fn headers(&self) -> &IcapHeaderMap {
        &self.headers
    }

    /// The `Encapsulated` header is always computed on encode, so a value set
    /// here is ignored.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut IcapHeaderMap {
        &mut self.headers
    }

    #[inline]
    pub fn http_request(&self) -> Option<&Request<Bytes>> {
        self.http_request.as_ref()
    }

    #[inline]
    pub fn http_response(&self) -> Option<&Response<Bytes>> {
        self.http_response.as_ref()
    }

    #[inline]
    pub fn chunk_length(&self) -> usize {
        self.chunk_length
    }

    /// Chunk size used when sending the body left over after preview.
    /// 0 restores the default.
    pub fn set_chunk_length(&mut self, len: usize) {
        self.chunk_length = if len == 0 { DEFAULT_CHUNK_LENGTH } else { len };
    }

    #[inline]
    pub fn preview(&self) -> Option<&IcapPreview> {
        self.preview.as_ref()
    }

    /// Add `Allow: 204` and a `Host` header with the local host name unless
    /// the caller set them already.
    pub fn set_default_headers(&mut self) {
        if !self.headers.contains_key("Allow") {
            self.headers.append("Allow", "204");
        }
        if !self.headers.contains_key("Host") {
            self.headers.append("Host", crate::hostname::hostname());
        }
    }

    /// The body preview negotiation works on.
    fn adapted_body(&self) -> Option<&Bytes> {
        match self.method {
            IcapMethod::Reqmod => self.http_request.as_ref().map(|r| r.body()),
            IcapMethod::Respmod => self.http_response.as_ref().map(|r| r.body()),
            IcapMethod::Options => None,
        }
    }
}
