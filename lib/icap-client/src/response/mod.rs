/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead, Read};

use bytes::Bytes;
use http::{Request, Response};

use crate::embedded::{parse_request_header, parse_response_header};
use crate::header::IcapHeaderMap;
use crate::parse::{Encapsulated, EncapsulatedKey, HeaderLine, StatusLine};
use crate::service::IcapMethod;

mod error;
pub use error::IcapResponseParseError;
use error::map_read_exact;

mod body;
use body::read_chunked_body;

/// Read one line, ending with '\n', of at most `max_size` bytes.
///
/// Returns 0 at end of stream. A line cut short by end of stream is an error.
pub(crate) fn read_line_limited<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_size: usize,
) -> Result<usize, IcapResponseParseError> {
    buf.clear();
    let nr = (&mut *reader)
        .take(max_size as u64)
        .read_until(b'\n', buf)?;
    if nr > 0 && buf.last() != Some(&b'\n') {
        return if nr >= max_size {
            Err(IcapResponseParseError::TooLargeHeader(max_size))
        } else {
            Err(IcapResponseParseError::UnexpectedEof)
        };
    }
    Ok(nr)
}

/// A decoded ICAP response.
#[derive(Debug)]
pub struct IcapResponse {
    pub code: u16,
    pub reason: String,
    pub headers: IcapHeaderMap,
    pub encapsulated: Option<Encapsulated>,
    /// Value of the `Preview` header, if any.
    pub preview_size: Option<usize>,
    pub http_request: Option<Request<Bytes>>,
    pub http_response: Option<Response<Bytes>>,
    /// The decoded body, whichever Encapsulated key it was sent under.
    pub body: Bytes,
    /// Set when the body ended with a `0; ieof` chunk.
    pub ieof: bool,
}

impl IcapResponse {
    fn new(code: u16, reason: &str) -> Self {
        IcapResponse {
            code,
            reason: reason.to_string(),
            headers: IcapHeaderMap::new(),
            encapsulated: None,
            preview_size: None,
            http_request: None,
            http_response: None,
            body: Bytes::new(),
            ieof: false,
        }
    }

    #[inline]
    pub fn is_continue(&self) -> bool {
        self.code == 100
    }

    #[inline]
    pub fn is_no_modification(&self) -> bool {
        self.code == 204
    }

    /// Read and decode one response.
    ///
    /// For OPTIONS the embedded header segments are skipped and only the raw
    /// body is kept.
    pub fn parse<R: BufRead>(
        reader: &mut R,
        method: IcapMethod,
        max_header_size: usize,
    ) -> Result<Self, IcapResponseParseError> {
        let mut line_buf = Vec::<u8>::with_capacity(128);
        let mut header_size: usize = 0;

        let mut rsp = loop {
            let nr = read_line_limited(reader, &mut line_buf, max_header_size)?;
            if nr == 0 {
                return Err(IcapResponseParseError::RemoteClosed);
            }
            header_size += nr;
            if header_size > max_header_size {
                return Err(IcapResponseParseError::TooLargeHeader(max_header_size));
            }
            if matches!(line_buf.as_slice(), b"\r\n" | b"\n") {
                // tolerate stray line ends left over from a previous message
                continue;
            }
            let status =
                StatusLine::parse(&line_buf).map_err(IcapResponseParseError::InvalidStatusLine)?;
            break IcapResponse::new(status.code, status.reason);
        };

        loop {
            let nr = read_line_limited(reader, &mut line_buf, max_header_size)?;
            if nr == 0 {
                return Err(IcapResponseParseError::UnexpectedEof);
            }
            header_size += nr;
            if header_size > max_header_size {
                return Err(IcapResponseParseError::TooLargeHeader(max_header_size));
            }
            if matches!(line_buf.as_slice(), b"\r\n" | b"\n") {
                break;
            }

            let header =
                HeaderLine::parse(&line_buf).map_err(IcapResponseParseError::InvalidHeaderLine)?;
            rsp.headers.append(header.name, header.value);
        }

        if let Some(v) = rsp.headers.get("Preview") {
            let size = atoi::atoi::<usize>(v.as_bytes())
                .ok_or(IcapResponseParseError::InvalidHeaderValue("Preview"))?;
            rsp.preview_size = Some(size);
        }

        let Some(value) = rsp.headers.get("Encapsulated") else {
            return Ok(rsp);
        };
        let encapsulated = Encapsulated::parse(value)?;
        rsp.read_encapsulated(reader, &encapsulated, method, max_header_size)?;
        rsp.encapsulated = Some(encapsulated);
        Ok(rsp)
    }

    fn read_encapsulated<R: BufRead>(
        &mut self,
        reader: &mut R,
        encapsulated: &Encapsulated,
        method: IcapMethod,
        max_header_size: usize,
    ) -> Result<(), IcapResponseParseError> {
        if encapsulated.leading_len() > max_header_size {
            return Err(IcapResponseParseError::TooLargeHeader(max_header_size));
        }
        let junk = encapsulated.leading_len() as u64;
        if junk > 0 {
            let nr = io::copy(&mut (&mut *reader).take(junk), &mut io::sink())?;
            if nr < junk {
                return Err(IcapResponseParseError::UnexpectedEof);
            }
        }

        for segment in encapsulated.header_segments() {
            // the declared length comes from the peer
            if segment.len > max_header_size {
                return Err(IcapResponseParseError::TooLargeHeader(max_header_size));
            }
            let mut buf = vec![0u8; segment.len];
            reader.read_exact(&mut buf).map_err(map_read_exact)?;
            if method == IcapMethod::Options {
                continue;
            }
            match segment.key {
                EncapsulatedKey::ReqHdr => {
                    let req = parse_request_header(&buf)
                        .map_err(IcapResponseParseError::InvalidHttpHeader)?;
                    self.http_request = Some(req);
                }
                EncapsulatedKey::ResHdr => {
                    let rsp = parse_response_header(&buf)
                        .map_err(IcapResponseParseError::InvalidHttpHeader)?;
                    self.http_response = Some(rsp);
                }
                _ => {}
            }
        }

        let Some(key) = encapsulated.body_key().filter(|k| k.has_body()) else {
            return Ok(());
        };
        let body = read_chunked_body(reader, max_header_size)?;
        self.ieof = body.ieof;
        self.body = Bytes::from(body.data);
        match key {
            EncapsulatedKey::ReqBody => {
                if let Some(req) = &mut self.http_request {
                    *req.body_mut() = self.body.clone();
                }
            }
            EncapsulatedKey::ResBody => {
                if let Some(rsp) = &mut self.http_response {
                    *rsp.body_mut() = self.body.clone();
                }
            }
            _ => {}
        }
        Ok(())
    }
}
