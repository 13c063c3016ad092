/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Bridge to the HTTP messages carried inside an ICAP envelope.
//!
//! Only header blocks are handled here. Bodies are framed by the ICAP codec.

use std::io::Write;

use bytes::{BufMut, Bytes};
use http::header::{HOST, HeaderName, HeaderValue};
use http::{Method, Request, Response, StatusCode, Uri, Version};
use thiserror::Error;

const MAX_HEADERS: usize = 128;

#[derive(Debug, Error)]
pub enum HttpHeaderParseError {
    #[error("incomplete header block")]
    Incomplete,
    #[error("malformed header block: {0}")]
    Malformed(#[from] httparse::Error),
    #[error("invalid method")]
    InvalidMethod,
    #[error("invalid uri: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("invalid status code")]
    InvalidStatusCode,
    #[error("invalid header {0}")]
    InvalidHeader(String),
    #[error("failed to build message: {0}")]
    BuildFailed(#[from] http::Error),
}

fn version_str(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "HTTP/1.0"
    } else {
        "HTTP/1.1"
    }
}

fn parsed_version(version: Option<u8>) -> Version {
    match version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    }
}

fn write_header_lines(headers: &http::HeaderMap, buf: &mut Vec<u8>) {
    for (name, value) in headers {
        buf.put_slice(name.as_str().as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }
}

/// Serialize the request line and headers, ending with the blank line.
pub(crate) fn write_request_header(req: &Request<Bytes>, buf: &mut Vec<u8>) {
    let uri = req.uri();
    let target = if req.method() == Method::CONNECT {
        uri.authority().map(|a| a.as_str()).unwrap_or("/")
    } else {
        uri.path_and_query().map(|p| p.as_str()).unwrap_or("/")
    };
    let _ = write!(
        buf,
        "{} {target} {}\r\n",
        req.method(),
        version_str(req.version())
    );
    if !req.headers().contains_key(HOST) {
        if let Some(authority) = uri.authority() {
            let _ = write!(buf, "Host: {authority}\r\n");
        }
    }
    write_header_lines(req.headers(), buf);
    buf.put_slice(b"\r\n");
}

/// Serialize the status line and headers, ending with the blank line.
pub(crate) fn write_response_header(rsp: &Response<Bytes>, buf: &mut Vec<u8>) {
    let status = rsp.status();
    let _ = write!(
        buf,
        "{} {} {}\r\n",
        version_str(rsp.version()),
        status.as_str(),
        status.canonical_reason().unwrap_or("")
    );
    write_header_lines(rsp.headers(), buf);
    buf.put_slice(b"\r\n");
}

fn append_headers(
    map: &mut http::HeaderMap,
    headers: &[httparse::Header<'_>],
) -> Result<(), HttpHeaderParseError> {
    for h in headers {
        let name = HeaderName::from_bytes(h.name.as_bytes())
            .map_err(|_| HttpHeaderParseError::InvalidHeader(h.name.to_string()))?;
        let value = HeaderValue::from_bytes(h.value)
            .map_err(|_| HttpHeaderParseError::InvalidHeader(h.name.to_string()))?;
        map.append(name, value);
    }
    Ok(())
}

pub(crate) fn parse_request_header(buf: &[u8]) -> Result<Request<Bytes>, HttpHeaderParseError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    if req.parse(buf)?.is_partial() {
        return Err(HttpHeaderParseError::Incomplete);
    }

    let method = req
        .method
        .ok_or(HttpHeaderParseError::InvalidMethod)
        .and_then(|m| {
            Method::from_bytes(m.as_bytes()).map_err(|_| HttpHeaderParseError::InvalidMethod)
        })?;
    let uri = Uri::try_from(req.path.unwrap_or("/"))?;

    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .version(parsed_version(req.version))
        .body(Bytes::new())?;
    append_headers(request.headers_mut(), req.headers)?;
    Ok(request)
}

pub(crate) fn parse_response_header(buf: &[u8]) -> Result<Response<Bytes>, HttpHeaderParseError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut rsp = httparse::Response::new(&mut headers);
    if rsp.parse(buf)?.is_partial() {
        return Err(HttpHeaderParseError::Incomplete);
    }

    let status = rsp
        .code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(HttpHeaderParseError::InvalidStatusCode)?;

    let mut response = Response::builder()
        .status(status)
        .version(parsed_version(rsp.version))
        .body(Bytes::new())?;
    append_headers(response.headers_mut(), rsp.headers)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_header() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("http://www.example.com/upload?id=1")
            .header("content-type", "text/plain")
            .header("content-length", "11")
            .body(Bytes::from_static(b"hello world"))
            .unwrap();
        let mut buf = Vec::new();
        write_request_header(&req, &mut buf);
        assert_eq!(
            buf,
            b"POST /upload?id=1 HTTP/1.1\r\n\
              Host: www.example.com\r\n\
              content-type: text/plain\r\n\
              content-length: 11\r\n\r\n"
        );

        let parsed = parse_request_header(&buf).unwrap();
        assert_eq!(parsed.method(), Method::POST);
        assert_eq!(parsed.uri(), "/upload?id=1");
        assert_eq!(parsed.headers()["host"], "www.example.com");
        assert_eq!(parsed.headers()["content-length"], "11");
    }

    #[test]
    fn response_header() {
        let rsp = Response::builder()
            .status(StatusCode::FORBIDDEN)
            .header("content-type", "text/html")
            .body(Bytes::new())
            .unwrap();
        let mut buf = Vec::new();
        write_response_header(&rsp, &mut buf);
        assert_eq!(
            buf,
            b"HTTP/1.1 403 Forbidden\r\ncontent-type: text/html\r\n\r\n"
        );

        let parsed = parse_response_header(&buf).unwrap();
        assert_eq!(parsed.status(), StatusCode::FORBIDDEN);
        assert_eq!(parsed.headers()["content-type"], "text/html");
    }

    #[test]
    fn incomplete() {
        assert!(matches!(
            parse_request_header(b"GET / HTTP/1.1\r\nHost: a\r\n"),
            Err(HttpHeaderParseError::Incomplete)
        ));
        assert!(parse_response_header(b"HTTP/1.1 abc OK\r\n\r\n").is_err());
    }
}
