/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix10Checked;

use super::IcapLineParseError;

pub(crate) struct StatusLine<'a> {
    pub(crate) code: u16,
    pub(crate) reason: &'a str,
}

impl<'a> StatusLine<'a> {
    pub(crate) fn parse(buf: &'a [u8]) -> Result<StatusLine<'a>, IcapLineParseError> {
        const MINIMAL_LENGTH: usize = 13; // ICAP/1.0 XYZ\n

        if buf.len() < MINIMAL_LENGTH {
            return Err(IcapLineParseError::NotLongEnough);
        }

        let Some(p) = memchr::memchr(b' ', buf) else {
            return Err(IcapLineParseError::NoDelimiterFound(' '));
        };
        if &buf[0..p] != b"ICAP/1.0" {
            return Err(IcapLineParseError::InvalidIcapVersion);
        }

        let left = &buf[p + 1..];
        let (code, len) = u16::from_radix_10_checked(left);
        let Some(code) = code.filter(|_| len == 3) else {
            return Err(IcapLineParseError::InvalidStatusCode);
        };

        match left.get(len) {
            Some(b' ') => {}
            Some(b'\r' | b'\n') | None => return Err(IcapLineParseError::MissingReason),
            Some(_) => return Err(IcapLineParseError::InvalidStatusCode),
        }
        let reason = std::str::from_utf8(&left[len + 1..])?.trim();
        if reason.is_empty() {
            return Err(IcapLineParseError::MissingReason);
        }

        Ok(StatusLine { code, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let s = StatusLine::parse(b"ICAP/1.0 200 OK\r\n").unwrap();
        assert_eq!(s.code, 200);
        assert_eq!(s.reason, "OK");

        let s = StatusLine::parse(b"ICAP/1.0 204 No Modifications\r\n").unwrap();
        assert_eq!(s.code, 204);
        assert_eq!(s.reason, "No Modifications");
    }

    #[test]
    fn continue_line() {
        let s = StatusLine::parse(b"ICAP/1.0 100 Continue\r\n").unwrap();
        assert_eq!(s.code, 100);
        assert_eq!(s.reason, "Continue");
    }

    #[test]
    fn missing_reason() {
        assert!(matches!(
            StatusLine::parse(b"ICAP/1.0 200\r\n"),
            Err(IcapLineParseError::MissingReason)
        ));
        assert!(matches!(
            StatusLine::parse(b"ICAP/1.0 200 \r\n"),
            Err(IcapLineParseError::MissingReason)
        ));
        assert!(matches!(
            StatusLine::parse(b"ICAP/1.0 200  \t \r\n"),
            Err(IcapLineParseError::MissingReason)
        ));
    }

    #[test]
    fn version_mismatch() {
        assert!(matches!(
            StatusLine::parse(b"HTTP/1.1 200 OK\r\n"),
            Err(IcapLineParseError::InvalidIcapVersion)
        ));
        assert!(matches!(
            StatusLine::parse(b"ICAP/2.0 200 OK\r\n"),
            Err(IcapLineParseError::InvalidIcapVersion)
        ));
    }

    #[test]
    fn invalid_code() {
        assert!(matches!(
            StatusLine::parse(b"ICAP/1.0 2000 OK\r\n"),
            Err(IcapLineParseError::InvalidStatusCode)
        ));
        assert!(matches!(
            StatusLine::parse(b"ICAP/1.0 99999999999999999999 OK\r\n"),
            Err(IcapLineParseError::InvalidStatusCode)
        ));
        assert!(matches!(
            StatusLine::parse(b"ICAP/1.0 abc OK\r\n"),
            Err(IcapLineParseError::InvalidStatusCode)
        ));
    }
}
