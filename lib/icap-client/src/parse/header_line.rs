/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::IcapLineParseError;

pub(crate) struct HeaderLine<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: &'a str,
}

impl<'a> HeaderLine<'a> {
    /// Split a raw header line on the first ':' and trim the value.
    pub(crate) fn parse(buf: &'a [u8]) -> Result<HeaderLine<'a>, IcapLineParseError> {
        let line = std::str::from_utf8(buf)?;

        let p = memchr::memchr(b':', line.as_bytes())
            .ok_or(IcapLineParseError::NoDelimiterFound(':'))?;
        let name = line[0..p].trim();
        if name.is_empty() {
            return Err(IcapLineParseError::MissingHeaderName);
        }

        let value = line[p + 1..].trim();
        Ok(HeaderLine { name, value })
    }
}
