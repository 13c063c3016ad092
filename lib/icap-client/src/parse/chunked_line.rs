/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix16Checked;

use super::IcapLineParseError;

pub(crate) struct ChunkedLine<'a> {
    pub(crate) chunk_size: u64,
    pub(crate) extension: Option<&'a str>,
}

impl<'a> ChunkedLine<'a> {
    pub(crate) fn parse(buf: &'a [u8]) -> Result<ChunkedLine<'a>, IcapLineParseError> {
        let (chunk_size, offset) = u64::from_radix_16_checked(buf);
        let Some(chunk_size) = chunk_size.filter(|_| offset > 0) else {
            return Err(IcapLineParseError::InvalidChunkSize);
        };

        if buf.len() == offset {
            return Err(IcapLineParseError::NotLongEnough);
        }

        match buf[offset] {
            b'\r' | b'\n' => Ok(ChunkedLine {
                chunk_size,
                extension: None,
            }),
            b';' | b' ' | b'\t' => {
                let left = std::str::from_utf8(&buf[offset..])?.trim();
                let extension = left.strip_prefix(';').map(|s| s.trim());
                Ok(ChunkedLine {
                    chunk_size,
                    extension,
                })
            }
            _ => Err(IcapLineParseError::InvalidChunkSize),
        }
    }

    /// The zero sized chunk with the `ieof` extension ends a preview which
    /// carried the complete body.
    pub(crate) fn is_ieof(&self) -> bool {
        self.chunk_size == 0 && self.extension.is_some_and(|ext| ext == "ieof")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple() {
        let chunk = ChunkedLine::parse(b"1\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 1);

        let chunk = ChunkedLine::parse(b"1F\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 0x1f);
        assert!(!chunk.is_ieof());
    }

    #[test]
    fn ieof() {
        let chunk = ChunkedLine::parse(b"0; ieof\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 0);
        assert_eq!(chunk.extension, Some("ieof"));
        assert!(chunk.is_ieof());

        let chunk = ChunkedLine::parse(b"0;ieof\r\n").unwrap();
        assert!(chunk.is_ieof());

        let chunk = ChunkedLine::parse(b"0\r\n").unwrap();
        assert!(!chunk.is_ieof());
    }

    #[test]
    fn invalid() {
        assert!(ChunkedLine::parse(b"\r\n").is_err());
        assert!(ChunkedLine::parse(b"z1\r\n").is_err());
        assert!(ChunkedLine::parse(b"1").is_err());
    }

    #[test]
    fn size_overflow() {
        assert!(matches!(
            ChunkedLine::parse(b"fffffffffffffffffffff\r\n"),
            Err(IcapLineParseError::InvalidChunkSize)
        ));
        let chunk = ChunkedLine::parse(b"ffffffffffffffff\r\n").unwrap();
        assert_eq!(chunk.chunk_size, u64::MAX);
    }
}
