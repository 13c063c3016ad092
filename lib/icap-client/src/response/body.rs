/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{BufRead, Read};

use super::{IcapResponseParseError, read_line_limited};
use crate::parse::ChunkedLine;

pub(super) struct ChunkedBody {
    pub(super) data: Vec<u8>,
    pub(super) ieof: bool,
}

fn is_empty_line(line: &[u8]) -> bool {
    matches!(line, b"\r\n" | b"\n")
}

/// Decode a chunked body up to and including its terminal chunk and the
/// (normally empty) trailer section.
pub(super) fn read_chunked_body<R: BufRead>(
    reader: &mut R,
    max_line_size: usize,
) -> Result<ChunkedBody, IcapResponseParseError> {
    let mut data = Vec::new();
    let mut line = Vec::with_capacity(32);

    loop {
        if read_line_limited(reader, &mut line, max_line_size)? == 0 {
            return Err(IcapResponseParseError::UnexpectedEof);
        }
        let (chunk_size, ieof) = {
            let chunk =
                ChunkedLine::parse(&line).map_err(IcapResponseParseError::InvalidChunkSize)?;
            (chunk.chunk_size, chunk.is_ieof())
        };

        if chunk_size == 0 {
            loop {
                if read_line_limited(reader, &mut line, max_line_size)? == 0 {
                    return Err(IcapResponseParseError::UnexpectedEof);
                }
                if is_empty_line(&line) {
                    break;
                }
            }
            return Ok(ChunkedBody { data, ieof });
        }

        let nr = (&mut *reader).take(chunk_size).read_to_end(&mut data)?;
        if (nr as u64) < chunk_size {
            return Err(IcapResponseParseError::UnexpectedEof);
        }

        if read_line_limited(reader, &mut line, max_line_size)? == 0 {
            return Err(IcapResponseParseError::UnexpectedEof);
        }
        if !is_empty_line(&line) {
            return Err(IcapResponseParseError::InvalidChunkedBody(
                "no CRLF after chunk data",
            ));
        }
    }
}
