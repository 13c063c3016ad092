/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use bytes::BufMut;

pub(crate) const END_CHUNK: &[u8] = b"0\r\n\r\n";
pub(crate) const IEOF_END_CHUNK: &[u8] = b"0; ieof\r\n\r\n";

/// Write `data` as a single chunk. Empty data writes nothing, as a zero sized
/// chunk would end the body.
pub(crate) fn write_chunk(buf: &mut Vec<u8>, data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let _ = write!(buf, "{:x}\r\n", data.len());
    buf.put_slice(data);
    buf.put_slice(b"\r\n");
}

/// Write `data` split into chunks of at most `chunk_size` bytes, followed by
/// the terminal chunk.
pub(crate) fn write_chunked(buf: &mut Vec<u8>, data: &[u8], chunk_size: usize) {
    let chunk_size = chunk_size.max(1);
    buf.reserve(data.len() + (data.len() / chunk_size + 1) * 12 + END_CHUNK.len());
    for chunk in data.chunks(chunk_size) {
        write_chunk(buf, chunk);
    }
    buf.put_slice(END_CHUNK);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, b"Hello World");
        assert_eq!(buf, b"b\r\nHello World\r\n");

        let mut buf = Vec::new();
        write_chunk(&mut buf, b"");
        assert!(buf.is_empty());
    }

    #[test]
    fn split() {
        let mut buf = Vec::new();
        write_chunked(&mut buf, b"abcdefghij", 4);
        assert_eq!(buf, b"4\r\nabcd\r\n4\r\nefgh\r\n2\r\nij\r\n0\r\n\r\n");
    }

    #[test]
    fn empty() {
        let mut buf = Vec::new();
        write_chunked(&mut buf, b"", 512);
        assert_eq!(buf, END_CHUNK);
    }
}
