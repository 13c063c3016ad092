/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use bytes::{BufMut, Bytes};

use super::IcapRequest;
use crate::embedded::{write_request_header, write_response_header};
use crate::parse::{Encapsulated, EncapsulatedKey};
use crate::serialize::{END_CHUNK, IEOF_END_CHUNK, write_chunk, write_chunked};

const ENCAPSULATED_PREFIX: &[u8] = b"Encapsulated:  ";

impl IcapRequest {
    /// Serialize the full request for the first round trip.
    ///
    /// With a negotiated preview only the preview prefix of the body is
    /// written, see [`IcapRequest::encode_remainder`] for the rest.
    pub fn encode(&self) -> Vec<u8> {
        let mut encapsulated = Encapsulated::with_capacity(3);
        let mut http_block = Vec::with_capacity(1024);

        if let Some(req) = &self.http_request {
            encapsulated.push(EncapsulatedKey::ReqHdr, http_block.len());
            write_request_header(req, &mut http_block);
            if self.http_response.is_none() {
                self.push_body(
                    &mut encapsulated,
                    &mut http_block,
                    EncapsulatedKey::ReqBody,
                    req.body(),
                );
            }
        }
        if let Some(rsp) = &self.http_response {
            encapsulated.push(EncapsulatedKey::ResHdr, http_block.len());
            write_response_header(rsp, &mut http_block);
            self.push_body(
                &mut encapsulated,
                &mut http_block,
                EncapsulatedKey::ResBody,
                rsp.body(),
            );
        }
        if encapsulated.is_empty() {
            encapsulated.push(EncapsulatedKey::NullBody, 0);
        }

        let url = self.url.as_str();
        let mut buf = Vec::with_capacity(64 + url.len() + http_block.len());
        buf.put_slice(self.method.as_str().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(url.as_bytes());
        buf.put_slice(b" ICAP/1.0\r\n");
        self.headers.write_to_buf(&mut buf, "Encapsulated");
        buf.put_slice(ENCAPSULATED_PREFIX);
        buf.put_slice(encapsulated.to_string().as_bytes());
        buf.put_slice(b"\r\n\r\n");
        buf.put_slice(&http_block);
        buf
    }

    fn push_body(
        &self,
        encapsulated: &mut Encapsulated,
        buf: &mut Vec<u8>,
        key: EncapsulatedKey,
        body: &Bytes,
    ) {
        if body.is_empty() {
            encapsulated.push(EncapsulatedKey::NullBody, buf.len());
            return;
        }

        encapsulated.push(key, buf.len());
        match &self.preview {
            Some(preview) => {
                let size = preview.size().min(body.len());
                write_chunk(buf, &body[..size]);
                if preview.body_fits() {
                    buf.put_slice(IEOF_END_CHUNK);
                } else {
                    buf.put_slice(END_CHUNK);
                }
            }
            None => {
                write_chunk(buf, body);
                buf.put_slice(END_CHUNK);
            }
        }
    }

    /// Serialize the body left over after the preview, split into chunks of
    /// `chunk_length` bytes and ended by the terminal chunk.
    ///
    /// Returns `None` if there is nothing left to send.
    pub fn encode_remainder(&self) -> Option<Vec<u8>> {
        let preview = self.preview.as_ref()?;
        if preview.body_fits() {
            return None;
        }
        let remainder = preview.remainder();
        let mut buf = Vec::with_capacity(remainder.len() + 64);
        write_chunked(&mut buf, remainder, self.chunk_length);
        Some(buf)
    }
}
