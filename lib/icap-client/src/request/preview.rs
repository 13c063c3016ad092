/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use bytes::Bytes;

use super::IcapRequest;

/// Outcome of preview negotiation for one request.
#[derive(Clone, Debug)]
pub struct IcapPreview {
    size: usize,
    body_fits: bool,
    remainder: Bytes,
}

impl IcapPreview {
    fn new(body: &Bytes, max_size: usize) -> Self {
        if body.len() <= max_size {
            IcapPreview {
                size: body.len(),
                body_fits: true,
                remainder: Bytes::new(),
            }
        } else {
            IcapPreview {
                size: max_size,
                body_fits: false,
                remainder: body.slice(max_size..),
            }
        }
    }

    /// Number of body bytes sent in the preview.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn body_fits(&self) -> bool {
        self.body_fits
    }

    /// Body bytes held back for a `100 Continue`.
    #[inline]
    pub fn remainder(&self) -> &Bytes {
        &self.remainder
    }
}

impl IcapRequest {
    /// Negotiate a preview of at most `max_size` body bytes.
    ///
    /// Does nothing for OPTIONS. The embedded body is left intact, only the
    /// encoder limits what goes out in the first round trip.
    pub fn set_preview(&mut self, max_size: usize) {
        let Some(body) = self.adapted_body() else {
            return;
        };
        let preview = IcapPreview::new(body, max_size);
        self.headers
            .insert("Preview", itoa::Buffer::new().format(preview.size));
        self.preview = Some(preview);
    }
}
