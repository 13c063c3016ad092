/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Aborts an in-progress dial when triggered from another thread.
///
/// The token is only consulted while connecting. Transfers on an established
/// connection are bounded by the read/write timeouts instead.
#[derive(Clone, Debug, Default)]
pub struct DialCancelToken {
    cancelled: Arc<AtomicBool>,
}

impl DialCancelToken {
    pub fn new() -> Self {
        DialCancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
