/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod chunked;
pub(crate) use chunked::{END_CHUNK, IEOF_END_CHUNK, write_chunk, write_chunked};
