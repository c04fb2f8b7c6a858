// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod accumulator;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod source;
pub mod stream;
pub mod test_support;
pub mod update;
pub mod url;
