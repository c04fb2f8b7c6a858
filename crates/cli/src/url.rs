// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Display;

/// Path of the streaming simulation endpoint.
pub const RUN_VIVARIUM_PATH: &str = "/run-vivarium";

/// Build the `run-vivarium` request target.
///
/// Values are interpolated as given, without validation or escaping. When
/// `vivarium_id` is `None` the parameter is omitted and the server creates
/// a fresh vivarium for the run.
pub fn run_vivarium_url(root: &str, duration: impl Display, vivarium_id: Option<&str>) -> String {
    let mut url = format!("{root}{RUN_VIVARIUM_PATH}?duration={duration}");
    if let Some(id) = vivarium_id {
        url.push_str(&format!("&vivarium_id={id}"));
    }
    url
}

#[cfg(test)]
#[path = "url_tests.rs"]
mod tests;
