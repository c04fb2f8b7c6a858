// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One streamed simulation step as emitted by `run-vivarium`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VivariumUpdate {
    pub job_id: String,
    pub last_updated: String,
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Extract typed updates from a bare array or an `{"updates": [...]}` envelope.
pub fn updates_from(doc: &Value) -> anyhow::Result<Vec<VivariumUpdate>> {
    let list = match doc {
        Value::Array(_) => doc,
        Value::Object(map) => map
            .get("updates")
            .ok_or_else(|| anyhow::anyhow!("document has no updates field"))?,
        other => anyhow::bail!("expected an array or an updates envelope, got {other}"),
    };
    Ok(Vec::<VivariumUpdate>::deserialize(list)?)
}

/// The message of a server failure document (`{"error": "..."}`), if any.
pub fn error_message(doc: &Value) -> Option<&str> {
    doc.get("error")?.as_str()
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
