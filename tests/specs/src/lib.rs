// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Runs the real `vivstream` binary as a subprocess against a fake
//! simulation server and captures its exit status and output.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

/// Resolve the path to the compiled `vivstream` binary.
pub fn vivstream_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("vivstream")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Captured result of one binary invocation.
#[derive(Debug)]
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Parse stdout as the printed JSON document.
    pub fn document(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}

/// Builder for one `vivstream` invocation.
pub struct VivstreamRun {
    args: Vec<String>,
    timeout: Duration,
}

impl VivstreamRun {
    /// Target the given server root with quiet logging.
    pub fn against(root: &str) -> Self {
        let args = ["--root", root, "--log-level", "warn"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self { args, timeout: Duration::from_secs(10) }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_owned());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run to completion, killing the process if it outlives the timeout.
    pub async fn output(self) -> anyhow::Result<RunOutput> {
        let binary = vivstream_binary();
        anyhow::ensure!(binary.exists(), "vivstream binary not found at {}", binary.display());

        let child = tokio::process::Command::new(&binary)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow::anyhow!("vivstream did not exit within {:?}", self.timeout))??;

        Ok(RunOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
