// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that run the real `vivstream` binary against a
//! fake streaming simulation server.

use std::time::Duration;

use serde_json::json;

use vivstream::config::DEFAULT_TEST_ID;
use vivstream::test_support::SimServer;
use vivstream_specs::{free_port, VivstreamRun};

#[tokio::test]
async fn prints_parsed_document_and_exits_zero() -> anyhow::Result<()> {
    let server = SimServer::builder()
        .chunks([r#"{"job_id": "run-1", "last_updated": "t0", "#, r#""results": [{"n": 1}]}"#])
        .spawn()
        .await?;

    let out = VivstreamRun::against(&server.root()).output().await?;

    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert_eq!(out.document()?, json!({"job_id": "run-1", "last_updated": "t0", "results": [{"n": 1}]}));
    Ok(())
}

#[tokio::test]
async fn sends_test_id_by_default() -> anyhow::Result<()> {
    let server = SimServer::builder().chunks([r#"{"results": []}"#]).spawn().await?;

    let out = VivstreamRun::against(&server.root()).arg("--duration").arg("7").output().await?;

    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert_eq!(server.queries().await, vec![format!("duration=7&vivarium_id={DEFAULT_TEST_ID}")]);
    Ok(())
}

#[tokio::test]
async fn new_flag_omits_identifier() -> anyhow::Result<()> {
    let server = SimServer::builder().chunks([r#"{"results": []}"#]).spawn().await?;

    let out = VivstreamRun::against(&server.root()).arg("--new").output().await?;

    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert_eq!(server.queries().await, vec!["duration=10"]);
    Ok(())
}

#[tokio::test]
async fn envelope_stream_exits_no_document() -> anyhow::Result<()> {
    let server = SimServer::builder()
        .chunks([r#"{"updates": ["#, r#"{"job_id": "j", "last_updated": "t", "results": []}"#, "]}"])
        .spawn()
        .await?;

    let out = VivstreamRun::against(&server.root()).output().await?;

    assert_eq!(out.code, Some(3), "stderr: {}", out.stderr);
    assert!(out.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn bare_error_document_exits_one() -> anyhow::Result<()> {
    let server = SimServer::builder().chunks([r#"{"error": "grpc unavailable", "at": []}"#]).spawn().await?;

    let out = VivstreamRun::against(&server.root()).output().await?;

    assert_eq!(out.code, Some(1));
    Ok(())
}

#[tokio::test]
async fn error_after_envelope_opener_exits_three() -> anyhow::Result<()> {
    let server = SimServer::builder()
        .chunks([r#"{"updates": ["#, r#"{"error": "grpc unavailable"}"#])
        .spawn()
        .await?;

    let out = VivstreamRun::against(&server.root()).output().await?;

    assert_eq!(out.code, Some(3), "stderr: {}", out.stderr);
    assert!(out.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_server_exits_one() -> anyhow::Result<()> {
    let root = format!("http://127.0.0.1:{}", free_port()?);

    let out = VivstreamRun::against(&root)
        .arg("--connect-timeout-ms")
        .arg("500")
        .timeout(Duration::from_secs(5))
        .output()
        .await?;

    assert_eq!(out.code, Some(1));
    Ok(())
}

#[tokio::test]
async fn invalid_log_format_exits_two() -> anyhow::Result<()> {
    let out = VivstreamRun::against("http://127.0.0.1:1")
        .arg("--log-format")
        .arg("xml")
        .output()
        .await?;

    assert_eq!(out.code, Some(2));
    assert!(out.stderr.contains("invalid log format"));
    Ok(())
}
