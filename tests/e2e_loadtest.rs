
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tempfile::tempdir;

use gbload::app::run_load_test;
use gbload::domain::{Comment, LOADTEST_USERNAME, RunConfig};
use gbload::guestbook::{self, GuestbookState, MemoryListStore};
use gbload::http::{BackoffPolicy, ClientSettings, MESSAGE_LEN};
use gbload::metrics::{PercentileReport, PercentileSet};
use gbload::shutdown::{request_shutdown, shutdown_channel};

use support_guestbook::{StubMode, run_gbload, spawn_guestbook_stub, summary_value};

fn run_config(base_url: Url, total_requests: u64, workers: usize) -> RunConfig {
    RunConfig {
        base_url,
        total_requests,
        workers,
        percentiles: PercentileSet::default(),
        backoff: BackoffPolicy::default(),
        client: ClientSettings {
            pool_max_idle_per_host: workers,
            ..ClientSettings::default()
        },
        deadline: None,
        seed: Some(2024),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn load_test_against_in_process_guestbook_has_no_errors() -> Result<(), String> {
    let listener = guestbook::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let store = Arc::new(MemoryListStore::default());
    let (server_shutdown_tx, server_shutdown_rx) = shutdown_channel();
    let server = tokio::spawn(guestbook::serve_on(
        listener,
        GuestbookState::new(store.clone(), guestbook::DEFAULT_RECENT_COMMENTS),
        server_shutdown_rx,
    ));

    let base = Url::parse(&format!("http://{}", addr)).map_err(|err| err.to_string())?;
    let summary = run_load_test(&run_config(base.clone(), 200, 8))
        .await
        .map_err(|err| err.to_string())?;

    if summary.errors != 0 {
        return Err(format!("Expected zero errors, got {:?}", summary));
    }
    if summary.successes() != 200 || summary.interrupted {
        return Err(format!("Unexpected summary {:?}", summary));
    }
    if summary.successful_post == 0 || summary.bytes_sent == 0 {
        return Err(format!("Expected POST traffic, got {:?}", summary));
    }
    if summary.bytes_received == 0 {
        return Err("Expected response bodies to be counted".to_owned());
    }
    let PercentileReport::Table(table) = &summary.percentiles else {
        return Err("Expected percentile data".to_owned());
    };
    if table.samples() != 200 {
        return Err(format!("Expected 200 samples, got {}", table.samples()));
    }

    let stored = store.len().await;
    if u64::try_from(stored).map_err(|err| err.to_string())? != summary.successful_post {
        return Err(format!(
            "Stored {} comments for {} successful posts",
            stored, summary.successful_post
        ));
    }

    let comments: Vec<Comment> = reqwest::get(format!("http://{}/comments", addr))
        .await
        .map_err(|err| err.to_string())?
        .json()
        .await
        .map_err(|err| err.to_string())?;
    if comments.is_empty() || comments.len() > guestbook::DEFAULT_RECENT_COMMENTS {
        return Err(format!("Unexpected comment page of {}", comments.len()));
    }
    if !comments
        .iter()
        .all(|comment| comment.username == LOADTEST_USERNAME && comment.message.len() == MESSAGE_LEN)
    {
        return Err(format!("Unexpected comments {:?}", comments));
    }

    request_shutdown(&server_shutdown_tx);
    server
        .await
        .map_err(|err| err.to_string())?
        .map_err(|err| err.to_string())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deadline_shorter_than_client_setup_interrupts_run() -> Result<(), String> {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
        listener.local_addr().map_err(|err| err.to_string())?
    };
    let base = Url::parse(&format!("http://{}", addr)).map_err(|err| err.to_string())?;
    let mut config = run_config(base, 3_000, 2);
    config.backoff = BackoffPolicy {
        max_attempts: 1,
        ..BackoffPolicy::default()
    };
    config.deadline = Some(Duration::from_millis(1));

    let summary = run_load_test(&config)
        .await
        .map_err(|err| err.to_string())?;

    if !summary.interrupted {
        return Err(format!("A 1ms deadline must interrupt the run: {:?}", summary));
    }
    if summary.successes().saturating_add(summary.errors) >= 3_000 {
        return Err(format!("Run went to completion despite the deadline: {:?}", summary));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deadline_interrupts_run_against_dead_target() -> Result<(), String> {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
        listener.local_addr().map_err(|err| err.to_string())?
    };
    let base = Url::parse(&format!("http://{}", addr)).map_err(|err| err.to_string())?;
    let mut config = run_config(base, 50, 2);
    config.deadline = Some(Duration::from_millis(300));

    let started = std::time::Instant::now();
    let summary = run_load_test(&config)
        .await
        .map_err(|err| err.to_string())?;

    if !summary.interrupted {
        return Err(format!("Expected an interrupted run, got {:?}", summary));
    }
    if summary.successes() != 0 {
        return Err(format!("No request can succeed: {:?}", summary));
    }
    if !matches!(summary.percentiles, PercentileReport::NoData { .. }) {
        return Err("Expected no percentile data".to_owned());
    }
    if started.elapsed() > Duration::from_secs(5) {
        return Err(format!("Deadline ignored; run took {:?}", started.elapsed()));
    }
    Ok(())
}

#[test]
fn cli_reports_text_summary() -> Result<(), String> {
    let (url, _server) = spawn_guestbook_stub(StubMode::Healthy)?;

    let output = run_gbload(["-u", url.as_str(), "-n", "40", "-c", "4", "--seed", "1"])?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let get = summary_value(&stdout, "Successful GET Requests:")?;
    let post = summary_value(&stdout, "Successful POST Requests:")?;
    if get.saturating_add(post) != 40 {
        return Err(format!("Expected 40 successes:\n{}", stdout));
    }
    if summary_value(&stdout, "Total Errors:")? != 0 {
        return Err(format!("Expected no errors:\n{}", stdout));
    }
    for label in [
        "Elapsed Time:",
        "Total Bytes Sent:",
        "Total Bytes Received:",
        "50th Percentile Latency:",
        "90th Percentile Latency:",
        "95th Percentile Latency:",
        "99th Percentile Latency:",
        "Requests per Second:",
    ] {
        if !stdout.lines().any(|line| line.starts_with(label)) {
            return Err(format!("Missing '{}' in:\n{}", label, stdout));
        }
    }
    Ok(())
}

#[test]
fn cli_exports_json_summary() -> Result<(), String> {
    let (url, _server) = spawn_guestbook_stub(StubMode::Healthy)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let export = dir.path().join("summary.json");
    let export_str = export.to_string_lossy().into_owned();

    let output = run_gbload([
        "-u",
        url.as_str(),
        "-n",
        "12",
        "-c",
        "3",
        "--output-format",
        "json",
        "--export-json",
        export_str.as_str(),
    ])?;
    if !output.status.success() {
        return Err(format!(
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let printed: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|err| format!("stdout not JSON: {}", err))?;
    let written = std::fs::read_to_string(&export).map_err(|err| err.to_string())?;
    let exported: serde_json::Value =
        serde_json::from_str(&written).map_err(|err| format!("export not JSON: {}", err))?;

    let successes = exported["successful_get"]
        .as_u64()
        .zip(exported["successful_post"].as_u64())
        .map(|(get, post)| get.saturating_add(post));
    if successes != Some(12) || exported["errors"].as_u64() != Some(0) {
        return Err(format!("Unexpected export {}", exported));
    }
    if printed["total_requests"] != exported["total_requests"] {
        return Err("Printed and exported summaries disagree".to_owned());
    }
    if !exported["requests_per_second"].is_number() {
        return Err(format!("Expected numeric rps in {}", exported));
    }
    Ok(())
}

#[test]
fn cli_counts_errors_against_failing_target() -> Result<(), String> {
    let (url, _server) = spawn_guestbook_stub(StubMode::Unavailable)?;

    let output = run_gbload([
        "-u",
        url.as_str(),
        "-n",
        "6",
        "-c",
        "2",
        "--max-attempts",
        "2",
        "--backoff-initial",
        "1ms",
        "--backoff-max",
        "2ms",
    ])?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "A failing target must not fail the run:\n{}\n{}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    if summary_value(&stdout, "Total Errors:")? != 6 {
        return Err(format!("Expected 6 errors:\n{}", stdout));
    }
    if !stdout.contains("50th Percentile Latency: no data") {
        return Err(format!("Expected no percentile data:\n{}", stdout));
    }
    Ok(())
}

#[test]
fn cli_reads_host_from_config_file() -> Result<(), String> {
    let (url, _server) = spawn_guestbook_stub(StubMode::Healthy)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("gbload.toml");
    let content = format!("host = \"{}\"\nrequests = 8\nthreads = 2\npercentiles = [50]\n", url);
    std::fs::write(&config_path, content).map_err(|err| format!("write failed: {}", err))?;
    let config_str = config_path.to_string_lossy().into_owned();

    let output = run_gbload(["--config", config_str.as_str()])?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    let get = summary_value(&stdout, "Successful GET Requests:")?;
    let post = summary_value(&stdout, "Successful POST Requests:")?;
    if get.saturating_add(post) != 8 {
        return Err(format!("Expected 8 successes:\n{}", stdout));
    }
    if stdout.contains("90th Percentile") {
        return Err(format!("Only the configured percentile should print:\n{}", stdout));
    }
    Ok(())
}

#[test]
fn cli_rejects_out_of_range_percentile() -> Result<(), String> {
    let output = run_gbload(["-u", "http://127.0.0.1:9", "--percentiles", "50,101"])?;
    if output.status.success() {
        return Err("Expected percentile 101 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn cli_requires_host() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let empty_config = dir.path().join("gbload.json");
    std::fs::write(&empty_config, "{}").map_err(|err| format!("write failed: {}", err))?;
    let config_str = empty_config.to_string_lossy().into_owned();

    let output = run_gbload(["--config", config_str.as_str()])?;
    if output.status.success() {
        return Err("Expected a missing host to fail".to_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("MissingHost") {
        return Err(format!("Unexpected stderr: {}", stderr));
    }
    Ok(())
}
