use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;
use tempfile::TempDir;

use hostinst::{RunConfig, RunError, RunOutcome, Transcript, TranscriptSink};
use hostinst_core::DownloadError;
use hostinst_runtime::{HostError, InstallerStatus, RuntimeHost, RuntimeListing};

// SHA-512 of b"abc"
const ABC_SHA512: &str = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";

struct FakeHost {
    listings: Mutex<VecDeque<RuntimeListing>>,
    list_calls: Mutex<usize>,
    installs: Mutex<Vec<(PathBuf, String)>>,
    exit_code: i32,
}

impl FakeHost {
    fn unavailable() -> Self {
        Self::with_listings(Vec::new())
    }

    fn with_listings(listings: Vec<RuntimeListing>) -> Self {
        Self {
            listings: Mutex::new(listings.into()),
            list_calls: Mutex::new(0),
            installs: Mutex::new(Vec::new()),
            exit_code: 0,
        }
    }

    fn exiting_with(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    fn list_calls(&self) -> usize {
        *self.list_calls.lock().expect("lock")
    }

    fn installs(&self) -> Vec<(PathBuf, String)> {
        self.installs.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RuntimeHost for FakeHost {
    async fn list_installed_runtimes(&self) -> RuntimeListing {
        *self.list_calls.lock().expect("lock") += 1;
        self.listings
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(RuntimeListing::unavailable)
    }

    async fn run_installer(
        &self,
        installer: &Path,
        silent_flag: &str,
    ) -> Result<InstallerStatus, HostError> {
        self.installs
            .lock()
            .expect("lock")
            .push((installer.to_path_buf(), silent_flag.to_string()));
        Ok(InstallerStatus {
            code: Some(self.exit_code),
        })
    }
}

struct Harness {
    server: MockServer,
    temp: TempDir,
    config: RunConfig,
}

impl Harness {
    fn new() -> Self {
        let server = MockServer::start();
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let config = RunConfig {
            metadata_url: Some(server.url("/release-metadata/9.0/releases.json")),
            download_base_url: server.url("/Runtime"),
            log_dir: temp.path().join("logs"),
            download_dir: temp.path().join("downloads"),
            ..RunConfig::default()
        };
        Self {
            server,
            temp,
            config,
        }
    }

    fn serve_metadata(&self, body: &serde_json::Value) -> httpmock::Mock<'_> {
        let body = body.to_string();
        self.server.mock(|when, then| {
            when.method(GET).path("/release-metadata/9.0/releases.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(body);
        })
    }

    fn serve_installer(&self, version: &str, body: &str) -> httpmock::Mock<'_> {
        let path = format!("/Runtime/{version}/dotnet-hosting-{version}-win.exe");
        self.server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).body(body);
        })
    }

    fn transcript(&self) -> (Transcript, TranscriptSink) {
        let transcript = Transcript::start(&self.config.log_dir, TranscriptSink::detached())
            .expect("transcript should start");
        let sink = transcript.sink();
        (transcript, sink)
    }

    fn installer_path(&self, version: &str) -> PathBuf {
        self.temp
            .path()
            .join("downloads")
            .join(format!("dotnet-hosting-{version}-win.exe"))
    }
}

fn release(version: &str) -> serde_json::Value {
    json!({
        "release-version": version,
        "aspnetcore-runtime": { "version": version, "files": [] }
    })
}

fn metadata(releases: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "channel-version": "9.0",
        "latest-release": "9.0.10",
        "releases": releases
    })
}

fn assert_transcript_closed(sink: &TranscriptSink, path: &Path) {
    assert!(!sink.is_open(), "transcript should be closed after the run");
    let contents = std::fs::read_to_string(path).expect("transcript should be readable");
    assert!(contents.contains("transcript end"));
}

#[tokio::test]
async fn installs_latest_version_even_without_runtime_listing() {
    let harness = Harness::new();
    let metadata_mock = harness.serve_metadata(&metadata(vec![
        release("9.0.9"),
        release("9.0.10"),
        release("8.9.99"),
        json!({ "release-version": "9.0.0-preview.1", "aspnetcore-runtime": null }),
    ]));
    let installer_mock = harness.serve_installer("9.0.10", "abc");
    let host = FakeHost::unavailable();
    let (transcript, sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    metadata_mock.assert_hits(1);
    installer_mock.assert_hits(1);
    let expected_installer = harness.installer_path("9.0.10");
    match &report.outcome {
        RunOutcome::Installed { version, installer } => {
            assert_eq!(version, "9.0.10");
            assert_eq!(installer, &expected_installer);
        }
        other => panic!("expected Installed, got {other:?}"),
    }
    assert_eq!(
        std::fs::read(&expected_installer).expect("installer should be on disk"),
        b"abc"
    );
    assert_eq!(
        host.installs(),
        vec![(expected_installer, "/quiet".to_string())]
    );
    assert_eq!(host.list_calls(), 2);
    assert_eq!(report.inventories.before.as_deref(), Some(&[][..]));
    assert_eq!(report.inventories.after.as_deref(), Some(&[][..]));
    assert_transcript_closed(&sink, &report.transcript);
}

#[tokio::test]
async fn metadata_failure_aborts_before_download() {
    let harness = Harness::new();
    let metadata_mock = harness.server.mock(|when, then| {
        when.method(GET).path("/release-metadata/9.0/releases.json");
        then.status(500);
    });
    let installer_mock = harness.serve_installer("9.0.10", "abc");
    let host = FakeHost::unavailable();
    let (transcript, sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    metadata_mock.assert_hits(1);
    installer_mock.assert_hits(0);
    assert!(report.outcome.is_failure());
    assert!(matches!(
        report.outcome,
        RunOutcome::Failed(RunError::Metadata(_))
    ));
    assert!(host.installs().is_empty());
    assert!(report.inventories.before.is_some());
    assert!(report.inventories.after.is_none());
    assert!(!harness.temp.path().join("downloads").exists());
    assert_transcript_closed(&sink, &report.transcript);
}

#[tokio::test]
async fn no_qualifying_version_is_a_soft_stop() {
    let harness = Harness::new();
    harness.serve_metadata(&metadata(vec![
        release("abc"),
        json!({ "release-version": "9.0.0-preview.2" }),
    ]));
    let host = FakeHost::unavailable();
    let (transcript, sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    assert!(matches!(report.outcome, RunOutcome::NoVersionFound));
    assert!(!report.outcome.is_failure());
    assert!(host.installs().is_empty());
    assert_eq!(host.list_calls(), 2);
    assert_transcript_closed(&sink, &report.transcript);
}

#[tokio::test]
async fn malformed_version_is_skipped_during_selection() {
    let harness = Harness::new();
    harness.serve_metadata(&metadata(vec![
        release("abc"),
        release("9.0.1"),
        release("9.0.2"),
    ]));
    let installer_mock = harness.serve_installer("9.0.2", "abc");
    let host = FakeHost::unavailable();
    let (transcript, _sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    installer_mock.assert_hits(1);
    assert!(matches!(
        report.outcome,
        RunOutcome::Installed { ref version, .. } if version == "9.0.2"
    ));
}

#[tokio::test]
async fn failing_installer_is_fatal_and_skips_post_check() {
    let harness = Harness::new();
    harness.serve_metadata(&metadata(vec![release("9.0.10")]));
    harness.serve_installer("9.0.10", "abc");
    let host = FakeHost::unavailable().exiting_with(1603);
    let (transcript, sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Failed(RunError::Install {
            source: HostError::InstallerFailed { code: 1603 },
            ..
        })
    ));
    assert_eq!(host.installs().len(), 1);
    assert_eq!(host.list_calls(), 1);
    assert!(report.inventories.after.is_none());
    assert_transcript_closed(&sink, &report.transcript);
}

#[tokio::test]
async fn checksum_mismatch_prevents_installation() {
    let harness = Harness::new();
    harness.serve_metadata(&metadata(vec![json!({
        "release-version": "9.0.10",
        "aspnetcore-runtime": {
            "version": "9.0.10",
            "files": [
                { "name": "dotnet-hosting-win.exe", "url": "", "hash": ABC_SHA512 }
            ]
        }
    })]));
    harness.serve_installer("9.0.10", "tampered");
    let host = FakeHost::unavailable();
    let (transcript, _sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Failed(RunError::Download(DownloadError::ChecksumMismatch { .. }))
    ));
    assert!(host.installs().is_empty());
    assert!(!harness.installer_path("9.0.10").exists());
}

#[tokio::test]
async fn published_checksum_is_verified_before_install() {
    let harness = Harness::new();
    harness.serve_metadata(&metadata(vec![json!({
        "release-version": "9.0.10",
        "aspnetcore-runtime": {
            "version": "9.0.10",
            "files": [
                { "name": "dotnet-hosting-win.exe", "url": "", "hash": ABC_SHA512.to_uppercase() }
            ]
        }
    })]));
    harness.serve_installer("9.0.10", "abc");
    let host = FakeHost::unavailable();
    let (transcript, _sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    assert!(matches!(report.outcome, RunOutcome::Installed { .. }));
    assert_eq!(host.installs().len(), 1);
}

#[tokio::test]
async fn dry_run_reports_download_without_fetching_it() {
    let mut harness = Harness::new();
    harness.config.dry_run = true;
    harness.serve_metadata(&metadata(vec![release("9.0.5")]));
    let installer_mock = harness.serve_installer("9.0.5", "abc");
    let host = FakeHost::unavailable();
    let (transcript, sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    installer_mock.assert_hits(0);
    match &report.outcome {
        RunOutcome::DryRun {
            version,
            url,
            installer,
        } => {
            assert_eq!(version, "9.0.5");
            assert_eq!(
                url,
                &harness
                    .server
                    .url("/Runtime/9.0.5/dotnet-hosting-9.0.5-win.exe")
            );
            assert_eq!(installer, &harness.installer_path("9.0.5"));
        }
        other => panic!("expected DryRun, got {other:?}"),
    }
    assert!(host.installs().is_empty());
    assert_transcript_closed(&sink, &report.transcript);
}

#[tokio::test]
async fn skip_if_installed_stops_when_runtime_present() {
    let mut harness = Harness::new();
    harness.config.skip_if_installed = true;
    harness.serve_metadata(&metadata(vec![release("9.0.10")]));
    let installer_mock = harness.serve_installer("9.0.10", "abc");
    let listing = RuntimeListing::available(
        "Microsoft.AspNetCore.App 9.0.10 [C:\\Program Files\\dotnet\\shared\\Microsoft.AspNetCore.App]\n",
    );
    let host = FakeHost::with_listings(vec![listing.clone(), listing]);
    let (transcript, _sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    installer_mock.assert_hits(0);
    assert!(matches!(
        report.outcome,
        RunOutcome::AlreadyInstalled { ref version } if version == "9.0.10"
    ));
    assert_eq!(
        report
            .inventories
            .before
            .as_ref()
            .map(Vec::len),
        Some(1)
    );
    assert!(host.installs().is_empty());
}

#[tokio::test]
async fn post_check_inventory_is_captured_after_install() {
    let harness = Harness::new();
    harness.serve_metadata(&metadata(vec![release("9.0.10")]));
    harness.serve_installer("9.0.10", "abc");
    let host = FakeHost::with_listings(vec![
        RuntimeListing::available("Microsoft.AspNetCore.App 9.0.9 [C:\\dotnet]\n"),
        RuntimeListing::available(
            "Microsoft.AspNetCore.App 9.0.9 [C:\\dotnet]\nMicrosoft.AspNetCore.App 9.0.10 [C:\\dotnet]\n",
        ),
    ]);
    let (transcript, _sink) = harness.transcript();

    let report = hostinst::run(&harness.config, &host, transcript).await;

    assert!(matches!(report.outcome, RunOutcome::Installed { .. }));
    let after = report
        .inventories
        .after
        .expect("post-check should have run");
    assert_eq!(after.len(), 2);
    assert!(after.iter().any(|runtime| runtime.version == "9.0.10"));
}
