//! End-to-end update runs through the library API.

use tokio_util::sync::CancellationToken;
use yuzu_updater::config::UpdaterConfig;
use yuzu_updater::core::{UpdaterError, exit_code_for};
use yuzu_updater::fetcher::ProcessInfo;
use yuzu_updater::test_utils::archives::{tar_gz_bytes, tar_xz_bytes, zip_bytes};
use yuzu_updater::test_utils::{FakeProbe, FakeProcesses, FakeTransport, init_test_logging, listing_page};
use yuzu_updater::utils::Platform;
use yuzu_updater::version::Version;
use yuzu_updater::workflow::{UpdateWorkflow, WorkflowOutcome};
use tempfile::TempDir;

const WINDOWS_DEBUG: &str = "/download/mainline-0-1500/yuzu-windows-msvc-20230706-debugsymbols.zip";
const WINDOWS_ASSET: &str = "/download/mainline-0-1500/yuzu-windows-msvc-20230706-6b1f3e8f6.zip";
const LINUX_DEBUG: &str = "/download/mainline-0-1500/yuzu-linux-20230706-debug.tar.gz";
const LINUX_ASSET: &str = "/download/mainline-0-1500/yuzu-linux-20230706-6b1f3e8f6.tar.gz";

fn installation(platform: Platform) -> (TempDir, UpdaterConfig) {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let config = UpdaterConfig::for_platform(platform, temp.path().to_path_buf()).unwrap();
    (temp, config)
}

fn asset_url(config: &UpdaterConfig, path: &str) -> String {
    format!("{}{path}", config.releases_url)
}

#[tokio::test]
async fn test_windows_update_replaces_files_and_records_version() {
    let (_temp, config) = installation(Platform::Windows);
    let root = &config.install_root;
    std::fs::write(config.marker_path(), "1234").unwrap();
    std::fs::write(root.join("yuzu.exe"), "old build").unwrap();
    std::fs::write(root.join("user.ini"), "keep me").unwrap();

    let archive = zip_bytes(
        "yuzu-windows-msvc",
        &[("yuzu.exe", "new build"), ("Qt6Core.dll", "qt"), ("yuzu-windows-msvc-source.tar.xz", "src")],
    );
    let (head, tail) = archive.split_at(archive.len() / 2);
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_DEBUG, WINDOWS_ASSET]))
        .with_asset(asset_url(&config, WINDOWS_ASSET), vec![head.to_vec(), tail.to_vec()]);
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let mut reports = Vec::new();
    let outcome = workflow.run(|progress| reports.push(progress.downloaded)).await.unwrap();

    assert_eq!(
        outcome,
        WorkflowOutcome::Updated {
            from: Version::new(1234),
            to: Version::new(1500),
            asset: "yuzu-windows-msvc-20230706-6b1f3e8f6.zip".into(),
        }
    );
    assert_eq!(reports.first(), Some(&0));
    assert_eq!(reports.last(), Some(&(archive.len() as u64)));

    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1500");
    assert_eq!(std::fs::read_to_string(root.join("yuzu.exe")).unwrap(), "new build");
    assert_eq!(std::fs::read_to_string(root.join("Qt6Core.dll")).unwrap(), "qt");
    assert_eq!(std::fs::read_to_string(root.join("user.ini")).unwrap(), "keep me");
    assert!(!root.join("yuzu-windows-msvc-source.tar.xz").exists());
    assert!(!root.join("yuzu-windows-msvc").exists());
    assert!(!config.archive_path().exists());
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn test_linux_update_from_tarball() {
    let (_temp, config) = installation(Platform::Linux);
    std::fs::write(config.marker_path(), "1400").unwrap();

    let archive = tar_gz_bytes("yuzu-linux", &[("yuzu", "new build"), ("yuzu-cmd", "cmd")]);
    let transport = FakeTransport::new(listing_page(1500, &[LINUX_DEBUG, LINUX_ASSET]))
        .with_asset(asset_url(&config, LINUX_ASSET), vec![archive]);
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let outcome = workflow.run(|_| {}).await.unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Updated { .. }));
    assert_eq!(std::fs::read_to_string(config.install_root.join("yuzu")).unwrap(), "new build");
    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1500");
}

#[tokio::test]
async fn test_linux_update_from_xz_tarball() {
    let (_temp, config) = installation(Platform::Linux);
    std::fs::write(config.marker_path(), "1400").unwrap();
    let asset = "/download/mainline-0-1500/yuzu-linux-20230706-6b1f3e8f6.tar.xz";

    let archive = tar_xz_bytes("yuzu-linux", &[("yuzu", "xz build")]);
    let transport = FakeTransport::new(listing_page(1500, &[LINUX_DEBUG, asset]))
        .with_asset(asset_url(&config, asset), vec![archive]);
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let outcome = workflow.run(|_| {}).await.unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Updated { ref asset, .. } if asset.ends_with(".tar.xz")));
    assert_eq!(std::fs::read_to_string(config.install_root.join("yuzu")).unwrap(), "xz build");
    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1500");
}

#[tokio::test]
async fn test_probe_is_used_without_marker() {
    let (_temp, config) = installation(Platform::Windows);
    let archive = zip_bytes("yuzu-windows-msvc", &[("yuzu.exe", "new build")]);
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_DEBUG, WINDOWS_ASSET]))
        .with_asset(asset_url(&config, WINDOWS_ASSET), vec![archive]);
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1450);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let outcome = workflow.run(|_| {}).await.unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Updated { from, .. } if from == Version::new(1450)));
    assert_eq!(probe.calls(), 1);
    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1500");
}

#[tokio::test]
async fn test_probe_failure_without_marker_stops_before_network() {
    let (_temp, config) = installation(Platform::Windows);
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_DEBUG, WINDOWS_ASSET]));
    let processes = FakeProcesses::default();
    let probe = FakeProbe::failing("failed to run: No such file or directory");

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let err = workflow.run(|_| {}).await.unwrap_err();

    assert!(matches!(err, UpdaterError::VersionProbeFailed { .. }));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(exit_code_for(&anyhow::Error::from(err)), 5);
    assert_eq!(transport.text_requests(), 0);
    assert_eq!(transport.body_requests(), 0);
    assert!(!config.marker_path().exists());
}

#[tokio::test]
async fn test_local_newer_than_remote_stops_before_download() {
    let (_temp, config) = installation(Platform::Windows);
    std::fs::write(config.marker_path(), "1600").unwrap();
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_DEBUG, WINDOWS_ASSET]));
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let err = workflow.run(|_| {}).await.unwrap_err();

    assert_eq!(
        err,
        UpdaterError::Inconsistent {
            local: 1600,
            remote: 1500
        }
    );
    assert_eq!(err.exit_code(), 6);
    assert_eq!(transport.body_requests(), 0);
    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1600");
}

#[tokio::test]
async fn test_copy_failure_keeps_previous_version() {
    let (_temp, config) = installation(Platform::Windows);
    let root = &config.install_root;
    std::fs::write(config.marker_path(), "1234").unwrap();
    // A directory where the archive carries a file makes the copy fail.
    std::fs::create_dir_all(root.join("blocker")).unwrap();

    let archive = zip_bytes("yuzu-windows-msvc", &[("yuzu.exe", "new build"), ("blocker", "file")]);
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_DEBUG, WINDOWS_ASSET]))
        .with_asset(asset_url(&config, WINDOWS_ASSET), vec![archive]);
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let err = workflow.run(|_| {}).await.unwrap_err();

    assert!(matches!(err, UpdaterError::InstallError { .. }));
    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1234");
    assert!(!config.archive_path().exists());
}

#[tokio::test]
async fn test_single_asset_listing_is_rejected() {
    let (_temp, config) = installation(Platform::Windows);
    std::fs::write(config.marker_path(), "1234").unwrap();
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_ASSET]));
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let err = workflow.run(|_| {}).await.unwrap_err();

    assert!(matches!(err, UpdaterError::NoAssetFound { found: 1, .. }));
    assert_eq!(transport.body_requests(), 0);
}

#[tokio::test]
async fn test_running_emulator_blocks_update() {
    let (_temp, config) = installation(Platform::Linux);
    std::fs::write(config.marker_path(), "1234").unwrap();
    let transport = FakeTransport::new(listing_page(1500, &[LINUX_DEBUG, LINUX_ASSET]));
    let processes = FakeProcesses::new(vec![
        ProcessInfo::new("yuzu-updater", 10),
        ProcessInfo::new("yuzu", 11),
    ])
    .with_current_pid(10);
    let probe = FakeProbe::version(1);

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, CancellationToken::new());
    let err = workflow.run(|_| {}).await.unwrap_err();

    assert!(matches!(err, UpdaterError::InstanceRunning { pid: 11, .. }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(transport.body_requests(), 0);
}

#[tokio::test]
async fn test_cancelled_run_leaves_installation_untouched() {
    let (_temp, config) = installation(Platform::Windows);
    std::fs::write(config.marker_path(), "1234").unwrap();
    let archive = zip_bytes("yuzu-windows-msvc", &[("yuzu.exe", "new build")]);
    let transport = FakeTransport::new(listing_page(1500, &[WINDOWS_DEBUG, WINDOWS_ASSET]))
        .with_asset(asset_url(&config, WINDOWS_ASSET), vec![archive]);
    let processes = FakeProcesses::default();
    let probe = FakeProbe::version(1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let workflow = UpdateWorkflow::new(&config, &transport, &processes, &probe, cancel);
    let err = workflow.run(|_| {}).await.unwrap_err();

    assert_eq!(err, UpdaterError::Cancelled);
    assert!(!config.install_root.join("yuzu.exe").exists());
    assert!(!config.archive_path().exists());
    assert_eq!(std::fs::read_to_string(config.marker_path()).unwrap(), "1234");
}
