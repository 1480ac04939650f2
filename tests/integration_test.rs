// tests/integration_test.rs
use std::process::Command;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pypi-cleanup"));
    cmd.env_remove("PYPI_CLEANUP_PASSWORD")
        .env_remove("PYPI_CLEANUP_OTP")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_pypi_cleanup_help() {
    let output = binary()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("pypi-cleanup"));
    assert!(stdout.contains("--max-nightlies"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn test_pypi_cleanup_version() {
    let output = binary()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_host_is_usage_error() {
    let output = binary()
        .arg("--dry-run")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_live_run_without_username_is_validation_error() {
    let output = binary()
        .args(["--test", "--config", "tests/fixtures/custom_indexes.toml"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("username is required"));
}

#[test]
fn test_live_run_without_password_is_validation_error() {
    let output = binary()
        .args([
            "--test",
            "-u",
            "release-bot",
            "--config",
            "tests/fixtures/custom_indexes.toml",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("PYPI_CLEANUP_PASSWORD"));
}

#[test]
fn test_invalid_username_is_validation_error() {
    let output = binary()
        .args(["--test", "--dry-run", "--username=bad-"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[cfg(unix)]
mod interrupt {
    use super::binary;
    use axum::routing::get;
    use axum::Router;
    use std::io::Write;
    use std::process::{Command, Stdio};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Serve a read API that accepts the request and never answers in time.
    async fn stalled_index(hit: Arc<AtomicBool>) -> String {
        let app = Router::new().route(
            "/pypi/{package}/json",
            get(move || {
                let hit = hit.clone();
                async move {
                    hit.store(true, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "{}"
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_interrupt_reports_distinct_status() {
        let hit = Arc::new(AtomicBool::new(false));
        let url = stalled_index(hit.clone()).await;

        let mut config = NamedTempFile::new().unwrap();
        write!(
            config,
            "package = \"demo\"\n[indexes]\ntest = \"{}\"\n[http]\nrequest_timeout_secs = 120\n",
            url
        )
        .unwrap();
        config.flush().unwrap();

        let child = binary()
            .args(["--test", "--dry-run", "--config"])
            .arg(config.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start binary");
        let pid = child.id().to_string();

        let mut waited = Duration::ZERO;
        while !hit.load(Ordering::SeqCst) {
            assert!(waited < Duration::from_secs(30), "index was never contacted");
            tokio::time::sleep(Duration::from_millis(50)).await;
            waited += Duration::from_millis(50);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        let status = Command::new("kill")
            .args(["-INT", &pid])
            .status()
            .expect("Failed to send SIGINT");
        assert!(status.success());

        let output = tokio::task::spawn_blocking(move || child.wait_with_output())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(output.status.code(), Some(130));
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("Interrupted"), "stderr was: {}", stderr);
    }
}
