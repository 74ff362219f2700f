//! End-to-end tests driving a real headless chromium against an
//! in-process fixture server. Ignored by default because they need a
//! chromium binary on the host; run with `cargo test -- --ignored`.

use std::net::SocketAddr;
use std::path::Path;

use axum::{response::Html, routing::get, Router};
use serial_test::serial;

use verishot::config::VerifyConfig;
use verishot::verify::{run, VerifyError};

const PNG_MAGIC: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

// Tall spacer pushes the contact section below the fold, so the runner
// has to actually scroll to reach it.
const PAGE_WITH_CONTACT: &str = r#"<!DOCTYPE html>
<html>
<head><title>verishot fixture</title></head>
<body>
  <div style="height: 3000px">spacer</div>
  <div id="contact">Contact us</div>
</body>
</html>"#;

const PAGE_WITHOUT_CONTACT: &str = r#"<!DOCTYPE html>
<html>
<head><title>verishot fixture</title></head>
<body>
  <p>Nothing to see here.</p>
</body>
</html>"#;

async fn serve_fixture(page: &'static str) -> SocketAddr {
    let app = Router::new().route("/", get(move || async move { Html(page) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr, output: &Path) -> VerifyConfig {
    VerifyConfig {
        target_url: format!("http://{}", addr),
        output_path: output.to_path_buf(),
        element_timeout_ms: 2_000,
        ..VerifyConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore]
async fn section_below_fold_produces_viewport_png() {
    let addr = serve_fixture(PAGE_WITH_CONTACT).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("verification/verification.png");
    let config = config_for(addr, &output);

    run(&config).await.expect("verification should succeed");

    let bytes = std::fs::read(&output).expect("screenshot file should exist");
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..8], PNG_MAGIC, "output should decode as PNG");

    // Second run against unchanged server state overwrites without error.
    run(&config).await.expect("second run should succeed");
    let bytes_again = std::fs::read(&output).unwrap();
    assert_eq!(&bytes_again[..8], PNG_MAGIC);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore]
async fn missing_element_fails_without_artifact() {
    let addr = serve_fixture(PAGE_WITHOUT_CONTACT).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("verification.png");
    let config = config_for(addr, &output);

    let err = run(&config).await.expect_err("locator should not resolve");
    assert!(matches!(err, VerifyError::ElementNotFound { .. }));
    assert!(!output.exists(), "no screenshot on failure");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore]
async fn unreachable_server_fails_without_artifact() {
    // Bind and immediately drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("verification.png");
    let config = config_for(addr, &output);

    let err = run(&config).await.expect_err("navigation should fail");
    assert!(matches!(err, VerifyError::Navigation { .. }));
    assert!(!output.exists(), "no screenshot on failure");
}
