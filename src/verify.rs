use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::config::VerifyConfig;

const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("failed to acquire browser: {0}")]
    Launch(String),
    #[error("invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("navigation to '{url}' failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CdpError,
    },
    #[error("element '{selector}' not found within {timeout_ms}ms")]
    ElementNotFound { selector: String, timeout_ms: u64 },
    #[error("could not scroll '{selector}' into view: {source}")]
    Scroll {
        selector: String,
        #[source]
        source: CdpError,
    },
    #[error("screenshot capture failed: {0}")]
    Screenshot(#[source] CdpError),
    #[error("error closing browser: {0}")]
    Shutdown(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the whole verification: navigate to the target URL, scroll the
/// configured section into view, capture the visible viewport to the
/// output path. The browser is released on every exit path.
pub async fn run(config: &VerifyConfig) -> Result<(), VerifyError> {
    let session = BrowserSession::launch(config.window_width, config.window_height).await?;

    let result = capture_section(&session, config).await;

    // Release the browser whether or not the capture succeeded. A close
    // failure must not mask the verification outcome.
    if let Err(e) = session.close().await {
        warn!("Error closing browser: {}", e);
    }

    result
}

async fn capture_section(
    session: &BrowserSession,
    config: &VerifyConfig,
) -> Result<(), VerifyError> {
    let url = config
        .target()
        .map_err(|source| VerifyError::InvalidUrl {
            url: config.target_url.clone(),
            source,
        })?
        .to_string();
    let page = session.new_page().await?;

    info!("Navigating to {}", url);
    page.goto(&url).await.map_err(|source| VerifyError::Navigation {
        url: url.clone(),
        source,
    })?;
    page.wait_for_navigation()
        .await
        .map_err(|source| VerifyError::Navigation {
            url: url.clone(),
            source,
        })?;

    let element =
        wait_for_element(&page, &config.section_selector, config.element_timeout_ms).await?;

    element
        .scroll_into_view()
        .await
        .map_err(|source| VerifyError::Scroll {
            selector: config.section_selector.clone(),
            source,
        })?;
    debug!("Section '{}' scrolled into view", config.section_selector);

    // Viewport capture, not full page.
    let bytes = page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .full_page(false)
                .build(),
        )
        .await
        .map_err(VerifyError::Screenshot)?;

    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&config.output_path, &bytes).await?;
    info!(
        "Viewport screenshot written to {} ({} bytes)",
        config.output_path.display(),
        bytes.len()
    );

    Ok(())
}

/// `find_element` resolves against the DOM as it is right now, without
/// waiting, so poll until the element is attached or the timeout elapses.
async fn wait_for_element(
    page: &Page,
    selector: &str,
    timeout_ms: u64,
) -> Result<Element, VerifyError> {
    let timeout = Duration::from_millis(timeout_ms);
    let start = Instant::now();

    loop {
        match page.find_element(selector).await {
            Ok(element) => {
                debug!(
                    "Element '{}' found after {}ms",
                    selector,
                    start.elapsed().as_millis()
                );
                return Ok(element);
            }
            Err(_) => {
                if start.elapsed() >= timeout {
                    return Err(VerifyError::ElementNotFound {
                        selector: selector.to_string(),
                        timeout_ms,
                    });
                }
                tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_not_found_names_selector_and_timeout() {
        let err = VerifyError::ElementNotFound {
            selector: "#contact".to_string(),
            timeout_ms: 5_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("#contact"));
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn launch_error_carries_diagnostic() {
        let err = VerifyError::Launch("no chromium executable found".to_string());
        assert!(err.to_string().contains("no chromium executable found"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: VerifyError = io.into();
        assert!(matches!(err, VerifyError::Io(_)));
    }
}
