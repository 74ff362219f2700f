use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::verify::VerifyError;

/// Scoped ownership of one headless Chromium process over CDP.
///
/// Created at the start of a verification run and released at the end.
/// If `close` is never reached, dropping the handles closes the CDP
/// connection and chromiumoxide kills the child process, so a failed run
/// cannot leak a browser.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a headless Chromium sized to the requested viewport.
    pub async fn launch(width: u32, height: u32) -> Result<Self, VerifyError> {
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        // Containers without a usable user namespace cannot start the
        // Chromium sandbox at all.
        if no_sandbox_requested() {
            builder = builder.no_sandbox();
        }

        let config = builder.build().map_err(VerifyError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| VerifyError::Launch(format!("failed to launch chromium: {}", e)))?;

        // Pump CDP events in the background. Without this task the
        // connection stalls and every page call hangs.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!("Headless chromium launched ({}x{})", width, height);

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a fresh blank page in this session.
    pub async fn new_page(&self) -> Result<Page, VerifyError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| VerifyError::Launch(format!("failed to create page: {}", e)))
    }

    /// Orderly shutdown: ask the browser to quit, reap the child process,
    /// let the event pump drain. If this errors out early the drop of the
    /// handles still kills the child.
    pub async fn close(mut self) -> Result<(), VerifyError> {
        self.browser
            .close()
            .await
            .map_err(|e| VerifyError::Shutdown(e.to_string()))?;
        let _ = self.browser.wait().await;
        let _ = self.handler_task.await;
        tracing::debug!("Browser closed");
        Ok(())
    }
}

fn no_sandbox_requested() -> bool {
    std::env::var("VERISHOT_NO_SANDBOX")
        .map(|v| v != "0")
        .unwrap_or(false)
}
