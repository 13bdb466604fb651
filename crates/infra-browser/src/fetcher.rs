// Remote browser adapter

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use scrapeline_core::config::FetcherConfig;
use scrapeline_core::port::{FetchError, PageFetcher};
use tracing::{debug, info, warn};

/// Captures pages through a shared headless browser's DevTools endpoint.
///
/// Each fetch opens its own page and closes it before returning, whatever
/// the outcome. The browser itself belongs to the environment and is never
/// closed here - several workers may be pointed at the same one.
pub struct CdpPageFetcher {
    config: FetcherConfig,
}

impl CdpPageFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        page.goto(url)
            .await
            .map_err(|e| FetchError::Navigation(e.to_string()))?;

        match tokio::time::timeout(self.config.settle_timeout, page.wait_for_navigation()).await {
            Ok(Ok(_)) => {
                // Give client-side rendering a moment to finish.
                tokio::time::sleep(self.config.render_delay).await;
            }
            Ok(Err(e)) => return Err(FetchError::Navigation(e.to_string())),
            Err(_) => {
                // Soft condition: capture whatever is present at the
                // deadline.
                warn!(
                    url = %url,
                    timeout_secs = self.config.settle_timeout.as_secs(),
                    "Timed out waiting for page to settle, capturing current content"
                );
            }
        }

        page.content()
            .await
            .map_err(|e| FetchError::Session(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for CdpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(endpoint = %self.config.endpoint, "Connecting to browser");
        let (browser, mut handler) = Browser::connect(self.config.endpoint.as_str())
            .await
            .map_err(|e| FetchError::Session(e.to_string()))?;

        // The handler task pumps CDP events for the lifetime of this fetch.
        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                driver.abort();
                return Err(FetchError::Session(e.to_string()));
            }
        };

        let result = self.capture(&page, url).await;

        // Release the page on every exit path; the shared browser stays up.
        if let Err(e) = page.close().await {
            warn!(error = %e, "Page close failed");
        }
        driver.abort();

        if let Ok(document) = &result {
            info!(url = %url, bytes = document.len(), "Document captured");
        }
        result
    }
}
