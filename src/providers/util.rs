use anyhow::{Context, Error, Result, anyhow};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("goldwatch/", env!("CARGO_PKG_VERSION"));
const RETRY_DELAY_MS: u64 = 500;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// HTTP client shared by every provider in a session.
#[derive(Clone, Debug)]
pub struct JsonClient {
    client: Client,
    retries: usize,
}

impl JsonClient {
    pub fn new(timeout: Duration, retries: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(JsonClient { client, retries })
    }

    /// GETs `url` and parses the body as `T`. Non-success statuses, empty
    /// bodies and malformed JSON are all errors.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Requesting {}", url);
        let client = &self.client;
        let response = with_retry(
            || async move { client.get(url).send().await?.error_for_status() },
            self.retries,
            RETRY_DELAY_MS,
        )
        .await
        .with_context(|| format!("Request failed for {url}"))?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for {url}"))?;

        if text.trim().is_empty() {
            return Err(anyhow!("Received empty response from {}", url));
        }

        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response from {url}"))
    }
}
