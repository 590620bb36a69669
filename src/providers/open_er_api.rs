use super::util::JsonClient;
use crate::core::rates::RatesProvider;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Open Exchange Rates API (open.er-api.com). Quotes EGP, which the ECB
/// reference rates do not.
pub struct OpenErApiProvider {
    base_url: String,
    http: JsonClient,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, http: JsonClient) -> Self {
        OpenErApiProvider {
            base_url: base_url.to_string(),
            http,
        }
    }
}

#[async_trait]
impl RatesProvider for OpenErApiProvider {
    #[instrument(name = "OpenErApiRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        let url = format!("{}/v6/latest/USD", self.base_url);
        let data: LatestResponse = self.http.get_json(&url).await?;

        match data.result.as_deref() {
            Some(result) if result != "success" => {
                Err(anyhow!("Rates request was not successful: {}", result))
            }
            _ => Ok(data.rates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(mock_server: &MockServer) -> OpenErApiProvider {
        let http = JsonClient::new(Duration::from_secs(5), 0).unwrap();
        OpenErApiProvider::new(&mock_server.uri(), http)
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "rates": {"USD": 1, "EGP": 47.6312, "SAR": 3.75}
        }"#;
        let mock_server = create_mock_server(mock_response).await;

        let rates = provider(&mock_server).fetch_rates().await.unwrap();

        assert_eq!(rates["EGP"], 47.6312);
        assert_eq!(rates["SAR"], 3.75);
    }

    #[tokio::test]
    async fn test_error_result() {
        let mock_response = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        let mock_server = create_mock_server(mock_response).await;

        let result = provider(&mock_server).fetch_rates().await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Rates request was not successful: error"
        );
    }

    #[tokio::test]
    async fn test_non_numeric_rate_is_error() {
        let mock_response = r#"{"result": "success", "rates": {"EGP": "47.63"}}"#;
        let mock_server = create_mock_server(mock_response).await;

        assert!(provider(&mock_server).fetch_rates().await.is_err());
    }
}
