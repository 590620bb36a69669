use super::util::JsonClient;
use crate::core::rates::RatesProvider;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, f64>,
}

/// ECB reference rates against USD from the Frankfurter API.
pub struct FrankfurterProvider {
    base_url: String,
    http: JsonClient,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, http: JsonClient) -> Self {
        FrankfurterProvider {
            base_url: base_url.to_string(),
            http,
        }
    }
}

#[async_trait]
impl RatesProvider for FrankfurterProvider {
    #[instrument(name = "FrankfurterRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        let url = format!("{}/latest?from=USD", self.base_url);
        let data: LatestResponse = self.http.get_json(&url).await?;
        Ok(data.rates)
    }
}
