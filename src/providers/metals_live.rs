use super::util::JsonClient;
use crate::core::gold::{GoldPriceSource, GoldQuote};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct SpotRecord {
    price: Option<f64>,
}

/// Spot gold from metals.live. The feed has no 24h change.
pub struct MetalsLiveProvider {
    base_url: String,
    http: JsonClient,
}

impl MetalsLiveProvider {
    pub fn new(base_url: &str, http: JsonClient) -> Self {
        MetalsLiveProvider {
            base_url: base_url.to_string(),
            http,
        }
    }
}

#[async_trait]
impl GoldPriceSource for MetalsLiveProvider {
    fn name(&self) -> &str {
        "metals.live"
    }

    #[instrument(name = "MetalsLiveFetch", skip(self))]
    async fn fetch_quote(&self) -> Result<GoldQuote> {
        let url = format!("{}/v1/spot/gold", self.base_url);
        let records: Vec<SpotRecord> = self.http.get_json(&url).await?;

        let ounce_usd = records
            .first()
            .and_then(|record| record.price)
            .filter(|price| *price > 0.0)
            .ok_or_else(|| anyhow!("No spot price found in metals.live response"))?;

        Ok(GoldQuote {
            ounce_usd,
            change_24h: 0.0,
        })
    }
}
