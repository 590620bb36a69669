//! Gold price sources and the fallback chain that runs them

use crate::core::state::{GoldSource, GoldUpdate};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Spot price used when every source fails (Dec 2, 2025).
pub const FALLBACK_GOLD_OUNCE_USD: f64 = 2650.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldQuote {
    pub ounce_usd: f64,
    pub change_24h: f64,
}

#[async_trait]
pub trait GoldPriceSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches a USD per troy ounce quote. Responses without a usable price
    /// are errors.
    async fn fetch_quote(&self) -> Result<GoldQuote>;
}

/// Tries `sources` in order and stops at the first usable quote. When all of
/// them fail the fixed fallback price is returned.
#[instrument(name = "GoldPriceFetch", skip_all, fields(sources = sources.len()))]
pub async fn fetch_gold_price(sources: &[Box<dyn GoldPriceSource>]) -> GoldUpdate {
    for source in sources {
        match source.fetch_quote().await {
            Ok(quote) => {
                info!(
                    source = source.name(),
                    price = quote.ounce_usd,
                    "Gold price fetched"
                );
                return GoldUpdate {
                    ounce_usd: quote.ounce_usd,
                    change_24h: quote.change_24h,
                    source: GoldSource::Live,
                };
            }
            Err(e) => warn!(source = source.name(), error = %e, "Gold price source failed"),
        }
    }

    warn!(
        price = FALLBACK_GOLD_OUNCE_USD,
        "All gold price sources failed, using fallback price"
    );
    GoldUpdate {
        ounce_usd: FALLBACK_GOLD_OUNCE_USD,
        change_24h: 0.0,
        source: GoldSource::Fallback,
    }
}
