//! Crypto price abstractions and the bitcoin price fetcher

use crate::core::state::CryptoUpdate;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Price, 24h change and market cap in one quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AssetQuote {
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
}

/// Quotes for a single asset keyed by lowercase quote currency.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CryptoQuote {
    pub quotes: BTreeMap<String, AssetQuote>,
}

impl CryptoQuote {
    pub fn get(&self, currency: &str) -> Option<&AssetQuote> {
        self.quotes.get(&currency.to_lowercase())
    }

    pub fn usd(&self) -> AssetQuote {
        self.get("usd").copied().unwrap_or_default()
    }
}

#[async_trait]
pub trait CryptoPriceProvider: Send + Sync {
    async fn fetch_quote(&self) -> Result<CryptoQuote>;
}

/// Fetches the USD quote. Returns `None` on failure so the caller keeps
/// whatever it already had; there is no fallback price.
pub async fn fetch_crypto_price(provider: &dyn CryptoPriceProvider) -> Option<CryptoUpdate> {
    match provider.fetch_quote().await {
        Ok(quote) => {
            let usd = quote.usd();
            info!(price = usd.price, "Bitcoin price fetched");
            Some(CryptoUpdate {
                price_usd: usd.price,
                change_24h: usd.change_24h,
                market_cap_usd: usd.market_cap,
            })
        }
        Err(e) => {
            warn!(error = %e, "Bitcoin price unavailable, keeping previous values");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct StaticQuote(Option<CryptoQuote>);

    #[async_trait]
    impl CryptoPriceProvider for StaticQuote {
        async fn fetch_quote(&self) -> Result<CryptoQuote> {
            self.0.clone().ok_or_else(|| anyhow!("timeout"))
        }
    }

    #[tokio::test]
    async fn test_usd_quote_is_used() {
        let mut quotes = BTreeMap::new();
        quotes.insert(
            "usd".to_string(),
            AssetQuote {
                price: 97000.0,
                change_24h: 1.25,
                market_cap: 1.92e12,
            },
        );
        quotes.insert(
            "eur".to_string(),
            AssetQuote {
                price: 90000.0,
                change_24h: 1.1,
                market_cap: 1.8e12,
            },
        );

        let update = fetch_crypto_price(&StaticQuote(Some(CryptoQuote { quotes })))
            .await
            .unwrap();

        assert_eq!(update.price_usd, 97000.0);
        assert_eq!(update.change_24h, 1.25);
        assert_eq!(update.market_cap_usd, 1.92e12);
    }

    #[tokio::test]
    async fn test_missing_usd_defaults_to_zero() {
        let update = fetch_crypto_price(&StaticQuote(Some(CryptoQuote::default())))
            .await
            .unwrap();
        assert_eq!(update.price_usd, 0.0);
        assert_eq!(update.change_24h, 0.0);
        assert_eq!(update.market_cap_usd, 0.0);
    }

    #[tokio::test]
    async fn test_failure_yields_no_update() {
        assert!(fetch_crypto_price(&StaticQuote(None)).await.is_none());
    }

    #[test]
    fn test_quote_lookup_is_case_insensitive() {
        let mut quote = CryptoQuote::default();
        quote.quotes.insert("egp".to_string(), AssetQuote::default());
        assert!(quote.get("EGP").is_some());
        assert!(quote.get("sar").is_none());
    }
}
