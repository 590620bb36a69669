//! CoinGecko `/simple/price` client, used for gold-backed tokens and bitcoin.

use super::util::JsonClient;
use crate::core::crypto::{AssetQuote, CryptoPriceProvider, CryptoQuote};
use crate::core::gold::{GoldPriceSource, GoldQuote};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

/// `{"<id>": {"usd": 2650.1, "usd_24h_change": 0.4, ...}}`; any field may be null.
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

pub const TETHER_GOLD: &str = "tether-gold";
pub const PAX_GOLD: &str = "pax-gold";
pub const BITCOIN: &str = "bitcoin";

pub const BITCOIN_QUOTE_CURRENCIES: [&str; 6] = ["usd", "eur", "gbp", "egp", "sar", "aed"];

#[derive(Clone)]
struct CoinGeckoClient {
    base_url: String,
    http: JsonClient,
}

impl CoinGeckoClient {
    async fn simple_price(
        &self,
        id: &str,
        vs_currencies: &[&str],
        include_market_cap: bool,
    ) -> Result<HashMap<String, Option<f64>>> {
        let mut url = format!(
            "{}/simple/price?ids={}&vs_currencies={}&include_24hr_change=true",
            self.base_url,
            id,
            vs_currencies.join(",")
        );
        if include_market_cap {
            url.push_str("&include_market_cap=true");
        }

        let mut data: SimplePriceResponse = self.http.get_json(&url).await?;
        data.remove(id)
            .ok_or_else(|| anyhow!("No price data found for asset: {}", id))
    }
}

/// Gold price from a gold-backed token pegged to one troy ounce.
pub struct CoinGeckoGoldSource {
    id: String,
    client: CoinGeckoClient,
}

impl CoinGeckoGoldSource {
    pub fn new(base_url: &str, id: &str, http: JsonClient) -> Self {
        CoinGeckoGoldSource {
            id: id.to_string(),
            client: CoinGeckoClient {
                base_url: base_url.to_string(),
                http,
            },
        }
    }
}

#[async_trait]
impl GoldPriceSource for CoinGeckoGoldSource {
    fn name(&self) -> &str {
        &self.id
    }

    #[instrument(name = "CoinGeckoGoldFetch", skip(self), fields(id = %self.id))]
    async fn fetch_quote(&self) -> Result<GoldQuote> {
        let fields = self.client.simple_price(&self.id, &["usd"], false).await?;

        let ounce_usd = fields
            .get("usd")
            .copied()
            .flatten()
            .filter(|price| *price > 0.0)
            .ok_or_else(|| anyhow!("No usable USD price for asset: {}", self.id))?;
        let change_24h = fields.get("usd_24h_change").copied().flatten().unwrap_or(0.0);

        Ok(GoldQuote {
            ounce_usd,
            change_24h,
        })
    }
}

/// Price, change and market cap for one coin across several quote currencies.
pub struct CoinGeckoCryptoProvider {
    id: String,
    vs_currencies: Vec<String>,
    client: CoinGeckoClient,
}

impl CoinGeckoCryptoProvider {
    pub fn new(base_url: &str, id: &str, vs_currencies: &[&str], http: JsonClient) -> Self {
        CoinGeckoCryptoProvider {
            id: id.to_string(),
            vs_currencies: vs_currencies.iter().map(|c| c.to_lowercase()).collect(),
            client: CoinGeckoClient {
                base_url: base_url.to_string(),
                http,
            },
        }
    }

    pub fn bitcoin(base_url: &str, http: JsonClient) -> Self {
        Self::new(base_url, BITCOIN, &BITCOIN_QUOTE_CURRENCIES, http)
    }
}

#[async_trait]
impl CryptoPriceProvider for CoinGeckoCryptoProvider {
    #[instrument(name = "CoinGeckoCryptoFetch", skip(self), fields(id = %self.id))]
    async fn fetch_quote(&self) -> Result<CryptoQuote> {
        let vs: Vec<&str> = self.vs_currencies.iter().map(String::as_str).collect();
        let fields = self.client.simple_price(&self.id, &vs, true).await?;
        let field = |key: String| fields.get(&key).copied().flatten();

        let mut quotes = BTreeMap::new();
        for currency in &self.vs_currencies {
            let Some(price) = field(currency.clone()) else {
                continue;
            };
            quotes.insert(
                currency.clone(),
                AssetQuote {
                    price,
                    change_24h: field(format!("{currency}_24h_change")).unwrap_or(0.0),
                    market_cap: field(format!("{currency}_market_cap")).unwrap_or(0.0),
                },
            );
        }

        Ok(CryptoQuote { quotes })
    }
}
