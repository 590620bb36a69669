//! In-memory price state and the partial updates merged into it

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Provenance of the gold price currently held in [`PriceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoldSource {
    #[default]
    Loading,
    Live,
    Fallback,
}

impl Display for GoldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GoldSource::Loading => "loading",
                GoldSource::Live => "live",
                GoldSource::Fallback => "fallback",
            }
        )
    }
}

/// USD based multipliers keyed by currency code. `USD` is always `1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRates(BTreeMap<String, f64>);

impl ExchangeRates {
    pub fn usd_only() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert("USD".to_string(), 1.0);
        ExchangeRates(rates)
    }

    /// Seeds `USD: 1` and merges `rates` over it; a provider cannot move `USD`.
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut merged = Self::usd_only();
        for (code, rate) in rates {
            merged.insert(&code, rate);
        }
        merged
    }

    /// Snapshot used when the primary rates source is unreachable (Dec 2, 2025).
    pub fn fallback() -> Self {
        Self::from_rates(
            [
                ("EUR", 0.95),
                ("GBP", 0.79),
                ("EGP", 50.85),
                ("SAR", 3.75),
                ("AED", 3.67),
            ]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate)),
        )
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.0.get(currency).copied()
    }

    /// Rate for `currency`, or par when the currency is unknown.
    pub fn rate_or_par(&self, currency: &str) -> f64 {
        self.get(currency).unwrap_or(1.0)
    }

    pub fn insert(&mut self, currency: &str, rate: f64) {
        if currency == "USD" {
            return;
        }
        self.0.insert(currency.to_string(), rate);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::usd_only()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldUpdate {
    pub ounce_usd: f64,
    pub change_24h: f64,
    pub source: GoldSource,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CryptoUpdate {
    pub price_usd: f64,
    pub change_24h: f64,
    pub market_cap_usd: f64,
}

/// Results of one fetch cycle, merged into [`PriceState`] at the join point.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchBatch {
    pub rates: ExchangeRates,
    pub gold: GoldUpdate,
    pub crypto: Option<CryptoUpdate>,
}

/// Latest known prices for the session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceState {
    pub gold_ounce_usd: f64,
    pub gold_change_24h: f64,
    pub gold_source: GoldSource,
    pub btc_usd: f64,
    pub btc_change_24h: f64,
    pub btc_market_cap_usd: f64,
    pub exchange_rates: ExchangeRates,
}

impl PriceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites each field group wholesale. Crypto fields keep their prior
    /// values when the cycle produced no crypto update.
    pub fn apply(&mut self, batch: FetchBatch) {
        self.exchange_rates = batch.rates;

        self.gold_ounce_usd = batch.gold.ounce_usd;
        self.gold_change_24h = batch.gold.change_24h;
        self.gold_source = batch.gold.source;

        if let Some(crypto) = batch.crypto {
            self.btc_usd = crypto.price_usd;
            self.btc_change_24h = crypto.change_24h;
            self.btc_market_cap_usd = crypto.market_cap_usd;
        }
    }

    pub fn gold_available(&self) -> bool {
        self.gold_ounce_usd > 0.0
    }

    pub fn crypto_available(&self) -> bool {
        self.btc_usd > 0.0
    }
}
