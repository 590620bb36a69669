//! Derives display quotations from a [`PriceState`].
//!
//! Everything here is a pure function of the state it is given. Nothing is
//! cached, so the output always matches the state that produced it.

use crate::core::state::{GoldSource, PriceState};
use crate::core::units::{
    BREAKDOWN_KARATS, GOLD_POUND_GRAMS, GOLD_POUND_KARAT, GRAMS_PER_KG, KARAT_PURITY,
    SATOSHIS_PER_BITCOIN, TROY_OUNCE_GRAMS, WeightUnit, karat_purity,
};
use serde::{Deserialize, Serialize};

/// Spread for the gram/ounce/kg table and the gold pound.
pub const PRIMARY_SPREAD: f64 = 0.01;
/// Spread for the per-karat breakdown table.
pub const BREAKDOWN_SPREAD: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub sell: f64,
    pub buy: f64,
}

impl Quote {
    /// Sell above and buy below the base price.
    pub fn primary(base: f64) -> Self {
        Quote {
            sell: base * (1.0 + PRIMARY_SPREAD),
            buy: base * (1.0 - PRIMARY_SPREAD),
        }
    }

    /// Sell below and buy above the base price: the shop buys from the
    /// customer at `sell` and sells to the customer at `buy`.
    pub fn breakdown(base: f64) -> Self {
        Quote {
            sell: base * (1.0 - BREAKDOWN_SPREAD),
            buy: base * (1.0 + BREAKDOWN_SPREAD),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricedUnit {
    pub mid: f64,
    pub quote: Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KaratPrice {
    pub karat: u8,
    pub purity: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KaratQuote {
    pub karat: u8,
    pub mid: f64,
    pub quote: Quote,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoldQuotations {
    pub currency: String,
    pub source: GoldSource,
    pub ounce_usd: f64,
    pub change_24h: f64,
    pub change_amount_usd: f64,
    /// Rate of `currency` against USD used for every figure below.
    pub usd_rate: f64,
    pub gram: PricedUnit,
    pub ounce: PricedUnit,
    pub kg: PricedUnit,
    pub karats: Vec<KaratPrice>,
    pub breakdown: Vec<KaratQuote>,
    pub gold_pound: PricedUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CryptoQuotations {
    pub currency: String,
    pub price: f64,
    pub satoshi: f64,
    pub market_cap: f64,
    pub change_24h: f64,
    pub price_usd: f64,
    pub change_amount_usd: f64,
}

/// Figures for one currency. A group is `None` until its price is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quotations {
    pub gold: Option<GoldQuotations>,
    pub crypto: Option<CryptoQuotations>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcInput {
    pub weight: f64,
    pub unit: WeightUnit,
    pub karat: u8,
}

impl Default for CalcInput {
    fn default() -> Self {
        CalcInput {
            weight: 1.0,
            unit: WeightUnit::Gram,
            karat: GOLD_POUND_KARAT,
        }
    }
}

pub fn convert(state: &PriceState, amount_usd: f64, currency: &str) -> f64 {
    amount_usd * state.exchange_rates.rate_or_par(currency)
}

pub fn derive(state: &PriceState, currency: &str) -> Quotations {
    Quotations {
        gold: derive_gold(state, currency),
        crypto: derive_crypto(state, currency),
    }
}

pub fn derive_gold(state: &PriceState, currency: &str) -> Option<GoldQuotations> {
    if !state.gold_available() {
        return None;
    }

    let ounce = convert(state, state.gold_ounce_usd, currency);
    let gram = ounce / TROY_OUNCE_GRAMS;
    let kg = gram * GRAMS_PER_KG;

    let karats = KARAT_PURITY
        .iter()
        .map(|&(karat, purity)| KaratPrice {
            karat,
            purity,
            price: gram * purity,
        })
        .collect();

    let breakdown = BREAKDOWN_KARATS
        .iter()
        .filter_map(|&karat| {
            karat_purity(karat).map(|purity| {
                let mid = gram * purity;
                KaratQuote {
                    karat,
                    mid,
                    quote: Quote::breakdown(mid),
                }
            })
        })
        .collect();

    let pound = gram * karat_purity(GOLD_POUND_KARAT).unwrap_or(1.0) * GOLD_POUND_GRAMS;

    Some(GoldQuotations {
        currency: currency.to_string(),
        source: state.gold_source,
        ounce_usd: state.gold_ounce_usd,
        change_24h: state.gold_change_24h,
        change_amount_usd: state.gold_ounce_usd * state.gold_change_24h.abs() / 100.0,
        usd_rate: state.exchange_rates.rate_or_par(currency),
        gram: priced(gram),
        ounce: priced(ounce),
        kg: priced(kg),
        karats,
        breakdown,
        gold_pound: priced(pound),
    })
}

pub fn derive_crypto(state: &PriceState, currency: &str) -> Option<CryptoQuotations> {
    if !state.crypto_available() {
        return None;
    }

    let price = convert(state, state.btc_usd, currency);
    Some(CryptoQuotations {
        currency: currency.to_string(),
        price,
        satoshi: price / SATOSHIS_PER_BITCOIN,
        market_cap: convert(state, state.btc_market_cap_usd, currency),
        change_24h: state.btc_change_24h,
        price_usd: state.btc_usd,
        change_amount_usd: state.btc_usd * state.btc_change_24h.abs() / 100.0,
    })
}

/// Value of `input` in `currency`. Unknown karats are priced as pure gold.
pub fn calculate(state: &PriceState, input: &CalcInput, currency: &str) -> Option<f64> {
    if !state.gold_available() {
        return None;
    }

    let grams = input.unit.to_grams(input.weight);
    let gram_usd = state.gold_ounce_usd / TROY_OUNCE_GRAMS;
    let purity = karat_purity(input.karat).unwrap_or(1.0);
    Some(convert(state, grams * gram_usd * purity, currency))
}

fn priced(mid: f64) -> PricedUnit {
    PricedUnit {
        mid,
        quote: Quote::primary(mid),
    }
}
