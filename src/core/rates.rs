//! Exchange rate abstractions and the USD rates fetcher

use crate::core::state::ExchangeRates;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Defaults for currencies some rate sources do not quote (Dec 2, 2025).
pub const DEFAULT_RATES: [(&str, f64); 3] = [("EGP", 50.85), ("SAR", 3.75), ("AED", 3.67)];

#[async_trait]
pub trait RatesProvider: Send + Sync {
    /// Returns USD based rates keyed by currency code.
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>>;
}

/// Builds the session rates from `primary`, then lets `egp_source` override
/// `EGP`. Never fails: an unreachable primary yields
/// [`ExchangeRates::fallback`], and a failing `egp_source` is ignored.
pub async fn fetch_exchange_rates(
    primary: &dyn RatesProvider,
    egp_source: &dyn RatesProvider,
) -> ExchangeRates {
    let (primary_result, egp_result) = join(primary.fetch_rates(), egp_source.fetch_rates()).await;

    let mut rates = match primary_result {
        Ok(fetched) => {
            let mut rates = ExchangeRates::from_rates(fetched);
            for (currency, default_rate) in DEFAULT_RATES {
                if rates.get(currency).is_none_or(|rate| rate <= 0.0) {
                    debug!(currency, default_rate, "Rate missing, using default");
                    rates.insert(currency, default_rate);
                }
            }
            rates
        }
        Err(e) => {
            warn!(error = %e, "Exchange rates unavailable, using fallback rates");
            ExchangeRates::fallback()
        }
    };

    match egp_result {
        Ok(fetched) => match fetched.get("EGP") {
            Some(&egp) if egp > 0.0 => {
                info!(egp, "Using live EGP rate");
                rates.insert("EGP", egp);
            }
            _ => debug!("EGP rate source returned no EGP rate"),
        },
        Err(e) => debug!(error = %e, "EGP rate source unavailable"),
    }

    rates
}
