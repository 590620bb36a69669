//! Fixed unit, purity and currency tables

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const TROY_OUNCE_GRAMS: f64 = 31.1035;
pub const GRAMS_PER_KG: f64 = 1000.0;
pub const SATOSHIS_PER_BITCOIN: f64 = 1e8;

/// Egyptian gold pound (جنيه ذهب): 8 grams of 21 karat gold.
pub const GOLD_POUND_GRAMS: f64 = 8.0;
pub const GOLD_POUND_KARAT: u8 = 21;

/// Fraction of pure gold per karat, purest first.
pub const KARAT_PURITY: [(u8, f64); 7] = [
    (24, 1.0),
    (22, 0.9167),
    (21, 0.875),
    (18, 0.75),
    (14, 0.5833),
    (12, 0.5),
    (10, 0.4167),
];

/// Karats shown in the buy/sell breakdown table.
pub const BREAKDOWN_KARATS: [u8; 4] = [24, 22, 21, 18];

pub const SUPPORTED_CURRENCIES: [&str; 6] = ["USD", "EUR", "GBP", "EGP", "SAR", "AED"];

pub fn karat_purity(karat: u8) -> Option<f64> {
    KARAT_PURITY
        .iter()
        .find(|(k, _)| *k == karat)
        .map(|(_, purity)| *purity)
}

pub fn currency_symbol(currency: &str) -> &'static str {
    match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "EGP" => "ج.م",
        "SAR" => "ر.س",
        "AED" => "د.إ",
        _ => "$",
    }
}

pub fn is_supported_currency(currency: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&currency)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Gram,
    Ounce,
    Kg,
}

impl WeightUnit {
    pub fn to_grams(&self, weight: f64) -> f64 {
        match self {
            WeightUnit::Gram => weight,
            WeightUnit::Ounce => weight * TROY_OUNCE_GRAMS,
            WeightUnit::Kg => weight * GRAMS_PER_KG,
        }
    }
}

impl Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WeightUnit::Gram => "gram",
                WeightUnit::Ounce => "ounce",
                WeightUnit::Kg => "kg",
            }
        )
    }
}

impl FromStr for WeightUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gram" | "g" => Ok(WeightUnit::Gram),
            "ounce" | "oz" => Ok(WeightUnit::Ounce),
            "kg" => Ok(WeightUnit::Kg),
            _ => Err(anyhow!("Invalid weight unit: {}", s)),
        }
    }
}
