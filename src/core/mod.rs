//! Price state, fetchers, derivation and the refresh cycle

pub mod config;
pub mod crypto;
pub mod derive;
pub mod format;
pub mod gold;
pub mod log;
pub mod rates;
pub mod refresh;
pub mod state;
pub mod units;

// Re-export main types for cleaner imports
pub use crypto::CryptoPriceProvider;
pub use derive::{CalcInput, Quotations};
pub use gold::GoldPriceSource;
pub use rates::RatesProvider;
pub use refresh::{Dashboard, Feeds, Phase, Presenter, RefreshOutcome, Refresher};
pub use state::{GoldSource, PriceState};
