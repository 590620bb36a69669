pub mod coingecko;
pub mod frankfurter;
pub mod metals_live;
pub mod open_er_api;
pub mod util;

pub use util::JsonClient;
