pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::{CalcPresenter, JsonPresenter, TerminalPresenter};
use crate::core::config::AppConfig;
use crate::core::derive::CalcInput;
use crate::core::refresh::{Feeds, Presenter, Refresher};
use crate::core::units::{SUPPORTED_CURRENCIES, is_supported_currency};
use crate::providers::JsonClient;
use crate::providers::coingecko::{
    CoinGeckoCryptoProvider, CoinGeckoGoldSource, PAX_GOLD, TETHER_GOLD,
};
use crate::providers::frankfurter::FrankfurterProvider;
use crate::providers::metals_live::MetalsLiveProvider;
use crate::providers::open_er_api::OpenErApiProvider;
use anyhow::{Result, bail};
use std::future::Future;
use std::io::{self, BufRead};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    /// One refresh cycle, as tables or JSON.
    Show { json: bool },
    /// Auto-refresh loop with manual triggers from stdin.
    Watch,
    /// One refresh cycle, printing only the calculator value.
    Calc(CalcInput),
}

/// Builds the provider set for a session. Every provider shares one HTTP
/// client with the configured timeout and retries.
pub fn build_feeds(config: &AppConfig) -> Result<Feeds> {
    let http = JsonClient::new(config.request_timeout(), config.retries)?;
    let providers = &config.providers;

    Ok(Feeds {
        rates: Box::new(FrankfurterProvider::new(
            &providers.frankfurter.base_url,
            http.clone(),
        )),
        egp_rates: Box::new(OpenErApiProvider::new(
            &providers.open_er_api.base_url,
            http.clone(),
        )),
        gold: vec![
            Box::new(CoinGeckoGoldSource::new(
                &providers.coingecko.base_url,
                TETHER_GOLD,
                http.clone(),
            )),
            Box::new(CoinGeckoGoldSource::new(
                &providers.coingecko.base_url,
                PAX_GOLD,
                http.clone(),
            )),
            Box::new(MetalsLiveProvider::new(
                &providers.metals_live.base_url,
                http.clone(),
            )),
        ],
        crypto: Box::new(CoinGeckoCryptoProvider::bitcoin(
            &providers.coingecko.base_url,
            http,
        )),
    })
}

pub fn build_refresher(config: &AppConfig) -> Result<Refresher> {
    Ok(Refresher::new(build_feeds(config)?, &config.currency))
}

fn load_config(config_path: Option<&str>, currency: Option<&str>) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    if let Some(currency) = currency {
        let currency = currency.to_uppercase();
        if !is_supported_currency(&currency) {
            bail!(
                "Unsupported currency: {} (expected one of {})",
                currency,
                SUPPORTED_CURRENCIES.join(", ")
            );
        }
        config.currency = currency;
    }
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Sends a trigger for every line read from `input`. Reading happens on a
/// plain thread: a read blocked on an open terminal must not hold up runtime
/// shutdown. Triggers that do not fit in the channel are dropped; a refresh
/// is already pending.
fn spawn_line_triggers<R>(input: R, triggers: mpsc::Sender<()>)
where
    R: BufRead + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("goldwatch-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                if let Err(e) = line {
                    debug!(error = %e, "Stopped reading refresh triggers");
                    break;
                }
                match triggers.try_send(()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(())) => {
                        debug!("Refresh already queued, dropping trigger")
                    }
                    Err(mpsc::error::TrySendError::Closed(())) => break,
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Manual refresh unavailable, input thread failed to start");
    }
}

/// Auto-refresh loop where each line of `input` requests a refresh. Returns
/// once `shutdown` resolves, without waiting for `input`.
pub async fn watch<R, F>(
    refresher: &Refresher,
    presenter: &dyn Presenter,
    interval: Duration,
    input: R,
    shutdown: F,
) where
    R: BufRead + Send + 'static,
    F: Future<Output = ()>,
{
    let (trigger_tx, trigger_rx) = mpsc::channel(1);
    spawn_line_triggers(input, trigger_tx);
    refresher
        .run(presenter, trigger_rx, interval, shutdown)
        .await;
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    currency: Option<&str>,
) -> Result<()> {
    info!("Goldwatch starting...");

    let config = load_config(config_path, currency)?;
    let refresher = build_refresher(&config)?;

    match command {
        AppCommand::Show { json: false } => {
            refresher
                .refresh(&TerminalPresenter::new(config.calculator))
                .await;
        }
        AppCommand::Show { json: true } => {
            refresher.refresh(&JsonPresenter::default()).await;
        }
        AppCommand::Calc(input) => {
            if !(input.weight.is_finite() && input.weight >= 0.0) {
                bail!("Weight must be a non-negative number: {}", input.weight);
            }
            refresher.refresh(&CalcPresenter::new(input)).await;
        }
        AppCommand::Watch => {
            let presenter = TerminalPresenter::new(config.calculator).with_separator();
            println!("Press Enter to refresh, Ctrl-C to quit.");
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
            };
            watch(
                &refresher,
                &presenter,
                config.refresh_interval(),
                io::BufReader::new(io::stdin()),
                shutdown,
            )
            .await;
        }
    }
    Ok(())
}
