//! Refresh cycle coordination.
//!
//! A cycle moves `Idle -> Loading -> Presenting -> Idle`. The three feeds are
//! fetched concurrently and only merged into the [`PriceState`] once all of
//! them have settled, so derived figures never see a half-applied cycle.
//! Triggers that arrive while a cycle is running are coalesced.

use crate::core::crypto::{CryptoPriceProvider, fetch_crypto_price};
use crate::core::derive::{self, CalcInput, Quotations};
use crate::core::gold::{GoldPriceSource, fetch_gold_price};
use crate::core::rates::{RatesProvider, fetch_exchange_rates};
use crate::core::state::{FetchBatch, PriceState};
use chrono::{DateTime, Local};
use futures::future::join3;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Presenting,
}

/// Upstream providers for one session.
pub struct Feeds {
    pub rates: Box<dyn RatesProvider>,
    pub egp_rates: Box<dyn RatesProvider>,
    pub gold: Vec<Box<dyn GoldPriceSource>>,
    pub crypto: Box<dyn CryptoPriceProvider>,
}

/// Everything the view layer needs after a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub currency: String,
    pub state: PriceState,
    pub quotations: Quotations,
    pub updated_at: DateTime<Local>,
}

impl Dashboard {
    pub fn new(state: PriceState, currency: &str, updated_at: DateTime<Local>) -> Self {
        let quotations = derive::derive(&state, currency);
        Dashboard {
            currency: currency.to_string(),
            state,
            quotations,
            updated_at,
        }
    }

    pub fn calculate(&self, input: &CalcInput) -> Option<f64> {
        derive::calculate(&self.state, input, &self.currency)
    }
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Presented(Box<Dashboard>),
    /// Another cycle was already running.
    Coalesced,
}

pub trait Presenter: Send + Sync {
    fn loading(&self) {}

    fn present(&self, dashboard: &Dashboard);
}

/// Puts the phase back to `Idle` when dropped, so a cancelled cycle does not
/// leave the refresher stuck in `Loading`.
struct CycleGuard<'a>(&'a watch::Sender<Phase>);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(Phase::Idle);
    }
}

pub struct Refresher {
    feeds: Feeds,
    currency: String,
    state: Mutex<PriceState>,
    phase: watch::Sender<Phase>,
}

impl Refresher {
    pub fn new(feeds: Feeds, currency: &str) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Refresher {
            feeds,
            currency: currency.to_string(),
            state: Mutex::new(PriceState::new()),
            phase,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub async fn snapshot(&self) -> PriceState {
        self.state.lock().await.clone()
    }

    pub async fn quotations(&self) -> Quotations {
        derive::derive(&*self.state.lock().await, &self.currency)
    }

    pub async fn calculate(&self, input: &CalcInput) -> Option<f64> {
        derive::calculate(&*self.state.lock().await, input, &self.currency)
    }

    /// Runs one cycle unless one is already in flight.
    #[instrument(name = "RefreshCycle", skip_all)]
    pub async fn refresh(&self, presenter: &dyn Presenter) -> RefreshOutcome {
        let started = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Idle {
                *phase = Phase::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            debug!("Refresh already in progress, ignoring trigger");
            return RefreshOutcome::Coalesced;
        }
        let _cycle = CycleGuard(&self.phase);

        presenter.loading();

        let (rates, gold, crypto) = join3(
            fetch_exchange_rates(self.feeds.rates.as_ref(), self.feeds.egp_rates.as_ref()),
            fetch_gold_price(&self.feeds.gold),
            fetch_crypto_price(self.feeds.crypto.as_ref()),
        )
        .await;

        let dashboard = {
            let mut state = self.state.lock().await;
            state.apply(FetchBatch {
                rates,
                gold,
                crypto,
            });
            self.phase.send_replace(Phase::Presenting);
            Dashboard::new(state.clone(), &self.currency, Local::now())
        };

        info!(
            gold_source = %dashboard.state.gold_source,
            gold = dashboard.state.gold_ounce_usd,
            btc = dashboard.state.btc_usd,
            "Prices refreshed"
        );
        presenter.present(&dashboard);

        RefreshOutcome::Presented(Box::new(dashboard))
    }

    /// Refreshes immediately, then every `interval` and on each manual
    /// trigger, until `shutdown` resolves.
    pub async fn run<F>(
        &self,
        presenter: &dyn Presenter,
        mut triggers: mpsc::Receiver<()>,
        interval: Duration,
        shutdown: F,
    ) where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutting down refresh loop");
                    break;
                }
                _ = ticker.tick() => debug!("Auto-refresh timer fired"),
                Some(()) = triggers.recv() => debug!("Manual refresh requested"),
            }

            self.refresh(presenter).await;

            let mut ignored = 0;
            while triggers.try_recv().is_ok() {
                ignored += 1;
            }
            if ignored > 0 {
                debug!(ignored, "Ignored refresh requests received while loading");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crypto::{AssetQuote, CryptoQuote};
    use crate::core::gold::GoldQuote;
    use crate::core::state::{ExchangeRates, GoldSource};
    use crate::core::units::WeightUnit;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{mpsc, oneshot};

    struct FixedRates(Option<f64>);

    #[async_trait]
    impl RatesProvider for FixedRates {
        async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
            match self.0 {
                Some(egp) => Ok(HashMap::from([("EGP".to_string(), egp)])),
                None => Err(anyhow!("offline")),
            }
        }
    }

    struct SlowGold {
        price: Option<f64>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GoldPriceSource for SlowGold {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_quote(&self) -> Result<GoldQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.price
                .map(|ounce_usd| GoldQuote {
                    ounce_usd,
                    change_24h: 0.5,
                })
                .ok_or_else(|| anyhow!("offline"))
        }
    }

    struct FixedBitcoin(Option<f64>);

    #[async_trait]
    impl CryptoPriceProvider for FixedBitcoin {
        async fn fetch_quote(&self) -> Result<CryptoQuote> {
            let price = self.0.ok_or_else(|| anyhow!("offline"))?;
            let mut quotes = BTreeMap::new();
            quotes.insert(
                "usd".to_string(),
                AssetQuote {
                    price,
                    change_24h: -1.0,
                    market_cap: price * 19_800_000.0,
                },
            );
            Ok(CryptoQuote { quotes })
        }
    }

    fn make_feeds(
        gold: Option<f64>,
        btc: Option<f64>,
        delay: Duration,
    ) -> (Feeds, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let feeds = Feeds {
            rates: Box::new(FixedRates(None)),
            egp_rates: Box::new(FixedRates(Some(48.0))),
            gold: vec![Box::new(SlowGold {
                price: gold,
                delay,
                calls: Arc::clone(&calls),
            })],
            crypto: Box::new(FixedBitcoin(btc)),
        };
        (feeds, calls)
    }

    #[derive(Default)]
    struct RecordingPresenter {
        loading: AtomicUsize,
        presented: std::sync::Mutex<Vec<Dashboard>>,
        notify: Option<mpsc::UnboundedSender<()>>,
    }

    impl Presenter for RecordingPresenter {
        fn loading(&self) {
            self.loading.fetch_add(1, Ordering::SeqCst);
        }

        fn present(&self, dashboard: &Dashboard) {
            self.presented.lock().unwrap().push(dashboard.clone());
            if let Some(notify) = &self.notify {
                let _ = notify.send(());
            }
        }
    }

    #[tokio::test]
    async fn test_refresh_merges_all_feeds() {
        let (feeds, _) = make_feeds(Some(2700.0), Some(95000.0), Duration::ZERO);
        let refresher = Refresher::new(feeds, "EGP");
        let presenter = RecordingPresenter::default();

        let outcome = refresher.refresh(&presenter).await;

        let RefreshOutcome::Presented(dashboard) = outcome else {
            panic!("Expected a presented dashboard");
        };
        assert_eq!(dashboard.state.gold_ounce_usd, 2700.0);
        assert_eq!(dashboard.state.gold_source, GoldSource::Live);
        assert_eq!(dashboard.state.btc_usd, 95000.0);
        assert_eq!(dashboard.state.exchange_rates.get("EGP"), Some(48.0));
        assert_eq!(dashboard.state.exchange_rates.get("EUR"), Some(0.95));
        assert!(dashboard.quotations.gold.is_some());
        assert!(dashboard.quotations.crypto.is_some());

        assert_eq!(presenter.loading.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.presented.lock().unwrap().len(), 1);
        assert_eq!(refresher.phase(), Phase::Idle);
        assert_eq!(refresher.snapshot().await, dashboard.state);
        assert_eq!(refresher.quotations().await, dashboard.quotations);
    }

    #[tokio::test]
    async fn test_refresh_with_every_source_down() {
        let (feeds, _) = make_feeds(None, None, Duration::ZERO);
        let refresher = Refresher::new(feeds, "EGP");
        let presenter = RecordingPresenter::default();

        let RefreshOutcome::Presented(dashboard) = refresher.refresh(&presenter).await else {
            panic!("Expected a presented dashboard");
        };

        assert_eq!(dashboard.state.gold_ounce_usd, 2650.0);
        assert_eq!(dashboard.state.gold_source, GoldSource::Fallback);
        assert_eq!(dashboard.state.btc_usd, 0.0);
        assert!(dashboard.quotations.crypto.is_none());
        let mut expected = ExchangeRates::fallback();
        expected.insert("EGP", 48.0);
        assert_eq!(dashboard.state.exchange_rates, expected);
    }

    #[tokio::test]
    async fn test_failed_crypto_keeps_previous_price() {
        let (feeds, _) = make_feeds(Some(2700.0), Some(95000.0), Duration::ZERO);
        let refresher = Refresher::new(feeds, "USD");
        let presenter = RecordingPresenter::default();
        refresher.refresh(&presenter).await;

        let (feeds, _) = make_feeds(Some(2710.0), None, Duration::ZERO);
        let refresher = Refresher {
            feeds,
            currency: "USD".to_string(),
            state: Mutex::new(refresher.snapshot().await),
            phase: watch::channel(Phase::Idle).0,
        };
        refresher.refresh(&presenter).await;

        let state = refresher.snapshot().await;
        assert_eq!(state.gold_ounce_usd, 2710.0);
        assert_eq!(state.btc_usd, 95000.0);
        assert_eq!(state.btc_change_24h, -1.0);
    }

    #[tokio::test]
    async fn test_concurrent_triggers_are_coalesced() {
        let (feeds, calls) = make_feeds(Some(2700.0), Some(95000.0), Duration::from_millis(50));
        let refresher = Refresher::new(feeds, "EGP");
        let presenter = RecordingPresenter::default();
        let mut phases = refresher.subscribe();

        let (first, second) =
            tokio::join!(refresher.refresh(&presenter), refresher.refresh(&presenter));

        assert!(matches!(first, RefreshOutcome::Presented(_)));
        assert!(matches!(second, RefreshOutcome::Coalesced));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.presented.lock().unwrap().len(), 1);
        assert_eq!(refresher.phase(), Phase::Idle);
        assert!(phases.has_changed().unwrap());
        assert_eq!(*phases.borrow_and_update(), Phase::Idle);

        assert!(matches!(
            refresher.refresh(&presenter).await,
            RefreshOutcome::Presented(_)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_refresh_returns_to_idle() {
        let (feeds, calls) = make_feeds(Some(2700.0), None, Duration::from_secs(30));
        let refresher = Refresher::new(feeds, "USD");
        let presenter = RecordingPresenter::default();

        let cancelled =
            tokio::time::timeout(Duration::from_secs(1), refresher.refresh(&presenter)).await;

        assert!(cancelled.is_err());
        assert_eq!(refresher.phase(), Phase::Idle);
        assert_eq!(refresher.snapshot().await, PriceState::new());
        assert!(presenter.presented.lock().unwrap().is_empty());

        assert!(matches!(
            refresher.refresh(&presenter).await,
            RefreshOutcome::Presented(_)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refresher.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_calculate_before_and_after_refresh() {
        let (feeds, _) = make_feeds(Some(2650.0), None, Duration::ZERO);
        let refresher = Refresher::new(feeds, "EGP");
        let input = CalcInput {
            weight: 10.0,
            unit: WeightUnit::Gram,
            karat: 21,
        };

        assert!(refresher.calculate(&input).await.is_none());
        assert!(refresher.quotations().await.gold.is_none());

        let RefreshOutcome::Presented(dashboard) =
            refresher.refresh(&RecordingPresenter::default()).await
        else {
            panic!("Expected a presented dashboard");
        };
        let expected = 10.0 * (2650.0 / 31.1035) * 0.875 * 48.0;
        let value = refresher.calculate(&input).await.unwrap();
        assert!((value - expected).abs() < 1e-6);
        assert_eq!(dashboard.calculate(&input), Some(value));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_on_start_trigger_and_timer() {
        let (feeds, calls) = make_feeds(Some(2700.0), Some(95000.0), Duration::ZERO);
        let refresher = Refresher::new(feeds, "EGP");
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let presenter = RecordingPresenter {
            notify: Some(notify_tx),
            ..RecordingPresenter::default()
        };
        let (trigger_tx, trigger_rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let driver = async {
            // Initial load
            notify_rx.recv().await.unwrap();
            // Manual trigger mid-interval
            trigger_tx.send(()).await.unwrap();
            notify_rx.recv().await.unwrap();
            // Timer after five minutes
            notify_rx.recv().await.unwrap();
            shutdown_tx.send(()).unwrap();
        };

        let run = refresher.run(
            &presenter,
            trigger_rx,
            Duration::from_secs(300),
            async {
                let _ = shutdown_rx.await;
            },
        );

        tokio::join!(run, driver);

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(presenter.presented.lock().unwrap().len(), 3);
        assert_eq!(refresher.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_drains_triggers_queued_during_a_cycle() {
        let (feeds, calls) = make_feeds(Some(2700.0), Some(95000.0), Duration::from_secs(10));
        let refresher = Refresher::new(feeds, "EGP");
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let presenter = RecordingPresenter {
            notify: Some(notify_tx),
            ..RecordingPresenter::default()
        };
        let (trigger_tx, trigger_rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let driver = async {
            // Initial cycle is still fetching
            tokio::time::sleep(Duration::from_secs(1)).await;
            for _ in 0..3 {
                trigger_tx.try_send(()).unwrap();
            }
            notify_rx.recv().await.unwrap();
            // Well before the next timer tick
            tokio::time::sleep(Duration::from_secs(60)).await;
            shutdown_tx.send(()).unwrap();
        };

        let run = refresher.run(
            &presenter,
            trigger_rx,
            Duration::from_secs(300),
            async {
                let _ = shutdown_rx.await;
            },
        );

        tokio::join!(run, driver);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.loading.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.presented.lock().unwrap().len(), 1);
        assert_eq!(refresher.phase(), Phase::Idle);
    }
}
