use std::time::Duration;

use anyhow::Context;
use common::config::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_RETRY_INTERVAL_SECS};
use market_data::QuoteProvider;
use storage::Database;
use storage::repositories::{QuoteRepository, SignalRepository};
use strategy::SignalClassifier;
use tokio::{sync::watch, time};
use tracing::{error, info, warn};

use crate::{error::LoopError, report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The provider had nothing for us; nothing was stored.
    NoData,
    Completed { quotes: usize, signals: usize },
}

/// Fetch, store, classify, store, report; then wait and do it again.
pub struct PollLoop<P> {
    provider: P,
    db: Database,
    classifier: SignalClassifier,
    symbols: Vec<String>,
    poll_interval: Duration,
    retry_interval: Duration,
    state: LoopState,
}

impl<P: QuoteProvider> PollLoop<P> {
    pub fn new(provider: P, db: Database, symbols: Vec<String>) -> Self {
        Self {
            provider,
            db,
            classifier: SignalClassifier::default(),
            symbols,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            state: LoopState::Running,
        }
    }

    pub fn with_intervals(mut self, poll_interval: Duration, retry_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.retry_interval = retry_interval;
        self
    }

    pub fn with_classifier(mut self, classifier: SignalClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until the shutdown flag turns true. The flag is looked at between
    /// cycles and while sleeping, never in the middle of a cycle.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            symbols = ?self.symbols,
            "Polling {} symbols every {:?}",
            self.symbols.len(),
            self.poll_interval
        );

        while self.state == LoopState::Running {
            if *shutdown.borrow() {
                self.state = LoopState::Stopped;
                break;
            }

            let pause = self.tick().await;

            tokio::select! {
                _ = time::sleep(pause) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    self.state = LoopState::Stopped;
                }
            }
        }
        info!(state = ?self.state, "Stopping data collection...");
    }

    /// One guarded cycle. Returns how long to wait before the next one.
    pub async fn tick(&mut self) -> Duration {
        match self.run_cycle().await {
            Ok(_) => self.poll_interval,
            Err(e) => {
                error!("Error in main loop: {}", e);
                self.retry_interval
            }
        }
    }

    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, LoopError> {
        info!("Fetching latest crypto data...");
        let quotes = self.provider.fetch(&self.symbols).await?;

        if quotes.is_empty() {
            warn!("No quotes received, skipping this cycle");
            return Ok(CycleOutcome::NoData);
        }

        QuoteRepository::insert_batch(&self.db, &quotes).await?;

        let signals = self.classifier.classify(&quotes);
        SignalRepository::insert_batch(&self.db, &signals).await?;

        report::print(&quotes, &signals).context("writing cycle report")?;

        Ok(CycleOutcome::Completed {
            quotes: quotes.len(),
            signals: signals.len(),
        })
    }
}

/// Resolves once shutdown is requested. A dropped sender never resolves it.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::Quote;
    use market_data::{FetchError, MockQuoteProvider};
    use mockall::Sequence;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const POLL: Duration = Duration::from_secs(300);
    const RETRY: Duration = Duration::from_secs(60);

    fn symbols() -> Vec<String> {
        vec!["BTC".to_string(), "ETH".to_string()]
    }

    fn quote(symbol: &str, price: f64, change: f64) -> Quote {
        Quote::new(symbol, price, 2.0e9, change, Utc::now())
    }

    async fn row_counts(db: &Database) -> (i64, i64) {
        let quotes = sqlx::query_scalar("SELECT COUNT(*) FROM crypto_prices")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let signals = sqlx::query_scalar("SELECT COUNT(*) FROM trade_signals")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (quotes, signals)
    }

    async fn poll_loop(provider: MockQuoteProvider) -> (PollLoop<MockQuoteProvider>, Database) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let poll = PollLoop::new(provider, db.clone(), symbols()).with_intervals(POLL, RETRY);
        (poll, db)
    }

    #[tokio::test]
    async fn tick_waits_retry_interval_after_failures() {
        let mut provider = MockQuoteProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_fetch()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(FetchError::Transport {
                    cause: "connection reset".to_string(),
                })
            });
        provider
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![quote("BTC", 64000.0, 7.5)]));
        let (mut poll, db) = poll_loop(provider).await;

        assert_eq!(poll.tick().await, RETRY);
        assert_eq!(poll.tick().await, RETRY);
        assert_eq!(poll.tick().await, POLL);

        assert_eq!(row_counts(&db).await, (1, 1));
        let stored: String = sqlx::query_scalar("SELECT signal FROM trade_signals")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(stored, "BUY");
    }

    #[tokio::test]
    async fn loop_survives_two_failed_fetches_then_stores_one_batch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut provider = MockQuoteProvider::new();
        provider.expect_fetch().returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(FetchError::Transport {
                    cause: "connection reset".to_string(),
                }),
                2 => Ok(vec![quote("BTC", 64000.0, 7.5)]),
                _ => Ok(Vec::new()),
            }
        });
        let (poll, db) = poll_loop(provider).await;
        let mut poll =
            poll.with_intervals(Duration::from_millis(20), Duration::from_millis(20));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            poll.run(shutdown_rx).await;
            poll
        });

        time::timeout(Duration::from_secs(5), async {
            while calls.load(Ordering::SeqCst) < 4 {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("loop should keep polling after failures");

        assert_eq!(row_counts(&db).await, (1, 1));
        assert!(!handle.is_finished());

        shutdown_tx.send(true).unwrap();
        let poll = time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop should stop promptly")
            .unwrap();
        assert_eq!(poll.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn full_cycle_reports_counts() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .withf(|requested| requested.iter().map(String::as_str).eq(["BTC", "ETH"]))
            .returning(|_| {
                Ok(vec![
                    quote("BTC", 64000.0, 1.0),
                    quote("ETH", 3100.0, -8.0),
                ])
            });
        let (mut poll, db) = poll_loop(provider).await;

        let outcome = poll.run_cycle().await.unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                quotes: 2,
                signals: 2
            }
        );
        assert_eq!(row_counts(&db).await, (2, 2));
    }

    #[tokio::test]
    async fn empty_fetch_skips_storage_and_waits_full_interval() {
        let mut provider = MockQuoteProvider::new();
        provider.expect_fetch().returning(|_| Ok(Vec::new()));
        let (mut poll, db) = poll_loop(provider).await;

        assert_eq!(poll.run_cycle().await.unwrap(), CycleOutcome::NoData);
        assert_eq!(poll.tick().await, POLL);
        assert_eq!(row_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn store_failure_uses_retry_interval_and_skips_signals() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .returning(|_| Ok(vec![quote("BTC", 64000.0, 9.0), quote("ETH", f64::NAN, 1.0)]));
        let (mut poll, db) = poll_loop(provider).await;

        let err = poll.run_cycle().await.unwrap_err();
        assert!(matches!(err, LoopError::Store(_)), "{:?}", err);

        assert_eq!(poll.tick().await, RETRY);
        assert_eq!(row_counts(&db).await, (0, 0));
        assert_eq!(poll.state(), LoopState::Running);
    }

    #[tokio::test]
    async fn remote_errors_surface_as_fetch_errors() {
        let mut provider = MockQuoteProvider::new();
        provider.expect_fetch().returning(|_| {
            Err(FetchError::Remote {
                message: "API key missing.".to_string(),
            })
        });
        let (mut poll, _db) = poll_loop(provider).await;

        let err = poll.run_cycle().await.unwrap_err();
        assert!(matches!(err, LoopError::Fetch(FetchError::Remote { .. })));
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_loop_while_sleeping() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .returning(|_| Ok(vec![quote("BTC", 64000.0, 1.0)]));
        let (poll, _db) = poll_loop(provider).await;
        let mut poll = poll.with_intervals(Duration::from_secs(3600), Duration::from_secs(3600));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            poll.run(shutdown_rx).await;
            poll
        });
        time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        let poll = time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop should stop promptly")
            .unwrap();
        assert_eq!(poll.state(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn already_cancelled_loop_never_fetches() {
        let mut provider = MockQuoteProvider::new();
        provider.expect_fetch().never();
        let (mut poll, _db) = poll_loop(provider).await;
        let (_shutdown_tx, shutdown_rx) = watch::channel(true);

        poll.run(shutdown_rx).await;

        assert_eq!(poll.state(), LoopState::Stopped);
    }
}
