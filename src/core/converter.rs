use crate::core::input::parse_number;
use crate::domain::model::{
    normalize_code, Conversion, ConverterState, ConverterStatus, RateCache, RateTable,
};
use crate::domain::ports::RateSource;
use crate::utils::error::{Result, RATE_FETCH_WARNING};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Currency converter backed by a lazily filled, per-session rate cache.
///
/// The cache is only written by [`CurrencyConverter::refresh`]; conversions take
/// a short read lock and never wait for a fetch to finish. Overlapping refreshes
/// for the same base currency are last-write-wins.
pub struct CurrencyConverter<S: RateSource> {
    source: S,
    cache: RwLock<RateCache>,
    status: watch::Sender<ConverterStatus>,
}

/// Keeps the in-flight counter honest when a refresh future is dropped mid-fetch.
struct FetchGuard<'a> {
    status: &'a watch::Sender<ConverterStatus>,
}

impl<'a> FetchGuard<'a> {
    fn begin(status: &'a watch::Sender<ConverterStatus>) -> Self {
        status.send_modify(|s| {
            s.in_flight += 1;
            s.state = ConverterState::Fetching;
        });
        Self { status }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.status.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            if s.in_flight == 0 {
                s.state = ConverterState::Idle;
            }
        });
    }
}

impl<S: RateSource> CurrencyConverter<S> {
    pub fn new(source: S) -> Self {
        let (status, _) = watch::channel(ConverterStatus::default());
        Self {
            source,
            cache: RwLock::new(RateCache::default()),
            status,
        }
    }

    /// Fetches and stores the rate table for `base`.
    ///
    /// A failure leaves any cached table for `base` untouched and publishes the
    /// user-facing warning through [`CurrencyConverter::status`]. The error is
    /// returned for callers that want it, but it never needs handling.
    pub async fn refresh(&self, base: &str) -> Result<()> {
        let base = normalize_code(base);
        let _guard = FetchGuard::begin(&self.status);
        tracing::debug!("Fetching exchange rates for {}", base);

        match self.source.fetch_rates(&base).await {
            Ok(table) => {
                let now = Utc::now();
                let count = table.len();
                self.cache.write().await.store(&base, table, now);
                self.status.send_modify(|s| {
                    s.last_updated = Some(now);
                    s.warning = None;
                });
                tracing::info!("Updated {} exchange rates for {}", count, base);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Currency API error for {}: {}", base, e);
                self.status
                    .send_modify(|s| s.warning = Some(RATE_FETCH_WARNING.to_string()));
                Err(e)
            }
        }
    }

    /// Fetches `base` only when nothing is cached for it yet. Returns whether a
    /// fetch happened.
    pub async fn ensure_rates(&self, base: &str) -> Result<bool> {
        if self.has_rates(base).await {
            return Ok(false);
        }
        self.refresh(base).await?;
        Ok(true)
    }

    pub async fn has_rates(&self, base: &str) -> bool {
        self.cache.read().await.table(base).is_some()
    }

    pub async fn rates_for(&self, base: &str) -> Option<RateTable> {
        self.cache.read().await.table(base).cloned()
    }

    /// Cached rate from `from` to `to`, or 1 when nothing usable is cached.
    pub async fn rate(&self, from: &str, to: &str) -> f64 {
        self.cache
            .read()
            .await
            .lookup(from, to)
            .filter(|rate| rate.is_finite() && *rate != 0.0)
            .unwrap_or(1.0)
    }

    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Conversion {
        let rate = self.rate(from, to).await;
        Conversion {
            amount,
            from: normalize_code(from),
            to: normalize_code(to),
            rate,
            result: amount * rate,
        }
    }

    pub async fn convert_text(&self, amount: &str, from: &str, to: &str) -> Conversion {
        self.convert(parse_number(amount), from, to).await
    }

    pub fn status(&self) -> ConverterStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConverterStatus> {
        self.status.subscribe()
    }
}

impl<S: RateSource + 'static> CurrencyConverter<S> {
    /// Starts a background task that fetches `base` immediately and then every
    /// `period`. The task stops when the returned handle is shut down or dropped.
    pub fn spawn_poller(self: &Arc<Self>, base: &str, period: Duration) -> RatePoller {
        let (base_tx, base_rx) = watch::channel(normalize_code(base));
        let handle = tokio::spawn(run_poller(Arc::clone(self), base_rx, period));
        tracing::debug!("Rate poller started for {} every {:?}", base, period);

        RatePoller {
            base_tx,
            handle: Some(handle),
        }
    }
}

async fn run_poller<S: RateSource>(
    converter: Arc<CurrencyConverter<S>>,
    mut base_rx: watch::Receiver<String>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let base = base_rx.borrow().clone();
                // Logged and surfaced through the status channel already.
                let _ = converter.refresh(&base).await;
            }
            changed = base_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let base = base_rx.borrow_and_update().clone();
                ticker.reset();
                let _ = converter.ensure_rates(&base).await;
            }
        }
    }

    tracing::debug!("Rate poller stopped");
}

/// Handle to a running rate poller.
pub struct RatePoller {
    base_tx: watch::Sender<String>,
    handle: Option<JoinHandle<()>>,
}

impl RatePoller {
    pub fn base(&self) -> String {
        self.base_tx.borrow().clone()
    }

    /// Switches the polled base currency. Fetches right away if the new base
    /// has no cached rates, and restarts the interval.
    pub fn set_base(&self, base: &str) {
        let base = normalize_code(base);
        self.base_tx.send_if_modified(|current| {
            if *current == base {
                false
            } else {
                *current = base;
                true
            }
        });
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the task, including any fetch in flight, and waits for it to end.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!("Rate poller ended abnormally: {}", e);
                }
            }
        }
    }
}

impl Drop for RatePoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CalcError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::{Mutex, Notify};

    enum Scripted {
        Rates(RateTable),
        Fail(u16),
    }

    #[derive(Clone)]
    struct MockRateSource {
        script: Arc<Mutex<VecDeque<Scripted>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockRateSource {
        fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        async fn calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl RateSource for MockRateSource {
        async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
            self.calls.lock().await.push(base.to_string());
            // Once the script runs out, keep answering with an empty table.
            match self.script.lock().await.pop_front() {
                Some(Scripted::Rates(table)) => Ok(table),
                Some(Scripted::Fail(status)) => Err(CalcError::RateFetchFailed {
                    base: base.to_string(),
                    status,
                }),
                None => Ok(RateTable::new()),
            }
        }
    }

    fn usd_table() -> RateTable {
        RateTable::from([
            ("EUR".to_string(), 0.5),
            ("GBP".to_string(), 0.25),
            ("USD".to_string(), 0.98),
        ])
    }

    #[tokio::test]
    async fn test_refresh_stores_table_with_self_rate() {
        let converter = CurrencyConverter::new(MockRateSource::new(vec![Scripted::Rates(
            usd_table(),
        )]));

        converter.refresh("usd").await.unwrap();

        let rates = converter.rates_for("USD").await.unwrap();
        assert_eq!(rates.get("USD"), Some(&1.0));
        assert_eq!(rates.get("EUR"), Some(&0.5));

        let status = converter.status();
        assert_eq!(status.state, ConverterState::Idle);
        assert_eq!(status.in_flight, 0);
        assert!(status.last_updated.is_some());
        assert!(status.warning.is_none());
    }

    #[tokio::test]
    async fn test_conversion_uses_cached_rate() {
        let converter = CurrencyConverter::new(MockRateSource::new(vec![Scripted::Rates(
            usd_table(),
        )]));
        converter.refresh("USD").await.unwrap();

        let conversion = converter.convert(100.0, "USD", "EUR").await;
        assert_eq!(conversion.rate, 0.5);
        assert_eq!(conversion.result, 50.0);
        assert_eq!(conversion.to, "EUR");
    }

    #[tokio::test]
    async fn test_uncached_rate_falls_back_to_identity() {
        let converter = CurrencyConverter::new(MockRateSource::new(vec![]));

        assert_eq!(converter.rate("USD", "EUR").await, 1.0);
        let conversion = converter.convert_text("42", "USD", "EUR").await;
        assert_eq!(conversion.result, 42.0);
    }

    #[tokio::test]
    async fn test_same_currency_is_identity() {
        let converter = CurrencyConverter::new(MockRateSource::new(vec![Scripted::Rates(
            usd_table(),
        )]));
        assert_eq!(converter.convert(73.25, "USD", "USD").await.result, 73.25);

        converter.refresh("USD").await.unwrap();
        assert_eq!(converter.convert(73.25, "USD", "USD").await.result, 73.25);
    }

    #[tokio::test]
    async fn test_zero_rate_falls_back_to_identity() {
        let table = RateTable::from([("EUR".to_string(), 0.0)]);
        let converter =
            CurrencyConverter::new(MockRateSource::new(vec![Scripted::Rates(table)]));
        converter.refresh("USD").await.unwrap();

        assert_eq!(converter.rate("USD", "EUR").await, 1.0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_rates() {
        let converter = CurrencyConverter::new(MockRateSource::new(vec![
            Scripted::Rates(usd_table()),
            Scripted::Fail(503),
        ]));

        converter.refresh("USD").await.unwrap();
        let updated_at = converter.status().last_updated;

        let err = converter.refresh("USD").await.unwrap_err();
        assert!(matches!(err, CalcError::RateFetchFailed { status: 503, .. }));

        assert_eq!(converter.rate("USD", "GBP").await, 0.25);
        let status = converter.status();
        assert_eq!(status.state, ConverterState::Idle);
        assert_eq!(status.warning.as_deref(), Some(RATE_FETCH_WARNING));
        assert_eq!(status.last_updated, updated_at);
    }

    #[tokio::test]
    async fn test_success_clears_warning() {
        let converter = CurrencyConverter::new(MockRateSource::new(vec![
            Scripted::Fail(500),
            Scripted::Rates(usd_table()),
        ]));

        assert!(converter.refresh("USD").await.is_err());
        assert!(converter.status().warning.is_some());

        converter.refresh("USD").await.unwrap();
        assert!(converter.status().warning.is_none());
    }

    #[tokio::test]
    async fn test_ensure_rates_fetches_once_per_base() {
        let source = MockRateSource::new(vec![Scripted::Rates(usd_table())]);
        let converter = CurrencyConverter::new(source.clone());

        assert!(converter.ensure_rates("USD").await.unwrap());
        assert!(!converter.ensure_rates("usd").await.unwrap());
        assert!(converter.ensure_rates("EUR").await.unwrap());

        assert_eq!(source.calls().await, vec!["USD", "EUR"]);
    }

    #[tokio::test]
    async fn test_poller_fetches_immediately_and_repeats() {
        let source = MockRateSource::new(vec![]);
        let converter = Arc::new(CurrencyConverter::new(source.clone()));

        let poller = converter.spawn_poller("USD", Duration::from_millis(40));
        assert!(poller.is_running());
        tokio::time::sleep(Duration::from_millis(150)).await;
        poller.shutdown().await;

        let calls = source.calls().await;
        assert!(calls.len() >= 2, "expected repeated fetches, got {:?}", calls);
        assert!(calls.iter().all(|base| base == "USD"));
        assert!(converter.has_rates("USD").await);
    }

    #[tokio::test]
    async fn test_poller_stops_after_shutdown() {
        let source = MockRateSource::new(vec![]);
        let converter = Arc::new(CurrencyConverter::new(source.clone()));

        let poller = converter.spawn_poller("USD", Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.shutdown().await;

        let after_shutdown = source.calls().await.len();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls().await.len(), after_shutdown);
        assert_eq!(converter.status().in_flight, 0);
    }

    #[tokio::test]
    async fn test_dropping_poller_stops_it() {
        let source = MockRateSource::new(vec![]);
        let converter = Arc::new(CurrencyConverter::new(source.clone()));

        {
            let _poller = converter.spawn_poller("USD", Duration::from_millis(20));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        // Give the runtime a moment to process the abort.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_drop = source.calls().await.len();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls().await.len(), after_drop);
    }

    #[tokio::test]
    async fn test_set_base_fetches_uncached_base() {
        let source = MockRateSource::new(vec![]);
        let converter = Arc::new(CurrencyConverter::new(source.clone()));

        let poller = converter.spawn_poller("USD", Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(30)).await;

        poller.set_base("eur");
        assert_eq!(poller.base(), "EUR");
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Back to a cached base: no extra fetch until the next tick.
        poller.set_base("USD");
        tokio::time::sleep(Duration::from_millis(30)).await;
        poller.shutdown().await;

        assert_eq!(source.calls().await, vec!["USD", "EUR"]);
    }

    /// Holds every fetch open until `release` is notified.
    struct GatedRateSource {
        table: RateTable,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl RateSource for GatedRateSource {
        async fn fetch_rates(&self, _base: &str) -> Result<RateTable> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.table.clone())
        }
    }

    #[tokio::test]
    async fn test_conversion_does_not_wait_for_fetch_in_flight() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let converter = Arc::new(CurrencyConverter::new(GatedRateSource {
            table: usd_table(),
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        }));

        let refresh = tokio::spawn({
            let converter = Arc::clone(&converter);
            async move { converter.refresh("USD").await }
        });
        started.notified().await;

        let status = converter.status();
        assert_eq!(status.state, ConverterState::Fetching);
        assert_eq!(status.in_flight, 1);

        let conversion = tokio::time::timeout(
            Duration::from_millis(100),
            converter.convert(10.0, "USD", "EUR"),
        )
        .await
        .expect("conversion blocked on the fetch");
        assert_eq!(conversion.rate, 1.0);
        assert_eq!(conversion.result, 10.0);

        release.notify_one();
        refresh.await.unwrap().unwrap();

        let status = converter.status();
        assert_eq!(status.state, ConverterState::Idle);
        assert_eq!(status.in_flight, 0);
        assert_eq!(converter.convert(10.0, "USD", "EUR").await.result, 5.0);
    }
}
