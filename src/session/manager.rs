use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;

use super::{
    Clock, RetryDecision, RetryPolicy, RetryState, SessionState, SystemClock, TerminationCause,
};
use crate::api::{HistoricalData, OrderSubmitter, PriceFeed};
use crate::config::{parse_duration, SessionConfig};
use crate::error::{ConfigError, FeedError, HistoryError, OrderSubmissionError, SessionError};
use crate::execution::PositionExecutor;
use crate::market::{BarAggregator, BarSeries};
use crate::models::{Order, Position, Tick};
use crate::strategy::{Strategy, TradingHours};

/// Summary handed back when a session ends cleanly
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub cause: TerminationCause,
    pub state: SessionState,
    pub fills: Vec<Order>,
    pub cumulative_pl: Decimal,
    pub recovery_attempts: u32,
    pub bars: usize,
}

/// Resolves once a stop has been requested. Never resolves without a receiver.
async fn stop_requested(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown.as_mut() {
        let stopped = rx.wait_for(|stop| *stop).await.is_ok();
        if stopped {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// Drives one live trading session from seeding to termination.
///
/// Ticks are handled strictly one at a time: ingest, seal, gate, evaluate,
/// execute. Feed failures move the session to RECOVERING; the position and
/// ledger survive reconnection, bars are rebuilt from fresh history.
pub struct SessionManager {
    instrument: String,
    bar_length: Duration,
    granularity: Duration,
    history_span: Duration,
    session_duration: Duration,
    hours: TradingHours,
    retry: RetryPolicy,

    feed: Arc<dyn PriceFeed>,
    history: Arc<dyn HistoricalData>,
    strategy: Box<dyn Strategy>,
    executor: PositionExecutor,
    clock: Arc<dyn Clock>,
    shutdown: Option<watch::Receiver<bool>>,

    state: SessionState,
    retry_state: RetryState,
    bars: BarSeries,
    start_time: Option<DateTime<Utc>>,
}

impl SessionManager {
    /// Build a session from configuration. The strategy comes from
    /// `config.strategy` unless replaced with [`SessionManager::with_strategy`].
    pub fn new(
        config: &SessionConfig,
        feed: Arc<dyn PriceFeed>,
        history: Arc<dyn HistoricalData>,
        broker: Arc<dyn OrderSubmitter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let strategy = config
            .strategy
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            instrument: config.instrument.clone(),
            bar_length: config.bar_length()?,
            granularity: parse_duration(&config.history_granularity)?,
            history_span: Duration::days(config.history_days),
            session_duration: config.session_duration(),
            hours: config.trading_window()?,
            retry: config.retry_policy(),
            feed,
            history,
            strategy,
            executor: PositionExecutor::new(config.instrument.clone(), config.units, broker),
            clock: Arc::new(SystemClock),
            shutdown: None,
            state: SessionState::Initializing,
            retry_state: RetryState::new(),
            bars: BarSeries::new(config.max_bars),
            start_time: None,
        })
    }

    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        if strategy.min_lookback() > self.bars.capacity() {
            tracing::warn!(
                strategy = strategy.name(),
                lookback = strategy.min_lookback(),
                max_bars = self.bars.capacity(),
                "Strategy lookback exceeds bar retention, it will never signal"
            );
        }
        self.strategy = strategy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Stop cooperatively once the channel carries `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Override the session start used to compute the scheduled end
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn held(&self) -> Position {
        self.executor.held()
    }

    pub fn bars(&self) -> &BarSeries {
        &self.bars
    }

    pub fn executor(&self) -> &PositionExecutor {
        &self.executor
    }

    pub fn recovery_attempts(&self) -> u32 {
        self.retry_state.attempts()
    }

    /// Run until the scheduled end, a manual stop, retry exhaustion or a
    /// fatal error. The position is flattened on every exit path.
    pub async fn run(&mut self) -> Result<SessionReport, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::AlreadyTerminated);
        }

        let start = *self.start_time.get_or_insert_with(|| self.clock.now());
        let end_time = start + self.session_duration;

        tracing::info!(
            instrument = %self.instrument,
            strategy = self.strategy.name(),
            bar_length = %self.bar_length,
            units = self.executor.unit_size(),
            end = %end_time,
            "🚀 Session starting"
        );

        loop {
            let error = match self.stream(end_time).await {
                Ok(cause) => return self.terminate(cause).await,
                Err(e) => e,
            };

            if !error.is_recoverable() {
                return self.abort(error).await;
            }

            tracing::warn!(error = %error, "⚠️  Connection problem");
            self.transition(SessionState::Recovering);

            let (next, decision) = self.retry_state.next(&self.retry);
            self.retry_state = next;

            match decision {
                RetryDecision::Retry { attempt, wait } => {
                    tracing::info!(
                        attempt,
                        wait_secs = wait.as_secs(),
                        "🔄 Reconnecting after wait"
                    );
                    let mut shutdown = self.shutdown.clone();
                    tokio::select! {
                        biased;
                        _ = stop_requested(&mut shutdown) => {
                            return self.terminate(TerminationCause::ManualStop).await;
                        }
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                RetryDecision::Exhausted { attempts } => {
                    tracing::error!(attempts, "❌ Max reconnection attempts reached");
                    return self.terminate(TerminationCause::RetriesExhausted).await;
                }
            }
        }
    }

    /// Seed, subscribe and process ticks until something ends the stream
    async fn stream(&mut self, end_time: DateTime<Utc>) -> Result<TerminationCause, SessionError> {
        let mut aggregator = self.seed().await?;
        let mut ticks = self.feed.subscribe(&self.instrument).await?;
        self.transition(SessionState::Streaming);

        let mut shutdown = self.shutdown.clone();
        loop {
            let message = tokio::select! {
                biased;
                _ = stop_requested(&mut shutdown) => return Ok(TerminationCause::ManualStop),
                message = ticks.recv() => message,
            };

            match message {
                Some(Ok(tick)) => {
                    if let Some(cause) = self.on_tick(&mut aggregator, &tick, end_time).await? {
                        return Ok(cause);
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(FeedError::Disconnected.into()),
            }
        }
    }

    /// Fetch history and rebuild the bar series. Lagging history is
    /// re-fetched once; a second lag is fatal.
    async fn seed(&mut self) -> Result<BarAggregator, SessionError> {
        match self.fetch_and_seed().await {
            Err(HistoryError::Insufficient { gap, bar_length }) => {
                tracing::warn!(
                    gap = %gap,
                    bar_length = %bar_length,
                    "History lags more than one bar, fetching again"
                );
                Ok(self.fetch_and_seed().await?)
            }
            other => Ok(other?),
        }
    }

    async fn fetch_and_seed(&mut self) -> Result<BarAggregator, HistoryError> {
        let now = self.clock.now();
        let records = self
            .history
            .fetch(&self.instrument, now - self.history_span, now, self.granularity)
            .await?;

        let seeded = BarAggregator::seed(&records, self.bar_length, now)?;

        self.bars.clear();
        if let Err(e) = self.bars.extend(seeded.bars) {
            tracing::warn!(error = %e, "Dropped out-of-order history bar");
        }

        tracing::info!(
            bars = self.bars.len(),
            last_bar = %seeded.aggregator.last_boundary(),
            "📊 Seeded bar series"
        );
        if self.bars.len() < self.strategy.min_lookback() {
            tracing::warn!(
                bars = self.bars.len(),
                lookback = self.strategy.min_lookback(),
                strategy = self.strategy.name(),
                "Seeded fewer bars than the strategy needs, signals start once enough bars close"
            );
        }
        Ok(seeded.aggregator)
    }

    async fn on_tick(
        &mut self,
        aggregator: &mut BarAggregator,
        tick: &Tick,
        end_time: DateTime<Utc>,
    ) -> Result<Option<TerminationCause>, SessionError> {
        if tick.timestamp >= end_time {
            return Ok(Some(TerminationCause::ScheduledEnd));
        }

        let sealed = aggregator.ingest(tick);
        if sealed.is_empty() {
            return Ok(None);
        }

        for bar in sealed {
            tracing::debug!(end = %bar.end, close = %bar.close, flat = bar.is_flat(), "Bar closed");
            if let Err(e) = self.bars.push(bar) {
                tracing::warn!(error = %e, "Dropped out-of-order bar");
            }
        }

        self.on_bar_close().await?;
        Ok(None)
    }

    /// Gate on trading hours, evaluate the strategy and execute the target
    async fn on_bar_close(&mut self) -> Result<(), SessionError> {
        let Some(bar_end) = self.bars.last().map(|b| b.end) else {
            return Ok(());
        };

        if !self.hours.is_live(bar_end) {
            tracing::debug!(
                bar_end = %bar_end,
                local_hour = self.hours.local_hour(bar_end),
                "Outside trading hours, skipping"
            );
            return Ok(());
        }

        let target = match self.strategy.evaluate(self.bars.bars()) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!(strategy = self.strategy.name(), error = %e, "No signal");
                return Ok(());
            }
        };

        match self.executor.apply(target).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_connectivity() => Err(SessionError::Broker(e)),
            // Rejections and timeouts are logged by the executor; keep streaming
            Err(_) => Ok(()),
        }
    }

    /// Flatten and close out
    async fn terminate(&mut self, cause: TerminationCause) -> Result<SessionReport, SessionError> {
        tracing::info!(cause = %cause, held = %self.executor.held(), "🛑 Terminating session");

        let flattened = self.executor.flatten().await;
        self.transition(SessionState::Terminated);

        match flattened {
            Ok(_) => {
                let report = self.report(cause);
                tracing::info!(
                    cause = %cause,
                    fills = report.fills.len(),
                    cum_pl = %report.cumulative_pl,
                    recovery_attempts = report.recovery_attempts,
                    "🏁 Session terminated"
                );
                Ok(report)
            }
            Err(source) => Err(self.termination_failure(source)),
        }
    }

    /// Fatal error: still try to leave the account flat
    async fn abort(&mut self, error: SessionError) -> Result<SessionReport, SessionError> {
        tracing::error!(error = %error, held = %self.executor.held(), "💥 Fatal session error");

        let flattened = self.executor.flatten().await;
        self.transition(SessionState::Terminated);

        match flattened {
            Ok(_) => Err(error),
            Err(source) => Err(self.termination_failure(source)),
        }
    }

    fn termination_failure(&self, source: OrderSubmissionError) -> SessionError {
        let held = self.executor.held();
        tracing::error!(
            held = %held,
            units = held.direction() * self.executor.unit_size(),
            error = %source,
            cum_pl = %self.executor.ledger().cumulative_pl(),
            "🚨 Could not flatten on exit, position still open"
        );
        SessionError::TerminationFailure { held, source }
    }

    fn report(&self, cause: TerminationCause) -> SessionReport {
        SessionReport {
            cause,
            state: self.state,
            fills: self.executor.ledger().fills().to_vec(),
            cumulative_pl: self.executor.ledger().cumulative_pl(),
            recovery_attempts: self.retry_state.attempts(),
            bars: self.bars.len(),
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = %self.state, to = %next, "Ignoring invalid session transition");
            return;
        }

        tracing::info!(
            at = %self.clock.now(),
            from = %self.state,
            to = %next,
            held = %self.executor.held(),
            cum_pl = %self.executor.ledger().cumulative_pl(),
            "🔀 Session state change"
        );
        self.state = next;
    }
}
