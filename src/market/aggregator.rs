use chrono::{DateTime, Duration, DurationRound, Utc};
use rust_decimal::Decimal;

use crate::error::HistoryError;
use crate::models::{Bar, HistoricalRecord, Tick};

/// Running OHLC accumulators for the interval currently being filled
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenBar {
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
}

impl OpenBar {
    fn new(price: Decimal) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    fn update(&mut self, price: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }

    fn finish(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Bar {
        Bar {
            start,
            end,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}

/// Folds ticks into closed, non-overlapping bars of a fixed length.
///
/// Bars are epoch-aligned buckets `[start, start + bar_length)` labeled by
/// their end. `boundary` is the end of the last sealed bar, which is also
/// the start of the bar being accumulated.
#[derive(Debug, Clone)]
pub struct BarAggregator {
    bar_length: Duration,
    boundary: DateTime<Utc>,
    last_price: Decimal,
    current: Option<OpenBar>,
}

/// Output of [`BarAggregator::seed`]
#[derive(Debug, Clone)]
pub struct Seeded {
    pub bars: Vec<Bar>,
    pub aggregator: BarAggregator,
}

impl BarAggregator {
    /// Start aggregating at `boundary` with `last_price` as the forward-fill value
    pub fn new(bar_length: Duration, boundary: DateTime<Utc>, last_price: Decimal) -> Self {
        Self {
            bar_length,
            boundary,
            last_price,
            current: None,
        }
    }

    /// Resample historical sub-bar records into complete bars.
    ///
    /// Empty buckets are skipped and the trailing bucket (still filling at
    /// fetch time) is left out of the series; its records become the
    /// in-progress bar. Fails when the last complete bar ends a full bar
    /// length or more before `now`.
    pub fn seed(
        records: &[HistoricalRecord],
        bar_length: Duration,
        now: DateTime<Utc>,
    ) -> Result<Seeded, HistoryError> {
        let mut records = records.to_vec();
        records.sort_by_key(|r| r.timestamp);

        let mut buckets: Vec<(DateTime<Utc>, OpenBar)> = Vec::new();
        for record in &records {
            let start = bucket_start(record.timestamp, bar_length)?;
            match buckets.last_mut() {
                Some((bucket, acc)) if *bucket == start => acc.update(record.close),
                _ => buckets.push((start, OpenBar::new(record.close))),
            }
        }

        let (partial_start, partial) = buckets.pop().ok_or(HistoryError::Empty)?;
        let bars: Vec<Bar> = buckets
            .into_iter()
            .map(|(start, acc)| acc.finish(start, start + bar_length))
            .collect();

        let last = bars.last().ok_or(HistoryError::Empty)?;
        let boundary = last.end;

        let gap = now - boundary;
        if gap >= bar_length {
            return Err(HistoryError::Insufficient { gap, bar_length });
        }

        let mut aggregator = Self::new(bar_length, boundary, last.close);
        if partial_start == boundary {
            aggregator.last_price = partial.close;
            aggregator.current = Some(partial);
        }

        tracing::debug!(
            bars = bars.len(),
            boundary = %boundary,
            "Seeded bar series from history"
        );

        Ok(Seeded { bars, aggregator })
    }

    /// Fold a tick into the in-progress bar.
    ///
    /// Returns every bar sealed by this tick in chronological order: empty
    /// while the tick falls inside the current interval, one bar when it
    /// crosses the boundary, several when intervals passed without ticks
    /// (those are forward-filled with the last known price).
    pub fn ingest(&mut self, tick: &Tick) -> Vec<Bar> {
        if tick.timestamp < self.boundary {
            tracing::debug!(
                tick = %tick.timestamp,
                boundary = %self.boundary,
                "Ignoring tick older than the current bar"
            );
            return Vec::new();
        }

        let sealed = self.advance_to(tick.timestamp);

        let price = tick.mid();
        match self.current.as_mut() {
            Some(acc) => acc.update(price),
            None => self.current = Some(OpenBar::new(price)),
        }
        self.last_price = price;

        sealed
    }

    /// Seal every bar whose end is at or before `now`.
    ///
    /// Lets idle periods produce regular forward-filled bars without
    /// waiting for the next tick.
    pub fn advance_to(&mut self, now: DateTime<Utc>) -> Vec<Bar> {
        let mut sealed = Vec::new();
        while now - self.boundary >= self.bar_length {
            sealed.push(self.seal());
        }
        sealed
    }

    fn seal(&mut self) -> Bar {
        let start = self.boundary;
        let end = start + self.bar_length;
        let bar = match self.current.take() {
            Some(acc) => acc.finish(start, end),
            None => Bar::flat(start, end, self.last_price),
        };
        self.boundary = end;
        bar
    }

    pub fn bar_length(&self) -> Duration {
        self.bar_length
    }

    /// End of the last sealed bar
    pub fn last_boundary(&self) -> DateTime<Utc> {
        self.boundary
    }

    pub fn last_price(&self) -> Decimal {
        self.last_price
    }

    pub fn has_open_bar(&self) -> bool {
        self.current.is_some()
    }
}

fn bucket_start(timestamp: DateTime<Utc>, bar_length: Duration) -> Result<DateTime<Utc>, HistoryError> {
    timestamp.duration_trunc(bar_length).map_err(|e| {
        tracing::warn!(
            timestamp = %timestamp,
            bar_length = %bar_length,
            error = %e,
            "Bar alignment failed"
        );
        HistoryError::Unaligned {
            timestamp,
            bar_length,
        }
    })
}
