use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::Bar;

#[derive(Debug, Error, PartialEq)]
#[error("bar starting {start} overlaps series ending {last_end}")]
pub struct OutOfOrderBar {
    pub start: DateTime<Utc>,
    pub last_end: DateTime<Utc>,
}

/// Append-only, chronologically ordered bar history
///
/// Keeps at most `max_bars` of the most recent bars.
#[derive(Debug, Clone)]
pub struct BarSeries {
    bars: Vec<Bar>,
    max_bars: usize,
}

impl BarSeries {
    pub fn new(max_bars: usize) -> Self {
        Self {
            bars: Vec::new(),
            max_bars: max_bars.max(1),
        }
    }

    /// Append a closed bar. Rejects bars that start before the last one ended.
    pub fn push(&mut self, bar: Bar) -> Result<(), OutOfOrderBar> {
        if let Some(last) = self.bars.last() {
            if bar.start < last.end {
                return Err(OutOfOrderBar {
                    start: bar.start,
                    last_end: last.end,
                });
            }
        }

        self.bars.push(bar);

        // Drop oldest beyond the retention limit
        if self.bars.len() > self.max_bars {
            let excess = self.bars.len() - self.max_bars;
            self.bars.drain(..excess);
        }

        Ok(())
    }

    pub fn extend<I: IntoIterator<Item = Bar>>(&mut self, bars: I) -> Result<(), OutOfOrderBar> {
        for bar in bars {
            self.push(bar)?;
        }
        Ok(())
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The `n` most recent bars
    pub fn recent(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Retention limit
    pub fn capacity(&self) -> usize {
        self.max_bars
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn clear(&mut self) {
        self.bars.clear();
    }
}
