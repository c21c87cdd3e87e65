use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::Position;

/// Live feed and historical service failures. Always recoverable.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed connection failed: {0}")]
    Connection(String),

    #[error("feed disconnected")]
    Disconnected,

    #[error("historical fetch failed: {0}")]
    Fetch(String),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history ends {gap} before now, more than one bar ({bar_length})")]
    Insufficient { gap: Duration, bar_length: Duration },

    #[error("history contains no complete bar")]
    Empty,

    #[error("cannot align {timestamp} to {bar_length} bars")]
    Unaligned {
        timestamp: DateTime<Utc>,
        bar_length: Duration,
    },

    #[error(transparent)]
    Feed(#[from] FeedError),
}

#[derive(Debug, Error)]
pub enum OrderSubmissionError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("order submission timed out")]
    Timeout,

    #[error("broker connection failed: {0}")]
    Connection(String),
}

impl OrderSubmissionError {
    /// Connectivity failures are handed to session recovery instead of being swallowed
    pub fn is_connectivity(&self) -> bool {
        matches!(self, OrderSubmissionError::Connection(_))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StrategyError {
    #[error("insufficient data: {have} bars, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid strategy parameters: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("broker connectivity lost: {0}")]
    Broker(OrderSubmissionError),

    #[error("could not terminate session, still {held}: {source}")]
    TerminationFailure {
        held: Position,
        #[source]
        source: OrderSubmissionError,
    },

    #[error("session already terminated")]
    AlreadyTerminated,
}

impl SessionError {
    /// Errors that send the session to RECOVERING rather than ending it
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Feed(_) | SessionError::Broker(_) => true,
            SessionError::History(HistoryError::Feed(_) | HistoryError::Empty) => true,
            _ => false,
        }
    }
}
