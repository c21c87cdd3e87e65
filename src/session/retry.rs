use std::time::Duration;

/// Reconnection schedule: fixed or linearly growing waits, optionally capped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    initial_wait: Duration,
    wait_increase: Duration,
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn new(initial_wait: Duration, wait_increase: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            initial_wait,
            wait_increase,
            max_attempts,
        }
    }

    /// Same wait before every attempt
    pub fn fixed(wait: Duration, max_attempts: Option<u32>) -> Self {
        Self::new(wait, Duration::ZERO, max_attempts)
    }

    /// Wait before reconnection attempt `attempt` (1-based)
    pub fn wait_for(&self, attempt: u32) -> Duration {
        self.initial_wait + self.wait_increase * attempt.saturating_sub(1)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(15), None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt: u32, wait: Duration },
    Exhausted { attempts: u32 },
}

/// Reconnection attempts made so far in this session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Advance after a failure. Returns the next state and what to do.
    pub fn next(self, policy: &RetryPolicy) -> (RetryState, RetryDecision) {
        let attempt = self.attempts + 1;
        match policy.max_attempts() {
            Some(max) if attempt > max => (
                self,
                RetryDecision::Exhausted {
                    attempts: self.attempts,
                },
            ),
            _ => (
                RetryState { attempts: attempt },
                RetryDecision::Retry {
                    attempt,
                    wait: policy.wait_for(attempt),
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_waits() {
        let policy = RetryPolicy::new(Duration::from_secs(15), Duration::from_secs(15), None);
        assert_eq!(policy.wait_for(1), Duration::from_secs(15));
        assert_eq!(policy.wait_for(2), Duration::from_secs(30));
        assert_eq!(policy.wait_for(4), Duration::from_secs(60));
    }

    #[test]
    fn test_exhausts_after_max() {
        let policy = RetryPolicy::new(Duration::from_secs(15), Duration::from_secs(15), Some(2));
        let state = RetryState::new();

        let (state, first) = state.next(&policy);
        assert_eq!(
            first,
            RetryDecision::Retry {
                attempt: 1,
                wait: Duration::from_secs(15)
            }
        );

        let (state, second) = state.next(&policy);
        assert_eq!(
            second,
            RetryDecision::Retry {
                attempt: 2,
                wait: Duration::from_secs(30)
            }
        );

        let (state, third) = state.next(&policy);
        assert_eq!(third, RetryDecision::Exhausted { attempts: 2 });
        assert_eq!(state.attempts(), 2);
    }

    #[test]
    fn test_unbounded_never_exhausts() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();
        for _ in 0..100 {
            let (next, decision) = state.next(&policy);
            assert!(matches!(decision, RetryDecision::Retry { .. }));
            state = next;
        }
        assert_eq!(state.attempts(), 100);
    }

    #[test]
    fn test_zero_max_exhausts_immediately() {
        let policy = RetryPolicy::fixed(Duration::from_secs(1), Some(0));
        let (_, decision) = RetryState::new().next(&policy);
        assert_eq!(decision, RetryDecision::Exhausted { attempts: 0 });
    }
}
