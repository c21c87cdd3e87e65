use std::fmt;

/// Session lifecycle. TERMINATED has no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Initializing,
    Streaming,
    Recovering,
    Terminated,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Initializing, Streaming)
                | (Initializing, Recovering)
                | (Initializing, Terminated)
                | (Streaming, Recovering)
                | (Streaming, Terminated)
                | (Recovering, Streaming)
                | (Recovering, Terminated)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == SessionState::Terminated
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Initializing => "INITIALIZING",
            SessionState::Streaming => "STREAMING",
            SessionState::Recovering => "RECOVERING",
            SessionState::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCause {
    ScheduledEnd,
    ManualStop,
    RetriesExhausted,
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCause::ScheduledEnd => write!(f, "Scheduled termination"),
            TerminationCause::ManualStop => write!(f, "Manual stop"),
            TerminationCause::RetriesExhausted => write!(f, "Max attempts reached"),
        }
    }
}
