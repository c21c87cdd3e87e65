// Live session lifecycle: seeding, streaming, recovery and termination
pub mod clock;
pub mod manager;
pub mod retry;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{SessionManager, SessionReport};
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use state::{SessionState, TerminationCause};
