//! Trial-mode accounting.
//!
//! The trial counter is a process-wide count of batch submissions made
//! with the server's own API key; callers supplying their own key are
//! never counted. Enforcement is a pure function so the limit check is
//! trivially testable and carries no hidden session state.

/// True when the trial allowance is used up.
pub fn trial_exhausted(attempts: u32, limit: u32) -> bool {
    attempts >= limit
}
