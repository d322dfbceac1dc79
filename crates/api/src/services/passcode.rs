//! Admin passcode gate.
//!
//! A single shared secret from `ADMIN_PASSCODE` unlocks the admin UI. It is
//! unrelated to user accounts and carries no session.

/// Result of a passcode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasscodeOutcome {
    Verified,
    Invalid,
    /// No passcode is configured; every attempt fails.
    NotConfigured,
}

/// Compare a submitted passcode against the configured one.
///
/// An empty configured value counts as not configured.
#[must_use]
pub fn verify(configured: Option<&str>, provided: &str) -> PasscodeOutcome {
    match configured {
        None | Some("") => PasscodeOutcome::NotConfigured,
        Some(expected) if expected == provided => PasscodeOutcome::Verified,
        Some(_) => PasscodeOutcome::Invalid,
    }
}
