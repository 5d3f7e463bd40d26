//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// - 0: Success
/// - 1: General error, including no signed-in operator
/// - 2+: Mapped from core error kinds
pub mod exit_codes {
    pub const FAILURE: i32 = 1;

    /// Invalid user input, arguments or entry fields.
    pub const INVALID_INPUT: i32 = 2;

    /// Journal, entry or reference record not found.
    pub const NOT_FOUND: i32 = 3;

    /// Illegal lifecycle transition.
    pub const INVALID_STATE: i32 = 4;

    /// Wrong passphrase.
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}
