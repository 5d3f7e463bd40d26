//! Rules for the journal passphrase chosen at `shiftlog init`.

use crate::error::{Result, ShiftlogError};

/// Counted in characters, so non-ASCII passphrases are not penalized.
pub const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Reject blank passphrases and ones shorter than [`MIN_PASSPHRASE_LENGTH`].
///
/// ```
/// use shiftlog_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("night-shift-2024").is_ok());
/// assert!(validate_passphrase("relay").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    let problem = match passphrase.chars().count() {
        _ if passphrase.chars().all(char::is_whitespace) => {
            "Passphrase must not be blank".to_owned()
        }
        n if n < MIN_PASSPHRASE_LENGTH => format!(
            "Passphrase is {} characters; at least {} are required",
            n, MIN_PASSPHRASE_LENGTH
        ),
        _ => return Ok(()),
    };
    Err(ShiftlogError::InvalidInput(problem))
}
