//! Passphrase policy for encrypted journals.
//!
//! Encryption itself lives in [`crate::storage::encryption`] (Age with its
//! built-in scrypt passphrase recipient).

pub mod passphrase;

pub use passphrase::validate_passphrase;
