//! Age passphrase encryption for journal files.
//!
//! Age's passphrase recipient derives the file key with scrypt, so no
//! separate key-derivation step is needed here.

use std::io::{Read, Write};

use secrecy::SecretString;

use crate::error::{Result, ShiftlogError};

fn secret(passphrase: &str) -> SecretString {
    SecretString::from(passphrase.to_owned())
}

fn crypto_err(stage: &'static str) -> impl Fn(std::io::Error) -> ShiftlogError {
    move |e| ShiftlogError::Crypto(format!("{}: {}", stage, e))
}

/// Seal a serialized journal image.
///
/// ```
/// use shiftlog_core::storage::encryption::encrypt;
///
/// let sealed = encrypt(b"shift notes", "night-shift-2024").unwrap();
/// assert_ne!(sealed.as_slice(), b"shift notes");
/// ```
pub fn encrypt(data: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let mut sealed = Vec::with_capacity(data.len() + 256);
    let mut stream = age::Encryptor::with_user_passphrase(secret(passphrase))
        .wrap_output(&mut sealed)
        .map_err(crypto_err("Cannot start encryption"))?;
    stream
        .write_all(data)
        .map_err(crypto_err("Cannot encrypt journal"))?;
    stream
        .finish()
        .map_err(crypto_err("Cannot finish encryption"))?;
    Ok(sealed)
}

/// Open a sealed journal image.
///
/// A passphrase that does not unlock the file is `IncorrectPassphrase`;
/// anything unreadable as age is `Crypto`.
pub fn decrypt(sealed: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let decryptor = age::Decryptor::new(sealed)
        .map_err(|e| ShiftlogError::Crypto(format!("Not an encrypted journal: {}", e)))?;

    let identity = age::scrypt::Identity::new(secret(passphrase));
    let identities: [&dyn age::Identity; 1] = [&identity];
    let mut stream = decryptor.decrypt(identities.into_iter()).map_err(|e| match e {
        age::DecryptError::NoMatchingKeys
        | age::DecryptError::DecryptionFailed
        | age::DecryptError::KeyDecryptionFailed => ShiftlogError::IncorrectPassphrase,
        other => ShiftlogError::Crypto(format!("Cannot decrypt journal: {}", other)),
    })?;

    let mut plain = Vec::new();
    stream
        .read_to_end(&mut plain)
        .map_err(crypto_err("Cannot read decrypted journal"))?;
    Ok(plain)
}
