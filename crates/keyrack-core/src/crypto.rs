//! Cryptographic operations for vault security
//!
//! - AES-256-GCM for symmetric encryption
//! - PBKDF2-HMAC-SHA256 for passphrase-based key derivation
//! - Secure memory handling with zeroization

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{VaultError, VaultResult};

/// Size of AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of the key-derivation salt in bytes
pub const SALT_SIZE: usize = 16;

/// PBKDF2 iteration count. Fixed: existing vault files depend on it.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Symmetric key derived from the master passphrase.
///
/// The raw key bytes are held in a [`Secret`] and zeroized when the value is
/// dropped.
pub struct VaultKey {
    key: Secret<[u8; KEY_SIZE]>,
}

impl VaultKey {
    /// Derive a key from a passphrase and salt using PBKDF2-HMAC-SHA256.
    ///
    /// Deterministic: the same passphrase and salt always produce the same
    /// key. The passphrase buffer is overwritten with zeroes before this
    /// function returns, on every path; callers must not rely on its
    /// contents afterwards.
    pub fn derive(passphrase: &mut [u8], salt: &[u8; SALT_SIZE]) -> VaultResult<Self> {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(passphrase, salt, PBKDF2_ROUNDS, &mut key);
        passphrase.zeroize();

        Ok(Self {
            key: Secret::new(key),
        })
    }

    /// Encrypt a payload using AES-256-GCM.
    ///
    /// A fresh random 12-byte nonce is generated on every call and prepended
    /// to the result, so the returned blob is `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &[u8]) -> VaultResult<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(self.key.expose_secret())
            .map_err(|e| VaultError::Encryption(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| VaultError::Encryption(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypt a `nonce || ciphertext || tag` blob produced by [`encrypt`].
    ///
    /// Fails with [`VaultError::DecryptionFailed`] on short input, tag
    /// mismatch, or any cipher fault. A wrong key and a corrupted blob are
    /// indistinguishable here.
    ///
    /// [`encrypt`]: VaultKey::encrypt
    pub fn decrypt(&self, blob: &[u8]) -> VaultResult<Vec<u8>> {
        if blob.len() < NONCE_SIZE {
            return Err(VaultError::DecryptionFailed);
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);

        let cipher = Aes256Gcm::new_from_slice(self.key.expose_secret())
            .map_err(|_| VaultError::DecryptionFailed)?;

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }
}

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}
