//! keyrack-core - encrypted single-file credential store
//!
//! This crate provides:
//! - AES-256-GCM authenticated encryption for records at rest
//! - PBKDF2-HMAC-SHA256 key derivation from a master passphrase
//! - A compact binary payload layout with an integrity marker
//! - In-memory CRUD over the decrypted record set with full-file persistence
//! - Automatic zeroization of passphrases, keys, and record text

pub mod codec;
pub mod crypto;
pub mod error;
pub mod models;
pub mod storage;
pub mod vault;

pub use crypto::{generate_salt, VaultKey, KEY_SIZE, NONCE_SIZE, PBKDF2_ROUNDS, SALT_SIZE};
pub use error::{VaultError, VaultResult};
pub use models::Record;
pub use storage::vault_exists;
pub use vault::Vault;
