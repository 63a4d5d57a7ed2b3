//! The vault store: unlock lifecycle, in-memory record set, CRUD, persistence
//!
//! A [`Vault`] is constructed by [`Vault::unlock`]. Construction either
//! initializes a fresh vault file or loads and decrypts an existing one;
//! a failed unlock yields an error and no vault (retry by constructing a new
//! instance). Every mutation re-encrypts the full record set with a fresh
//! nonce and atomically rewrites the file.

use std::path::{Path, PathBuf};

use zeroize::{Zeroize, Zeroizing};

use crate::codec;
use crate::crypto::{generate_salt, VaultKey, SALT_SIZE};
use crate::error::{VaultError, VaultResult};
use crate::models::Record;
use crate::storage;

/// An unlocked vault bound to one file on disk.
///
/// The salt and derived key are cached at unlock and reused for every
/// persist; the salt never changes for the lifetime of the vault file.
pub struct Vault {
    path: PathBuf,
    salt: [u8; SALT_SIZE],
    key: Option<VaultKey>,
    records: Vec<Record>,
}

impl Vault {
    /// Unlock the vault at `path` with the given master passphrase.
    ///
    /// When no usable vault file exists, a new one is initialized: a fresh
    /// salt is generated, the key derived, and an empty record set persisted.
    /// Otherwise the file is loaded and decrypted; wrong passphrase,
    /// corruption, and truncation all surface as the single
    /// [`VaultError::UnlockFailed`] signal, by design carrying no detail.
    ///
    /// The passphrase buffer is zeroized before this function returns, on
    /// every path.
    pub fn unlock(path: impl Into<PathBuf>, passphrase: &mut [u8]) -> VaultResult<Self> {
        let path = path.into();

        if !storage::vault_exists(&path) {
            return Self::initialize(path, passphrase);
        }
        Self::load(path, passphrase)
    }

    fn initialize(path: PathBuf, passphrase: &mut [u8]) -> VaultResult<Self> {
        let salt = generate_salt();
        let key = VaultKey::derive(passphrase, &salt)?;

        let mut vault = Self {
            path,
            salt,
            key: Some(key),
            records: Vec::new(),
        };
        storage::ensure_vault_dir(&vault.path)?;
        vault.persist()?;
        Ok(vault)
    }

    fn load(path: PathBuf, passphrase: &mut [u8]) -> VaultResult<Self> {
        let (salt, blob) = match storage::read_vault_file(&path) {
            Ok(parts) => parts,
            Err(_) => {
                passphrase.zeroize();
                return Err(VaultError::UnlockFailed);
            }
        };

        let key = VaultKey::derive(passphrase, &salt)?;
        let plaintext =
            Zeroizing::new(key.decrypt(&blob).map_err(|_| VaultError::UnlockFailed)?);
        let records = codec::decode(&plaintext).map_err(|_| VaultError::UnlockFailed)?;

        Ok(Self {
            path,
            salt,
            key: Some(key),
            records,
        })
    }

    /// Whether the vault still accepts operations. False after [`close`].
    ///
    /// [`close`]: Vault::close
    pub fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }

    /// Path of the backing vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a record, replacing any existing record with the same
    /// `(source, login)` identity. The replacement is removed and the new
    /// record appended at the end of the set. Persists on success.
    pub fn add(&mut self, source: &str, login: &str, password: &str) -> VaultResult<()> {
        self.ensure_open()?;
        self.records.retain(|r| !r.matches(source, login));
        self.records.push(Record::new(source, login, password));
        self.persist()
    }

    /// Exact-match lookup by `(source, login)`.
    pub fn find(&self, source: &str, login: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.matches(source, login))
    }

    /// Re-key a record: remove it under the old identity and insert it under
    /// the new one, replacing any record already there. A missing old
    /// identity is a silent no-op. Persists at most once.
    pub fn edit(
        &mut self,
        old_source: &str,
        old_login: &str,
        new_source: &str,
        new_login: &str,
        new_password: &str,
    ) -> VaultResult<()> {
        self.ensure_open()?;
        if self.find(old_source, old_login).is_none() {
            return Ok(());
        }
        self.records.retain(|r| !r.matches(old_source, old_login));
        self.records.retain(|r| !r.matches(new_source, new_login));
        self.records
            .push(Record::new(new_source, new_login, new_password));
        self.persist()
    }

    /// Remove the record with the given identity. A missing identity is a
    /// no-op and does not touch the file.
    pub fn delete(&mut self, source: &str, login: &str) -> VaultResult<()> {
        self.ensure_open()?;
        let before = self.records.len();
        self.records.retain(|r| !r.matches(source, login));
        if self.records.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Case-insensitive substring search over source and login (never the
    /// password), preserving record order. An empty keyword matches
    /// everything.
    pub fn search(&self, keyword: &str) -> Vec<&Record> {
        let keyword = keyword.to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.source.to_lowercase().contains(&keyword)
                    || r.login.to_lowercase().contains(&keyword)
            })
            .collect()
    }

    /// The current record set in live order.
    pub fn list_all(&self) -> &[Record] {
        &self.records
    }

    /// Persist once more, then release the key material and scrub the record
    /// set. Closing an already-closed vault is a no-op; mutating operations
    /// after close fail with [`VaultError::VaultClosed`], and read accessors
    /// observe an empty set.
    pub fn close(&mut self) -> VaultResult<()> {
        if self.key.is_none() {
            return Ok(());
        }
        self.persist()?;
        self.key.take();
        self.records.clear();
        Ok(())
    }

    fn ensure_open(&self) -> VaultResult<()> {
        if self.key.is_none() {
            return Err(VaultError::VaultClosed);
        }
        Ok(())
    }

    /// Serialize, encrypt with a fresh nonce, and atomically rewrite the
    /// vault file. The in-memory set is the source of truth; a failed write
    /// surfaces the error without rolling the set back.
    fn persist(&mut self) -> VaultResult<()> {
        let key = self.key.as_ref().ok_or(VaultError::VaultClosed)?;
        let plaintext = Zeroizing::new(codec::encode(&self.records));
        let blob = key.encrypt(&plaintext)?;
        storage::write_vault_file(&self.path, &self.salt, &blob)
    }
}
