//! Data model for stored credentials

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// One stored credential: where it is used, the account name, and the secret.
///
/// The `(source, login)` pair identifies a record; at most one record per pair
/// exists in a vault at any time. All three fields are scrubbed from memory
/// when the record is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Record {
    pub source: String,
    pub login: String,
    pub password: String,
}

impl Record {
    pub fn new(
        source: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            login: login.into(),
            password: password.into(),
        }
    }

    /// Exact, case-sensitive identity match on `(source, login)`.
    pub fn matches(&self, source: &str, login: &str) -> bool {
        self.source == source && self.login == login
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("source", &self.source)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}
