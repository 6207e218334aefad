//! Account identifiers as accepted by provider accessors.
//!
//! NEAR has no checksummed address format, so an address is whatever string
//! the caller supplies. It may also arrive as a pending future (for example a
//! signer that derives its account lazily) which is awaited before use.

use std::fmt;

use futures::future::BoxFuture;
use near_account_id::AccountId;

use crate::error::Error;

/// An account identifier, possibly not yet known.
pub enum Address {
    /// A plain account id string.
    Resolved(String),
    /// An identifier that resolves asynchronously.
    Pending(BoxFuture<'static, Result<String, Error>>),
}

impl Address {
    /// Wrap a future producing the account id.
    pub fn pending<F>(fut: F) -> Self
    where
        F: std::future::Future<Output = Result<String, Error>> + Send + 'static,
    {
        Self::Pending(Box::pin(fut))
    }

    /// Resolve to the plain string form.
    pub async fn resolve(self) -> Result<String, Error> {
        match self {
            Address::Resolved(s) => Ok(s),
            Address::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Resolved(s) => f.debug_tuple("Resolved").field(s).finish(),
            Address::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::Resolved(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::Resolved(s)
    }
}

impl From<&String> for Address {
    fn from(s: &String) -> Self {
        Self::Resolved(s.clone())
    }
}

impl From<AccountId> for Address {
    fn from(id: AccountId) -> Self {
        Self::Resolved(id.to_string())
    }
}

impl From<&AccountId> for Address {
    fn from(id: &AccountId) -> Self {
        Self::Resolved(id.to_string())
    }
}
