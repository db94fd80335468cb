use std::str::FromStr;

use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid account id: must be a positive integer")]
    AccountId,
    #[error("invalid card id: must be a positive integer")]
    CardId,
    #[error("invalid card number: must be 16 digits (spaces allowed)")]
    CardNumber,
    #[error("invalid card expiry: must be MM/YY with a month between 01 and 12")]
    CardExpiry,
    #[error("invalid username: must be 3-32 characters (a-z, A-Z, 0-9, '.', '_', '-')")]
    Username,
    #[error("invalid password: must be a non-empty string")]
    Password,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(u64);
impl AccountId {
    pub fn new(v: u64) -> Result<Self, ValueError> {
        if v >= 1 {
            Ok(Self(v))
        } else {
            Err(ValueError::AccountId)
        }
    }
    pub fn get(self) -> u64 {
        self.0
    }
}
impl FromStr for AccountId {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: u64 = s.trim().trim_start_matches('#').parse().map_err(|_| ValueError::AccountId)?;
        Self::new(v)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(u64);
impl CardId {
    pub fn new(v: u64) -> Result<Self, ValueError> {
        if v >= 1 {
            Ok(Self(v))
        } else {
            Err(ValueError::CardId)
        }
    }
    pub fn get(self) -> u64 {
        self.0
    }
}
impl FromStr for CardId {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: u64 = s.trim().parse().map_err(|_| ValueError::CardId)?;
        Self::new(v)
    }
}

/// Millisecond timestamp identifying a transaction record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransactionId(i64);
impl TransactionId {
    pub fn get(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRef, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);
impl Username {
    pub fn new(s: &str) -> Result<Self, ValueError> {
        let t = s.trim();
        if (3..=32).contains(&t.len())
            && t
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            Ok(Self(t.into()))
        } else {
            Err(ValueError::Username)
        }
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for Username {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Clone, PartialEq, Eq, AsRef)]
pub struct Password(String);
impl Password {
    pub fn new(s: &str) -> Result<Self, ValueError> {
        if s.is_empty() {
            Err(ValueError::Password)
        } else {
            Ok(Self(s.into()))
        }
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}
