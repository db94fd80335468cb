//! # Processor
//!
//! `processor` validates a deposit, withdrawal or transfer against a collection of accounts and
//! produces the updated collection. It never touches storage: persisting the result and
//! recording the transaction is up to the caller.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{account::Account, transaction::TransactionKind, types::AccountId};

/// Business-rule rejection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("invalid amount")]
    InvalidAmount,
    #[error("account not found: #{0}")]
    AccountNotFound(AccountId),
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("destination not found")]
    DestinationNotFound,
    #[error("same account")]
    SameAccount,
    #[error("amount too large")]
    Overflow,
}

/// A requested balance change
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub source: AccountId,
    /// Only read for transfers
    pub destination: Option<AccountId>,
}

impl TransactionRequest {
    pub fn deposit(account: AccountId, amount: Decimal) -> Self {
        Self {
            kind: TransactionKind::Deposit,
            amount,
            source: account,
            destination: None,
        }
    }

    pub fn withdrawal(account: AccountId, amount: Decimal) -> Self {
        Self {
            kind: TransactionKind::Withdrawal,
            amount,
            source: account,
            destination: None,
        }
    }

    pub fn transfer(from: AccountId, to: AccountId, amount: Decimal) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            amount,
            source: from,
            destination: Some(to),
        }
    }
}

/// Signed balance change applied to one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub account: AccountId,
    pub counterparty: Option<AccountId>,
    pub amount: Decimal,
}

/// Accepted request: the updated accounts and the postings to record
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub accounts: Vec<Account>,
    pub postings: Vec<Posting>,
}

/// Parse user input into an amount, rejecting anything that is not a number above zero
pub fn parse_amount(input: &str) -> Result<Decimal, ProcessError> {
    let amount = Decimal::from_str(input.trim()).map_err(|_| ProcessError::InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(ProcessError::InvalidAmount);
    }
    Ok(amount)
}

fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal, ProcessError> {
    balance.checked_add(amount).ok_or(ProcessError::Overflow)
}

fn debit(balance: Decimal, amount: Decimal) -> Result<Decimal, ProcessError> {
    balance.checked_sub(amount).ok_or(ProcessError::Overflow)
}

/// Validate `request` against `accounts` and apply it to a copy of the collection
pub fn process(request: &TransactionRequest, accounts: &[Account]) -> Result<Processed, ProcessError> {
    let amount = request.amount;
    if amount <= Decimal::ZERO {
        return Err(ProcessError::InvalidAmount);
    }

    let source = accounts
        .iter()
        .position(|a| a.id == request.source)
        .ok_or(ProcessError::AccountNotFound(request.source))?;

    if request.kind != TransactionKind::Deposit && accounts[source].balance < amount {
        return Err(ProcessError::InsufficientFunds);
    }

    let destination = match request.kind {
        TransactionKind::Transfer => {
            let to = request.destination.ok_or(ProcessError::DestinationNotFound)?;
            if to == request.source {
                return Err(ProcessError::SameAccount);
            }
            let position = accounts
                .iter()
                .position(|a| a.id == to)
                .ok_or(ProcessError::DestinationNotFound)?;
            Some(position)
        }
        _ => None,
    };

    let mut updated = accounts.to_vec();
    let postings = match (request.kind, destination) {
        (TransactionKind::Deposit, _) => {
            updated[source].balance = credit(updated[source].balance, amount)?;
            vec![Posting {
                account: request.source,
                counterparty: None,
                amount,
            }]
        }
        (TransactionKind::Withdrawal, _) => {
            updated[source].balance = debit(updated[source].balance, amount)?;
            vec![Posting {
                account: request.source,
                counterparty: None,
                amount: -amount,
            }]
        }
        (TransactionKind::Transfer, Some(destination)) => {
            let to = updated[destination].id;
            updated[source].balance = debit(updated[source].balance, amount)?;
            updated[destination].balance = credit(updated[destination].balance, amount)?;
            vec![
                Posting {
                    account: request.source,
                    counterparty: Some(to),
                    amount: -amount,
                },
                Posting {
                    account: to,
                    counterparty: Some(request.source),
                    amount,
                },
            ]
        }
        (TransactionKind::Transfer, None) => return Err(ProcessError::DestinationNotFound),
    };

    debug!(kind = %request.kind, %amount, source = %request.source, "Processed transaction");

    Ok(Processed {
        accounts: updated,
        postings,
    })
}
