pub mod accounts;
pub mod auth;
pub mod cards;
pub mod config;
pub mod dashboard;
pub mod history;
pub mod reset;
pub mod transactions;
pub mod verify;

use anyhow::Result;
use tracing::warn;

use crate::{ux::events::render_events, AppCtx};
use demobank_api::{
    client::error::ClientError,
    ledger::{self, Ledger, LedgerError},
    processor::ProcessError,
    types::ValueError,
};

/// Run `f` against the local ledger, then print the notifications it emitted
pub(crate) async fn with_ledger<T>(
    ctx: &AppCtx,
    f: impl FnOnce(&mut Ledger) -> ledger::Result<T>,
) -> Result<T> {
    let mut ledger = ctx.ledger();
    let events = ledger.events();
    let result = f(&mut ledger);
    // Dropping the ledger closes the channel so the stream below ends.
    drop(ledger);
    render_events(events).await;
    Ok(result?)
}

/// Turn failures the user can fix by re-entering the command into warnings
pub fn recover(result: Result<()>) -> Result<()> {
    let Err(e) = result else {
        return Ok(());
    };

    if let Some(err) = e.downcast_ref::<LedgerError>() {
        match err {
            LedgerError::Rejected(reason) => warn!("Transaction rejected: {}", reason),
            LedgerError::CardNotFound(id) => {
                warn!("Card #{} not found, run `demobank cards list` to list your cards", id)
            }
            LedgerError::Value(err) => warn!("{}", err),
            LedgerError::Storage(_) => return Err(e),
        }
        return Ok(());
    }
    if let Some(reason) = e.downcast_ref::<ProcessError>() {
        warn!("Transaction rejected: {}", reason);
        return Ok(());
    }
    if let Some(err) = e.downcast_ref::<ValueError>() {
        warn!("{}", err);
        return Ok(());
    }
    if let Some(err) = e.downcast_ref::<ClientError>() {
        match err {
            ClientError::Unauthorized => {
                warn!("Your session expired, please run `demobank login` again")
            }
            ClientError::InvalidCredentials => warn!("Invalid username or password"),
            ClientError::Status(code) => {
                warn!("The server refused the request (status code {})", code)
            }
        }
        return Ok(());
    }
    Err(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};
    use demobank_api::{storage::StorageError, types::CardId};

    #[test]
    fn business_and_session_errors_are_recovered() {
        assert!(recover(Err(LedgerError::Rejected(ProcessError::InsufficientFunds).into())).is_ok());
        assert!(recover(Err(LedgerError::CardNotFound(CardId::from(4)).into())).is_ok());
        assert!(recover(Err(ProcessError::InvalidAmount.into())).is_ok());
        assert!(recover(Err(anyhow!(ClientError::Unauthorized).context("Failed to list accounts"))).is_ok());
        assert!(recover(Err(ClientError::Status(503).into())).is_ok());
    }

    #[test]
    fn other_errors_are_kept() {
        assert!(recover(Err(anyhow!("disk on fire"))).is_err());
        let storage = LedgerError::Storage(StorageError::InvalidKey("../x".to_string()));
        assert!(recover(Err(storage.into())).is_err());
        assert!(recover(Err::<(), _>(ProcessError::SameAccount).context("Transfer failed")).is_ok());
    }
}
