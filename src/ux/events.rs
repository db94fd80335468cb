use futures_util::{pin_mut, Stream, StreamExt};
use tracing::debug;

use demobank_api::ledger::LedgerEvent;

use super::render::{accounts_table, event_line};

/// Print ledger notifications until the stream ends
pub async fn render_events(events: impl Stream<Item = LedgerEvent>) {
    pin_mut!(events);
    while let Some(event) = events.next().await {
        match &event {
            LedgerEvent::AccountsChanged { partition, accounts } => {
                debug!(%partition, "Accounts changed");
                println!("{}", accounts_table(accounts));
            }
            other => {
                if let Some(line) = event_line(other) {
                    println!("{}", line);
                }
            }
        }
    }
}
