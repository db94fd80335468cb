pub mod account;
pub mod card;
pub mod client;
pub mod clock;
pub mod constants;
pub mod dashboard;
pub mod ledger;
pub mod processor;
pub mod storage;
pub mod transaction;
pub mod types;

use std::sync::Arc;

#[cfg(not(tarpaulin_include))]
pub fn get_client(base_url: &str, store: Arc<dyn storage::KeyValueStore>) -> anyhow::Result<client::DemoBankClient> {
    client::DemoBankClient::new(base_url, store)
}

#[cfg(not(tarpaulin_include))]
pub fn get_ledger(store: Arc<dyn storage::KeyValueStore>) -> ledger::Ledger {
    ledger::Ledger::new(store)
}
