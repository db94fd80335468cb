use std::fmt::Write;

use demobank_api::{
    account::Account,
    card::Card,
    client::models::RemoteTransaction,
    dashboard::{format_amount, Dashboard, HistoryLine},
    ledger::{Discrepancy, LedgerEvent, Partition},
};

pub fn accounts_table(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts".to_string();
    }
    let mut out = format!("{:<6} {:<12} {:<10} {:>16}  {}", "ID", "TYPE", "NUMBER", "BALANCE", "CARD");
    for account in accounts {
        let card = account.card_id.map(|id| format!("#{}", id)).unwrap_or_default();
        let _ = write!(
            out,
            "\n{:<6} {:<12} {:<10} {:>16}  {}",
            format!("#{}", account.id),
            account.kind.as_str(),
            account.number,
            format_amount(account.balance),
            card
        );
    }
    out
}

pub fn cards_table(cards: &[Card], active: Partition) -> String {
    if cards.is_empty() {
        return "No cards".to_string();
    }
    let mut out = format!("  {:<4} {:<20} {:<6} {:<20} {}", "ID", "NUMBER", "EXPIRY", "BANK", "STYLE");
    for card in cards {
        let marker = if active == Partition::Card(card.id) { '*' } else { ' ' };
        let _ = write!(
            out,
            "\n{} {:<4} {:<20} {:<6} {:<20} {:?}",
            marker, card.id, card.number, card.expiry, card.bank, card.style
        );
    }
    out
}

pub fn history_table(lines: &[HistoryLine]) -> String {
    if lines.is_empty() {
        return "No transactions".to_string();
    }
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let date = line.date.map(|d| d.to_string()).unwrap_or_else(|| "-".repeat(10));
        let _ = write!(out, "{}  {:<24} {:>14}", date, line.label, line.formatted_amount);
        if let Some(description) = line.description.as_deref().filter(|d| *d != line.label) {
            let _ = write!(out, "  {}", description);
        }
    }
    out
}

pub fn dashboard_view(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    if let Some(user) = &dashboard.user {
        let _ = writeln!(out, "Hello {} 👋", user);
    }
    let _ = writeln!(
        out,
        "Total balance: {} across {} account(s), {} card(s)",
        format_amount(dashboard.total_balance),
        dashboard.accounts.len(),
        dashboard.card_count
    );
    let _ = writeln!(out, "\n{}", accounts_table(&dashboard.accounts));
    let _ = write!(out, "\nRecent transactions\n{}", history_table(&dashboard.recent));
    out
}

pub fn discrepancies_table(discrepancies: &[Discrepancy]) -> String {
    let mut out = format!("{:<6} {:>16} {:>16}", "ID", "STORED", "FROM LOG");
    for d in discrepancies {
        let _ = write!(
            out,
            "\n{:<6} {:>16} {:>16}",
            format!("#{}", d.account),
            format_amount(d.balance),
            format_amount(d.derived)
        );
    }
    out
}

pub fn remote_transaction_line(transaction: &RemoteTransaction) -> String {
    let mut out = format!("{} of {}", transaction.kind, format_amount(transaction.amount));
    if let Some(from) = transaction.from_account_id {
        let _ = write!(out, " from #{}", from);
    }
    if let Some(to) = transaction.to_account_id {
        let _ = write!(out, " to #{}", to);
    }
    out
}

/// One line describing `event`, `None` for events rendered as tables
pub fn event_line(event: &LedgerEvent) -> Option<String> {
    match event {
        LedgerEvent::AccountsChanged { .. } => None,
        LedgerEvent::TransactionRecorded(record) => Some(format!(
            "{}  #{:<4} {:<32} {:>14}",
            record.date,
            record.account_id,
            record.description,
            format_amount(record.amount)
        )),
        LedgerEvent::CardAdded(card) => Some(format!("Card #{} {} added", card.id, card.number)),
        LedgerEvent::CardRemoved(id) => Some(format!("Card #{} removed", id)),
        LedgerEvent::PartitionSelected(partition) => Some(format!("Now using the {} accounts", partition)),
        LedgerEvent::Cleared => Some("Local data cleared".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use demobank_api::{
        account::AccountKind,
        dashboard::Direction,
        transaction::{TransactionKind, TransactionRecord},
        types::{AccountId, CardId, TransactionId},
    };
    use rust_decimal_macros::dec;

    #[test]
    fn accounts_table_lists_every_account() {
        let accounts = vec![
            Account::new(AccountId::from(1), AccountKind::Checking, dec!(1234.5), None),
            Account::new(AccountId::from(2), AccountKind::Savings, dec!(0), Some(CardId::from(3))),
        ];
        let table = accounts_table(&accounts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("#1"));
        assert!(lines[1].contains("+$1,234.50"));
        assert!(lines[2].ends_with("#3"));
        assert_eq!(accounts_table(&[]), "No accounts");
    }

    #[test]
    fn history_skips_description_equal_to_label() {
        let line = |label: &str, description: &str| HistoryLine {
            id: TransactionId::from(1),
            date: NaiveDate::from_ymd_opt(2024, 2, 3),
            direction: Direction::Outgoing,
            label: label.to_string(),
            description: Some(description.to_string()),
            amount: dec!(-30),
            formatted_amount: "-$30.00".to_string(),
        };
        let table = history_table(&[line("Withdrawal", "Withdrawal"), line("Transfer to #2", "rent")]);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("2024-02-03"));
        assert!(lines[0].trim_end().ends_with("-$30.00"));
        assert!(lines[1].ends_with("rent"));
    }

    #[test]
    fn event_lines() {
        let record = TransactionRecord {
            id: TransactionId::from(5),
            kind: TransactionKind::Deposit,
            description: "Deposit".to_string(),
            amount: dec!(50),
            date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            account_id: AccountId::from(1),
            counterparty: None,
        };
        let line = event_line(&LedgerEvent::TransactionRecorded(record)).unwrap();
        assert!(line.contains("+$50.00"));
        assert_eq!(
            event_line(&LedgerEvent::PartitionSelected(Partition::Card(CardId::from(2)))).as_deref(),
            Some("Now using the card #2 accounts")
        );
        assert_eq!(
            event_line(&LedgerEvent::AccountsChanged {
                partition: Partition::Default,
                accounts: vec![],
            }),
            None
        );
    }
}
