use rust_decimal::Decimal;
use serde::Serialize;
use veex_core::period::within;
use veex_core::{EntryKind, LedgerEntry, YearMonth};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

pub fn summarize(entries: &[LedgerEntry], period: Option<YearMonth>) -> LedgerSummary {
    let (income, expenses) = entries
        .iter()
        .filter(|entry| within(period, entry.date))
        .fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), entry| match entry.kind {
                EntryKind::Income => (income.saturating_add(entry.amount), expenses),
                EntryKind::Expense => (income, expenses.saturating_add(entry.amount)),
            },
        );

    LedgerSummary {
        income,
        expenses,
        balance: income.saturating_sub(expenses),
    }
}

/// Balance across the whole ledger.
pub fn balance(entries: &[LedgerEntry]) -> Decimal {
    summarize(entries, None).balance
}

/// Entries within `period`, newest first.
pub fn entries_in_period(entries: &[LedgerEntry], period: Option<YearMonth>) -> Vec<&LedgerEntry> {
    let mut matching: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|entry| within(period, entry.date))
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));
    matching
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn entry(id: &str, month: u32, kind: EntryKind, amount: i64) -> LedgerEntry {
        LedgerEntry {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, month, 15).unwrap(),
            description: id.to_string(),
            kind,
            amount: Decimal::from(amount),
        }
    }

    fn ledger() -> Vec<LedgerEntry> {
        vec![
            entry("venda", 3, EntryKind::Income, 2000),
            entry("aluguel", 3, EntryKind::Expense, 800),
            entry("couro", 2, EntryKind::Expense, 500),
        ]
    }

    #[test]
    fn summarizes_one_month() {
        let march = YearMonth::new(2026, 3).unwrap();
        let summary = summarize(&ledger(), Some(march));

        assert_eq!(summary.income, Decimal::from(2000));
        assert_eq!(summary.expenses, Decimal::from(800));
        assert_eq!(summary.balance, Decimal::from(1200));
    }

    #[test]
    fn balance_spans_every_month() {
        assert_eq!(balance(&ledger()), Decimal::from(700));
        assert_eq!(balance(&[]), Decimal::ZERO);
    }

    #[test]
    fn lists_period_entries_newest_first() {
        let all = ledger();
        let listed = entries_in_period(&all, None);
        assert_eq!(listed.first().map(|entry| entry.id.as_str()), Some("venda"));
        assert_eq!(listed.last().map(|entry| entry.id.as_str()), Some("couro"));

        let february = YearMonth::new(2026, 2).unwrap();
        assert_eq!(entries_in_period(&all, Some(february)).len(), 1);
    }
}
