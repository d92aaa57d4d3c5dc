//! Filtered views and budget aggregates over a transaction list.

use chrono::NaiveDate;

use crate::models::{RecurrenceType, Transaction, TransactionType};

// ---------------------------------------------------------------------------
// TransactionFilter
// ---------------------------------------------------------------------------

/// Criteria for narrowing a transaction list.
///
/// Every set criterion must hold for a transaction to be kept; unset
/// criteria do not constrain anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive substring of the name or the category.
    pub search_term: Option<String>,
    /// Inclusive lower bound on the transaction date.
    pub date_start: Option<NaiveDate>,
    /// Inclusive upper bound on the transaction date.
    pub date_end: Option<NaiveDate>,
    /// Exact category label.
    pub category: Option<String>,
    pub recurrence: Option<RecurrenceType>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search_term = Some(term.to_string());
        self
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_start = start;
        self.date_end = end;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn recurrence(mut self, recurrence: RecurrenceType) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_search(tx)
            && self.matches_category(tx)
            && self.matches_date(tx)
            && self.matches_recurrence(tx)
    }

    /// Keep the matching transactions, preserving order.
    pub fn apply<'a, I>(&self, transactions: I) -> Vec<Transaction>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect()
    }

    fn matches_search(&self, tx: &Transaction) -> bool {
        let term = match self.search_term.as_deref() {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return true,
        };
        tx.name.to_lowercase().contains(&term)
            || tx
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&term))
    }

    fn matches_category(&self, tx: &Transaction) -> bool {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => tx.category.as_deref() == Some(c),
            _ => true,
        }
    }

    fn matches_date(&self, tx: &Transaction) -> bool {
        if self.date_start.is_none() && self.date_end.is_none() {
            return true;
        }
        let Some(date) = parse_date(&tx.date) else {
            return false;
        };
        self.date_start.map_or(true, |start| date >= start)
            && self.date_end.map_or(true, |end| date <= end)
    }

    fn matches_recurrence(&self, tx: &Transaction) -> bool {
        match self.recurrence {
            Some(RecurrenceType::Recurring) => tx.is_recurrent,
            Some(RecurrenceType::OneTime) => !tx.is_recurrent,
            None => true,
        }
    }
}

/// Parse the calendar date of an ISO date or date-time string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Income and expense totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub income: f64,
    pub expenses: f64,
}

impl Summary {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .fold(Summary::default(), |mut acc, tx| {
                match tx.transaction_type {
                    TransactionType::Income => acc.income += tx.amount,
                    TransactionType::Expense => acc.expenses += tx.amount,
                }
                acc
            })
    }

    /// Totals over the transactions dated within `[start, end]`.
    pub fn for_period<'a, I>(transactions: I, start: NaiveDate, end: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let period = TransactionFilter::new().between(Some(start), Some(end));
        Self::from_transactions(transactions.into_iter().filter(|tx| period.matches(tx)))
    }

    pub fn remaining_balance(&self) -> f64 {
        self.income - self.expenses
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_balance() < 0.0
    }

    /// How far spending exceeds income, or zero when within budget.
    pub fn over_budget_by(&self) -> f64 {
        (-self.remaining_balance()).max(0.0)
    }
}
