//! Monthly budget summary fetched from the period endpoints.

use chrono::{NaiveDate, NaiveTime, SecondsFormat};

use crate::config;
use crate::error::{Result, TrackerError};
use crate::filter::Summary;
use crate::models::{Transaction, TransactionType};
use crate::normalize;
use crate::ExpenseTracker;

// ---------------------------------------------------------------------------
// MonthlySummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub expenses: Vec<Transaction>,
    pub income: Vec<Transaction>,
    pub totals: Summary,
}

impl MonthlySummary {
    pub fn remaining_balance(&self) -> f64 {
        self.totals.remaining_balance()
    }

    pub fn is_over_budget(&self) -> bool {
        self.totals.is_over_budget()
    }
}

// ---------------------------------------------------------------------------
// SummaryQuery
// ---------------------------------------------------------------------------

pub struct SummaryQuery<'a> {
    tracker: &'a ExpenseTracker,
}

impl<'a> SummaryQuery<'a> {
    pub fn new(tracker: &'a ExpenseTracker) -> Self {
        Self { tracker }
    }

    /// Expenses and income for calendar month `month` (1-12) of `year`.
    ///
    /// Items from the expense endpoint count as expenses and items from the
    /// income endpoint as income, whatever their own `type` field says.
    pub fn monthly(&self, year: i32, month: u32) -> Result<MonthlySummary> {
        let (start, end) = month_bounds(year, month)?;
        let query = [("start", start), ("end", end)];

        let expenses = self.fetch(config::EXPENSES_PATH, &query, TransactionType::Expense)?;
        let income = self.fetch(config::INCOME_PATH, &query, TransactionType::Income)?;
        let totals = Summary::from_transactions(expenses.iter().chain(income.iter()));
        if totals.is_over_budget() {
            tracing::info!(
                year,
                month,
                over_by = totals.over_budget_by(),
                "Monthly budget exceeded"
            );
        }

        Ok(MonthlySummary {
            year,
            month,
            expenses,
            income,
            totals,
        })
    }

    fn fetch(
        &self,
        path: &str,
        query: &[(&str, String)],
        kind: TransactionType,
    ) -> Result<Vec<Transaction>> {
        let data = self
            .tracker
            .api
            .get_json(path, query)
            .inspect_err(|e| tracing::error!("Failed to fetch {path}: {e}"))?;
        let mut list = normalize::normalize_transactions(data);
        for tx in &mut list {
            tx.transaction_type = kind;
        }
        Ok(list)
    }
}

/// RFC 3339 instants (UTC, millisecond precision) for the first moment of
/// the month and of the following month.
pub fn month_bounds(year: i32, month: u32) -> Result<(String, String)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TrackerError::InvalidArgument(format!("invalid month {year}-{month}")))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| TrackerError::InvalidArgument(format!("invalid month {year}-{month}")))?;
    let instant = |d: NaiveDate| {
        d.and_time(NaiveTime::default())
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    };
    Ok((instant(start), instant(end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, "2024-12-01T00:00:00.000Z");
        assert_eq!(end, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn month_bounds_reject_invalid_month() {
        assert!(matches!(
            month_bounds(2024, 13),
            Err(TrackerError::InvalidArgument(_))
        ));
        assert!(month_bounds(2024, 0).is_err());
    }
}
