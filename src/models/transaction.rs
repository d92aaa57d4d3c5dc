use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TransactionType: Income or expense; the sign of an amount
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction: Canonical client-side record
// ---------------------------------------------------------------------------

/// A single income or expense record as seen by the client.
///
/// Built from backend JSON by [`normalize_transaction`](crate::normalize::normalize_transaction);
/// `amount` is always a finite magnitude and the sign lives in `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub is_recurrent: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub receipt_id: Option<String>,
}

impl Transaction {
    /// Amount with the sign implied by the transaction type.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }
}

// ---------------------------------------------------------------------------
// RecurrenceType: One-time vs recurring, shared by forms and filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceType {
    #[default]
    OneTime,
    Recurring,
}

impl RecurrenceType {
    /// Value sent in the multipart `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::OneTime => "one-time",
            RecurrenceType::Recurring => "recurring",
        }
    }
}
