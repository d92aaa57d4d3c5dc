use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category: Expense classification, referenced by id from forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}
