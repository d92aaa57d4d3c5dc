//! Category listing for expense forms and the category filter.

use crate::config;
use crate::error::Result;
use crate::models::Category;
use crate::normalize;
use crate::ExpenseTracker;

// ---------------------------------------------------------------------------
// CategoryQuery
// ---------------------------------------------------------------------------

/// Read-only access to the backend's categories. Their lifecycle belongs to
/// the backend; the client only lists them for selection.
pub struct CategoryQuery<'a> {
    tracker: &'a ExpenseTracker,
}

impl<'a> CategoryQuery<'a> {
    pub fn new(tracker: &'a ExpenseTracker) -> Self {
        Self { tracker }
    }

    pub fn list(&self) -> Result<Vec<Category>> {
        self.tracker
            .api
            .get_json(config::CATEGORIES_PATH, &[])
            .map(normalize::normalize_categories)
            .inspect_err(|e| tracing::error!("Failed to list categories: {e}"))
    }

    /// Category names, in backend order, for the category filter.
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.list()?.into_iter().map(|c| c.name).collect())
    }
}
