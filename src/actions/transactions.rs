//! Create, update, delete and receipt download for transactions.
//!
//! `TransactionActions` is the single entry point the presentation layer
//! uses to change transactions. It validates forms before any network I/O,
//! applies the receipt attachment gate, delegates the write to the
//! [`TransactionStore`](crate::store::TransactionStore) (which refreshes
//! afterwards), and resets the modal/edit state once a write succeeds.

use std::path::{Path, PathBuf};

use crate::config;
use crate::error::{Result, TrackerError};
use crate::filter::{Summary, TransactionFilter};
use crate::models::{DownloadedReceipt, Transaction, TransactionForm};
use crate::ExpenseTracker;

// ---------------------------------------------------------------------------
// ModalState
// ---------------------------------------------------------------------------

/// UI-facing state driven by the transaction actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    /// The create/edit modal is open.
    pub modal_open: bool,
    /// Transaction currently targeted by an edit or a pending delete.
    pub editing_id: Option<String>,
    /// The confirm-delete dialog is open.
    pub confirm_open: bool,
}

// ---------------------------------------------------------------------------
// TransactionActions
// ---------------------------------------------------------------------------

pub struct TransactionActions<'a> {
    tracker: &'a ExpenseTracker,
}

impl<'a> TransactionActions<'a> {
    pub fn new(tracker: &'a ExpenseTracker) -> Self {
        Self { tracker }
    }

    // -- Reads -------------------------------------------------------------

    /// Re-fetch the transaction list from the backend.
    pub fn refresh(&self) -> Result<()> {
        self.tracker.store.borrow_mut().refresh(&self.tracker.api)
    }

    /// Snapshot of every transaction in the store.
    pub fn list(&self) -> Vec<Transaction> {
        self.tracker.store.borrow().transactions().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.tracker.store.borrow().get(id).cloned()
    }

    /// Transactions matching `filter`, in store order.
    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter.apply(self.tracker.store.borrow().transactions())
    }

    /// Income/expense totals over the transactions matching `filter`.
    pub fn summary(&self, filter: &TransactionFilter) -> Summary {
        let store = self.tracker.store.borrow();
        Summary::from_transactions(store.transactions().iter().filter(|t| filter.matches(t)))
    }

    // -- Modal state -------------------------------------------------------

    pub fn state(&self) -> ModalState {
        self.tracker.modal.borrow().clone()
    }

    /// Open the modal for a new transaction.
    pub fn open_create(&self) {
        let mut modal = self.tracker.modal.borrow_mut();
        modal.modal_open = true;
        modal.editing_id = None;
    }

    /// Open the modal to edit `id`.
    pub fn begin_edit(&self, id: &str) {
        let mut modal = self.tracker.modal.borrow_mut();
        modal.modal_open = true;
        modal.editing_id = Some(id.to_string());
    }

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&self, id: &str) {
        let mut modal = self.tracker.modal.borrow_mut();
        modal.confirm_open = true;
        modal.editing_id = Some(id.to_string());
    }

    /// Close any open modal or dialog without acting.
    pub fn dismiss(&self) {
        *self.tracker.modal.borrow_mut() = ModalState::default();
    }

    // -- Mutations ---------------------------------------------------------

    /// Create a transaction from `form`.
    ///
    /// Recurring forms without both dates are rejected before any request.
    pub fn create(&self, form: &TransactionForm) -> Result<()> {
        validate(form)?;
        let submission = form.submission();
        self.tracker
            .store
            .borrow_mut()
            .add(&self.tracker.api, &submission)?;
        self.close_modal();
        Ok(())
    }

    /// Update a transaction from `form`.
    ///
    /// The id comes from `id`, else the form's own id, else the current
    /// edit target; if none resolves, nothing is sent.
    pub fn update(&self, id: Option<&str>, form: &TransactionForm) -> Result<()> {
        let id = id
            .map(str::to_string)
            .or_else(|| form.id.clone())
            .or_else(|| self.tracker.modal.borrow().editing_id.clone())
            .ok_or_else(|| {
                tracing::warn!("Update submitted without a transaction id");
                TrackerError::Validation("no transaction id to update".into())
            })?;
        validate(form)?;
        let submission = form.submission();
        self.tracker
            .store
            .borrow_mut()
            .update(&self.tracker.api, &id, &submission)?;
        self.close_modal();
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.tracker
            .store
            .borrow_mut()
            .remove(&self.tracker.api, id)?;
        let mut modal = self.tracker.modal.borrow_mut();
        modal.confirm_open = false;
        modal.editing_id = None;
        Ok(())
    }

    /// Delete the transaction targeted by [`request_delete`](Self::request_delete).
    pub fn confirm_delete(&self) -> Result<()> {
        let id = self
            .tracker
            .modal
            .borrow()
            .editing_id
            .clone()
            .ok_or_else(|| TrackerError::Validation("no transaction pending deletion".into()))?;
        self.delete(&id)
    }

    // -- Receipts ----------------------------------------------------------

    /// Fetch the receipt attached to transaction `id`.
    ///
    /// Tries the transaction's receipt endpoint first, then the receipt
    /// endpoint keyed by the transaction's `receipt_id`. The receipt id is
    /// looked up in the store, so the fallback is only available once
    /// [`refresh`](Self::refresh) has loaded the transaction; use
    /// [`fetch_receipt_with`](Self::fetch_receipt_with) to supply it directly.
    pub fn fetch_receipt(&self, id: &str) -> Result<DownloadedReceipt> {
        let stored = self.get(id);
        if stored.is_none() {
            tracing::debug!(transaction_id = id, "Transaction not in store; no receipt id known");
        }
        let receipt_id = stored.and_then(|t| t.receipt_id);
        self.fetch_receipt_with(id, receipt_id.as_deref())
    }

    /// Like [`fetch_receipt`](Self::fetch_receipt), with the fallback
    /// keyed by an explicit `receipt_id` instead of the stored one.
    pub fn fetch_receipt_with(
        &self,
        id: &str,
        receipt_id: Option<&str>,
    ) -> Result<DownloadedReceipt> {
        let api = &self.tracker.api;
        let primary = format!("{}/{}/receipt", config::EXPENSES_PATH, id);
        let primary_err = match api.download(&primary, id) {
            Ok(receipt) => return Ok(receipt),
            Err(TrackerError::MissingCredential) => return Err(TrackerError::MissingCredential),
            Err(e) => e,
        };
        tracing::warn!(transaction_id = id, "Primary receipt download failed: {primary_err}");

        let Some(receipt_id) = receipt_id else {
            tracing::error!(transaction_id = id, "No receipt id to fall back on");
            return Err(primary_err);
        };
        let fallback = format!("{}/{}", config::RECEIPTS_PATH, receipt_id);
        api.download(&fallback, id).inspect_err(|e| {
            tracing::error!(transaction_id = id, receipt_id, "Receipt download failed: {e}");
        })
    }

    /// Download the receipt for `id` into the configured download directory.
    pub fn download_receipt(&self, id: &str) -> Result<PathBuf> {
        self.download_receipt_to(id, &self.tracker.download_dir)
    }

    /// Download the receipt for `id` into `dir`, returning the saved path.
    pub fn download_receipt_to(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let receipt = self.fetch_receipt(id)?;
        receipt.save_to(dir).inspect_err(|e| {
            tracing::error!(transaction_id = id, "Could not save receipt: {e}");
        })
    }

    fn close_modal(&self) {
        let mut modal = self.tracker.modal.borrow_mut();
        modal.modal_open = false;
        modal.editing_id = None;
    }
}

fn validate(form: &TransactionForm) -> Result<()> {
    form.validate().inspect_err(|e| {
        tracing::warn!("Transaction form rejected: {e}");
    })
}
