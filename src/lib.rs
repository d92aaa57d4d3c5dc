//! Expense tracker SDK for Rust.
//!
//! Client-side data layer for the expense tracker backend. Transactions are
//! fetched over REST, normalized into one canonical shape, kept in an
//! in-memory store that is re-read after every write, and exposed through
//! filtered views and budget summaries ready for rendering.
//!
//! # Quick start
//!
//! ```no_run
//! use expense_tracker_sdk::{ExpenseTracker, TransactionFilter, TransactionForm};
//!
//! let tracker = ExpenseTracker::builder()
//!     .base_url("http://localhost:8080")
//!     .credential("session-token")
//!     .build()
//!     .unwrap();
//!
//! let actions = tracker.transactions();
//! actions.refresh().unwrap();
//! actions
//!     .create(&TransactionForm::new("Coffee", 3.5, "2024-02-01").category("4"))
//!     .unwrap();
//!
//! let food = actions.filtered(&TransactionFilter::new().search("coffee"));
//! ```

pub mod actions;
pub mod api;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod store;

pub use actions::{ModalState, MonthlySummary};
pub use api::{ApiClient, Credential};
#[cfg(feature = "async")]
pub use async_client::AsyncExpenseTracker;
pub use error::{Result, TrackerError};
pub use filter::{Summary, TransactionFilter};
pub use models::{
    Category, DownloadedReceipt, ReceiptFile, RecurrenceType, SessionStatus, Transaction,
    TransactionForm, TransactionType,
};
pub use store::TransactionStore;

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ExpenseTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`ExpenseTracker`].
///
/// Use [`ExpenseTracker::builder()`] to obtain one.
#[derive(Default)]
pub struct ExpenseTrackerBuilder {
    base_url: Option<String>,
    credential: Option<Credential>,
    timeout: Option<Duration>,
    download_dir: Option<PathBuf>,
}

impl ExpenseTrackerBuilder {
    /// Set the backend base URL.
    ///
    /// If not set, [`config::API_URL_ENV`] is read at build time.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Set the session credential used by every authenticated call.
    ///
    /// A blank token is treated as no credential, so authenticated calls
    /// are skipped rather than sent.
    pub fn credential(mut self, token: &str) -> Self {
        self.credential = Credential::new(token);
        self
    }

    /// Bound every request by `timeout`. By default requests wait for as
    /// long as the backend takes.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Directory receipts are saved into.
    ///
    /// Defaults to the platform download directory (e.g. `~/Downloads`),
    /// falling back to the current directory.
    pub fn download_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.download_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the tracker. The transaction store starts empty; call
    /// [`TransactionActions::refresh`](actions::TransactionActions::refresh)
    /// to load it.
    pub fn build(self) -> Result<ExpenseTracker> {
        let base_url = self
            .base_url
            .or_else(config::base_url_from_env)
            .ok_or_else(|| {
                TrackerError::InvalidArgument(format!(
                    "no backend URL configured (set it on the builder or in {})",
                    config::API_URL_ENV
                ))
            })?;
        let api = ApiClient::new(&base_url, self.credential, self.timeout)?;
        Ok(ExpenseTracker {
            api,
            store: RefCell::new(TransactionStore::new()),
            modal: RefCell::new(ModalState::default()),
            download_dir: self
                .download_dir
                .unwrap_or_else(config::default_download_dir),
        })
    }
}

// ---------------------------------------------------------------------------
// ExpenseTracker
// ---------------------------------------------------------------------------

/// The main entry point of the SDK.
///
/// Owns the HTTP client, the transaction store and the modal state, and
/// hands out lightweight borrowing wrappers for each area. All store
/// mutation goes through those wrappers, one operation at a time.
pub struct ExpenseTracker {
    pub(crate) api: ApiClient,
    pub(crate) store: RefCell<TransactionStore>,
    pub(crate) modal: RefCell<ModalState>,
    pub(crate) download_dir: PathBuf,
}

impl ExpenseTracker {
    pub fn builder() -> ExpenseTrackerBuilder {
        ExpenseTrackerBuilder::default()
    }

    /// Transaction reads, filtering, CRUD actions and receipt downloads.
    pub fn transactions(&self) -> actions::TransactionActions<'_> {
        actions::TransactionActions::new(self)
    }

    pub fn categories(&self) -> actions::CategoryQuery<'_> {
        actions::CategoryQuery::new(self)
    }

    /// Session probe, refresh, sign-up and password change.
    pub fn session(&self) -> actions::SessionActions<'_> {
        actions::SessionActions::new(self)
    }

    /// Monthly budget summaries.
    pub fn summary(&self) -> actions::SummaryQuery<'_> {
        actions::SummaryQuery::new(self)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

impl fmt::Display for ExpenseTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExpenseTracker(base_url={}, transactions={}, authenticated={})",
            self.api.base_url,
            self.store.borrow().len(),
            self.api.has_credential()
        )
    }
}
