//! Async wrapper around [`ExpenseTracker`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every operation on Tokio's blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! requests are in flight. Operations are serialized by a mutex, so the
//! store still has exactly one writer at a time.
//!
//! # Example
//!
//! ```no_run
//! use expense_tracker_sdk::{AsyncExpenseTracker, TransactionFilter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = AsyncExpenseTracker::builder()
//!         .base_url("http://localhost:8080")
//!         .credential("session-token")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     tracker.refresh().await.unwrap();
//!     let rent = tracker
//!         .filtered(TransactionFilter::new().search("rent"))
//!         .await
//!         .unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Result, TrackerError};
use crate::filter::TransactionFilter;
use crate::models::{Transaction, TransactionForm};
use crate::ExpenseTracker;

// ---------------------------------------------------------------------------
// AsyncExpenseTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncExpenseTracker`].
#[derive(Default)]
pub struct AsyncExpenseTrackerBuilder {
    base_url: Option<String>,
    credential: Option<String>,
    timeout: Option<Duration>,
    download_dir: Option<PathBuf>,
}

impl AsyncExpenseTrackerBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn credential(mut self, token: &str) -> Self {
        self.credential = Some(token.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn download_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.download_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the async tracker.
    ///
    /// The blocking HTTP client is created on the blocking thread pool, since
    /// it must not be constructed inside the async event loop.
    pub async fn build(self) -> Result<AsyncExpenseTracker> {
        tokio::task::spawn_blocking(move || {
            let mut builder = ExpenseTracker::builder();
            if let Some(url) = self.base_url {
                builder = builder.base_url(&url);
            }
            if let Some(token) = self.credential {
                builder = builder.credential(&token);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(dir) = self.download_dir {
                builder = builder.download_dir(dir);
            }
            let tracker = builder.build()?;
            Ok(AsyncExpenseTracker {
                inner: Arc::new(Mutex::new(tracker)),
            })
        })
        .await
        .map_err(|e| TrackerError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncExpenseTracker
// ---------------------------------------------------------------------------

/// Async wrapper around [`ExpenseTracker`].
///
/// The tracker is protected by a [`Mutex`] since it uses `RefCell`
/// internally. Use [`run()`](Self::run) for anything without a convenience
/// method.
#[derive(Clone)]
pub struct AsyncExpenseTracker {
    inner: Arc<Mutex<ExpenseTracker>>,
}

impl AsyncExpenseTracker {
    pub fn builder() -> AsyncExpenseTrackerBuilder {
        AsyncExpenseTrackerBuilder::default()
    }

    /// Run a sync tracker operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ExpenseTracker) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tracker = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = tracker
                .lock()
                .map_err(|_| TrackerError::InvalidArgument("tracker lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TrackerError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn refresh(&self) -> Result<()> {
        self.run(|t| t.transactions().refresh()).await
    }

    pub async fn list(&self) -> Result<Vec<Transaction>> {
        self.run(|t| Ok(t.transactions().list())).await
    }

    pub async fn filtered(&self, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        self.run(move |t| Ok(t.transactions().filtered(&filter))).await
    }

    pub async fn create(&self, form: TransactionForm) -> Result<()> {
        self.run(move |t| t.transactions().create(&form)).await
    }

    pub async fn update(&self, id: Option<String>, form: TransactionForm) -> Result<()> {
        self.run(move |t| t.transactions().update(id.as_deref(), &form))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.run(move |t| t.transactions().delete(&id)).await
    }

    /// Download a receipt into the configured download directory.
    pub async fn download_receipt(&self, id: &str) -> Result<PathBuf> {
        let id = id.to_string();
        self.run(move |t| t.transactions().download_receipt(&id))
            .await
    }

    /// Release the tracker on the blocking pool, where its HTTP client can
    /// shut down safely.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || drop(self.inner))
            .await
            .map_err(|e| TrackerError::InvalidArgument(format!("Task join error: {e}")))
    }
}
