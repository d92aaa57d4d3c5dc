//! The authoritative in-memory transaction list.
//!
//! The list is only ever replaced wholesale by [`TransactionStore::refresh`];
//! mutations go to the backend first and are followed by a refresh, so the
//! local view never diverges from the server after a completed write.

use reqwest::Method;

use crate::api::ApiClient;
use crate::config;
use crate::error::{Result, TrackerError};
use crate::models::{Submission, Transaction};
use crate::normalize;

#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of the list.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Re-fetch and normalize the full collection, then swap it in.
    ///
    /// On any failure the previous list is kept and the error is logged.
    pub fn refresh(&mut self, api: &ApiClient) -> Result<()> {
        let fetched = api
            .get_json(config::EXPENSES_PATH, &[])
            .map(normalize::normalize_transactions);
        match fetched {
            Ok(list) => {
                tracing::debug!(count = list.len(), "Transaction list refreshed");
                self.transactions = list;
                Ok(())
            }
            Err(TrackerError::MissingCredential) => Err(TrackerError::MissingCredential),
            Err(e) => {
                tracing::error!("Failed to refresh transactions: {e}");
                Err(e)
            }
        }
    }

    pub fn add(&mut self, api: &ApiClient, submission: &Submission) -> Result<()> {
        self.mutate(api, "create", |api| {
            api.send_multipart(Method::POST, config::EXPENSES_PATH, submission)
        })
    }

    pub fn update(&mut self, api: &ApiClient, id: &str, submission: &Submission) -> Result<()> {
        let path = format!("{}/{}", config::EXPENSES_PATH, id);
        self.mutate(api, "update", |api| {
            api.send_multipart(Method::PUT, &path, submission)
        })
    }

    pub fn remove(&mut self, api: &ApiClient, id: &str) -> Result<()> {
        let path = format!("{}/{}", config::EXPENSES_PATH, id);
        self.mutate(api, "delete", |api| api.delete(&path))
    }

    /// Run a network mutation, then refresh on success.
    fn mutate<F>(&mut self, api: &ApiClient, action: &str, op: F) -> Result<()>
    where
        F: FnOnce(&ApiClient) -> Result<()>,
    {
        match op(api) {
            Ok(()) => {}
            Err(TrackerError::MissingCredential) => return Err(TrackerError::MissingCredential),
            Err(e) => {
                tracing::error!("Transaction {action} failed: {e}");
                return Err(e);
            }
        }
        self.refresh(api)
    }
}
