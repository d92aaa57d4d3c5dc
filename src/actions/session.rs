//! Session probing, refresh, sign-up and password change.

use crate::api;
use crate::config;
use crate::error::{Result, TrackerError};
use crate::models::{ChangePasswordRequest, SessionStatus, SignUpRequest};
use crate::ExpenseTracker;

// ---------------------------------------------------------------------------
// SessionActions
// ---------------------------------------------------------------------------

pub struct SessionActions<'a> {
    tracker: &'a ExpenseTracker,
}

impl<'a> SessionActions<'a> {
    pub fn new(tracker: &'a ExpenseTracker) -> Self {
        Self { tracker }
    }

    /// Ask the backend whether the current session is still valid.
    ///
    /// Any non-success status counts as expired.
    pub fn me(&self) -> Result<SessionStatus> {
        let status = self.tracker.api.probe(config::AUTH_ME_PATH)?;
        if status.is_success() {
            Ok(SessionStatus::Valid)
        } else {
            tracing::info!(status = status.as_u16(), "Session expired");
            Ok(SessionStatus::Expired)
        }
    }

    /// Refresh the session using the session cookie.
    ///
    /// Returns `false` when the backend refuses, in which case the user has
    /// to log in again.
    pub fn refresh_login(&self) -> Result<bool> {
        let status = self
            .tracker
            .api
            .post_empty(config::AUTH_REFRESH_PATH)
            .inspect_err(|e| tracing::error!("Session refresh failed: {e}"))?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Session refresh refused");
        }
        Ok(status.is_success())
    }

    /// Create an account. Succeeds only on HTTP 201.
    ///
    /// The password confirmation is checked locally; a mismatch sends nothing.
    pub fn sign_up(&self, email: &str, password: &str, confirm_password: &str) -> Result<()> {
        if password != confirm_password {
            return Err(TrackerError::Validation("passwords do not match".into()));
        }
        let body = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let (status, value) = self
            .tracker
            .api
            .post_json(config::AUTH_SIGNUP_PATH, &body, false)?;
        if status.as_u16() == 201 {
            return Ok(());
        }
        let message = api::error_message(&value).unwrap_or_else(|| "unknown error".into());
        tracing::warn!(status = status.as_u16(), "Sign-up rejected: {message}");
        Err(TrackerError::Status {
            status: status.as_u16(),
            body: message,
        })
    }

    /// Change the current user's password.
    pub fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let body = ChangePasswordRequest {
            old_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let client = &self.tracker.api;
        let (status, value) =
            client.post_json(config::CHANGE_PASSWORD_PATH, &body, client.has_credential())?;
        if status.is_success() {
            return Ok(());
        }
        let message = api::error_message(&value)
            .unwrap_or_else(|| format!("password change failed ({})", status.as_u16()));
        tracing::error!("Password change rejected: {message}");
        Err(TrackerError::Status {
            status: status.as_u16(),
            body: message,
        })
    }
}
