use std::fs;
use std::path::Path;

use reqwest::blocking::multipart;

use crate::config;
use crate::error::{Result, TrackerError};
use crate::models::transaction::RecurrenceType;

// ---------------------------------------------------------------------------
// ReceiptFile: A document the user wants attached to a transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Load a receipt from disk, guessing the content type from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TrackerError::InvalidArgument(format!("Not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = fs::read(path)?;
        let content_type = config::content_type_for_file(&file_name).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Whether this file passes the client-side receipt gate: an allowed
    /// MIME type and at most [`config::MAX_RECEIPT_BYTES`].
    pub fn is_attachable(&self) -> bool {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        config::RECEIPT_CONTENT_TYPES.contains(&essence.as_str())
            && self.size() <= config::MAX_RECEIPT_BYTES
    }
}

// ---------------------------------------------------------------------------
// TransactionForm: User input for create/update
// ---------------------------------------------------------------------------

/// Form input for creating or updating a transaction.
///
/// `id` plays the role of the id carried on an edit form; it is only
/// consulted by updates.
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub id: Option<String>,
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub recurrence: RecurrenceType,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub receipt: Option<ReceiptFile>,
}

impl TransactionForm {
    pub fn new(description: &str, amount: f64, date: &str) -> Self {
        Self {
            description: description.to_string(),
            amount,
            date: date.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn category(mut self, category_id: &str) -> Self {
        self.category_id = Some(category_id.to_string());
        self
    }

    pub fn recurrence(mut self, recurrence: RecurrenceType) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Mark the form as recurring over `[start_date, end_date]`.
    pub fn recurring(mut self, start_date: &str, end_date: &str) -> Self {
        self.recurrence = RecurrenceType::Recurring;
        self.start_date = Some(start_date.to_string());
        self.end_date = Some(end_date.to_string());
        self
    }

    pub fn receipt(mut self, receipt: ReceiptFile) -> Self {
        self.receipt = Some(receipt);
        self
    }

    /// Reject recurring forms without both a start and an end date.
    pub fn validate(&self) -> Result<()> {
        if self.recurrence == RecurrenceType::Recurring {
            let present = |d: &Option<String>| d.as_deref().is_some_and(|s| !s.trim().is_empty());
            if !present(&self.start_date) || !present(&self.end_date) {
                return Err(TrackerError::Validation(
                    "recurring transactions need both a start date and an end date".into(),
                ));
            }
        }
        Ok(())
    }

    /// Build the submission body, dropping a receipt that fails the gate.
    pub fn submission(&self) -> Submission {
        let mut fields = vec![
            ("description", self.description.clone()),
            ("amount", self.amount.to_string()),
            ("date", self.date.clone()),
            ("type", self.recurrence.as_str().to_string()),
        ];
        if let Some(category_id) = &self.category_id {
            fields.push(("categoryId", category_id.clone()));
        }
        if self.recurrence == RecurrenceType::Recurring {
            if let Some(start) = &self.start_date {
                fields.push(("startDate", start.clone()));
            }
            if let Some(end) = &self.end_date {
                fields.push(("endDate", end.clone()));
            }
        }

        let receipt = match &self.receipt {
            Some(file) if file.is_attachable() => Some(file.clone()),
            Some(file) => {
                tracing::warn!(
                    file_name = %file.file_name,
                    content_type = %file.content_type,
                    size = file.size(),
                    "Receipt rejected by the attachment gate; saving without it"
                );
                None
            }
            None => None,
        };

        Submission { fields, receipt }
    }
}

// ---------------------------------------------------------------------------
// Submission: The multipart body actually sent to the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Submission {
    pub fields: Vec<(&'static str, String)>,
    pub receipt: Option<ReceiptFile>,
}

impl Submission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Build a fresh multipart form. Called once per request since
    /// multipart bodies are consumed on send.
    pub fn to_multipart(&self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(*name, value.clone());
        }
        if let Some(file) = &self.receipt {
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)?;
            form = form.part("receipt", part);
        }
        Ok(form)
    }
}
