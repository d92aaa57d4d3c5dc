use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config;
use crate::error::Result;

// ---------------------------------------------------------------------------
// DownloadedReceipt: A receipt document fetched from the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedReceipt {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DownloadedReceipt {
    /// Build a receipt from a response's headers and body.
    ///
    /// The file name comes from `Content-Disposition` when it carries one,
    /// otherwise `receipt-{transaction_id}.{ext}` with the extension taken
    /// from the content type.
    pub fn from_response_parts(
        transaction_id: &str,
        content_disposition: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        let content_type = content_type
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = content_disposition
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| default_file_name(transaction_id, &content_type));
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Write the receipt into `dir`, returning the path actually written.
    ///
    /// Writes to a temp file in the same directory first and links it into
    /// place on success, so a failed write never leaves a partial file
    /// behind. An existing file is never replaced: when the name is taken
    /// the receipt is saved as `name (1).ext`, `name (2).ext` and so on.
    pub fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.flush()?;

        for attempt in 0..=MAX_NAME_SUFFIX {
            let dest = dir.join(numbered_file_name(&self.file_name, attempt));
            match tmp.persist_noclobber(&dest) {
                Ok(_) => {
                    if attempt > 0 {
                        tracing::info!(
                            file_name = %self.file_name,
                            saved_as = %dest.display(),
                            "Receipt name already taken"
                        );
                    }
                    return Ok(dest);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                Err(e) => return Err(e.error.into()),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for {} in {}", self.file_name, dir.display()),
        )
        .into())
    }
}

/// Highest ` (n)` suffix tried before giving up on a free name.
const MAX_NAME_SUFFIX: u32 = 999;

/// `invoice.pdf` with `n = 2` becomes `invoice (2).pdf`; `n = 0` is the name
/// itself. Dot files like `.receipt` have no extension.
fn numbered_file_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{name} ({n})"),
    }
}

fn default_file_name(transaction_id: &str, content_type: &str) -> String {
    let safe_id: String = transaction_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("receipt-{}.{}", safe_id, config::receipt_extension(content_type))
}

/// Extract a file name from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*` form over plain `filename`. Quoted
/// values may contain `;` and backslash escapes. Any path components are
/// stripped so the name cannot escape the target directory.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = unquote(value.trim());
        if key == "filename*" {
            // charset'language'percent-encoded
            let encoded = value.splitn(3, '\'').last().unwrap_or(&value);
            let decoded = urlencoding::decode_binary(encoded.as_bytes());
            extended = Some(String::from_utf8_lossy(&decoded).into_owned());
        } else if key == "filename" {
            plain = Some(value);
        }
    }

    extended
        .or(plain)
        .map(|name| sanitize_file_name(&name))
        .filter(|name| !name.is_empty())
}

/// Split header parameters on `;`, ignoring separators inside quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(header[start..].trim());
    params
}

/// Strip surrounding quotes and resolve `\x` escapes in a quoted string.
/// Unquoted tokens are returned as-is.
fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    match base.trim() {
        "." | ".." => String::new(),
        other => other.to_string(),
    }
}
