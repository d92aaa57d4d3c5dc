use std::path::PathBuf;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "EXPENSE_TRACKER_API_URL";

pub const EXPENSES_PATH: &str = "/api/expenses";
pub const INCOME_PATH: &str = "/api/income";
pub const RECEIPTS_PATH: &str = "/api/receipts";
pub const CATEGORIES_PATH: &str = "/api/categories";
pub const AUTH_ME_PATH: &str = "/api/auth/me";
pub const AUTH_REFRESH_PATH: &str = "/api/auth/refreshlogin";
pub const AUTH_SIGNUP_PATH: &str = "/api/auth/signup";
pub const CHANGE_PASSWORD_PATH: &str = "/api/user/change-password";

/// Largest receipt file that is attached to a submission (2 MiB).
pub const MAX_RECEIPT_BYTES: usize = 2 * 1024 * 1024;

/// MIME types accepted for receipt attachments.
pub const RECEIPT_CONTENT_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

/// File extension used for a downloaded receipt of the given content type.
pub fn receipt_extension(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "application/pdf" => "pdf",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        _ => "bin",
    }
}

/// Content type guessed from a file name's extension, for receipts loaded from disk.
pub fn content_type_for_file(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Read the backend base URL from [`API_URL_ENV`], if set and non-empty.
pub fn base_url_from_env() -> Option<String> {
    std::env::var(API_URL_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn default_download_dir() -> PathBuf {
    if let Some(dir) = dirs::download_dir() {
        dir
    } else {
        PathBuf::from(".")
    }
}
