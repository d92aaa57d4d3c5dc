//! Conversion of loosely-shaped backend JSON into canonical records.
//!
//! The backend mixes snake_case and camelCase field names and renames a few
//! fields between endpoints. Every rule for resolving that lives here, so the
//! rest of the crate only ever sees [`Transaction`] and [`Category`].

use serde_json::{Map, Value};

use crate::models::{Category, Transaction, TransactionType};

/// Unwrap a collection response into its items.
///
/// Accepts a bare array or an object with the array under `data`; anything
/// else yields no items.
pub fn collection_items(data: Value) -> Vec<Value> {
    match data {
        Value::Array(arr) => arr,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(arr)) => arr,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Normalize every item of a collection response.
pub fn normalize_transactions(data: Value) -> Vec<Transaction> {
    collection_items(data)
        .iter()
        .map(normalize_transaction)
        .collect()
}

/// Normalize a single backend record into a [`Transaction`].
///
/// Non-object input produces a transaction with every field at its default.
pub fn normalize_transaction(raw: &Value) -> Transaction {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let source = str_field(obj, "source");
    let transaction_type = match str_field(obj, "type").map(|t| t.to_ascii_lowercase()) {
        Some(t) if t == "income" => TransactionType::Income,
        Some(t) if t == "expense" => TransactionType::Expense,
        _ if source.is_some() => TransactionType::Income,
        _ => TransactionType::Expense,
    };

    Transaction {
        id: obj.get("id").map(stringify).unwrap_or_default(),
        name: str_field(obj, "description")
            .or_else(|| str_field(obj, "name"))
            .unwrap_or_default(),
        amount: coerce_amount(obj.get("amount")),
        date: str_field(obj, "expense_date")
            .or_else(|| str_field(obj, "date"))
            .unwrap_or_default(),
        transaction_type,
        is_recurrent: first_present(obj, &["is_recurrent", "isRecurrent"])
            .map(coerce_bool)
            .unwrap_or(false),
        start_date: first_present(obj, &["start_date", "startDate"]).map(stringify),
        end_date: first_present(obj, &["end_date", "endDate"]).map(stringify),
        category: resolve_category(obj),
        source,
        receipt_id: first_present(obj, &["receipt_id", "receiptId"]).map(stringify),
    }
}

/// Normalize a category record; numeric ids are stringified.
pub fn normalize_category(raw: &Value) -> Category {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    Category {
        id: obj.get("id").map(stringify).unwrap_or_default(),
        name: str_field(obj, "name")
            .or_else(|| str_field(obj, "label"))
            .unwrap_or_default(),
    }
}

pub fn normalize_categories(data: Value) -> Vec<Category> {
    collection_items(data)
        .iter()
        .map(normalize_category)
        .collect()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// First key whose value is present and not null.
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn coerce_amount(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n.abs()
    } else {
        0.0
    }
}

/// Flag coercion for `is_recurrent`. Strings count only when they spell a
/// true value, so a backend sending `"false"` or `"0"` yields `false`.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

fn resolve_category(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("category") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Object(cat)) => {
            if let Some(name) = str_field(cat, "name").or_else(|| str_field(cat, "label")) {
                return Some(name);
            }
        }
        _ => {}
    }
    str_field(obj, "category_name").or_else(|| {
        obj.get("category_id")
            .filter(|v| !v.is_null())
            .map(stringify)
    })
}
