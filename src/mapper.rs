//! Field mapping between stored rows and the human-facing records written to
//! backup files.
//!
//! The four bookkeeping fields (`id`, `created_at`, `resolved`, `vaulted`)
//! map to fixed headers and back. Every other key is turned into Title Case
//! on export and re-derived as snake_case on import; that reverse step is a
//! heuristic and loses information for keys that contained runs of capitals
//! or punctuation (`HTMLBody` comes back as `htmlbody`).

use serde_json::{Map, Value};

use crate::fmt;
use crate::store::RawRecord;

/// A row prepared for a backup file: display headers to display values.
pub type PresentationRecord = Map<String, Value>;

/// A row recovered from a backup file, before it is mapped back for insert.
pub type ImportRecord = Map<String, Value>;

const DROPPED_KEYS: &[&str] = &["id", "created_at", "Date", "ID"];

// ---------------------------------------------------------------------------
// Export direction
// ---------------------------------------------------------------------------

/// `company_name` -> `Company Name`.
pub fn title_key(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// String form of a value as it appears in text-based formats.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn to_presentation(raw: &RawRecord) -> PresentationRecord {
    let mut out = PresentationRecord::new();
    for (key, value) in raw {
        match key.as_str() {
            "created_at" => {
                let date = match value {
                    Value::String(s) => fmt::timestamp(s),
                    other => display_value(other),
                };
                out.insert("Date".to_string(), Value::String(date));
            }
            "id" => {
                let id = match value {
                    Value::Null => Value::String(String::new()),
                    other => other.clone(),
                };
                out.insert("ID".to_string(), id);
            }
            "resolved" => {
                let status = if is_truthy(value) { "Resolved" } else { "Pending" };
                out.insert("Status".to_string(), Value::String(status.to_string()));
            }
            "vaulted" => {
                let vaulted = if is_truthy(value) { "Yes" } else { "No" };
                out.insert("Vaulted".to_string(), Value::String(vaulted.to_string()));
            }
            _ => {
                let formatted = match value {
                    Value::Array(items) => Value::String(
                        items.iter().map(display_value).collect::<Vec<_>>().join(", "),
                    ),
                    Value::Object(_) => Value::String(value.to_string()),
                    Value::Null => Value::String(String::new()),
                    other => other.clone(),
                };
                out.insert(title_key(key), formatted);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Import direction
// ---------------------------------------------------------------------------

/// `Company Name`, `companyName` and `company_name` all become `company_name`.
pub fn snake_key(key: &str) -> String {
    let mut out = String::new();
    for word in key
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push('_');
        }
        let mut prev_lower = false;
        for c in word.chars() {
            if c.is_uppercase() && prev_lower {
                out.push('_');
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// How a delimited-text column header maps onto a stored field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderKey {
    /// Regenerated by storage; the column is ignored.
    Skip,
    /// `Status` column, becomes the boolean `resolved`.
    Resolved,
    /// `Vaulted` column, becomes the boolean `vaulted`.
    Vaulted,
    Field(String),
}

pub fn header_key(header: &str) -> HeaderKey {
    match header {
        "ID" | "Date" => return HeaderKey::Skip,
        "Status" => return HeaderKey::Resolved,
        "Vaulted" => return HeaderKey::Vaulted,
        _ => {}
    }
    let key = snake_key(header);
    match key.as_str() {
        "id" | "created_at" | "date" => HeaderKey::Skip,
        "status" => HeaderKey::Resolved,
        "vaulted" => HeaderKey::Vaulted,
        _ => HeaderKey::Field(key),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Map a recovered record back to something the store can insert.
///
/// Identity and timestamp fields are dropped, empty values are omitted, and
/// `resolved`/`vaulted` default to `false`.
pub fn to_storage_input(record: &ImportRecord) -> RawRecord {
    let mut out = RawRecord::new();
    for (key, value) in record {
        if DROPPED_KEYS.contains(&key.as_str()) || is_blank(value) {
            continue;
        }
        let snake = snake_key(key);
        match snake.as_str() {
            "status" => {
                let resolved = value.as_str() == Some("Resolved");
                out.insert("resolved".to_string(), Value::Bool(resolved));
            }
            "vaulted" => {
                let vaulted = value.as_str() == Some("Yes") || value == &Value::Bool(true);
                out.insert("vaulted".to_string(), Value::Bool(vaulted));
            }
            "date" | "id" | "created_at" => {}
            _ => {
                out.insert(snake, value.clone());
            }
        }
    }
    out.entry("resolved").or_insert(Value::Bool(false));
    out.entry("vaulted").or_insert(Value::Bool(false));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_presentation_scenario() {
        let raw = obj(json!({
            "id": "1",
            "created_at": "2024-01-01T10:00:00Z",
            "resolved": true,
            "vaulted": false,
            "company_name": "Acme",
        }));
        let p = to_presentation(&raw);
        assert_eq!(
            Value::Object(p.clone()),
            json!({
                "ID": "1",
                "Date": "Jan 1, 2024 10:00 AM",
                "Status": "Resolved",
                "Vaulted": "No",
                "Company Name": "Acme",
            })
        );
        let keys: Vec<&str> = p.keys().map(String::as_str).collect();
        assert_eq!(keys, ["ID", "Date", "Status", "Vaulted", "Company Name"]);
    }

    #[test]
    fn test_presentation_value_shapes() {
        let raw = obj(json!({
            "selected_products": ["Assam", "Nilgiri"],
            "details": {"grade": "FTGFOP"},
            "phone": null,
            "quantity_kg": 250,
        }));
        let p = to_presentation(&raw);
        assert_eq!(p["Selected Products"], "Assam, Nilgiri");
        assert_eq!(p["Details"], r#"{"grade":"FTGFOP"}"#);
        assert_eq!(p["Phone"], "");
        assert_eq!(p["Quantity Kg"], 250);
    }

    #[test]
    fn test_title_key() {
        assert_eq!(title_key("company_name"), "Company Name");
        assert_eq!(title_key("gst"), "Gst");
        assert_eq!(title_key("quantity_kg"), "Quantity Kg");
    }

    #[test]
    fn test_snake_key() {
        assert_eq!(snake_key("Company Name"), "company_name");
        assert_eq!(snake_key("companyName"), "company_name");
        assert_eq!(snake_key("company_name"), "company_name");
        assert_eq!(snake_key("Quantity Kg"), "quantity_kg");
        assert_eq!(snake_key("ID"), "id");
    }

    #[test]
    fn test_snake_key_is_lossy_for_capital_runs() {
        assert_eq!(snake_key("HTMLBody"), "htmlbody");
    }

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("ID"), HeaderKey::Skip);
        assert_eq!(header_key("Date"), HeaderKey::Skip);
        assert_eq!(header_key("Status"), HeaderKey::Resolved);
        assert_eq!(header_key("vaulted"), HeaderKey::Vaulted);
        assert_eq!(header_key("Contact Name"), HeaderKey::Field("contact_name".into()));
    }

    #[test]
    fn test_storage_input_drops_identity_and_blanks() {
        let rec = obj(json!({
            "id": "x", "ID": "y", "created_at": "t", "Date": "d",
            "Company Name": "Acme", "Phone": "", "Grade": null,
        }));
        let out = to_storage_input(&rec);
        assert_eq!(
            Value::Object(out),
            json!({"company_name": "Acme", "resolved": false, "vaulted": false})
        );
    }

    #[test]
    fn test_storage_input_status_and_vaulted() {
        let out = to_storage_input(&obj(json!({"Status": "Resolved", "Vaulted": "Yes"})));
        assert_eq!(out["resolved"], true);
        assert_eq!(out["vaulted"], true);

        let out = to_storage_input(&obj(json!({"Status": "Pending", "vaulted": true})));
        assert_eq!(out["resolved"], false);
        assert_eq!(out["vaulted"], true);

        let out = to_storage_input(&obj(json!({"Vaulted": "No", "resolved": true})));
        assert_eq!(out["resolved"], true);
        assert_eq!(out["vaulted"], false);
    }

    #[test]
    fn test_roundtrip_reconstructs_fields() {
        let raw = obj(json!({
            "id": "9f2c",
            "created_at": "2024-05-02T09:15:00Z",
            "company_name": "Acme Tea",
            "email": "ops@acme.test",
            "quantity_kg": 40,
            "resolved": false,
            "vaulted": true,
        }));
        let back = to_storage_input(&to_presentation(&raw));
        assert_eq!(
            Value::Object(back),
            json!({
                "company_name": "Acme Tea",
                "email": "ops@acme.test",
                "quantity_kg": 40,
                "resolved": false,
                "vaulted": true,
            })
        );
    }
}
