use chrono::{DateTime, Utc};

use crate::fmt;
use crate::mapper::{display_value, PresentationRecord};

pub fn render(records: &[PresentationRecord], title: &str) -> Vec<u8> {
    render_at(records, title, &Utc::now())
}

/// Record-by-record dump under a title banner.
pub fn render_at(records: &[PresentationRecord], title: &str, generated: &DateTime<Utc>) -> Vec<u8> {
    if records.is_empty() {
        return Vec::new();
    }
    let mut out = format!("{title}\nGenerated on {}\n", fmt::display(generated));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!("Record {}\n", i + 1));
        out.push_str(&"-".repeat(30));
        out.push('\n');
        for (key, value) in record {
            out.push_str(&format!("{key}: {}\n", display_value(value)));
        }
        out.push('\n');
    }
    out.into_bytes()
}
