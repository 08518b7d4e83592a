use crate::error::{FormdeskError, Result};

// ---------------------------------------------------------------------------
// Table allow-list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ContactSubmissions,
    QuoteRequests,
    SampleRequests,
    FeedbackSubmissions,
    ProductRequests,
    CallRequests,
}

pub const ALL_TABLES: &[Table] = &[
    Table::ContactSubmissions,
    Table::QuoteRequests,
    Table::SampleRequests,
    Table::FeedbackSubmissions,
    Table::ProductRequests,
    Table::CallRequests,
];

impl Table {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ContactSubmissions => "contact_submissions",
            Self::QuoteRequests => "quote_requests",
            Self::SampleRequests => "sample_requests",
            Self::FeedbackSubmissions => "feedback_submissions",
            Self::ProductRequests => "product_requests",
            Self::CallRequests => "call_requests",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ContactSubmissions => "Contact Submissions",
            Self::QuoteRequests => "Quote Requests",
            Self::SampleRequests => "Sample Requests",
            Self::FeedbackSubmissions => "Feedback",
            Self::ProductRequests => "Product Requests",
            Self::CallRequests => "Call Requests",
        }
    }

    pub fn from_key(key: &str) -> Result<Table> {
        ALL_TABLES
            .iter()
            .find(|t| t.key() == key)
            .copied()
            .ok_or_else(|| FormdeskError::InvalidTable(key.to_string()))
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Find the table whose key appears in `file_name` (case-insensitive).
///
/// Returns `Ok(None)` when nothing matches and a validation error when more
/// than one table key matches, since the file could belong to either.
pub fn detect_in_filename(file_name: &str) -> Result<Option<Table>> {
    let lower = file_name.to_lowercase();
    let matches: Vec<Table> = ALL_TABLES
        .iter()
        .filter(|t| lower.contains(t.key()))
        .copied()
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        many => {
            let keys: Vec<&str> = many.iter().map(|t| t.key()).collect();
            Err(FormdeskError::Validation(format!(
                "Filename matches several tables ({}); pass --table to choose one",
                keys.join(", ")
            )))
        }
    }
}
