use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

// Columns declared BOOLEAN read back as JSON booleans, JSON columns as parsed
// arrays/objects (see store.rs).
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS contact_submissions (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    company_name TEXT,
    subject TEXT,
    message TEXT,
    resolved BOOLEAN NOT NULL DEFAULT 0,
    vaulted BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS quote_requests (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    company_name TEXT NOT NULL,
    contact_name TEXT,
    email TEXT NOT NULL,
    phone TEXT,
    product_id TEXT,
    grade TEXT,
    quantity TEXT,
    message TEXT,
    resolved BOOLEAN NOT NULL DEFAULT 0,
    vaulted BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sample_requests (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    company_name TEXT NOT NULL,
    category TEXT,
    phone TEXT,
    email TEXT NOT NULL,
    gst TEXT,
    address TEXT,
    payment_status TEXT DEFAULT 'pending',
    selected_products JSON,
    resolved BOOLEAN NOT NULL DEFAULT 0,
    vaulted BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS feedback_submissions (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    company TEXT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    feedback_type TEXT,
    rating TEXT,
    feedback TEXT,
    resolved BOOLEAN NOT NULL DEFAULT 0,
    vaulted BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS product_requests (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    company TEXT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    category TEXT,
    product_name TEXT,
    quantity TEXT,
    details JSON,
    resolved BOOLEAN NOT NULL DEFAULT 0,
    vaulted BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS call_requests (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    company_name TEXT,
    agenda TEXT,
    preferred_time TEXT,
    resolved BOOLEAN NOT NULL DEFAULT 0,
    vaulted BOOLEAN NOT NULL DEFAULT 0
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
