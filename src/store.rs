use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Connection;
use serde_json::{Map, Number, Value};

use crate::db::{get_connection, init_db};
use crate::error::{FormdeskError, Result};
use crate::tables::Table;

/// A row as stored: snake_case field names to JSON values.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub resolved: Option<bool>,
    pub search: Option<String>,
}

/// The CRUD backend the backup subsystem talks to.
pub trait SubmissionStore {
    /// Rows of `table` matching `filter`, newest `created_at` first.
    fn select(&self, table: Table, filter: &Filter) -> Result<Vec<RawRecord>>;

    /// Insert one row. `id` and `created_at` are generated when absent.
    fn insert(&self, table: Table, record: &RawRecord) -> Result<()>;

    /// Returns the number of rows changed.
    fn set_resolved(&self, table: Table, id: &str, resolved: bool) -> Result<usize>;

    /// Returns the number of rows removed.
    fn delete(&self, table: Table, id: &str) -> Result<usize>;

    fn count(&self, table: Table, resolved: Option<bool>) -> Result<usize>;
}

// ---------------------------------------------------------------------------
// SQLite implementation
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        Self::new(get_connection(db_path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FormdeskError::Other("database connection lock poisoned".to_string()))
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn resolved_clause(resolved: Option<bool>) -> &'static str {
    match resolved {
        Some(true) => " WHERE resolved = 1",
        Some(false) => " WHERE resolved = 0",
        None => "",
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn from_sql_value(raw: ValueRef<'_>, decl_type: Option<&str>) -> Value {
    let decl = decl_type.unwrap_or("").to_ascii_uppercase();
    match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if decl == "BOOLEAN" => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if decl == "JSON" {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            } else {
                Value::String(text)
            }
        }
        ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn matches_search(record: &RawRecord, needle: &str) -> bool {
    record.values().any(|v| {
        let text = match v {
            Value::String(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        };
        text.contains(needle)
    })
}

impl SubmissionStore for SqliteStore {
    fn select(&self, table: Table, filter: &Filter) -> Result<Vec<RawRecord>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY created_at DESC",
            table.key(),
            resolved_clause(filter.resolved)
        );
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<(String, Option<String>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
            .collect();
        let rows = stmt.query_map([], |row| {
            let mut record = RawRecord::new();
            for (i, (name, decl)) in columns.iter().enumerate() {
                record.insert(name.clone(), from_sql_value(row.get_ref(i)?, decl.as_deref()));
            }
            Ok(record)
        })?;
        let mut records = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        if let Some(needle) = filter.search.as_deref().map(str::to_lowercase) {
            if !needle.is_empty() {
                records.retain(|r| matches_search(r, &needle));
            }
        }
        Ok(records)
    }

    fn insert(&self, table: Table, record: &RawRecord) -> Result<()> {
        let conn = self.lock()?;
        if record.is_empty() {
            conn.execute(&format!("INSERT INTO {} DEFAULT VALUES", table.key()), [])?;
            return Ok(());
        }
        let columns: Vec<String> = record.keys().map(|k| quote_ident(k)).collect();
        let placeholders: Vec<String> = (1..=record.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.key(),
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<SqlValue> = record.values().map(to_sql_value).collect();
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
    }

    fn set_resolved(&self, table: Table, id: &str, resolved: bool) -> Result<usize> {
        let conn = self.lock()?;
        let changed = conn.execute(
            &format!("UPDATE {} SET resolved = ?1 WHERE id = ?2", table.key()),
            rusqlite::params![resolved, id],
        )?;
        Ok(changed)
    }

    fn delete(&self, table: Table, id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table.key()), [id])?;
        Ok(removed)
    }

    fn count(&self, table: Table, resolved: Option<bool>) -> Result<usize> {
        let conn = self.lock()?;
        let sql = format!("SELECT count(*) FROM {}{}", table.key(), resolved_clause(resolved));
        let n: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(n as usize)
    }
}
