//! Query result rendering
//!
//! `QueryResult` is the structured form of a prefix query. The bracketed
//! history text is a rendering of the same rows:
//!
//! ```text
//! Inventory history: {[A1,O1,20240101000000,5][A1,O1,20240102000000,7]}
//! ```
//!
//! Strings are written verbatim, so a value containing `,` or `]` makes the
//! text ambiguous. Consumers that need to parse results should use the
//! structured form.

use std::io::{self, Write};
use serde::{Serialize, Deserialize};

use crate::models::{Row, TableSchema, Value};

/// Label used by [`format`]
pub const DEFAULT_HISTORY_LABEL: &str = "Inventory history";

/// Renders rows in the bracketed history form under a configurable label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFormatter {
    label: String,
}

impl Default for HistoryFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LABEL)
    }
}

impl HistoryFormatter {
    /// Create a formatter with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// The label written before the rows
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Render rows into a string
    pub fn format<I>(&self, rows: I, schema: &TableSchema) -> String
    where
        I: IntoIterator<Item = Row>,
    {
        let mut out = self.opening();
        for row in rows {
            render_row(&mut out, &row, schema);
        }
        out.push('}');
        out
    }

    /// Stream rows into a writer, one row at a time
    pub fn write_to<W, I>(&self, out: &mut W, rows: I, schema: &TableSchema) -> io::Result<()>
    where
        W: Write,
        I: IntoIterator<Item = Row>,
    {
        out.write_all(self.opening().as_bytes())?;

        let mut buf = String::new();
        for row in rows {
            buf.clear();
            render_row(&mut buf, &row, schema);
            out.write_all(buf.as_bytes())?;
        }
        out.write_all(b"}")
    }

    fn opening(&self) -> String {
        let mut out = String::with_capacity(self.label.len() + 3);
        out.push_str(&self.label);
        out.push_str(": {");
        out
    }
}

/// Append `[key,...,value,...]` for one row
fn render_row(out: &mut String, row: &Row, schema: &TableSchema) {
    out.push('[');
    for (i, value) in row.key.iter().take(schema.key_len()).enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&value.to_string());
    }
    for value in row.values.iter().take(schema.value_len()) {
        out.push(',');
        out.push_str(&value.to_string());
    }
    out.push(']');
}

/// Render rows with the default label
pub fn format<I>(rows: I, schema: &TableSchema) -> String
where
    I: IntoIterator<Item = Row>,
{
    HistoryFormatter::default().format(rows, schema)
}

/// A single typed cell of a query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    /// Text cell
    Text(String),
    /// Integer cell
    Int32(i32),
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(v) => Field::Text(v),
            Value::Int32(v) => Field::Int32(v),
        }
    }
}

/// Structured result of a prefix query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Table the rows came from
    pub table: String,

    /// Column names, key columns first
    pub columns: Vec<String>,

    /// Rows in key order, one field per column
    pub rows: Vec<Vec<Field>>,
}

impl QueryResult {
    /// Collect rows into a structured result
    pub fn from_rows<I>(schema: &TableSchema, rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.key
                    .into_iter()
                    .chain(row.values)
                    .map(Field::from)
                    .collect()
            })
            .collect();

        QueryResult {
            table: schema.name.clone(),
            columns: schema.column_names(),
            rows,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
