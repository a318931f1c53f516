pub mod auth;
pub mod client;

use crate::error::SheetsError;
use crate::twitter::normalize::Record;
use async_trait::async_trait;
use serde_json::Value;

/// Header row followed by one row per record, in the order given.
pub fn build_table(records: &[Record]) -> Vec<Vec<Value>> {
    let header: Vec<Value> = Record::HEADER.iter().map(|h| Value::from(*h)).collect();
    std::iter::once(header)
        .chain(records.iter().map(Record::to_row))
        .collect()
}

/// Tab-separated rendering of a table, used by `--dry-run`.
pub fn render_tsv(table: &[Vec<Value>]) -> String {
    let mut out = String::new();
    for row in table {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Value::String(s) => s.replace(['\t', '\n', '\r'], " "),
                other => other.to_string(),
            })
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Destination for the finished table.
#[async_trait]
pub trait SheetPublisher: Send + Sync {
    /// Empty the destination worksheet.
    async fn clear(&self) -> Result<(), SheetsError>;

    /// Write `rows` starting at `top_left` (A1 notation).
    async fn update(&self, top_left: &str, rows: &[Vec<Value>]) -> Result<(), SheetsError>;

    /// Clear, then write from A1. The two calls are not atomic: if the
    /// second fails the worksheet is left empty.
    async fn publish(&self, rows: &[Vec<Value>]) -> Result<(), SheetsError> {
        self.clear().await?;
        self.update("A1", rows).await
    }
}
