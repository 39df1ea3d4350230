//! Query sources
//!
//! Queries come from one column of a local JSON dataset export, either JSON
//! Lines (one object per line) or a single JSON array of objects.

use crate::error::QuerySourceError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Supplies the ordered, de-duplicated query list for a run
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn load(&self, column: &str) -> Result<Vec<String>, QuerySourceError>;
}

/// Reads queries from a `.jsonl` or `.json` file
#[derive(Debug, Clone)]
pub struct FileQuerySource {
    path: PathBuf,
}

impl FileQuerySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_records(&self, content: &str) -> Result<Vec<Map<String, Value>>, QuerySourceError> {
        let is_array = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            || content.trim_start().starts_with('[');

        if is_array {
            let values: Vec<Value> =
                serde_json::from_str(content).map_err(|source| QuerySourceError::Json {
                    path: self.path.clone(),
                    record: 0,
                    source,
                })?;
            return Ok(values.into_iter().filter_map(as_object).collect());
        }

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value =
                serde_json::from_str(line).map_err(|source| QuerySourceError::Json {
                    path: self.path.clone(),
                    record: index + 1,
                    source,
                })?;
            if let Some(record) = as_object(value) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn as_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            debug!("Ignoring non-object record: {}", other);
            None
        }
    }
}

/// String form of a column value; null and nested values yield nothing
fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Pull non-blank values of `column`, keeping the first occurrence of each
pub fn collect_queries(
    records: &[Map<String, Value>],
    column: &str,
) -> Result<Vec<String>, QuerySourceError> {
    if !records.is_empty() && !records.iter().any(|r| r.contains_key(column)) {
        let available: BTreeSet<String> = records.iter().flat_map(|r| r.keys().cloned()).collect();
        return Err(QuerySourceError::ColumnNotFound {
            column: column.to_string(),
            available: available.into_iter().collect(),
        });
    }

    let mut seen = HashSet::new();
    let queries: Vec<String> = records
        .iter()
        .filter_map(|r| r.get(column).and_then(query_text))
        .filter(|q| !q.is_empty())
        .filter(|q| seen.insert(q.clone()))
        .collect();

    Ok(queries)
}

#[async_trait]
impl QuerySource for FileQuerySource {
    async fn load(&self, column: &str) -> Result<Vec<String>, QuerySourceError> {
        info!(path = %self.path.display(), column, "Loading queries");

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| QuerySourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let records = self.parse_records(&content)?;
        let queries = collect_queries(&records, column)?;

        if queries.is_empty() {
            warn!(column, "No valid queries found in column");
        } else {
            info!(
                records = records.len(),
                "Loaded {} unique queries from column '{}'",
                queries.len(),
                column
            );
        }

        Ok(queries)
    }
}
