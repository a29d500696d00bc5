use crate::domain::ports::Storage;
use crate::utils::error::{Result, ScanError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Writes `data` as JSON indented by two spaces.
pub async fn save_to_json<S, T>(storage: &S, filename: &str, data: &T) -> Result<()>
where
    S: Storage,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(data)?;
    storage.write_file(filename, json.as_bytes()).await?;
    tracing::debug!("Wrote {} ({} bytes)", filename, json.len());
    Ok(())
}

/// Reads a results document written by [`save_to_json`] and writes its
/// `metrics` list as CSV next to it. Returns the CSV path.
pub async fn save_to_csv<S: Storage>(storage: &S, filename: &str) -> Result<String> {
    let content = storage.read_file(filename).await?;
    let document: Value = serde_json::from_slice(&content)?;
    let csv_data = metrics_to_csv(&document)?;

    let csv_path = csv_file_name(filename);
    storage.write_file(&csv_path, &csv_data).await?;
    tracing::debug!("Wrote {} ({} bytes)", csv_path, csv_data.len());
    Ok(csv_path)
}

pub fn csv_file_name(filename: &str) -> String {
    Path::new(filename)
        .with_extension("csv")
        .to_string_lossy()
        .into_owned()
}

/// One row per metric, nested objects flattened into `parent.child`
/// columns, preceded by an unnamed row-index column.
pub fn metrics_to_csv(document: &Value) -> Result<Vec<u8>> {
    let metrics = document
        .get("metrics")
        .ok_or_else(|| ScanError::ProcessingError {
            message: "results document has no 'metrics' key".to_string(),
        })?
        .as_array()
        .ok_or_else(|| ScanError::ProcessingError {
            message: "'metrics' is not a list".to_string(),
        })?;

    let rows: Vec<Map<String, Value>> = metrics.iter().map(flatten_record).collect();

    let mut columns: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(std::iter::once("").chain(columns.iter().copied()))?;

    for (index, row) in rows.iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(index.to_string());
        for column in &columns {
            record.push(row.get(*column).map(cell_text).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| ScanError::ProcessingError {
        message: format!("failed to finish CSV output: {}", e),
    })
}

pub fn flatten_record(value: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    match value {
        Value::Object(object) => flatten_into(&mut flat, None, object),
        other => {
            flat.insert("0".to_string(), other.clone());
        }
    }
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let column = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(flat, Some(column.as_str()), nested)
            }
            other => {
                flat.insert(column, other.clone());
            }
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
