//! File-backed record sources for the CLI

use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::normalizer::Record;
use crate::infrastructure::memory::InMemoryStore;
use crate::infrastructure::{InfraError, InfraResult};

fn read_document(path: &Path) -> InfraResult<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
    serde_json::from_str(&content).map_err(|e| InfraError::DataFormat {
        message: format!("{}: {}", path.display(), e),
    })
}

/// Read a JSON array of loose records.
#[instrument(level = "debug")]
pub fn read_records(path: &Path) -> InfraResult<Vec<Record>> {
    let Value::Array(items) = read_document(path)? else {
        return Err(InfraError::DataFormat {
            message: format!("{}: expected a JSON array of records", path.display()),
        });
    };
    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(InfraError::DataFormat {
                message: format!("{}: record {} is not an object", path.display(), i),
            }),
        })
        .collect::<InfraResult<Vec<_>>>()?;
    debug!("read {} records", records.len());
    Ok(records)
}

/// Load a JSON document of entity tables (`{"<entity>": [rows]}`) into a store.
#[instrument(level = "debug")]
pub fn load_store(path: &Path) -> InfraResult<InMemoryStore> {
    let document = read_document(path)?;
    Ok(InMemoryStore::from_json(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_record_array_when_reading_then_returns_objects() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("records.json");
        fs::write(&path, r#"[{"id": 1, "label": "Root"}, {"id": 2, "parent_id": 1}]"#).unwrap();

        let records = read_records(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["parent_id"], 1);
    }

    #[test]
    fn given_object_document_when_reading_records_then_data_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("records.json");
        fs::write(&path, r#"{"id": 1}"#).unwrap();

        assert!(matches!(read_records(&path), Err(InfraError::DataFormat { .. })));
    }

    #[test]
    fn given_missing_file_when_loading_store_then_io_error() {
        let temp = TempDir::new().unwrap();
        let result = load_store(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(InfraError::Io { .. })));
    }
}
