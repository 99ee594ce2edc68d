//! Dataset annotation loading.

use std::path::Path;

use serde_json::Value;

use crate::error::{PrivacyOpsError, Result};

/// Load the first entry of the top-level `dataset` list from a YAML file.
///
/// The entry is converted to JSON so it can be sent to the service as-is.
///
/// # Errors
///
/// Returns `DatasetIo` if the file cannot be read, or `DatasetInvalid` if it
/// is not YAML or has no dataset entries.
pub fn load_dataset(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path).map_err(|source| PrivacyOpsError::DatasetIo {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = |detail: String| PrivacyOpsError::DatasetInvalid {
        path: path.to_path_buf(),
        detail,
    };

    let document: Value = serde_yaml::from_str(&raw).map_err(|e| invalid(e.to_string()))?;
    document
        .get("dataset")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .cloned()
        .ok_or_else(|| invalid("expected a non-empty top-level `dataset` list".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_first_entry() {
        let file = write_yaml(
            r"
dataset:
  - fides_key: shopkeep_postgres
    collections:
      - name: users
        fields:
          - name: email
            data_categories: [user.provided.identifiable.contact.email]
  - fides_key: ignored
",
        );

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset["fides_key"], "shopkeep_postgres");
        assert_eq!(dataset["collections"][0]["fields"][0]["name"], "email");
    }

    #[test]
    fn test_empty_dataset_list_is_invalid() {
        let file = write_yaml("dataset: []\n");
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, PrivacyOpsError::DatasetInvalid { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_invalid() {
        let file = write_yaml("dataset: [unclosed\n");
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, PrivacyOpsError::DatasetInvalid { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, PrivacyOpsError::DatasetIo { .. }));
    }

    #[test]
    fn test_bundled_dataset_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/shopkeep_postgres_dataset.yml");
        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset["fides_key"], "shopkeep_postgres");
        let collections = dataset["collections"].as_array().unwrap();
        assert_eq!(collections.len(), 3);
    }
}
