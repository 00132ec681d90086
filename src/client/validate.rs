// SPDX-License-Identifier: MIT

//! Local argument checks run before a request is issued

use std::path::Path;

use crate::error::StepError;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const MIN_SPLIT_RATIO: f64 = 0.1;
pub const MAX_SPLIT_RATIO: f64 = 0.9;

pub fn pipeline_id(pipeline_id: &str) -> Result<(), StepError> {
    non_empty("pipeline_id", pipeline_id)
}

pub fn non_empty(field: &str, value: &str) -> Result<(), StepError> {
    if value.trim().is_empty() {
        return Err(StepError::invalid_argument(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub fn columns(columns: &[String]) -> Result<(), StepError> {
    if columns.is_empty() {
        return Err(StepError::invalid_argument("at least one column is required"));
    }
    columns.iter().try_for_each(|c| non_empty("column name", c))
}

pub fn split_ratio(ratio: f64) -> Result<(), StepError> {
    if !(MIN_SPLIT_RATIO..=MAX_SPLIT_RATIO).contains(&ratio) {
        return Err(StepError::invalid_argument(format!(
            "split ratio must be between {} and {}, got {}",
            MIN_SPLIT_RATIO, MAX_SPLIT_RATIO, ratio
        )));
    }
    Ok(())
}

/// Check the extension and size of a dataset file, then read it
pub async fn read_upload_file(path: &Path) -> Result<Vec<u8>, StepError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(StepError::invalid_argument(format!(
            "{} is not a CSV or Excel file (.csv, .xlsx, .xls)",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        StepError::invalid_argument(format!("cannot read {}: {}", path.display(), e))
    })?;
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(StepError::invalid_argument(format!(
            "{} is {} bytes; the limit is 50MB",
            path.display(),
            metadata.len()
        )));
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| StepError::invalid_argument(format!("cannot read {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_id_must_not_be_blank() {
        assert!(pipeline_id("abc").is_ok());
        assert!(matches!(pipeline_id("  "), Err(StepError::InvalidArgument(_))));
    }

    #[test]
    fn test_columns() {
        assert!(columns(&["age".to_string()]).is_ok());
        assert!(columns(&[]).is_err());
        assert!(columns(&["age".to_string(), "".to_string()]).is_err());
    }

    #[test]
    fn test_split_ratio_bounds() {
        assert!(split_ratio(0.8).is_ok());
        assert!(split_ratio(0.1).is_ok());
        assert!(split_ratio(0.9).is_ok());
        assert!(split_ratio(0.95).is_err());
        assert!(split_ratio(0.0).is_err());
        assert!(split_ratio(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_extension() {
        let err = read_upload_file(Path::new("notes.txt")).await.unwrap_err();
        assert!(matches!(err, StepError::InvalidArgument(m) if m.contains("not a CSV")));
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let path = std::env::temp_dir().join(format!("missing-{}.csv", uuid::Uuid::new_v4()));
        let err = read_upload_file(&path).await.unwrap_err();
        assert!(matches!(err, StepError::InvalidArgument(m) if m.contains("cannot read")));
    }

    #[tokio::test]
    async fn test_upload_reads_file() {
        let path = std::env::temp_dir().join(format!("dataset-{}.CSV", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "a,b\n1,2\n").await.unwrap();
        let bytes = read_upload_file(&path).await.unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_upload_rejects_file_over_limit() {
        let path = std::env::temp_dir().join(format!("large-{}.csv", uuid::Uuid::new_v4()));
        let file = tokio::fs::File::create(&path).await.unwrap();
        // sparse, so nothing is actually written
        file.set_len(MAX_UPLOAD_BYTES + 1).await.unwrap();
        drop(file);

        let err = read_upload_file(&path).await.unwrap_err();
        let _ = tokio::fs::remove_file(&path).await;
        assert!(matches!(err, StepError::InvalidArgument(m) if m.contains("limit")));
    }
}
