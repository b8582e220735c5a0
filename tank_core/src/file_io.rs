//! # File I/O Module
//!
//! Reads inspection requests and engine configuration from JSON files and
//! writes rendered reports:
//! - **Atomic saves**: write to `.tmp`, sync, rename so a crash never leaves a
//!   half-written report
//! - **Version validation**: requests from a newer schema are rejected
//!
//! ## Example
//!
//! ```rust,no_run
//! use tank_core::file_io::{load_request, save_text_atomic};
//! use std::path::Path;
//!
//! let request = load_request(Path::new("tank-101.json"))?;
//! println!("Loaded {} readings", request.measurements.len());
//! save_text_atomic(Path::new("tank-101.txt"), "report body")?;
//! # Ok::<(), tank_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::config::EngineConfig;
use crate::errors::{CalcError, CalcResult};
use crate::inspection::{InspectionRequest, SCHEMA_VERSION};

fn read_to_string(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path).map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Load an inspection request from a JSON file.
///
/// # Returns
///
/// * `Ok(InspectionRequest)` - parsed request, not yet validated
/// * `Err(CalcError::VersionMismatch)` - request schema is newer than supported
/// * `Err(CalcError::SerializationError)` - invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_request(path: &Path) -> CalcResult<InspectionRequest> {
    let contents = read_to_string(path)?;
    let request: InspectionRequest = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&request.schema_version)?;
    tracing::debug!(path = %path.display(), measurements = request.measurements.len(), "request loaded");
    Ok(request)
}

/// Load and validate an engine configuration file.
pub fn load_config(path: &Path) -> CalcResult<EngineConfig> {
    let contents = read_to_string(path)?;
    EngineConfig::from_json_str(&contents).map_err(|e| match e {
        CalcError::SerializationError { reason } => CalcError::SerializationError {
            reason: format!("{} ({})", reason, path.display()),
        },
        other => other,
    })
}

/// Write text with atomic write semantics.
///
/// 1. Write to `<path>.tmp`
/// 2. Sync to disk
/// 3. Rename over the target
pub fn save_text_atomic(path: &Path, contents: &str) -> CalcResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut tmp_file = File::create(tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(contents.as_bytes())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "file saved");
    Ok(())
}

/// Validate that a request's schema version is compatible with this build.
///
/// The major version must match. While the major version is 0, a newer minor
/// version is rejected as well.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<Vec<u32>> { v.trim().split('.').map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version).filter(|p| !p.is_empty()).ok_or_else(mismatch)?;
    let current_parts = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    if current_parts[0] == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("tank_core_test_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_version_compatibility() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("abc").is_err());
        assert!(validate_version("").is_err());
    }

    #[test]
    fn test_save_and_load_request() {
        let path = temp_path("request.json");
        let request = InspectionRequest::new("T-101");
        save_text_atomic(&path, &serde_json::to_string_pretty(&request).unwrap()).unwrap();

        let loaded = load_request(&path).unwrap();
        assert_eq!(loaded.tank.tank_id.as_deref(), Some("T-101"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_path("report.txt");
        save_text_atomic(&path, "Page 1 of 1").unwrap();

        assert!(!temp_path("report.txt.tmp").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "Page 1 of 1");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = load_request(&temp_path("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, CalcError::FileError { .. }));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_request(&path).unwrap_err();
        assert!(matches!(err, CalcError::SerializationError { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_newer_schema_rejected_on_load() {
        let path = temp_path("newer.json");
        fs::write(&path, r#"{"schema_version": "0.9.0", "tank": {}, "measurements": []}"#).unwrap();
        let err = load_request(&path).unwrap_err();
        assert!(matches!(err, CalcError::VersionMismatch { .. }));
        let _ = fs::remove_file(&path);
    }
}
