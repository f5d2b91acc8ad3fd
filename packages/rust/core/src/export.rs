//! Output directory writer.
//!
//! Writes the pipeline output to disk:
//! ```text
//! <target>/
//! ├── manifest.json
//! ├── styleguide.json     (section tree)
//! ├── search-index.json   (flat search records)
//! └── diagnostics.json    (non-fatal notices)
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use styleguide_shared::{Result, StyleguideError};

use crate::pipeline::PipelineOutput;

/// Version of the exported file layout.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const GUIDE_FILE: &str = "styleguide.json";
pub const SEARCH_INDEX_FILE: &str = "search-index.json";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";

/// Metadata supplied by the caller.
#[derive(Debug, Clone)]
pub struct ExportMeta {
    pub title: String,
    pub tool_version: String,
}

/// Checksum entry for one written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub title: String,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub file_count: usize,
    pub entity_count: usize,
    pub warning_count: usize,
    pub files: Vec<ExportedFile>,
}

/// Output from a successful export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub target: PathBuf,
    pub manifest: Manifest,
}

/// Write every output file into `target`, creating it if needed.
///
/// Files are written atomically (temp file, then rename); the manifest is
/// written last and lists a checksum for each of the others.
#[instrument(skip_all, fields(target = %target.display()))]
pub fn export(target: &Path, meta: &ExportMeta, output: &PipelineOutput) -> Result<ExportResult> {
    std::fs::create_dir_all(target).map_err(|e| StyleguideError::io(target, e))?;

    let files = vec![
        write_json(target, GUIDE_FILE, &output.guide)?,
        write_json(target, SEARCH_INDEX_FILE, &output.index)?,
        write_json(target, DIAGNOSTICS_FILE, &output.diagnostics)?,
    ];

    let manifest = Manifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        title: meta.title.clone(),
        tool_version: meta.tool_version.clone(),
        generated_at: Utc::now(),
        file_count: output.file_count,
        entity_count: output.entity_count,
        warning_count: output.diagnostics.len(),
        files,
    };
    write_json(target, MANIFEST_FILE, &manifest)?;

    info!(
        entities = manifest.entity_count,
        warnings = manifest.warning_count,
        "export complete"
    );

    Ok(ExportResult {
        target: target.to_path_buf(),
        manifest,
    })
}

/// Read back a previously written manifest.
pub fn read_manifest(target: &Path) -> Result<Manifest> {
    let path = target.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| StyleguideError::io(&path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| StyleguideError::Export(format!("invalid {MANIFEST_FILE}: {e}")))
}

/// Write a pretty-printed JSON file atomically and return its checksum entry.
fn write_json<T: Serialize>(dir: &Path, filename: &str, data: &T) -> Result<ExportedFile> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| StyleguideError::Export(format!("JSON serialization failed: {e}")))?;

    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));
    std::fs::write(&temp, &content).map_err(|e| StyleguideError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| StyleguideError::io(&target, e))?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    debug!(file = %filename, size = content.len(), "wrote JSON file");

    Ok(ExportedFile {
        filename: filename.to_string(),
        sha256,
        size_bytes: content.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineConfig, SilentProgress, run};
    use styleguide_shared::SubstitutionConfig;

    fn output() -> PipelineOutput {
        let config = PipelineConfig {
            files: vec![PathBuf::from("../../../fixtures/scss/colors.scss")],
            substitution: SubstitutionConfig {
                static_lipsum: true,
                placeholder_service: None,
            },
        };
        run(&config, &SilentProgress).unwrap()
    }

    fn meta() -> ExportMeta {
        ExportMeta {
            title: "Test Guide".into(),
            tool_version: "0.1.0-test".into(),
        }
    }

    #[test]
    fn export_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let result = export(&target, &meta(), &output()).unwrap();

        for name in [MANIFEST_FILE, GUIDE_FILE, SEARCH_INDEX_FILE, DIAGNOSTICS_FILE] {
            assert!(target.join(name).is_file(), "{name} missing");
        }
        assert_eq!(result.manifest.files.len(), 3);
        assert_eq!(result.manifest.entity_count, 3);
        assert_eq!(result.manifest.file_count, 1);
    }

    #[test]
    fn manifest_round_trips_and_counts_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let out = output();
        let warnings = out.diagnostics.len();
        export(dir.path(), &meta(), &out).unwrap();

        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(manifest.title, "Test Guide");
        assert_eq!(manifest.warning_count, warnings);
        assert!(manifest.files.iter().all(|f| f.sha256.len() == 64));
    }

    #[test]
    fn search_index_is_valid_json_array() {
        let dir = tempfile::tempdir().unwrap();
        export(dir.path(), &meta(), &output()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SEARCH_INDEX_FILE)).unwrap();
        let records: serde_json::Value = serde_json::from_str(&content).unwrap();
        let records = records.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["type"], "color");
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        export(dir.path(), &meta(), &output()).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_manifest(dir.path()).unwrap_err();
        assert!(matches!(err, StyleguideError::Io { .. }));
    }
}
