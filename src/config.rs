//! Runtime settings, job ids and series names.
use crate::error::PriceMatrixError;
use crate::error::ResultMessage;
use chrono::Local;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Default directory for generated workbooks.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Default retention window for generated and uploaded files, in seconds.
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Directories managed by the host and how long files in them are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Where `Price_<job>.xlsx` and `Type_<job>.xlsx` are written
    pub output_dir: PathBuf,
    /// Directories swept by the cleanup command
    pub cleanup_dirs: Vec<PathBuf>,
    /// Files older than this are removed by the cleanup command
    pub max_age: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cleanup_dirs: vec![PathBuf::from(DEFAULT_OUTPUT_DIR)],
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
        }
    }
}

impl Settings {
    /// Creates every configured directory that does not exist yet.
    pub fn ensure_directories(&self) -> Result<(), PriceMatrixError> {
        for dir in std::iter::once(&self.output_dir).chain(self.cleanup_dirs.iter()) {
            fs::create_dir_all(dir)
                .map_err(PriceMatrixError::from)
                .with_prefix(&format!("create directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}

/// New job id: local timestamp plus the first 8 hex digits of a random UUID,
/// e.g. `20240131_142501_1a2b3c4d`.
pub fn generate_job_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}_{}", Local::now().format("%Y%m%d_%H%M%S"), &uuid[..8])
}

/// Series name written to every output row.
///
/// The stem of the client's original file name wins when known. Otherwise the
/// stem of the stored input is used, without the `<uuid>_` prefix added on upload.
pub fn series_name(input: &Path, original_filename: Option<&str>) -> String {
    if let Some(original) = original_filename.filter(|name| !name.trim().is_empty()) {
        return file_stem(Path::new(original.trim()));
    }
    let pattern = Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}_")
        .expect("Hardcode regex pattern");
    pattern.replace(&file_stem(input), "").into_owned()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_shape() {
        let id = generate_job_id();
        let pattern = Regex::new(r"^\d{8}_\d{6}_[0-9a-f]{8}$").unwrap();
        assert!(pattern.is_match(&id), "{id}");
        assert_ne!(generate_job_id()[16..], id[16..]);
    }

    #[test]
    fn series_from_original_name() {
        let input = Path::new("uploads/0b3e2f4a-1c2d-4e5f-8a9b-0c1d2e3f4a5b_upload.xlsx");
        assert_eq!(series_name(input, Some("Sliding Door 2024.xlsx")), "Sliding Door 2024");
    }

    #[test]
    fn series_without_upload_prefix() {
        let input = Path::new("uploads/0b3e2f4a-1c2d-4e5f-8a9b-0c1d2e3f4a5b_Window A.xlsx");
        assert_eq!(series_name(input, None), "Window A");
        assert_eq!(series_name(input, Some("  ")), "Window A");
        assert_eq!(series_name(Path::new("/tmp/Window B.xlsx"), None), "Window B");
        assert_eq!(series_name(Path::new("0B3E2F4A-1C2D-4E5F-8A9B-0C1D2E3F4A5B_C.xlsx"), None), "0B3E2F4A-1C2D-4E5F-8A9B-0C1D2E3F4A5B_C");
    }

    #[test]
    fn create_missing_directories() {
        let root = tempfile::tempdir().unwrap();
        let settings = Settings {
            output_dir: root.path().join("outputs"),
            cleanup_dirs: vec![root.path().join("uploads")],
            ..Settings::default()
        };
        settings.ensure_directories().unwrap();
        assert!(root.path().join("outputs").is_dir());
        assert!(root.path().join("uploads").is_dir());
    }
}
