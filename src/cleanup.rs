//! Removal of expired uploads and generated workbooks.
use log::error;
use log::info;
use log::warn;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

/// Deletes regular files older than `max_age` from every directory in `dirs`.
///
/// Missing directories are ignored. A file that cannot be inspected or removed is
/// logged and skipped.
///
/// # Returns
/// Number of files removed
pub fn remove_expired(dirs: &[PathBuf], max_age: Duration) -> usize {
    remove_expired_at(dirs, max_age, SystemTime::now())
}

pub(crate) fn remove_expired_at(dirs: &[PathBuf], max_age: Duration, now: SystemTime) -> usize {
    dirs.iter()
        .filter(|dir| dir.is_dir())
        .map(|dir| sweep(dir, max_age, now))
        .sum()
}

fn sweep(dir: &Path, max_age: Duration, now: SystemTime) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Cannot list '{}': {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0usize;
    for entry in entries.flatten() {
        let path = entry.path();
        let modified = match entry.metadata().and_then(|metadata| {
            if metadata.is_file() { metadata.modified().map(Some) } else { Ok(None) }
        }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                warn!("Cannot inspect '{}': {}", path.display(), e);
                continue;
            }
        };
        let expired = now.duration_since(modified).map(|age| age > max_age).unwrap_or(false);
        if !expired {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed expired file '{}'", path.display());
                removed += 1;
            }
            Err(e) => warn!("Cannot remove '{}': {}", path.display(), e),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_only_expired_files() {
        let root = tempfile::tempdir().unwrap();
        let outputs = root.path().join("outputs");
        fs::create_dir_all(outputs.join("nested")).unwrap();
        fs::write(outputs.join("Price_job.xlsx"), b"x").unwrap();
        fs::write(outputs.join("Type_job.xlsx"), b"x").unwrap();
        fs::write(outputs.join("nested").join("keep.txt"), b"x").unwrap();

        let dirs = vec![outputs.clone(), root.path().join("missing")];
        let hour = Duration::from_secs(3600);

        assert_eq!(remove_expired(&dirs, hour), 0);
        assert!(outputs.join("Price_job.xlsx").exists());

        let later = SystemTime::now() + Duration::from_secs(2 * 3600);
        assert_eq!(remove_expired_at(&dirs, hour, later), 2);
        assert!(!outputs.join("Price_job.xlsx").exists());
        assert!(!outputs.join("Type_job.xlsx").exists());
        assert!(outputs.join("nested").join("keep.txt").exists());
    }
}
