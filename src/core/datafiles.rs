//! Input file discovery
//!
//! The raw SECOM files are looked up in the container-standard `/data`
//! directory first, then in the `data/` directory of the nearest ancestor of
//! the working directory that has one.

use std::path::{Path, PathBuf};

use crate::core::Config;

/// Measurement matrix file name
pub const FEATURES_FILE: &str = "secom.data";

/// Label file name
pub const LABELS_FILE: &str = "secom_labels.data";

/// Data directory mounted into containers
pub const CONTAINER_DATA_DIR: &str = "/data";

/// Resolved locations of the two input files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub features: PathBuf,
    pub labels: PathBuf,
}

impl DataFiles {
    /// Both files inside one directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            features: dir.join(FEATURES_FILE),
            labels: dir.join(LABELS_FILE),
        }
    }

    /// Resolve the input files for the configured environment
    pub fn resolve(config: &Config) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve_from(config.data_dir.as_deref(), Path::new(CONTAINER_DATA_DIR), &cwd)
    }

    /// Resolution order: explicit directory, container directory, then the
    /// first ancestor of `start` with a `data/secom.data`, else `start/data`.
    pub fn resolve_from(explicit: Option<&Path>, container: &Path, start: &Path) -> Self {
        if let Some(dir) = explicit {
            return Self::in_dir(dir);
        }

        if container.join(FEATURES_FILE).exists() {
            return Self::in_dir(container);
        }

        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join("data");
            if candidate.join(FEATURES_FILE).is_file() {
                return Self::in_dir(&candidate);
            }
            if !current.pop() {
                break;
            }
        }

        Self::in_dir(&start.join("data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_dir_wins() {
        let tmp = TempDir::new().unwrap();
        let files = DataFiles::resolve_from(Some(Path::new("/srv/secom")), tmp.path(), tmp.path());
        assert_eq!(files.features, PathBuf::from("/srv/secom/secom.data"));
        assert_eq!(files.labels, PathBuf::from("/srv/secom/secom_labels.data"));
    }

    #[test]
    fn test_container_dir_checked_first() {
        let container = TempDir::new().unwrap();
        fs::write(container.path().join(FEATURES_FILE), "1 2 3\n").unwrap();
        let project = TempDir::new().unwrap();

        let files = DataFiles::resolve_from(None, container.path(), project.path());
        assert_eq!(files.features, container.path().join(FEATURES_FILE));
    }

    #[test]
    fn test_walks_up_to_project_data_dir() {
        let container = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join("data")).unwrap();
        fs::write(project.path().join("data").join(FEATURES_FILE), "1\n").unwrap();
        let nested = project.path().join("db").join("init");
        fs::create_dir_all(&nested).unwrap();

        let files = DataFiles::resolve_from(None, container.path(), &nested);
        assert_eq!(files.features, project.path().join("data").join(FEATURES_FILE));
        assert_eq!(files.labels, project.path().join("data").join(LABELS_FILE));
    }

    #[test]
    fn test_falls_back_to_local_data_dir() {
        let container = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let files = DataFiles::resolve_from(None, container.path(), project.path());
        assert_eq!(files.features, project.path().join("data").join(FEATURES_FILE));
    }
}
