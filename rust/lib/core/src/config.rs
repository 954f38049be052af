use std::path::PathBuf;

/// Storage configuration shared by every OpenCourse entry point.
///
/// Binaries fill this from their config file, then hand it to the storage
/// layer.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Directory holding the embedded database files.
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file.
    /// Defaults to `{data_dir}/data.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve the SQLite database path, falling back to `{data_dir}/data.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("data.sqlite"))
                .unwrap_or_else(|| PathBuf::from("data.sqlite"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sqlite_path() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("/data/data.sqlite"));

        let explicit = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            sqlite_path: Some(PathBuf::from("/var/oc.db")),
        };
        assert_eq!(explicit.resolve_sqlite_path(), PathBuf::from("/var/oc.db"));

        assert_eq!(
            ServiceConfig::default().resolve_sqlite_path(),
            PathBuf::from("data.sqlite")
        );
    }
}
