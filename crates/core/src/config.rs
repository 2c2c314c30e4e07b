//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the services that
//! need it. Nothing in the core reads environment variables while a form is being filled in.

use crate::constants::{DEFAULT_PREFERENCES_FILENAME, SUBMISSIONS_DIR_NAME};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    preferences_file: PathBuf,
    subjects_file: Option<PathBuf>,
    skip_full_validation: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `data_dir` must exist and be a directory. When `preferences_file` is `None` it defaults
    /// to `preferences.json` inside `data_dir`. A `subjects_file`, when given, must be a file.
    pub fn new(
        data_dir: PathBuf,
        preferences_file: Option<PathBuf>,
        subjects_file: Option<PathBuf>,
        skip_full_validation: bool,
    ) -> CoreResult<Self> {
        if !data_dir.is_dir() {
            return Err(CoreError::InvalidInput(format!(
                "data directory does not exist: {}",
                data_dir.display()
            )));
        }

        if let Some(subjects) = &subjects_file {
            if !subjects.is_file() {
                return Err(CoreError::InvalidInput(format!(
                    "subjects file does not exist: {}",
                    subjects.display()
                )));
            }
        }

        let preferences_file =
            preferences_file.unwrap_or_else(|| data_dir.join(DEFAULT_PREFERENCES_FILENAME));

        Ok(Self {
            data_dir,
            preferences_file,
            subjects_file,
            skip_full_validation,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn submissions_dir(&self) -> PathBuf {
        self.data_dir.join(SUBMISSIONS_DIR_NAME)
    }

    pub fn preferences_file(&self) -> &Path {
        &self.preferences_file
    }

    pub fn subjects_file(&self) -> Option<&Path> {
        self.subjects_file.as_deref()
    }

    /// Whether the wizard asks the submission store to skip its full validation pass.
    pub fn skip_full_validation(&self) -> bool {
        self.skip_full_validation
    }
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> CoreResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(CoreError::InvalidInput(format!(
            "path exists but is not a directory: {}",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir).map_err(CoreError::DirCreation)
}

/// Parse a boolean flag from an optional environment value.
///
/// Accepts `1/0`, `true/false`, `yes/no` (case-insensitive). `None` or blank yields `default`.
pub fn flag_from_env_value(value: Option<String>, default: bool) -> CoreResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => Err(CoreError::InvalidInput(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_rejects_missing_data_dir() {
        let dir = TempDir::new().expect("tempdir");
        let err = CoreConfig::new(dir.path().join("missing"), None, None, true)
            .expect_err("should reject missing dir");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("does not exist")));
    }

    #[test]
    fn preferences_default_inside_data_dir() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = CoreConfig::new(dir.path().to_path_buf(), None, None, true).expect("config");
        assert_eq!(cfg.preferences_file(), dir.path().join("preferences.json"));
        assert_eq!(cfg.submissions_dir(), dir.path().join("submissions"));
        assert!(cfg.skip_full_validation());
    }

    #[test]
    fn subjects_file_must_exist() {
        let dir = TempDir::new().expect("tempdir");
        let err = CoreConfig::new(
            dir.path().to_path_buf(),
            None,
            Some(dir.path().join("subjects.yaml")),
            false,
        )
        .expect_err("should reject missing subjects file");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("subjects file")));
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let dir = TempDir::new().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).expect("create");
        assert!(nested.is_dir());
        ensure_dir(&nested).expect("idempotent");
    }

    #[test]
    fn flag_parsing() {
        assert!(flag_from_env_value(None, true).expect("default"));
        assert!(!flag_from_env_value(Some(" No ".into()), true).expect("no"));
        assert!(flag_from_env_value(Some("1".into()), false).expect("1"));
        assert!(flag_from_env_value(Some("maybe".into()), false).is_err());
    }
}
