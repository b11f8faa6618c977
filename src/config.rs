// src/config.rs
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;

use crate::errors::{Result, RunnerError};

const WORKSPACE_PREFIX: &str = "run-tests-";

/// Service configuration, built once at startup and shared read-only
/// between request handlers.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    pub host: String,
    pub port: u16,

    /// Executable invoked inside the extracted project.
    pub build_program: String,
    pub build_args: Vec<String>,

    /// File that must sit at the project root for the upload to be accepted.
    pub descriptor_file: String,

    /// Where the build writes its reports, relative to the project root.
    pub reports_dir: PathBuf,
    pub report_extension: String,

    /// Sort collected reports by file name instead of directory-listing order.
    pub sort_reports: bool,

    pub max_upload_bytes: usize,

    /// Kill the build after this many seconds. Unset means wait forever.
    pub build_timeout_secs: Option<u64>,

    /// Parent directory for per-request workspaces. Defaults to the system temp dir.
    pub workspace_root: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            build_program: "mvn".to_string(),
            build_args: vec!["surefire-report:report".to_string()],
            descriptor_file: "pom.xml".to_string(),
            reports_dir: PathBuf::from("target/surefire-reports"),
            report_extension: ".txt".to_string(),
            sort_reports: true,
            max_upload_bytes: 100 * 1024 * 1024,
            build_timeout_secs: None,
            workspace_root: None,
        }
    }
}

impl RunnerConfig {
    /// Parse a (possibly partial) TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RunnerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from the optional `RUNNER_CONFIG` TOML file and
    /// then apply environment variable overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("RUNNER_CONFIG") {
            Ok(path) => {
                log::info!("Loading configuration from {}", path);
                let content = std::fs::read_to_string(&path)?;
                Self::from_toml_str(&content)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(host) = std::env::var("RUNNER_HOST") {
            config.host = host;
        }
        if let Some(port) = env_parse::<u16>("RUNNER_PORT")? {
            config.port = port;
        }
        if let Ok(program) = std::env::var("RUNNER_BUILD_PROGRAM") {
            config.build_program = program;
        }
        if let Some(limit) = env_parse::<usize>("RUNNER_MAX_UPLOAD_BYTES")? {
            config.max_upload_bytes = limit;
        }
        if let Some(secs) = env_parse::<u64>("RUNNER_BUILD_TIMEOUT_SECS")? {
            config.build_timeout_secs = Some(secs);
        }
        if let Ok(dir) = std::env::var("RUNNER_WORKDIR") {
            config.workspace_root = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.build_program.trim().is_empty() {
            return Err(RunnerError::Config("build_program must not be empty".to_string()));
        }
        if self.descriptor_file.trim().is_empty() {
            return Err(RunnerError::Config("descriptor_file must not be empty".to_string()));
        }
        if !is_relative_inside(&self.reports_dir) {
            return Err(RunnerError::Config(format!(
                "reports_dir must be a relative path inside the project, got {}",
                self.reports_dir.display()
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(RunnerError::Config("max_upload_bytes must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Create a fresh, uniquely named workspace. The directory and everything
    /// in it is removed when the returned guard is dropped.
    pub fn new_workspace(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match &self.workspace_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RunnerError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

fn is_relative_inside(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_maven_layout() {
        let config = RunnerConfig::default();
        assert_eq!(config.build_program, "mvn");
        assert_eq!(config.build_args, vec!["surefire-report:report"]);
        assert_eq!(config.descriptor_file, "pom.xml");
        assert_eq!(config.reports_dir, PathBuf::from("target/surefire-reports"));
        assert_eq!(config.report_extension, ".txt");
        assert!(config.build_timeout_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RunnerConfig::from_toml_str(
            r#"
            port = 9090
            build_program = "/opt/maven/bin/mvn"
            build_timeout_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.build_program, "/opt/maven/bin/mvn");
        assert_eq!(config.build_timeout_secs, Some(600));
        assert_eq!(config.descriptor_file, "pom.xml");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = RunnerConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, RunnerError::TomlParse(_)));
    }

    #[test]
    fn test_validate_rejects_escaping_reports_dir() {
        let mut config = RunnerConfig::default();
        config.reports_dir = PathBuf::from("../outside");
        assert!(matches!(config.validate(), Err(RunnerError::Config(_))));

        config.reports_dir = PathBuf::from("/tmp/reports");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_program() {
        let config = RunnerConfig {
            build_program: "  ".to_string(),
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_workspaces_are_unique_and_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let config = RunnerConfig {
            workspace_root: Some(root.path().to_path_buf()),
            ..RunnerConfig::default()
        };

        let first = config.new_workspace().unwrap();
        let second = config.new_workspace().unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().starts_with(root.path()));

        let first_path = first.path().to_path_buf();
        drop(first);
        drop(second);
        assert!(!first_path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
