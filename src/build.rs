// src/build.rs
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::config::RunnerConfig;
use crate::errors::{Result, RunnerError};

/// The external build invocation, e.g. `mvn surefire-report:report`.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

/// Exit status and full output of one build run.
#[derive(Debug)]
pub struct BuildOutcome {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u64,
}

impl BuildCommand {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            program: config.build_program.clone(),
            args: config.build_args.clone(),
            timeout: config.build_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the build in `project_root` and wait for it to exit.
    ///
    /// The child is killed if this future is dropped before it completes,
    /// which happens when the client disconnects or the timeout fires.
    pub async fn run(&self, project_root: &Path) -> Result<BuildOutcome> {
        let start = Instant::now();
        let child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::BuildLaunch {
                program: self.program.clone(),
                source,
            })?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| RunnerError::BuildTimeout(limit.as_secs()))??,
            None => child.wait_with_output().await?,
        };

        Ok(BuildOutcome {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}

impl BuildOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Turn a non-zero exit into `BuildFailed`. Maven reports most failures
    /// on stdout, so stdout is used when stderr is empty.
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let output = if self.stderr.trim().is_empty() {
            self.stdout
        } else {
            self.stderr
        };
        Err(RunnerError::BuildFailed {
            code: self.status.code(),
            output,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> BuildCommand {
        BuildCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_runs_in_project_root_and_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = shell("touch marker && echo out && echo err >&2")
            .run(dir.path())
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let err = shell("echo 'tests failed' >&2; exit 3")
            .run(dir.path())
            .await
            .unwrap()
            .into_result()
            .unwrap_err();

        match err {
            RunnerError::BuildFailed { code, output } => {
                assert_eq!(code, Some(3));
                assert!(output.contains("tests failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_falls_back_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let err = shell("echo '[ERROR] BUILD FAILURE'; exit 1")
            .run(dir.path())
            .await
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("BUILD FAILURE"));
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let command = BuildCommand {
            program: "definitely-not-a-real-build-tool".to_string(),
            args: vec![],
            timeout: None,
        };
        let err = command.run(dir.path()).await.unwrap_err();
        assert!(matches!(err, RunnerError::BuildLaunch { .. }));
    }

    #[tokio::test]
    async fn test_timeout_stops_a_hung_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut command = shell("sleep 30");
        command.timeout = Some(Duration::from_millis(200));

        let err = command.run(dir.path()).await.unwrap_err();
        assert!(matches!(err, RunnerError::BuildTimeout(_)));
    }

    #[tokio::test]
    async fn test_elapsed_time_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = shell("sleep 0.2").run(dir.path()).await.unwrap();
        assert!(outcome.elapsed_ms >= 150, "elapsed {}ms", outcome.elapsed_ms);
        assert!(outcome.elapsed_ms < 60_000);
    }

    #[test]
    fn test_display_joins_program_and_args() {
        let command = BuildCommand::from_config(&RunnerConfig::default());
        assert_eq!(command.display(), "mvn surefire-report:report");
        assert!(command.timeout.is_none());
    }
}
