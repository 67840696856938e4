//! Status source that shells out to a platform command.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{MicStatusSource, QueryError};

/// Runs a command and treats its trimmed stdout as the mute status
/// encoding, e.g. `pactl get-source-mute @DEFAULT_SOURCE@` which prints
/// `Mute: yes`.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    /// Create a source running `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Build a source from a `[program, args...]` list. Returns `None` for an
    /// empty list.
    pub fn from_argv(argv: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), timeout))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self) -> Result<String, QueryError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| QueryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(QueryError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl MicStatusSource for CommandSource {
    async fn get_mic_status(&self) -> Result<String, QueryError> {
        debug!(program = %self.program, args = ?self.args, "querying mic status");
        tokio::time::timeout(self.timeout, self.run())
            .await
            .map_err(|_| QueryError::Timeout(self.timeout))?
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandSource {
        CommandSource::new("sh", vec!["-c".to_string(), script.to_string()], timeout)
    }

    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        let source = sh("echo '  true  '", Duration::from_secs(5));
        assert_eq!(source.get_mic_status().await.unwrap(), "true");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let source = sh("echo boom >&2; exit 3", Duration::from_secs(5));
        match source.get_mic_status().await {
            Err(QueryError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_failure() {
        let source = CommandSource::new(
            "micmute-definitely-not-a-program",
            vec![],
            Duration::from_secs(5),
        );
        assert!(matches!(
            source.get_mic_status().await,
            Err(QueryError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let source = sh("sleep 5", Duration::from_millis(50));
        assert!(matches!(
            source.get_mic_status().await,
            Err(QueryError::Timeout(t)) if t == Duration::from_millis(50)
        ));
    }

    #[test]
    fn test_from_argv() {
        assert!(CommandSource::from_argv(&[], Duration::from_secs(1)).is_none());

        let argv = vec!["pactl".to_string(), "get-source-mute".to_string()];
        let source = CommandSource::from_argv(&argv, Duration::from_secs(1)).unwrap();
        assert_eq!(source.name(), "pactl");
        assert_eq!(source.args, vec!["get-source-mute".to_string()]);
        assert_eq!(source.timeout(), Duration::from_secs(1));
    }
}
