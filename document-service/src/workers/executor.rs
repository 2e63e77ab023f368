use service_core::error::AppError;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Runs external tools (pdftoppm, convert, tesseract) under a timeout.
#[derive(Clone)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn execute(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<Output, AppError> {
        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        tracing::debug!(
            program = %program,
            args = ?args,
            timeout_secs = %self.timeout.as_secs(),
            "Executing command"
        );

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                AppError::InternalError(anyhow::anyhow!(
                    "{} timed out after {} seconds",
                    program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to start {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                program = %program,
                args = ?args,
                stderr = %stderr,
                "Command failed"
            );
            return Err(AppError::InternalError(anyhow::anyhow!(
                "{} failed: {}",
                program,
                stderr.trim()
            )));
        }

        tracing::debug!(
            program = %program,
            output_size = output.stdout.len(),
            "Command succeeded"
        );

        Ok(output)
    }
}

/// Paths are handed to external tools as UTF-8 arguments.
pub(crate) fn path_arg(path: &Path) -> Result<&str, AppError> {
    path.to_str().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("Non UTF-8 path: {}", path.display()))
    })
}
