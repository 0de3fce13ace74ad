//! Builder for executing the probe tool with timeout support.

use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::config::DEFAULT_TIMEOUT;
use crate::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output, drained in full.
    pub stdout: Vec<u8>,
}

/// A builder for constructing and executing external tool invocations.
///
/// Standard error is always discarded. Standard output is read concurrently
/// with waiting for exit, so a child producing more output than the pipe
/// buffer holds cannot stall.
///
/// # Example
///
/// ```no_run
/// use probekit_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> probekit_av::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .args(["-show_streams", "-print_format", "json", "-show_format"])
///     .arg("-i")
///     .arg("/path/to/video.mkv")
///     .execute()
///     .await?;
/// println!("{} bytes", output.stdout.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    stdin_data: Option<Vec<u8>>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            stdin_data: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Provide data to be written to the process's stdin.
    pub fn stdin(&mut self, data: Vec<u8>) -> &mut Self {
        self.stdin_data = Some(data);
        self
    }

    /// Arguments collected so far.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolUnavailable`] if spawning the process fails.
    /// - [`Error::ProbeFailed`] if the process exits with a non-zero status
    ///   or runs longer than the timeout (the child is killed).
    pub async fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!("Running {} {}", self.program.display(), self.args.join(" "));

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::tool_unavailable(&program_name, format!("failed to spawn: {e}")))?;

        // Feed stdin from its own task so the child can write output while
        // it is still consuming input.
        let writer = match (child.stdin.take(), self.stdin_data.clone()) {
            (Some(mut stdin), Some(data)) => Some(tokio::spawn(async move {
                match stdin.write_all(&data).await {
                    Ok(()) => {}
                    // The child may stop reading once it has seen enough.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Err(e) => tracing::debug!("Failed to write stdin: {e}"),
                }
                // Dropping stdin closes the pipe.
            })),
            _ => None,
        };

        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;

        if let Some(writer) = writer {
            writer.abort();
        }

        match result {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    return Err(Error::probe_failed(
                        program_name,
                        format!("exited with {}", output.status),
                    ));
                }

                Ok(ToolOutput {
                    status: output.status,
                    stdout: output.stdout,
                })
            }
            Ok(Err(e)) => Err(Error::probe_failed(
                program_name,
                format!("I/O error waiting for process: {e}"),
            )),
            // The wait future owned the child; dropping it kills the process.
            Err(_elapsed) => Err(Error::probe_failed(
                program_name,
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }
}

/// Drive a tool future to completion from synchronous code.
///
/// Inside a multi-threaded tokio runtime the current runtime is reused;
/// otherwise a private current-thread runtime runs the future.
pub(crate) fn block_on<T, F, M>(make: M) -> Result<T>
where
    M: FnOnce() -> F + Send,
    F: Future<Output = Result<T>>,
    T: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(make()))
        }
        // A current-thread runtime cannot be blocked from within, so run
        // on a scoped thread with its own runtime.
        Ok(_) => std::thread::scope(|scope| match scope.spawn(|| block_on_private(make)).join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }),
        Err(_) => block_on_private(make),
    }
}

fn block_on_private<T, F, M>(make: M) -> Result<T>
where
    M: FnOnce() -> F,
    F: Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(make())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(String::from_utf8_lossy(&out.stdout).contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"))
            .execute()
            .await;
        assert!(matches!(result, Err(Error::ToolUnavailable { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdin_is_piped_through() {
        let result = ToolCommand::new(PathBuf::from("cat"))
            .stdin(b"media bytes".to_vec())
            .execute()
            .await
            .unwrap();
        assert_eq!(result.stdout, b"media bytes");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_output_is_drained() {
        // Well above a typical 64 KiB pipe buffer.
        let result = ToolCommand::new(PathBuf::from("head"))
            .args(["-c", "1048576", "/dev/zero"])
            .execute()
            .await
            .unwrap();
        assert_eq!(result.stdout.len(), 1_048_576);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_probe_failure() {
        let err = ToolCommand::new(PathBuf::from("false"))
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProbeFailed { .. }), "unexpected error: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_fires() {
        let result = ToolCommand::new(PathBuf::from("sleep"))
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("timed out") || err.contains("unavailable"), "unexpected error: {err}");
    }

    #[test]
    fn block_on_without_runtime() {
        let value = block_on(|| async { Ok::<_, Error>(7) }).unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn block_on_inside_current_thread_runtime() {
        let value = block_on(|| async { Ok::<_, Error>("done") }).unwrap();
        assert_eq!(value, "done");
    }
}
