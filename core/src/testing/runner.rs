use std::{
    collections::HashMap,
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    process::Command,
    time::Instant,
};

use crate::str_interp::{interp, InterpError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    pub build: Option<String>,
    pub run: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Build failed ({}):\n{output}", describe_exit(.code))]
    Failed { code: Option<i32>, output: String },

    #[error("Build did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("Failed to spawn '{cmd}'")]
    Spawn {
        cmd: String,
        #[source]
        source: io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exitcode={}", c),
        None => "terminated by signal".to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub elapsed: Duration,
    /// The time limit expired and the process was killed.
    pub timed_out: bool,
    /// On timeout, whatever was captured before the kill, with no status.
    pub output: ProcessOutput,
}

/// Prepares the program once before any case runs.
#[async_trait]
pub trait Builder {
    async fn build(&self) -> Result<(), BuildError>;
}

/// Runs the prepared program on one input.
#[async_trait]
pub trait Runner {
    async fn run(&self, input: &str) -> anyhow::Result<Execution>;
}

/// [`Builder`] and [`Runner`] backed by shell command lines.
#[derive(Debug, Clone)]
pub struct TestRunner {
    cmd: TestCommand,
    shell: PathBuf,
    build_time_limit: Duration,
    exec_time_limit: Duration,
}

impl TestRunner {
    const DEFAULT_SHELL: &str = "/bin/sh";
    pub const DEFAULT_BUILD_TIME_LIMIT: Duration = Duration::from_secs(30);
    pub const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_secs(3);

    pub fn new(cmd: TestCommand) -> Self {
        Self {
            cmd,
            shell: Self::DEFAULT_SHELL.into(),
            build_time_limit: Self::DEFAULT_BUILD_TIME_LIMIT,
            exec_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn build_time_limit(mut self, limit: Duration) -> Self {
        self.build_time_limit = limit;
        self
    }

    pub fn exec_time_limit(mut self, limit: Duration) -> Self {
        self.exec_time_limit = limit;
        self
    }

    /// Expands the file variables (`#{filePath}`, `#{outDir}`, ...) in both commands.
    pub fn program_file(
        mut self,
        filepath: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<Self, InterpError> {
        let vars = Self::make_cmd_interp_vars(filepath.as_ref(), out_dir.as_ref());
        self.cmd.build = self.cmd.build.map(|t| interp(&t, &vars)).transpose()?;
        self.cmd.run = interp(&self.cmd.run, &vars)?;
        Ok(self)
    }

    fn make_cmd_interp_vars<'a>(
        filepath: &'a Path,
        out_dir: &'a Path,
    ) -> HashMap<&'static str, &'a OsStr> {
        HashMap::from([
            ("filePath", filepath.as_os_str()),
            (
                "fileName",
                filepath.file_name().unwrap_or(filepath.as_os_str()),
            ),
            (
                "fileDir",
                filepath.parent().unwrap_or(Path::new(".")).as_os_str(),
            ),
            ("fileStem", filepath.file_stem().unwrap_or_default()),
            ("fileExt", filepath.extension().unwrap_or_default()),
            ("outDir", out_dir.as_os_str()),
        ])
    }

    pub fn get_command(&self) -> &TestCommand {
        &self.cmd
    }

    pub fn get_exec_time_limit(&self) -> Duration {
        self.exec_time_limit
    }

    fn shell_command(&self, cmdline: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.args(["-c", cmdline]).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Builder for TestRunner {
    async fn build(&self) -> Result<(), BuildError> {
        let Some(cmdline) = &self.cmd.build else {
            return Ok(());
        };
        log::info!("Building: {}", cmdline);

        let mut cmd = self.shell_command(cmdline);
        cmd.stdin(Stdio::null());
        let output = tokio::time::timeout(self.build_time_limit, cmd.output())
            .await
            .map_err(|_| BuildError::TimedOut(self.build_time_limit))?
            .map_err(|source| BuildError::Spawn {
                cmd: cmdline.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined += &String::from_utf8_lossy(&output.stderr);
        Err(BuildError::Failed {
            code: output.status.code(),
            output: combined,
        })
    }
}

#[async_trait]
impl Runner for TestRunner {
    async fn run(&self, input: &str) -> anyhow::Result<Execution> {
        let cmdline = &self.cmd.run;
        log::debug!("Running: {}", cmdline);

        let mut proc = self
            .shell_command(cmdline)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to spawn '{} -c {}'",
                    self.shell.to_string_lossy(),
                    cmdline
                )
            })?;
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let start_at = Instant::now();
        let res = {
            let fut_stdin = async move {
                // stdin must be closed even when the program exits without reading it
                match stdin.write_all(input.as_bytes()).await {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            };
            let fut_stdout = stdout.read_to_end(&mut stdout_buf);
            let fut_stderr = stderr.read_to_end(&mut stderr_buf);
            let fut_exit_status = proc.wait();

            tokio::time::timeout(self.exec_time_limit, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
                    .context("Failed to communicate with subprocess")
            })
            .await
        };
        let elapsed = start_at.elapsed();

        let (timed_out, status) = match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                (true, None)
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok((_, _, _, exit_status))) => (false, exit_status.code()),
        };
        Ok(Execution {
            elapsed,
            timed_out,
            output: ProcessOutput {
                status,
                stdout: String::from_utf8_lossy(&stdout_buf).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
            },
        })
    }
}
