/*!
 * Command execution for facts
 *
 * Executors only move a command string to a shell and bring back its
 * output. They do not retry, pool connections or cache results.
 */

use std::process::{Command, Output, Stdio};

use tracing::{debug, trace, warn};

use crate::error::{FactError, Result, ResultExt};
use crate::facts::Fact;

/// Captured result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// Standard output, split into lines
    pub stdout: Vec<String>,
    /// Standard error, split into lines
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    fn from_process(output: Output) -> Result<Self> {
        Ok(Self {
            status: output.status.code(),
            stdout: split_lines(output.stdout)?,
            stderr: split_lines(output.stderr)?,
        })
    }
}

/// Something that can run a shell command and capture its output
pub trait Executor {
    /// Run `command` through a POSIX shell
    ///
    /// Only failures to run the command at all are errors; a non-zero exit
    /// status is reported in the returned [`CommandOutput`].
    fn execute(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalShell {
    shell: String,
}

impl LocalShell {
    /// Use `shell -c` to run commands
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl Executor for LocalShell {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        debug!("Running locally with {}: {}", self.shell, command);

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to spawn {}", self.shell))?;

        CommandOutput::from_process(output)
    }
}

/// Runs commands on a remote host through the `ssh` client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshShell {
    host: String,
    port: Option<u16>,
    user: Option<String>,
}

impl SshShell {
    /// Connect to `host` with the client's default port and user
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            user: None,
        }
    }

    /// Connect to a non-default port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Log in as `user`
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// The `user@host` (or `host`) destination passed to ssh
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// Arguments passed to the `ssh` binary for `command`
    pub fn args(&self, command: &str) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        args.push(self.destination());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

impl Executor for SshShell {
    fn execute(&self, command: &str) -> Result<CommandOutput> {
        debug!("Running on {}: {}", self.destination(), command);

        let output = Command::new("ssh")
            .args(self.args(command))
            .stdin(Stdio::null())
            .output()
            .with_context(|| "Failed to spawn ssh")?;

        let output = CommandOutput::from_process(output)?;
        // ssh reserves 255 for its own connection failures
        if output.status == Some(255) {
            return Err(FactError::Execution(format!(
                "ssh connection to {} failed: {}",
                self.destination(),
                output.stderr.join("\n")
            )));
        }

        Ok(output)
    }
}

/// Run a fact's command and parse its output
///
/// A failing command is an error unless the fact reports
/// [`Fact::default_on_error`], in which case the fact's absent value is
/// returned instead.
pub fn gather<F, E>(fact: &F, executor: &E) -> Result<F::Output>
where
    F: Fact,
    E: Executor + ?Sized,
{
    let command = fact.command();
    let output = executor.execute(&command)?;
    trace!("Command output: {:?}", output);

    if !output.success() {
        if fact.default_on_error() {
            debug!(
                "Command exited with {:?}, using default value",
                output.status
            );
            return Ok(F::Output::default());
        }

        warn!("Command exited with {:?}: {}", output.status, command);
        return Err(FactError::CommandFailed {
            command,
            status: output.status.unwrap_or(-1),
            stderr: output.stderr.join("\n"),
        });
    }

    fact.parse(&output.stdout)
}

/// Split captured output into lines, dropping the final newline
fn split_lines(bytes: Vec<u8>) -> Result<Vec<String>> {
    let text = String::from_utf8(bytes)
        .map_err(|e| FactError::Execution(format!("Command output is not UTF-8: {}", e)))?;

    Ok(text
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}
