// src/exec/command.rs

//! External-command adapters for [`BuildAction`] and [`RunAction`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::{ActionError, StepFailure};
use crate::exec::action::{ActionFuture, BuildAction, RunAction, StopHandle};

/// A command line to execute.
///
/// With `shell = true`, `program` is a full command line handed to the
/// platform shell (`sh -c` / `cmd /C`) and `args` must be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub shell: bool,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            shell: false,
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            program: line.into(),
            args: Vec::new(),
            shell: true,
        }
    }

    /// Build a shell or direct command appropriate for the platform.
    fn to_command(&self) -> Command {
        let mut cmd = if !self.shell {
            let mut c = Command::new(&self.program);
            c.args(&self.args);
            c
        } else if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.program);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.program);
            c
        };

        // The developer's terminal is the console for the app and its builds.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shell {
            return f.write_str(&self.program);
        }
        write_word(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_word(f, arg)?;
        }
        Ok(())
    }
}

/// Quote words that would otherwise not read back as a single argument.
fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    if word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '"') {
        write!(f, "{word:?}")
    } else {
        f.write_str(word)
    }
}

/// Runs a command to completion; nonzero exit is a failure.
#[derive(Debug, Clone)]
pub struct CommandBuildAction {
    spec: CommandSpec,
}

impl CommandBuildAction {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

impl BuildAction for CommandBuildAction {
    fn describe(&self) -> String {
        self.spec.to_string()
    }

    fn execute(&self) -> ActionFuture<'_, ()> {
        Box::pin(async move {
            let command = self.describe();
            debug!(command = %command, "running build step");

            let mut child = self
                .spec
                .to_command()
                .spawn()
                .map_err(|e| ActionError::new(command.clone(), StepFailure::Launch(e)))?;

            let status = child
                .wait()
                .await
                .map_err(|e| ActionError::new(command.clone(), StepFailure::Wait(e)))?;

            debug!(command = %command, exit_code = ?status.code(), "build step exited");

            if status.success() {
                Ok(())
            } else {
                Err(ActionError::new(command, StepFailure::Exit(status)))
            }
        })
    }
}

/// Launches a command and returns a [`ProcessHandle`] to kill it later.
#[derive(Debug, Clone)]
pub struct CommandRunAction {
    spec: CommandSpec,
}

impl CommandRunAction {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }

    /// Launch the command, keeping the concrete handle type.
    ///
    /// On unix the app leads its own process group, so stopping it also ends
    /// whatever a shell command line started.
    pub fn spawn(&self) -> Result<ProcessHandle, ActionError> {
        let command = self.describe();
        let mut cmd = self.spec.to_command();
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd
            .spawn()
            .map_err(|e| ActionError::new(command.clone(), StepFailure::Launch(e)))?;

        let group = child.id();
        info!(command = %command, pid = ?group, "app process started");
        Ok(ProcessHandle {
            command,
            child,
            group,
        })
    }
}

impl RunAction for CommandRunAction {
    fn describe(&self) -> String {
        self.spec.to_string()
    }

    fn start(&self) -> ActionFuture<'_, Box<dyn StopHandle>> {
        Box::pin(async move {
            let handle = self.spawn()?;
            Ok(Box::new(handle) as Box<dyn StopHandle>)
        })
    }
}

/// Exclusive owner of a running app process.
///
/// Dropping the handle also kills the process (`kill_on_drop`), but the
/// supervisor always stops it explicitly so the exit is reaped.
#[derive(Debug)]
pub struct ProcessHandle {
    command: String,
    child: Child,
    /// Process group id, equal to the app's pid at spawn time.
    #[cfg_attr(not(unix), allow(dead_code))]
    group: Option<u32>,
}

impl ProcessHandle {
    /// OS process id, if the process has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the process (and on unix its whole process group), then wait for
    /// it to exit.
    pub async fn kill(mut self) {
        // The group can outlive the app itself, so it is signalled first.
        #[cfg(unix)]
        self.kill_group();

        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    command = %self.command,
                    exit_code = ?status.code(),
                    "app process had already exited"
                );
                return;
            }
            Ok(None) => {}
            Err(e) => {
                debug!(command = %self.command, error = %e, "could not poll app process");
            }
        }

        if let Err(e) = self.child.kill().await {
            warn!(
                command = %self.command,
                error = %e,
                "failed to kill app process"
            );
            return;
        }
        debug!(command = %self.command, "app process killed");
    }
}

#[cfg(unix)]
impl ProcessHandle {
    fn kill_group(&self) {
        use nix::errno::Errno;
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pgid) = self.group.and_then(|id| i32::try_from(id).ok()) else {
            return;
        };
        match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
            Ok(()) => debug!(command = %self.command, pgid, "app process group killed"),
            // Every process in the group has already exited.
            Err(Errno::ESRCH) => {}
            Err(e) => warn!(
                command = %self.command,
                pgid,
                error = %e,
                "failed to kill app process group"
            ),
        }
    }
}

impl StopHandle for ProcessHandle {
    fn stop(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move { (*self).kill().await })
    }
}
