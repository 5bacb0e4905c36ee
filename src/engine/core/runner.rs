use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::ffmpeg_cmd::format_ffmpeg_cmd;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Result of one external invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Non-zero exit. `code` is `None` if the process never started or died
    /// from a signal.
    Failed { code: Option<i32> },
    /// The user interrupted the run while the process was alive
    Cancelled,
}

/// Executes ffmpeg invocations, blocking until each one finishes
pub trait CommandRunner {
    fn run(&self, cmd: Command) -> RunStatus;
}

/// Shared flag raised by the Ctrl+C handler
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs commands as child processes with inherited stdout/stderr so ffmpeg's
/// `-stats` line reaches the terminal.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    cancel: CancelFlag,
}

impl ProcessRunner {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel }
    }

    fn wait(&self, child: &mut Child) -> std::io::Result<ExitStatus> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if self.cancel.is_cancelled() {
                terminate(child);
                return child.wait();
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, mut cmd: Command) -> RunStatus {
        if self.cancel.is_cancelled() {
            return RunStatus::Cancelled;
        }

        debug!(command = %format_ffmpeg_cmd(&cmd), "spawning");
        cmd.stdin(Stdio::null());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    program = %cmd.get_program().to_string_lossy(),
                    error = %e,
                    "failed to spawn"
                );
                return RunStatus::Failed { code: None };
            }
        };

        let status = match self.wait(&mut child) {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "failed to wait for child");
                terminate(&mut child);
                let _ = child.wait();
                return if self.cancel.is_cancelled() {
                    RunStatus::Cancelled
                } else {
                    RunStatus::Failed { code: None }
                };
            }
        };

        // A terminal Ctrl+C also reaches the child, which then exits non-zero
        // on its own before we notice the flag.
        if self.cancel.is_cancelled() {
            return RunStatus::Cancelled;
        }
        if status.success() {
            RunStatus::Success
        } else {
            debug!(%status, "child exited unsuccessfully");
            RunStatus::Failed {
                code: status.code(),
            }
        }
    }
}

/// Ask the child to stop (SIGTERM lets ffmpeg close its output), and kill it
/// if it is still alive after a grace period.
#[cfg(unix)]
fn terminate(child: &mut Child) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: pid belongs to a child we have not reaped yet
    unsafe {
        libc::kill(pid, libc::SIGTERM);
    }

    let mut waited = Duration::ZERO;
    while waited < TERMINATE_GRACE {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => {
                thread::sleep(POLL_INTERVAL);
                waited += POLL_INTERVAL;
            }
            Err(_) => break,
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}
