// Helpers for running the Windows tools we delegate to (dism, cmd, shutdown
// and the package installers themselves).

use crate::log_debug;
use crate::schemas::errors::{FrameworkError, Result};
use colored::Colorize;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running installer is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Runs `program` to completion and captures stdout/stderr.
/// A non-zero exit status is not an error here; callers decide what success means.
pub fn run_capture(program: &str, args: &[&str]) -> Result<Output> {
    let mut command = Command::new(program);
    command.args(args);
    capture(program, &mut command)
}

/// Runs an already prepared `command` to completion and captures its output.
///
/// # Arguments
/// * `program` - Name used in log lines and spawn errors.
/// * `command` - The command, arguments included.
pub fn capture(program: &str, command: &mut Command) -> Result<Output> {
    let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy()).collect();
    log_debug!("[Process] Running: {} {}", program.cyan(), args.join(" "));
    command.output().map_err(|source| FrameworkError::CommandSpawn {
        program: program.to_string(),
        source,
    })
}

/// Exit code of a finished process. Processes killed by a signal report `-1`.
pub fn exit_code(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Combined, trimmed stdout and stderr of a finished process, for error messages.
pub fn output_text(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}{}", stdout.trim(), stderr.trim()).trim().to_string()
}

/// Spawns `command` and waits up to `timeout` for it to exit.
/// The child is killed when the timeout expires.
pub fn run_with_timeout(program: &str, command: &mut Command, timeout: Duration) -> Result<i32> {
    let child = command
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| FrameworkError::CommandSpawn {
            program: program.to_string(),
            source,
        })?;
    wait_with_timeout(program, child, timeout)
}

fn wait_with_timeout(program: &str, mut child: Child, timeout: Duration) -> Result<i32> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            log_debug!(
                "[Process] '{}' exited with {:?} after {:?}",
                program,
                status.code(),
                started.elapsed()
            );
            return Ok(exit_code(&status));
        }
        if started.elapsed() >= timeout {
            // Best effort: the process may exit between try_wait and kill.
            let _ = child.kill();
            let _ = child.wait();
            return Err(FrameworkError::Timeout {
                program: program.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
