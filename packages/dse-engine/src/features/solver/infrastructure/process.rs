//! Solver process runner
//!
//! Spawns the solver, feeds the query on stdin and collects both output
//! streams. The child is killed when the deadline passes.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// What happened to one solver run
#[derive(Debug)]
pub enum ProcessOutcome {
    Completed {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    TimedOut,
    Failed(io::Error),
}

/// Run `program args...` with `input` on stdin, bounded by `timeout`
pub async fn run_with_input(
    program: &Path,
    args: &[String],
    input: &str,
    timeout: Duration,
) -> ProcessOutcome {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return ProcessOutcome::Failed(e),
    };

    let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
        (child.stdin.take(), child.stdout.take(), child.stderr.take())
    else {
        let _ = child.start_kill();
        return ProcessOutcome::Failed(io::Error::new(
            io::ErrorKind::Other,
            "solver stdio pipes unavailable",
        ));
    };

    let exchange = async {
        let write = async {
            let written = stdin.write_all(input.as_bytes()).await;
            let closed = stdin.shutdown().await;
            drop(stdin);
            match written.and(closed) {
                // solver may exit before reading everything
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let (written, read_out, read_err) = tokio::join!(
            write,
            stdout.read_to_end(&mut out),
            stderr.read_to_end(&mut err)
        );
        written?;
        read_out?;
        read_err?;
        let status = child.wait().await?;
        Ok::<_, io::Error>((status, out, err))
    };

    let outcome = tokio::time::timeout(timeout, exchange).await;
    match outcome {
        Ok(Ok((status, out, err))) => ProcessOutcome::Completed {
            status,
            stdout: String::from_utf8_lossy(&out).into_owned(),
            stderr: String::from_utf8_lossy(&err).into_owned(),
        },
        Ok(Err(e)) => {
            let _ = child.start_kill();
            ProcessOutcome::Failed(e)
        }
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            ProcessOutcome::TimedOut
        }
    }
}

/// Locate a bare program name on `PATH`
pub fn find_on_path(name: &str) -> Option<std::path::PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
