//! Helpers for executing the VCS tool.

use std::process::Stdio;

use camino::Utf8Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::VcsError;

/// Creates a command that is rooted to a specific working directory.
pub(crate) fn command(program: &str, working_dir: &Utf8Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.current_dir(working_dir.as_std_path())
        .stdin(Stdio::null())
        .kill_on_drop(true);
    cmd
}

/// Outcome of a finished command.
#[derive(Debug)]
pub(crate) struct Finished {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Runs `program args..` in `working_dir` and collects its output.
///
/// Only a failure to start the program is an error; a non-zero exit status
/// is reported through [`Finished::success`].
pub(crate) async fn run(
    program: &str,
    working_dir: &Utf8Path,
    args: &[&str],
) -> Result<Finished, VcsError> {
    debug!(program, dir = %working_dir, ?args, "running command");
    let output = command(program, working_dir)
        .args(args)
        .output()
        .await
        .map_err(|source| VcsError::spawn(program, source))?;

    Ok(Finished {
        success: output.status.success(),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

/// Like [`run`], but turns a non-zero exit status into
/// [`VcsError::CommandFailed`].
pub(crate) async fn run_checked(
    program: &str,
    working_dir: &Utf8Path,
    args: &[&str],
) -> Result<Vec<u8>, VcsError> {
    let finished = run(program, working_dir, args).await?;
    if finished.success {
        Ok(finished.stdout)
    } else {
        Err(VcsError::CommandFailed {
            program: program.to_owned(),
            args: args.join(" "),
            dir: working_dir.to_owned(),
            stderr: finished.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = run("canopy-definitely-not-a-program", Utf8Path::new("."), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }));
    }
}
