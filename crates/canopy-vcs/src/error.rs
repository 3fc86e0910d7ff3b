//! Error types for the canopy-vcs crate.

use camino::Utf8PathBuf;

/// Errors that can occur while querying the version-control tool.
///
/// "Not inside a repository" is not an error: [`GitTracker::reload`]
/// treats it as a no-op.
///
/// [`GitTracker::reload`]: crate::GitTracker::reload
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The program could not be started (usually: not installed).
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The program ran but exited unsuccessfully.
    #[error("{program} {args} failed in {dir}: {stderr}")]
    CommandFailed {
        /// The program that was run.
        program: String,
        /// Space-joined arguments.
        args: String,
        /// Working directory.
        dir: Utf8PathBuf,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The repository root reported by the tool is not valid UTF-8.
    #[error("repository root is not valid UTF-8: {0}")]
    NonUtf8Root(String),
}

impl VcsError {
    /// Creates a new [`VcsError::Spawn`] error.
    #[inline]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Returns `true` if a later reload may succeed.
    ///
    /// Failing to spawn the program means the tool is missing; the caller
    /// should mark itself unavailable instead of retrying.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Spawn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_is_not_recoverable() {
        let err = VcsError::spawn("git", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("failed to run git"));
    }

    #[test]
    fn test_command_failure_is_recoverable() {
        let err = VcsError::CommandFailed {
            program: "git".into(),
            args: "status".into(),
            dir: "/r".into(),
            stderr: "index.lock exists".into(),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("index.lock"));
    }
}
