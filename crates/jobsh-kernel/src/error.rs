//! Error taxonomy for the shell core.
//!
//! Every variant is handled by the component that detects it and turned into
//! a diagnostic line. Only [`ShellError::is_fatal`] errors end the shell.

use nix::errno::Errno;
use thiserror::Error;

/// Exit status of a builtin or job. 0 means success.
pub type Status = i32;

/// Errors raised while building, launching, or controlling jobs.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Malformed command line; nothing from that line is launched.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Pipe or fork allocation failed.
    #[error("{what} failed: {source}")]
    Resource {
        what: &'static str,
        #[source]
        source: Errno,
        /// Set when no stage of the line is running yet.
        fatal: bool,
    },

    /// No builtin or executable matched the program name.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// The program was found but could not be executed.
    #[error("{path}: {}", .source.desc())]
    Exec {
        path: String,
        #[source]
        source: Errno,
    },

    /// `fg`/`bg` without an argument on an empty job table.
    #[error("no current job")]
    NoCurrentJob,

    /// `fg`/`bg` with a pid that belongs to no live job.
    #[error("job not found: {0}")]
    JobNotFound(i32),

    /// `fg`/`bg` argument that is not a pid.
    #[error("invalid pid: {0}")]
    InvalidPid(String),

    /// A redirection target or directory could not be opened.
    #[error("{path}: {source}")]
    Path {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// `cd` without an argument and no `HOME`.
    #[error("HOME not set")]
    MissingHome,

    /// Taking the controlling terminal failed at startup.
    #[error("terminal setup failed: {0}")]
    Terminal(#[source] Errno),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Errors after which the shell cannot keep running.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Resource { fatal: true, .. } | ShellError::Terminal(_)
        )
    }

    /// Exit status a child reports for this error.
    pub fn child_status(&self) -> Status {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::Exec { .. } => 126,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_not_found_message() {
        let err = ShellError::CommandNotFound("nosuchprogram".into());
        assert_eq!(err.to_string(), "nosuchprogram: command not found");
        assert_eq!(err.child_status(), 127);
    }

    #[test]
    fn exec_message_includes_os_text() {
        let err = ShellError::Exec {
            path: "/tmp/x".into(),
            source: Errno::EACCES,
        };
        assert_eq!(err.to_string(), "/tmp/x: Permission denied");
        assert_eq!(err.child_status(), 126);
    }

    #[test]
    fn only_early_resource_errors_are_fatal() {
        let early = ShellError::Resource {
            what: "fork",
            source: Errno::EAGAIN,
            fatal: true,
        };
        let late = ShellError::Resource {
            what: "pipe",
            source: Errno::EMFILE,
            fatal: false,
        };
        assert!(early.is_fatal());
        assert!(!late.is_fatal());
        assert!(!ShellError::NoCurrentJob.is_fatal());
    }
}
