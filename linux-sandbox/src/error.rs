use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxErr>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Kernel mechanism a policy failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subsystem {
    /// Landlock filesystem ruleset.
    Filesystem,
    /// seccomp syscall filter.
    Syscall,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Filesystem => f.write_str("filesystem policy (landlock)"),
            Subsystem::Syscall => f.write_str("syscall policy (seccomp)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SandboxErr {
    /// The kernel mechanism could not be initialized or committed.
    #[error("{subsystem} unavailable or failed: {source}")]
    PolicyUnavailable {
        subsystem: Subsystem,
        #[source]
        source: BoxError,
    },

    /// A specific filesystem grant could not be registered.
    #[error("filesystem policy (landlock) could not grant access to {}: {source}", path.display())]
    GrantFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// `execvp(3)` returned, so the target command never started.
    #[error("failed to execvp {program}: {source}")]
    ExecFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl SandboxErr {
    pub(crate) fn filesystem(source: impl Into<BoxError>) -> Self {
        SandboxErr::PolicyUnavailable {
            subsystem: Subsystem::Filesystem,
            source: source.into(),
        }
    }

    pub(crate) fn syscall(source: impl Into<BoxError>) -> Self {
        SandboxErr::PolicyUnavailable {
            subsystem: Subsystem::Syscall,
            source: source.into(),
        }
    }

    /// Subsystem whose policy could not be applied. `None` for exec
    /// failures, which are never subject to the escape hatch.
    pub fn subsystem(&self) -> Option<Subsystem> {
        match self {
            SandboxErr::PolicyUnavailable { subsystem, .. } => Some(*subsystem),
            SandboxErr::GrantFailed { .. } => Some(Subsystem::Filesystem),
            SandboxErr::ExecFailure { .. } => None,
        }
    }
}
