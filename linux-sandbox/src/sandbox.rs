//! The confinement sequence for one invocation: filesystem policy, then
//! syscall policy, each filtered through the escape hatch.
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::config::ALLOW_NO_SANDBOX_ENV_VAR;
use crate::config::SandboxConfig;
use crate::error::Result;
use crate::landlock::FilesystemBackend;
use crate::landlock::FilesystemPolicy;
use crate::mode::SandboxMode;
use crate::seccomp::SyscallBackend;
use crate::seccomp::SyscallPolicy;

/// Everything needed to confine and launch the target command. Built before
/// any policy is touched and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub mode: SandboxMode,
    pub workspace: PathBuf,
    pub readable_roots: Vec<PathBuf>,
    /// `command[0]` is resolved against `PATH` by `execvp(3)`.
    pub command: Vec<OsString>,
}

/// What happened to one kernel mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// The restriction is committed and irrevocable.
    Applied,
    /// The mode asked for no restriction (`full_access`).
    Bypassed,
    /// Setup failed and the escape hatch let the invocation continue
    /// without this restriction.
    SkippedViaEscape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SandboxOutcome {
    pub filesystem: StageOutcome,
    pub syscall: StageOutcome,
}

/// Confine the calling process according to `request.mode`.
///
/// On `Ok`, the process is ready to exec the target command. On `Err`, the
/// caller must not exec it.
pub fn apply_sandbox<F, S>(
    request: &ExecutionRequest,
    config: &SandboxConfig,
    filesystem_backend: &F,
    syscall_backend: &S,
) -> Result<SandboxOutcome>
where
    F: FilesystemBackend,
    S: SyscallBackend,
{
    let Some(workspace_access) = request.mode.workspace_access() else {
        debug!(mode = %request.mode, "no sandbox policy applied");
        return Ok(SandboxOutcome {
            filesystem: StageOutcome::Bypassed,
            syscall: StageOutcome::Bypassed,
        });
    };

    let filesystem_policy = FilesystemPolicy::for_workspace(
        &request.workspace,
        workspace_access,
        &request.readable_roots,
    );
    let filesystem = gate(
        filesystem_policy
            .apply(filesystem_backend)
            .map(|_restricted| ()),
        config,
    )?;

    let syscall = gate(
        SyscallPolicy::deny_list()
            .and_then(|policy| policy.commit(syscall_backend))
            .map(|_restricted| ()),
        config,
    )?;

    Ok(SandboxOutcome {
        filesystem,
        syscall,
    })
}

/// Escape hatch: a policy failure is fatal unless the configuration allows
/// running without the sandbox. Failures outside policy setup always
/// propagate.
pub fn gate(result: Result<()>, config: &SandboxConfig) -> Result<StageOutcome> {
    match result {
        Ok(()) => Ok(StageOutcome::Applied),
        Err(err) if config.allow_no_sandbox && err.subsystem().is_some() => {
            warn!("{err}; continuing without it because {ALLOW_NO_SANDBOX_ENV_VAR}=1");
            Ok(StageOutcome::SkippedViaEscape)
        }
        Err(err) => Err(err),
    }
}
