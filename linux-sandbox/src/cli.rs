use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::mode::SandboxMode;
use crate::sandbox::ExecutionRequest;

/// CLI surface for the Linux sandbox helper.
///
/// Usage errors are reported by clap on stderr with exit code 2, before any
/// policy work starts.
#[derive(Debug, Parser)]
#[command(name = "codex-linux-sandbox", version)]
pub struct SandboxCommand {
    /// Sandbox mode to confine the command with.
    #[arg(long = "mode", value_enum)]
    pub mode: SandboxMode,

    /// Workspace directory. Readable in every restricted mode and writable in
    /// `workspace_write` and `network_allowed`.
    #[arg(long = "workspace", value_name = "DIR")]
    pub workspace: PathBuf,

    /// Additional directory the command may read and execute from. May be
    /// repeated.
    #[arg(long = "readable-root", value_name = "DIR")]
    pub readable_roots: Vec<PathBuf>,

    /// Command and arguments to exec once the sandbox is in place. Must
    /// follow `--`.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<OsString>,
}

impl From<SandboxCommand> for ExecutionRequest {
    fn from(command: SandboxCommand) -> Self {
        let SandboxCommand {
            mode,
            workspace,
            readable_roots,
            command,
        } = command;
        ExecutionRequest {
            mode,
            workspace,
            readable_roots,
            command,
        }
    }
}
