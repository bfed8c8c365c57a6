//! Caller side: how to invoke this helper for a given mode.
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use crate::mode::SandboxMode;

/// Converts a mode, workspace and command into the argv (minus argv[0]) for
/// `codex-linux-sandbox`.
///
/// `full_access` commands still round-trip through the helper correctly, but
/// callers usually skip the helper entirely for that mode.
pub fn create_linux_sandbox_command_args(
    mode: SandboxMode,
    workspace: &Path,
    readable_roots: &[PathBuf],
    command: Vec<OsString>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--mode".into(),
        mode.as_str().into(),
        "--workspace".into(),
        workspace.as_os_str().to_owned(),
    ];
    for root in readable_roots {
        args.push("--readable-root".into());
        args.push(root.as_os_str().to_owned());
    }

    // Separator so that command arguments starting with `-` are not parsed as
    // options of the helper itself.
    args.push("--".into());
    args.extend(command);
    args
}
