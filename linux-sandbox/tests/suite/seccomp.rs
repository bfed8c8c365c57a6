use pretty_assertions::assert_eq;

use super::Invocation;
use super::describe;
use super::run_sandboxed;
use super::sandbox_skip_reason;
use super::scratch_dir;

const EPERM: i32 = 1;

/// Calls `ptrace(PTRACE_TRACEME)` and prints `<return value> <errno>`.
const PTRACE_TRACEME_SCRIPT: &str = "\
import ctypes
libc = ctypes.CDLL(None, use_errno=True)
rc = libc.ptrace(0, 0, None, None)
print(rc, ctypes.get_errno())
";

fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("-c")
        .arg("pass")
        .status()
        .is_ok_and(|status| status.success())
}

async fn ptrace_traceme(mode: &str) -> (i64, i32) {
    let workspace = scratch_dir();
    let output = run_sandboxed(
        &Invocation::new(mode, workspace.path()),
        &["python3", "-c", PTRACE_TRACEME_SCRIPT],
    )
    .await;
    assert!(output.status.success(), "{mode}: {}", describe(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut fields = stdout.split_whitespace();
    match (
        fields.next().and_then(|rc| rc.parse().ok()),
        fields.next().and_then(|errno| errno.parse().ok()),
    ) {
        (Some(rc), Some(errno)) => (rc, errno),
        _ => panic!("{mode}: unexpected output: {}", describe(&output)),
    }
}

#[tokio::test]
async fn ptrace_is_denied_with_eperm() {
    if let Some(reason) = sandbox_skip_reason().await {
        eprintln!("skipping: {reason}");
        return;
    }
    if !python3_available() {
        eprintln!("skipping: python3 not found");
        return;
    }
    let (rc, _) = ptrace_traceme("full_access").await;
    if rc != 0 {
        eprintln!("skipping: PTRACE_TRACEME is refused on this host even unsandboxed");
        return;
    }

    for mode in ["read_only", "workspace_write", "network_allowed"] {
        assert_eq!(ptrace_traceme(mode).await, (-1, EPERM), "{mode}");
    }
}
