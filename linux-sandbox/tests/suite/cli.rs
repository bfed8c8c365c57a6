use pretty_assertions::assert_eq;

use super::Invocation;
use super::describe;
use super::run_helper;
use super::run_sandboxed;
use super::run_sh;
use super::scratch_dir;
use super::shell_quote;

#[tokio::test]
async fn usage_errors_exit_2_without_running_the_command() {
    let dir = scratch_dir();
    let marker = dir.path().join("launched");
    let script = format!("touch {}", shell_quote(&marker));
    let script = script.as_str();
    let workspace = dir.path().to_string_lossy().to_string();
    let workspace = workspace.as_str();

    let invocations: Vec<Vec<&str>> = vec![
        vec!["--workspace", workspace, "--", "/bin/sh", "-c", script],
        vec!["--mode", "read_only", "--", "/bin/sh", "-c", script],
        vec![
            "--mode",
            "read_only",
            "--workspace",
            workspace,
            "/bin/sh",
            "-c",
            script,
        ],
        vec!["--mode", "read_only", "--workspace", workspace, "--"],
        vec![
            "--mode",
            "bogus",
            "--workspace",
            workspace,
            "--",
            "/bin/sh",
            "-c",
            script,
        ],
    ];
    for args in invocations {
        let output = run_helper(&args, &[]).await;
        assert_eq!(output.status.code(), Some(2), "{args:?}: {}", describe(&output));
        assert!(!marker.exists(), "{args:?} must not launch the command");
    }
}

#[tokio::test]
async fn full_access_passes_output_and_exit_code_through() {
    let dir = scratch_dir();
    let invocation = Invocation {
        readable_root: false,
        ..Invocation::new("full_access", dir.path())
    };

    let output = run_sh(&invocation, "echo hello; echo oops >&2; exit 7").await;
    assert_eq!(output.status.code(), Some(7), "{}", describe(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "oops\n");
}

#[tokio::test]
async fn full_access_leaves_the_filesystem_unrestricted() {
    let workspace = scratch_dir();
    let elsewhere = scratch_dir();
    let target = elsewhere.path().join("written");
    let invocation = Invocation {
        readable_root: false,
        ..Invocation::new("full_access", workspace.path())
    };

    let output = run_sh(&invocation, &format!("echo hi > {}", shell_quote(&target))).await;
    assert!(output.status.success(), "{}", describe(&output));
    assert!(target.exists());
}

#[tokio::test]
async fn exec_failure_exits_1() {
    let dir = scratch_dir();
    for mode in ["full_access", "read_only"] {
        // The escape hatch covers policy setup only, never the exec itself.
        let invocation = Invocation {
            allow_no_sandbox: true,
            ..Invocation::new(mode, dir.path())
        };
        let output = run_sandboxed(&invocation, &["agent-studio-no-such-program-4f1c"]).await;
        assert_eq!(output.status.code(), Some(1), "{mode}: {}", describe(&output));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("failed to execvp agent-studio-no-such-program-4f1c"),
            "{mode}: {stderr}"
        );
    }
}
