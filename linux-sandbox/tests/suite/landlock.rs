use pretty_assertions::assert_eq;

use super::Invocation;
use super::describe;
use super::run_sh;
use super::sandbox_skip_reason;
use super::scratch_dir;
use super::scratch_under_tmp_reason;
use super::shell_quote;

macro_rules! skip_without_sandbox {
    () => {
        if let Some(reason) = scratch_under_tmp_reason() {
            eprintln!("skipping: {reason}");
            return;
        }
        if let Some(reason) = sandbox_skip_reason().await {
            eprintln!("skipping: {reason}");
            return;
        }
    };
}

#[tokio::test]
async fn read_only_can_read_but_not_write_the_workspace() {
    skip_without_sandbox!();
    let workspace = scratch_dir();
    let existing = workspace.path().join("notes.txt");
    if let Err(err) = std::fs::write(&existing, "hello from the workspace\n") {
        panic!("failed to seed workspace: {err}");
    }

    let invocation = Invocation::new("read_only", workspace.path());
    let output = run_sh(&invocation, &format!("cat {}", shell_quote(&existing))).await;
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "hello from the workspace\n"
    );

    let created = workspace.path().join("created.txt");
    let output = run_sh(&invocation, &format!("echo hi > {}", shell_quote(&created))).await;
    assert!(!output.status.success(), "{}", describe(&output));
    assert!(!created.exists());
}

#[tokio::test]
async fn writable_modes_can_write_the_workspace_only() {
    skip_without_sandbox!();
    for mode in ["workspace_write", "network_allowed"] {
        let workspace = scratch_dir();
        let elsewhere = scratch_dir();
        let inside = workspace.path().join("inside.txt");
        let outside = elsewhere.path().join("outside.txt");
        let invocation = Invocation::new(mode, workspace.path());

        let output = run_sh(&invocation, &format!("echo hi > {}", shell_quote(&inside))).await;
        assert!(output.status.success(), "{mode}: {}", describe(&output));
        assert!(inside.exists(), "{mode}: workspace write should land");

        let output = run_sh(&invocation, &format!("echo hi > {}", shell_quote(&outside))).await;
        assert!(!output.status.success(), "{mode}: {}", describe(&output));
        assert!(!outside.exists(), "{mode}: write outside the workspace");
    }
}

#[tokio::test]
async fn workspace_write_can_create_and_remove_directories() {
    skip_without_sandbox!();
    let workspace = scratch_dir();
    let nested = workspace.path().join("a").join("b");
    let script = format!(
        "mkdir -p {nested} && rmdir {nested}",
        nested = shell_quote(&nested)
    );

    let output = run_sh(&Invocation::new("workspace_write", workspace.path()), &script).await;
    assert!(output.status.success(), "{}", describe(&output));
    assert!(workspace.path().join("a").is_dir());
    assert!(!nested.exists());
}

#[tokio::test]
async fn read_only_can_still_write_tmp() {
    skip_without_sandbox!();
    let workspace = scratch_dir();
    let script = "f=$(mktemp -p /tmp linux-sandbox-test.XXXXXX) && echo ok > \"$f\" && cat \"$f\" && rm \"$f\"";

    let output = run_sh(&Invocation::new("read_only", workspace.path()), script).await;
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ok\n");
}

#[tokio::test]
async fn without_readable_roots_only_workspace_and_tmp_are_reachable() {
    skip_without_sandbox!();
    let workspace = scratch_dir();
    let invocation = Invocation {
        readable_root: false,
        ..Invocation::new("read_only", workspace.path())
    };

    // /bin/sh lives outside the three granted paths, so it cannot be loaded.
    let output = run_sh(&invocation, "true").await;
    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to execvp /bin/sh"), "{stderr}");
}
