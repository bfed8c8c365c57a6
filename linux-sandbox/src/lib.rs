//! Linux sandbox helper entry point.
//!
//! On Linux, `codex-linux-sandbox` confines *itself* and then `execvp`s the
//! target command, so the restrictions are inherited by the command and all
//! of its descendants:
//! - Landlock for filesystem access (workspace, scratch directories), and
//! - `no_new_privs` + a seccomp deny-list for dangerous syscalls.
#[cfg(target_os = "linux")]
pub mod cli;
#[cfg(target_os = "linux")]
pub mod command_args;
#[cfg(target_os = "linux")]
pub mod config;
#[cfg(target_os = "linux")]
pub mod error;
#[cfg(target_os = "linux")]
mod exec;
#[cfg(target_os = "linux")]
pub mod landlock;
#[cfg(target_os = "linux")]
mod linux_run_main;
#[cfg(target_os = "linux")]
pub mod mode;
#[cfg(target_os = "linux")]
pub mod sandbox;
#[cfg(target_os = "linux")]
pub mod seccomp;

#[cfg(target_os = "linux")]
pub fn run_main() -> ! {
    linux_run_main::run_main();
}

#[cfg(not(target_os = "linux"))]
pub fn run_main() -> ! {
    eprintln!("codex-linux-sandbox is only supported on Linux");
    std::process::exit(1);
}
