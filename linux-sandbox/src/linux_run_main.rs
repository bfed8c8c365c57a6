use clap::Parser;
use tracing::debug;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::SandboxCommand;
use crate::config::SandboxConfig;
use crate::exec::execvp;
use crate::landlock::LandlockBackend;
use crate::sandbox::ExecutionRequest;
use crate::sandbox::apply_sandbox;
use crate::seccomp::SeccompBackend;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Keeps this crate's warnings and errors on when `RUST_LOG` is set.
const CRATE_LOG_DIRECTIVE: &str = "agent_studio_linux_sandbox=warn";

/// Exit status when the sandbox could not be applied or the command could
/// not be launched. Usage errors exit with 2 via clap.
const FAILURE_EXIT_CODE: i32 = 1;

/// Entry point for the Linux sandbox helper.
///
/// The sequence is:
/// 1. Parse the invocation (usage errors exit 2 before anything else).
/// 2. Read the escape hatch from the environment, once.
/// 3. Commit the Landlock ruleset, then the seccomp filter, unless the mode
///    is `full_access`.
/// 4. `execvp` into the final command.
pub fn run_main() -> ! {
    let request = ExecutionRequest::from(SandboxCommand::parse());
    init_tracing();
    let config = SandboxConfig::from_env();

    match apply_sandbox(&request, &config, &LandlockBackend, &SeccompBackend) {
        Ok(outcome) => debug!(mode = %request.mode, ?outcome, "sandbox ready"),
        Err(err) => {
            error!("{err}");
            std::process::exit(FAILURE_EXIT_CODE);
        }
    }

    let err = execvp(&request.command);
    error!("{err}");
    std::process::exit(FAILURE_EXIT_CODE);
}

/// Diagnostics go to stderr so the command's stdout stays untouched.
fn init_tracing() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = EnvFilter::try_new(log_directives(rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    // Failing to install a subscriber only loses diagnostics.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Filter directives for the helper's own events. Fatal errors and escape
/// hatch warnings from this crate stay visible whatever `RUST_LOG` says about
/// other targets; a directive naming this crate explicitly still overrides it.
fn log_directives(rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(rust_log) if !rust_log.is_empty() => {
            format!("{CRATE_LOG_DIRECTIVE},{rust_log}")
        }
        _ => DEFAULT_LOG_LEVEL.to_string(),
    }
}
