//! Process-wide configuration for the helper.
//!
//! The only knob is the escape hatch, read from the environment. There is no
//! command-line flag for it.

use std::ffi::OsStr;

/// Setting this to exactly `1` downgrades sandbox setup failures to warnings.
pub const ALLOW_NO_SANDBOX_ENV_VAR: &str = "AGENT_STUDIO_UNSAFE_ALLOW_NO_SANDBOX";

const ALLOW_NO_SANDBOX_ENABLED: &str = "1";

/// Always writable, whatever the mode.
pub const PRIMARY_TMP_DIR: &str = "/tmp";

/// Writable when present. On most Linux hosts this does not exist.
pub const ALTERNATE_TMP_DIR: &str = "/private/tmp";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Continue without a mechanism whose policy could not be applied.
    pub allow_no_sandbox: bool,
}

impl SandboxConfig {
    /// Read the configuration from the environment. Call once, at startup.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(ALLOW_NO_SANDBOX_ENV_VAR).as_deref())
    }

    pub fn from_env_value(value: Option<&OsStr>) -> Self {
        Self {
            allow_no_sandbox: value == Some(OsStr::new(ALLOW_NO_SANDBOX_ENABLED)),
        }
    }
}
