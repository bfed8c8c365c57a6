//! seccomp deny-list applied to the calling process before exec.
use std::collections::BTreeMap;

use seccompiler::BpfProgram;
use seccompiler::SeccompAction;
use seccompiler::SeccompFilter;
use seccompiler::SeccompRule;
use seccompiler::TargetArch;
use tracing::debug;

use crate::error::BoxError;
use crate::error::Result;
use crate::error::SandboxErr;

/// Syscalls that fail with `EPERM` inside the sandbox. Everything else is
/// allowed.
pub const DENIED_SYSCALLS: &[(&str, i64)] = &[
    ("ptrace", libc::SYS_ptrace),
    ("kexec_load", libc::SYS_kexec_load),
    ("kexec_file_load", libc::SYS_kexec_file_load),
    ("reboot", libc::SYS_reboot),
    ("mount", libc::SYS_mount),
    ("umount2", libc::SYS_umount2),
    ("bpf", libc::SYS_bpf),
];

/// Installs a compiled filter on the calling process.
pub trait SyscallBackend {
    fn apply_filter(&self, program: &BpfProgram) -> std::result::Result<(), BoxError>;
}

/// The host kernel's seccomp implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeccompBackend;

impl SyscallBackend for SeccompBackend {
    fn apply_filter(&self, program: &BpfProgram) -> std::result::Result<(), BoxError> {
        seccompiler::apply_filter(program)?;
        Ok(())
    }
}

/// Proof that the syscall filter was installed on this process.
#[must_use]
#[derive(Debug)]
pub struct SyscallsRestricted {
    _private: (),
}

/// A compiled default-allow filter that has not been installed yet.
#[derive(Debug)]
pub struct SyscallPolicy {
    program: BpfProgram,
}

impl SyscallPolicy {
    /// Compile [`DENIED_SYSCALLS`] for the architecture this binary targets.
    pub fn deny_list() -> Result<Self> {
        Self::for_arch(std::env::consts::ARCH)
    }

    fn for_arch(arch: &str) -> Result<Self> {
        let target_arch: TargetArch = arch.try_into().map_err(SandboxErr::syscall)?;

        // An empty rule vector matches the syscall unconditionally.
        let rules: BTreeMap<i64, Vec<SeccompRule>> = DENIED_SYSCALLS
            .iter()
            .map(|(_, nr)| (*nr, vec![]))
            .collect();

        let filter = SeccompFilter::new(
            rules,
            SeccompAction::Allow,                     // default: allow
            SeccompAction::Errno(libc::EPERM as u32), // listed syscalls fail with EPERM
            target_arch,
        )
        .map_err(SandboxErr::syscall)?;
        let program: BpfProgram = filter.try_into().map_err(SandboxErr::syscall)?;
        Ok(Self { program })
    }

    pub fn instruction_count(&self) -> usize {
        self.program.len()
    }

    /// Install the filter. The compiled program is dropped whether or not the
    /// kernel accepted it.
    pub fn commit<B: SyscallBackend>(self, backend: &B) -> Result<SyscallsRestricted> {
        backend
            .apply_filter(&self.program)
            .map_err(SandboxErr::syscall)?;
        debug!(denied = DENIED_SYSCALLS.len(), "seccomp filter installed");
        Ok(SyscallsRestricted { _private: () })
    }
}
