//! Sandbox modes and the filesystem rights they translate to.

use std::fmt;
use std::ops::BitOr;
use std::ops::BitOrAssign;

use clap::ValueEnum;
use landlock::AccessFs;
use landlock::BitFlags;

/// Sandbox mode selected with `--mode`.
///
/// `NetworkAllowed` only widens filesystem rights the same way
/// `WorkspaceWrite` does. This helper never restricts network access; that
/// has to be arranged by whoever launches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum SandboxMode {
    ReadOnly,
    WorkspaceWrite,
    NetworkAllowed,
    FullAccess,
}

impl SandboxMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SandboxMode::ReadOnly => "read_only",
            SandboxMode::WorkspaceWrite => "workspace_write",
            SandboxMode::NetworkAllowed => "network_allowed",
            SandboxMode::FullAccess => "full_access",
        }
    }

    /// Rights granted on the workspace, or `None` when the mode applies no
    /// policy at all.
    pub fn workspace_access(self) -> Option<AccessRights> {
        match self {
            SandboxMode::ReadOnly => Some(AccessRights::read()),
            SandboxMode::WorkspaceWrite | SandboxMode::NetworkAllowed => {
                Some(AccessRights::read_write())
            }
            SandboxMode::FullAccess => None,
        }
    }
}

impl fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of Landlock filesystem rights.
///
/// Rights only ever accumulate: there is no way to remove a right from a
/// value once it has been built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRights(BitFlags<AccessFs>);

impl AccessRights {
    pub fn empty() -> Self {
        Self(BitFlags::empty())
    }

    /// Execute, read file and read directory.
    pub fn read() -> Self {
        Self(AccessFs::Execute | AccessFs::ReadFile | AccessFs::ReadDir)
    }

    /// Every right that creates, modifies or removes a filesystem entry.
    pub fn write() -> Self {
        Self(
            AccessFs::WriteFile
                | AccessFs::RemoveDir
                | AccessFs::RemoveFile
                | AccessFs::MakeChar
                | AccessFs::MakeDir
                | AccessFs::MakeReg
                | AccessFs::MakeSock
                | AccessFs::MakeFifo
                | AccessFs::MakeBlock
                | AccessFs::MakeSym,
        )
    }

    pub fn read_write() -> Self {
        Self::read() | Self::write()
    }

    pub fn contains(self, other: AccessRights) -> bool {
        self.0.contains(other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0.is_empty()
    }

    pub fn bits(self) -> u64 {
        self.0.bits()
    }

    pub fn as_access_fs(self) -> BitFlags<AccessFs> {
        self.0
    }
}

impl BitOr for AccessRights {
    type Output = AccessRights;

    fn bitor(self, rhs: AccessRights) -> AccessRights {
        AccessRights(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessRights {
    fn bitor_assign(&mut self, rhs: AccessRights) {
        self.0 |= rhs.0;
    }
}

impl From<AccessFs> for AccessRights {
    fn from(access: AccessFs) -> Self {
        Self(access.into())
    }
}
