//! Landlock filesystem policy: building the ruleset, then committing it to
//! the calling process together with `no_new_privs`.
//!
//! Kernel access goes through [`FilesystemBackend`] so the sequencing
//! (which grants are fatal, when `no_new_privs` is set, when the ruleset is
//! released) can be exercised without restricting the test process.
use std::path::Path;
use std::path::PathBuf;

use landlock::CompatLevel;
use landlock::Compatible;
use landlock::PathBeneath;
use landlock::PathFd;
use landlock::Ruleset;
use landlock::RulesetAttr;
use landlock::RulesetCreated;
use landlock::RulesetCreatedAttr;
use landlock::RulesetStatus;
use tracing::debug;

use crate::config::ALTERNATE_TMP_DIR;
use crate::config::PRIMARY_TMP_DIR;
use crate::error::BoxError;
use crate::error::Result;
use crate::error::SandboxErr;
use crate::mode::AccessRights;

/// Kernel operations needed to confine the calling process' filesystem view.
pub trait FilesystemBackend {
    /// Kernel-owned ruleset. Dropping it releases the kernel object.
    type Ruleset;

    fn create_ruleset(&self, handled: AccessRights) -> std::result::Result<Self::Ruleset, BoxError>;

    /// Open `path` only long enough to anchor a rule granting `access`
    /// beneath it.
    fn add_rule(
        &self,
        ruleset: &mut Self::Ruleset,
        path: &Path,
        access: AccessRights,
    ) -> std::result::Result<(), BoxError>;

    fn set_no_new_privs(&self) -> std::io::Result<()>;

    fn restrict_self(&self, ruleset: Self::Ruleset) -> std::result::Result<(), BoxError>;
}

/// A directory and the rights granted beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathGrant {
    pub path: PathBuf,
    pub access: AccessRights,
}

impl PathGrant {
    pub fn new(path: impl Into<PathBuf>, access: AccessRights) -> Self {
        Self {
            path: path.into(),
            access,
        }
    }
}

/// The grants that make up the filesystem policy for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilesystemPolicy {
    /// Every one of these must be registered.
    pub required: Vec<PathGrant>,
    /// Registered when possible; failures are ignored.
    pub best_effort: Vec<PathGrant>,
}

impl FilesystemPolicy {
    /// Workspace with its mode-specific rights, any extra readable roots,
    /// and the scratch directories with full rights.
    pub fn for_workspace(
        workspace: &Path,
        workspace_access: AccessRights,
        readable_roots: &[PathBuf],
    ) -> Self {
        let mut required = vec![PathGrant::new(workspace, workspace_access)];
        required.extend(
            readable_roots
                .iter()
                .map(|root| PathGrant::new(root, AccessRights::read())),
        );
        required.push(PathGrant::new(PRIMARY_TMP_DIR, AccessRights::read_write()));

        Self {
            required,
            best_effort: vec![PathGrant::new(
                ALTERNATE_TMP_DIR,
                AccessRights::read_write(),
            )],
        }
    }

    /// Build the ruleset and commit it to the calling process.
    pub fn apply<B: FilesystemBackend>(&self, backend: &B) -> Result<FilesystemRestricted> {
        let mut ruleset = FilesystemRuleset::create(backend)?;
        for grant in &self.required {
            ruleset.grant(grant)?;
        }
        for grant in &self.best_effort {
            ruleset.grant_best_effort(grant);
        }
        ruleset.commit()
    }
}

/// Proof that a Landlock ruleset was committed to this process.
#[must_use]
#[derive(Debug)]
pub struct FilesystemRestricted {
    _private: (),
}

/// A ruleset that has been created but not yet committed.
///
/// [`FilesystemRuleset::commit`] consumes the value, so no grant can be
/// added once the restriction is in force.
pub struct FilesystemRuleset<'a, B: FilesystemBackend> {
    backend: &'a B,
    inner: B::Ruleset,
}

impl<'a, B: FilesystemBackend> FilesystemRuleset<'a, B> {
    /// Create a ruleset handling every read-class and write-class right.
    pub fn create(backend: &'a B) -> Result<Self> {
        let inner = backend
            .create_ruleset(AccessRights::read_write())
            .map_err(SandboxErr::filesystem)?;
        Ok(Self { backend, inner })
    }

    pub fn grant(&mut self, grant: &PathGrant) -> Result<()> {
        self.backend
            .add_rule(&mut self.inner, &grant.path, grant.access)
            .map_err(|source| SandboxErr::GrantFailed {
                path: grant.path.clone(),
                source,
            })?;
        debug!(path = %grant.path.display(), access = grant.access.bits(), "landlock grant added");
        Ok(())
    }

    pub fn grant_best_effort(&mut self, grant: &PathGrant) {
        if let Err(err) = self.grant(grant) {
            debug!("skipping optional landlock grant: {err}");
        }
    }

    /// Set `no_new_privs`, then restrict the calling process. The ruleset is
    /// released on every path out of this function.
    pub fn commit(self) -> Result<FilesystemRestricted> {
        let FilesystemRuleset { backend, inner } = self;
        backend
            .set_no_new_privs()
            .map_err(SandboxErr::filesystem)?;
        backend.restrict_self(inner).map_err(SandboxErr::filesystem)?;
        debug!("landlock ruleset committed");
        Ok(FilesystemRestricted { _private: () })
    }
}

/// The host kernel's Landlock implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct LandlockBackend;

impl FilesystemBackend for LandlockBackend {
    type Ruleset = RulesetCreated;

    fn create_ruleset(&self, handled: AccessRights) -> std::result::Result<RulesetCreated, BoxError> {
        // Hard requirement: a kernel without Landlock must surface as an
        // error, not as a ruleset that silently enforces nothing.
        let ruleset = Ruleset::default()
            .set_compatibility(CompatLevel::HardRequirement)
            .handle_access(handled.as_access_fs())?
            .create()?
            // `no_new_privs` is set explicitly by the committer.
            .set_no_new_privs(false);
        Ok(ruleset)
    }

    fn add_rule(
        &self,
        ruleset: &mut RulesetCreated,
        path: &Path,
        access: AccessRights,
    ) -> std::result::Result<(), BoxError> {
        // `PathFd` opens with `O_PATH | O_CLOEXEC` and is closed when the
        // rule is dropped at the end of this call.
        let fd = PathFd::new(path)?;
        ruleset.add_rule(PathBeneath::new(fd, access.as_access_fs()))?;
        Ok(())
    }

    fn set_no_new_privs(&self) -> std::io::Result<()> {
        set_no_new_privs()
    }

    fn restrict_self(&self, ruleset: RulesetCreated) -> std::result::Result<(), BoxError> {
        let status = ruleset.restrict_self()?;
        if status.ruleset == RulesetStatus::NotEnforced {
            return Err("the kernel did not enforce the landlock ruleset".into());
        }
        Ok(())
    }
}

/// Enable `PR_SET_NO_NEW_PRIVS` for this process and everything it execs.
fn set_no_new_privs() -> std::io::Result<()> {
    let result = unsafe { libc::prctl(libc::PR_SET_NO_NEW_PRIVS, 1, 0, 0, 0) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
