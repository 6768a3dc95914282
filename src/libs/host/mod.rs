//! # Host Primitives
//!
//! Everything `setup-dotnet` does to a machine goes through `WindowsHost`:
//! querying the NT version and registry, enabling OS features, running
//! package installers, evaluating skip guards, and detecting and triggering
//! reboots. The installer logic never spawns processes itself, which keeps it
//! testable and lets `--why-run` swap in `DryRunHost`.

use crate::schemas::errors::Result;
use crate::schemas::version::NtVersion;
use std::time::Duration;

mod dry_run;
#[cfg(test)]
pub mod recording;
mod system;

pub use dry_run::DryRunHost;
pub use system::SystemHost;

/// Enable one optional OS feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRequest<'a> {
    pub name: &'a str,
    /// Also enable parent features (`/All`, NT 6.2 and later).
    pub all: bool,
    /// Alternate payload location (`/Source`), e.g. `D:\sources\sxs`.
    pub source: Option<&'a str>,
}

/// Run one package installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest<'a> {
    pub name: &'a str,
    /// URL or local path of the installer.
    pub source: &'a str,
    pub checksum: &'a str,
    pub options: &'a str,
    pub timeout: Duration,
    pub success_codes: &'a [i32],
}

pub trait WindowsHost {
    /// Version of the running Windows kernel.
    fn nt_version(&self) -> Result<NtVersion>;

    /// DWORD value under `key`, `None` if the key or value is absent.
    fn registry_dword(&self, key: &str, value: &str) -> Result<Option<u32>>;

    fn registry_key_exists(&self, key: &str) -> Result<bool>;

    fn install_feature(&self, request: &FeatureRequest<'_>) -> Result<()>;

    /// Installs a package and returns the installer's exit code, which is
    /// always one of `request.success_codes`.
    fn install_package(&self, request: &PackageRequest<'_>) -> Result<i32>;

    /// Runs a guard command; `true` when it exits successfully.
    fn run_guard_command(&self, command: &str) -> Result<bool>;

    /// Which of `hotfix_ids` are reported by `Win32_QuickFixEngineering`.
    fn installed_hotfixes(&self, hotfix_ids: &[String]) -> Result<Vec<String>>;

    fn reboot_pending(&self) -> Result<bool>;

    /// Requests an immediate restart.
    ///
    /// # Returns
    /// * `true` when the machine is going down; the caller stops converging.
    /// * `false` when the restart was only simulated (why-run) and the caller
    ///   carries on as if the host had come back up.
    fn reboot_now(&self, reason: &str) -> Result<bool>;
}

/// Body of the WQL `WHERE` clause matching any of `hotfix_ids`,
/// e.g. ` HotFixID='KB1' OR HotFixID='KB2'`. `None` for an empty list.
pub fn hotfix_filter(hotfix_ids: &[String]) -> Option<String> {
    if hotfix_ids.is_empty() {
        return None;
    }
    Some(
        hotfix_ids
            .iter()
            .map(|kb| format!(" HotFixID='{}'", kb.replace('\'', "")))
            .collect::<Vec<_>>()
            .join(" OR"),
    )
}
