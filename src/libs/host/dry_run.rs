// Why-run mode: queries go to the real host, changes are only reported.
//
// A reboot is simulated too. After the first "would reboot" the host reports
// no pending reboot, so the rest of the run is reported the way a real run
// would continue once the machine is back up.

use super::{FeatureRequest, PackageRequest, WindowsHost};
use crate::log_info;
use crate::schemas::errors::Result;
use crate::schemas::version::NtVersion;
use colored::Colorize;
use std::cell::Cell;

pub struct DryRunHost<H> {
    // The real host, used for every read-only query.
    inner: H,
    // Set once a reboot has been simulated.
    rebooted: Cell<bool>,
}

impl<H: WindowsHost> DryRunHost<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            rebooted: Cell::new(false),
        }
    }
}

impl<H: WindowsHost> WindowsHost for DryRunHost<H> {
    fn nt_version(&self) -> Result<NtVersion> {
        self.inner.nt_version()
    }

    fn registry_dword(&self, key: &str, value: &str) -> Result<Option<u32>> {
        self.inner.registry_dword(key, value)
    }

    fn registry_key_exists(&self, key: &str) -> Result<bool> {
        self.inner.registry_key_exists(key)
    }

    fn install_feature(&self, request: &FeatureRequest<'_>) -> Result<()> {
        log_info!(
            "[Why-run] Would enable feature {} (all: {}, source: {})",
            request.name.bold(),
            request.all,
            request.source.unwrap_or("default")
        );
        Ok(())
    }

    fn install_package(&self, request: &PackageRequest<'_>) -> Result<i32> {
        log_info!(
            "[Why-run] Would install package {} from {} with options '{}'",
            request.name.bold(),
            request.source.cyan(),
            request.options
        );
        Ok(0)
    }

    // Guards are evaluated for real so the report matches what a real run would skip.
    fn run_guard_command(&self, command: &str) -> Result<bool> {
        self.inner.run_guard_command(command)
    }

    fn installed_hotfixes(&self, hotfix_ids: &[String]) -> Result<Vec<String>> {
        self.inner.installed_hotfixes(hotfix_ids)
    }

    fn reboot_pending(&self) -> Result<bool> {
        // A simulated restart clears whatever the real host has pending.
        if self.rebooted.get() {
            return Ok(false);
        }
        self.inner.reboot_pending()
    }

    fn reboot_now(&self, reason: &str) -> Result<bool> {
        log_info!("[Why-run] Would reboot now: {}", reason.yellow());
        log_info!("[Why-run] Continuing as if the host had restarted");
        self.rebooted.set(true);
        Ok(false)
    }
}
