// In-memory `WindowsHost` for tests. Records every call in order and answers
// queries from canned data.

use super::{FeatureRequest, PackageRequest, WindowsHost};
use crate::schemas::errors::{FrameworkError, Result};
use crate::schemas::version::NtVersion;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Feature {
        name: String,
        all: bool,
        source: Option<String>,
    },
    Package {
        name: String,
        source: String,
        options: String,
        timeout_secs: u64,
        success_codes: Vec<i32>,
    },
    Guard(String),
    HotfixQuery(Vec<String>),
    RebootPendingCheck,
    Reboot(String),
}

pub struct RecordingHost {
    nt: NtVersion,
    dwords: HashMap<(String, String), u32>,
    keys: HashSet<String>,
    hotfixes: HashSet<String>,
    guards: HashMap<String, bool>,
    exit_codes: HashMap<String, i32>,
    /// Feature or package names after which a reboot becomes pending.
    pending_after: HashSet<String>,
    pending: Cell<bool>,
    calls: RefCell<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            nt: NtVersion::new(10, 0),
            dwords: HashMap::new(),
            keys: HashSet::new(),
            hotfixes: HashSet::new(),
            guards: HashMap::new(),
            exit_codes: HashMap::new(),
            pending_after: HashSet::new(),
            pending: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_nt(mut self, nt: NtVersion) -> Self {
        self.nt = nt;
        self
    }

    pub fn with_dword(mut self, key: &str, value: &str, data: u32) -> Self {
        self.keys.insert(key.to_string());
        self.dwords.insert((key.to_string(), value.to_string()), data);
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.keys.insert(key.to_string());
        self
    }

    pub fn with_hotfixes(mut self, ids: &[&str]) -> Self {
        self.hotfixes.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn with_guard(mut self, command: &str, succeeds: bool) -> Self {
        self.guards.insert(command.to_string(), succeeds);
        self
    }

    pub fn with_exit_code(mut self, package: &str, code: i32) -> Self {
        self.exit_codes.insert(package.to_string(), code);
        self
    }

    pub fn with_reboot_pending(self, pending: bool) -> Self {
        self.pending.set(pending);
        self
    }

    pub fn with_pending_after(mut self, name: &str) -> Self {
        self.pending_after.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Names of installed features and packages, in call order.
    pub fn installed(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Feature { name, .. } | HostCall::Package { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn reboots(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Reboot(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }

    fn mark_pending_after(&self, name: &str) {
        if self.pending_after.contains(name) {
            self.pending.set(true);
        }
    }
}

impl WindowsHost for RecordingHost {
    fn nt_version(&self) -> Result<NtVersion> {
        Ok(self.nt)
    }

    fn registry_dword(&self, key: &str, value: &str) -> Result<Option<u32>> {
        Ok(self.dwords.get(&(key.to_string(), value.to_string())).copied())
    }

    fn registry_key_exists(&self, key: &str) -> Result<bool> {
        Ok(self.keys.contains(key))
    }

    fn install_feature(&self, request: &FeatureRequest<'_>) -> Result<()> {
        self.record(HostCall::Feature {
            name: request.name.to_string(),
            all: request.all,
            source: request.source.map(str::to_string),
        });
        self.mark_pending_after(request.name);
        Ok(())
    }

    fn install_package(&self, request: &PackageRequest<'_>) -> Result<i32> {
        self.record(HostCall::Package {
            name: request.name.to_string(),
            source: request.source.to_string(),
            options: request.options.to_string(),
            timeout_secs: request.timeout.as_secs(),
            success_codes: request.success_codes.to_vec(),
        });
        let code = self.exit_codes.get(request.name).copied().unwrap_or(0);
        if !request.success_codes.contains(&code) {
            return Err(FrameworkError::CommandFailed {
                program: request.name.to_string(),
                code,
                output: String::new(),
            });
        }
        self.mark_pending_after(request.name);
        Ok(code)
    }

    fn run_guard_command(&self, command: &str) -> Result<bool> {
        self.record(HostCall::Guard(command.to_string()));
        Ok(self.guards.get(command).copied().unwrap_or(false))
    }

    fn installed_hotfixes(&self, hotfix_ids: &[String]) -> Result<Vec<String>> {
        self.record(HostCall::HotfixQuery(hotfix_ids.to_vec()));
        Ok(hotfix_ids
            .iter()
            .filter(|id| self.hotfixes.contains(*id))
            .cloned()
            .collect())
    }

    fn reboot_pending(&self) -> Result<bool> {
        self.record(HostCall::RebootPendingCheck);
        Ok(self.pending.get())
    }

    fn reboot_now(&self, reason: &str) -> Result<bool> {
        self.record(HostCall::Reboot(reason.to_string()));
        Ok(true)
    }
}
