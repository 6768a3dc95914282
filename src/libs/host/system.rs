// `WindowsHost` for the machine we run on.
//
// Registry reads go through `winreg` and WMI queries through `wmi`. Optional
// features are enabled with `dism.exe`, guard commands run under `cmd.exe`
// and reboots go through `shutdown.exe`. Package installers run directly, or
// through `wusa.exe` for `.msu` updates and `msiexec.exe` for `.msi` packages.

use super::{FeatureRequest, PackageRequest, WindowsHost, hotfix_filter};
use crate::libs::utilities::download::fetch_package;
use crate::libs::utilities::process::{capture, exit_code, output_text, run_capture, run_with_timeout};
use crate::libs::utilities::registry;
use crate::libs::utilities::wmi_queries::{
    OS_VERSION_QUERY, OperatingSystem, QuickFixEngineering, WmiSession, hotfix_query,
};
use crate::schemas::errors::{FrameworkError, Result};
use crate::schemas::version::NtVersion;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::cell::{Cell, OnceCell};
use std::path::Path;
use std::process::Command;

/// "Success, restart required" exit code of Windows installers and DISM.
const ERROR_SUCCESS_REBOOT_REQUIRED: i32 = 3010;

// Any one of these means Windows is waiting for a restart.
const CBS_REBOOT_PENDING: &str =
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\Component Based Servicing\RebootPending";
const WU_REBOOT_REQUIRED: &str =
    r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\WindowsUpdate\Auto Update\RebootRequired";
const SESSION_MANAGER: &str = r"HKLM\SYSTEM\CurrentControlSet\Control\Session Manager";
const PENDING_RENAMES: &str = "PendingFileRenameOperations";

#[derive(Default)]
pub struct SystemHost {
    /// Set when an installer or DISM returned 3010 during this run.
    restart_requested: Cell<bool>,
    /// Opened on the first WMI query.
    wmi: OnceCell<WmiSession>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The WMI session, connecting on first use.
    fn wmi(&self) -> Result<&WmiSession> {
        if let Some(session) = self.wmi.get() {
            return Ok(session);
        }
        let session = WmiSession::connect()?;
        Ok(self.wmi.get_or_init(|| session))
    }

    /// Checks an exit code against the codes that count as success.
    ///
    /// # Arguments
    /// * `program` - What ran, for the error message.
    /// * `code` - The exit code it returned.
    /// * `success_codes` - Codes that count as success.
    /// * `output` - Detail for the error when `code` is not accepted.
    ///
    /// # Returns
    /// * `Ok(code)` when accepted. A 3010 also marks a reboot as pending.
    /// * `Err(FrameworkError::CommandFailed)` otherwise.
    fn accept_exit_code(&self, program: &str, code: i32, success_codes: &[i32], output: &str) -> Result<i32> {
        if !success_codes.contains(&code) {
            return Err(FrameworkError::CommandFailed {
                program: program.to_string(),
                code,
                output: output.to_string(),
            });
        }
        if code == ERROR_SUCCESS_REBOOT_REQUIRED {
            log_info!("[Reboot] Exit code {} reported: a reboot is required", code);
            self.restart_requested.set(true);
        }
        Ok(code)
    }
}

impl WindowsHost for SystemHost {
    fn nt_version(&self) -> Result<NtVersion> {
        let rows: Vec<OperatingSystem> = self.wmi()?.query(OS_VERSION_QUERY)?;
        let Some(os) = rows.into_iter().next() else {
            return Err(FrameworkError::Wmi {
                query: OS_VERSION_QUERY.to_string(),
                detail: "no rows returned".to_string(),
            });
        };
        log_debug!("[Host] Win32_OperatingSystem.Version = {}", os.version);
        os.version.parse()
    }

    fn registry_dword(&self, key: &str, value: &str) -> Result<Option<u32>> {
        registry::read_dword(key, value)
    }

    fn registry_key_exists(&self, key: &str) -> Result<bool> {
        registry::key_exists(key)
    }

    fn install_feature(&self, request: &FeatureRequest<'_>) -> Result<()> {
        let args = dism_feature_args(request);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = run_capture("dism.exe", &args)?;
        self.accept_exit_code(
            &format!("dism.exe /Enable-Feature /FeatureName:{}", request.name),
            exit_code(&output.status),
            &[0, ERROR_SUCCESS_REBOOT_REQUIRED],
            &output_text(&output),
        )?;
        Ok(())
    }

    fn install_package(&self, request: &PackageRequest<'_>) -> Result<i32> {
        // Dropped at the end of this call, taking the download with it.
        let scratch = tempfile::Builder::new().prefix("setup-dotnet-").tempdir()?;
        let installer = fetch_package(request.name, request.source, request.checksum, scratch.path())?;

        let (program, args) = installer_command(&installer, request.options);
        log_info!(
            "[Packages] Running {} {}",
            program.cyan(),
            args.join(" ").dimmed()
        );
        let mut command = Command::new(&program);
        command.args(&args);
        let code = run_with_timeout(&program, &mut command, request.timeout)?;

        self.accept_exit_code(
            request.name,
            code,
            request.success_codes,
            &format!("expected one of {:?}", request.success_codes),
        )
    }

    fn run_guard_command(&self, command: &str) -> Result<bool> {
        Ok(capture("cmd.exe", &mut guard_command(command))?.status.success())
    }

    fn installed_hotfixes(&self, hotfix_ids: &[String]) -> Result<Vec<String>> {
        let Some(filter) = hotfix_filter(hotfix_ids) else {
            return Ok(Vec::new());
        };
        let rows: Vec<QuickFixEngineering> = self.wmi()?.query(&hotfix_query(&filter))?;
        Ok(rows.into_iter().map(|row| row.hot_fix_id).collect())
    }

    fn reboot_pending(&self) -> Result<bool> {
        // Our own installers may have asked for a restart the registry does not show yet.
        if self.restart_requested.get() {
            return Ok(true);
        }
        Ok(registry::key_exists(CBS_REBOOT_PENDING)?
            || registry::key_exists(WU_REBOOT_REQUIRED)?
            || registry::value_exists(SESSION_MANAGER, PENDING_RENAMES)?)
    }

    fn reboot_now(&self, reason: &str) -> Result<bool> {
        // p:4:1 = planned, application installation.
        let output = run_capture("shutdown.exe", &["/r", "/t", "0", "/d", "p:4:1", "/c", reason])?;
        if !output.status.success() {
            return Err(FrameworkError::CommandFailed {
                program: "shutdown.exe".to_string(),
                code: exit_code(&output.status),
                output: output_text(&output),
            });
        }
        Ok(true)
    }
}

/// The `cmd.exe` command line that runs a guard, passed through unquoted.
fn guard_command_line(command: &str) -> String {
    format!("/C {command}")
}

/// `cmd.exe` running `command`.
///
/// `cmd.exe` does its own parsing of everything after `/C`, so on Windows the
/// guard goes in as a raw argument. Quoting it again would hand `cmd.exe`
/// `\"` sequences it does not understand.
fn guard_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd.exe");
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.raw_arg(guard_command_line(command));
    }
    #[cfg(not(windows))]
    cmd.args(["/C", command]);
    cmd
}

/// Arguments for `dism.exe` enabling one feature.
fn dism_feature_args(request: &FeatureRequest<'_>) -> Vec<String> {
    let mut args = vec![
        "/Online".to_string(),
        "/Enable-Feature".to_string(),
        format!("/FeatureName:{}", request.name),
        "/NoRestart".to_string(),
        "/Quiet".to_string(),
    ];
    if request.all {
        args.push("/All".to_string());
    }
    if let Some(source) = request.source {
        args.push(format!("/Source:{source}"));
        args.push("/LimitAccess".to_string());
    }
    args
}

/// Program and arguments that run `installer` with `options`.
fn installer_command(installer: &Path, options: &str) -> (String, Vec<String>) {
    let file = installer.to_string_lossy().to_string();
    let options = split_options(options);
    let extension = installer
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "msu" => ("wusa.exe".to_string(), [vec![file], options].concat()),
        "msi" => (
            "msiexec.exe".to_string(),
            [vec!["/i".to_string(), file], options].concat(),
        ),
        _ => (file, options),
    }
}

/// Splits installer options on whitespace, keeping double-quoted runs together.
fn split_options(options: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in options.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn dism_arguments() {
        let basic = FeatureRequest { name: "NetFx3", all: false, source: None };
        assert_eq!(
            dism_feature_args(&basic),
            ["/Online", "/Enable-Feature", "/FeatureName:NetFx3", "/NoRestart", "/Quiet"]
        );

        let full = FeatureRequest { name: "NetFx3", all: true, source: Some(r"D:\sources\sxs") };
        let args = dism_feature_args(&full);
        assert!(args.contains(&"/All".to_string()));
        assert!(args.ends_with(&[r"/Source:D:\sources\sxs".to_string(), "/LimitAccess".to_string()]));
    }

    #[test]
    fn installers_by_extension() {
        let (program, args) = installer_command(&PathBuf::from("ndp48.exe"), "/q /norestart");
        assert_eq!(program, "ndp48.exe");
        assert_eq!(args, ["/q", "/norestart"]);

        let (program, args) = installer_command(&PathBuf::from("Windows8.1-KB2919355-x64.MSU"), "/quiet /norestart");
        assert_eq!(program, "wusa.exe");
        assert_eq!(args, ["Windows8.1-KB2919355-x64.MSU", "/quiet", "/norestart"]);

        let (program, args) = installer_command(&PathBuf::from("netfx.msi"), "/qn");
        assert_eq!(program, "msiexec.exe");
        assert_eq!(args, ["/i", "netfx.msi", "/qn"]);
    }

    #[test]
    fn options_keep_quoted_values() {
        assert_eq!(
            split_options(r#"/q /norestart /log "C:\Program Files\ndp.log""#),
            ["/q", "/norestart", "/log", r"C:\Program Files\ndp.log"]
        );
        assert!(split_options("   ").is_empty());
    }

    #[test]
    fn guard_command_line_is_passed_unquoted() {
        let guard = r#"reg query "HKLM\SOFTWARE\Microsoft\NET Framework Setup\NDP\v4\Full" /v Release"#;
        assert_eq!(
            guard_command_line(guard),
            r#"/C reg query "HKLM\SOFTWARE\Microsoft\NET Framework Setup\NDP\v4\Full" /v Release"#
        );
        assert_eq!(guard_command_line(r#"if exist "C:\a b" exit 1"#), r#"/C if exist "C:\a b" exit 1"#);
    }

    #[cfg(windows)]
    #[test]
    fn guard_is_a_single_raw_argument() {
        let guard = r#"findstr /c:"a b" C:\x.txt"#;
        let command = guard_command(guard);
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, [std::ffi::OsStr::new(&guard_command_line(guard))]);
    }

    #[cfg(not(windows))]
    #[test]
    fn guard_arguments_off_windows() {
        let command = guard_command("exit 1");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["/C", "exit 1"]);
    }

    #[test]
    fn success_exit_code_is_accepted() {
        let host = SystemHost::new();
        assert_eq!(host.accept_exit_code("ndp48.exe", 0, &[0, 3010], "").unwrap(), 0);
        assert!(!host.restart_requested.get());
    }

    #[test]
    fn exit_code_3010_marks_a_reboot_pending() {
        let host = SystemHost::new();
        assert_eq!(host.accept_exit_code("ndp48.exe", 3010, &[0, 3010], "").unwrap(), 3010);
        assert!(host.restart_requested.get());
        // Answered from the flag, before any registry read.
        assert!(host.reboot_pending().unwrap());
    }

    #[test]
    fn unlisted_exit_code_fails() {
        let host = SystemHost::new();
        let err = host
            .accept_exit_code("ndp48.exe", 1603, &[0, 3010], "expected one of [0, 3010]")
            .unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::CommandFailed { ref program, code: 1603, .. } if program == "ndp48.exe"
        ));
        assert!(!host.restart_requested.get());
    }

    #[test]
    fn a_success_code_list_without_3010_rejects_it() {
        let host = SystemHost::new();
        assert!(host.accept_exit_code("ndp48.exe", 3010, &[0], "").is_err());
        assert!(!host.restart_requested.get());
    }
}
