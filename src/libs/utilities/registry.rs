// Registry reads through the `winreg` crate.
//
// Keys are written the way `regedit` and `reg.exe` show them, hive first:
//
//     HKLM\SOFTWARE\Microsoft\NET Framework Setup\NDP\v4\Full
//
// A missing key or value is not an error; it is how "not installed" and
// "no reboot pending" look in the registry. Off Windows every read fails
// with `UnsupportedPlatform`.

use crate::schemas::errors::{FrameworkError, Result};
use std::io;

/// The registry roots a catalog key may start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

/// Splits `HKLM\Path\To\Key` into its hive and the path below it.
///
/// # Arguments
/// * `key` - A full key path. Both the short (`HKLM`) and long
///   (`HKEY_LOCAL_MACHINE`) hive names are accepted, in any case.
///
/// # Returns
/// * `Ok((hive, path))` with surrounding backslashes removed from `path`.
/// * `Err(FrameworkError::Registry)` for an unknown hive.
pub fn split_key(key: &str) -> Result<(Hive, &str)> {
    let (root, path) = key.split_once('\\').unwrap_or((key, ""));
    let hive = match root.to_ascii_uppercase().as_str() {
        "HKLM" | "HKEY_LOCAL_MACHINE" => Hive::LocalMachine,
        "HKCU" | "HKEY_CURRENT_USER" => Hive::CurrentUser,
        _ => {
            return Err(FrameworkError::Registry {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, format!("unknown registry hive '{root}'")),
            });
        }
    };
    Ok((hive, path.trim_matches('\\')))
}

#[cfg(windows)]
mod native {
    use super::{Hive, split_key};
    use crate::log_debug;
    use crate::schemas::errors::{FrameworkError, Result};
    use colored::Colorize;
    use std::io;
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    /// Maps "not found" to `None` and any other failure to a registry error.
    fn found<T>(result: io::Result<T>, what: &str) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FrameworkError::Registry {
                key: what.to_string(),
                source,
            }),
        }
    }

    /// Opens `key` for reading, `None` if it does not exist.
    fn open(key: &str) -> Result<Option<RegKey>> {
        let (hive, path) = split_key(key)?;
        let root = RegKey::predef(match hive {
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::CurrentUser => HKEY_CURRENT_USER,
        });
        found(root.open_subkey(path), key)
    }

    pub fn read_dword(key: &str, value: &str) -> Result<Option<u32>> {
        let Some(opened) = open(key)? else {
            log_debug!("[Registry] Key {} not found", key.cyan());
            return Ok(None);
        };
        found(opened.get_value::<u32, _>(value), &format!("{key}\\{value}"))
    }

    pub fn key_exists(key: &str) -> Result<bool> {
        Ok(open(key)?.is_some())
    }

    /// `true` when `value` exists under `key`, whatever its type.
    pub fn value_exists(key: &str, value: &str) -> Result<bool> {
        match open(key)? {
            // `get_raw_value` accepts every value type (REG_MULTI_SZ included).
            Some(opened) => Ok(found(opened.get_raw_value(value), &format!("{key}\\{value}"))?.is_some()),
            None => Ok(false),
        }
    }
}

#[cfg(not(windows))]
mod native {
    use super::split_key;
    use crate::schemas::errors::{FrameworkError, Result};

    pub fn read_dword(key: &str, _value: &str) -> Result<Option<u32>> {
        split_key(key)?;
        Err(FrameworkError::UnsupportedPlatform("registry access"))
    }

    pub fn key_exists(key: &str) -> Result<bool> {
        split_key(key)?;
        Err(FrameworkError::UnsupportedPlatform("registry access"))
    }

    pub fn value_exists(key: &str, _value: &str) -> Result<bool> {
        split_key(key)?;
        Err(FrameworkError::UnsupportedPlatform("registry access"))
    }
}

pub use native::{key_exists, read_dword, value_exists};
