// WMI queries through the `wmi` crate.
//
// Two classes are read: `Win32_OperatingSystem` for the NT version and
// `Win32_QuickFixEngineering` for installed hotfixes. Rows are deserialized
// with serde straight into the structs below. Off Windows, connecting fails
// with `UnsupportedPlatform`.

use serde::Deserialize;

/// Query for the OS version string, e.g. `6.3.9600`.
pub const OS_VERSION_QUERY: &str = "SELECT Version FROM Win32_OperatingSystem";

/// One row of `Win32_OperatingSystem`.
#[derive(Debug, Deserialize)]
#[serde(rename = "Win32_OperatingSystem", rename_all = "PascalCase")]
pub struct OperatingSystem {
    pub version: String,
}

/// One row of `Win32_QuickFixEngineering`.
#[derive(Debug, Deserialize)]
#[serde(rename = "Win32_QuickFixEngineering")]
pub struct QuickFixEngineering {
    // `PascalCase` would give `HotFixId`; WMI spells it `HotFixID`.
    #[serde(rename = "HotFixID")]
    pub hot_fix_id: String,
}

/// WQL selecting the hotfixes matched by `filter`, the output of
/// `hotfix_filter` (which starts with a space).
pub fn hotfix_query(filter: &str) -> String {
    format!("SELECT HotFixID FROM Win32_QuickFixEngineering WHERE{filter}")
}

#[cfg(windows)]
mod session {
    use crate::log_debug;
    use crate::schemas::errors::{FrameworkError, Result};
    use colored::Colorize;
    use serde::de::DeserializeOwned;
    use wmi::{COMLibrary, WMIConnection};

    /// A connection to the local `ROOT\CIMV2` namespace.
    ///
    /// COM security can only be initialized once per process, so one session
    /// is opened lazily and reused for every query.
    pub struct WmiSession {
        connection: WMIConnection,
    }

    impl WmiSession {
        pub fn connect() -> Result<Self> {
            let connection = COMLibrary::new()
                .and_then(WMIConnection::new)
                .map_err(|e| FrameworkError::Wmi {
                    query: "connect to ROOT\\CIMV2".to_string(),
                    detail: e.to_string(),
                })?;
            Ok(Self { connection })
        }

        /// Runs `query` and deserializes every returned row into `T`.
        pub fn query<T: DeserializeOwned>(&self, query: &str) -> Result<Vec<T>> {
            log_debug!("[WMI] {}", query.cyan());
            self.connection.raw_query(query).map_err(|e| FrameworkError::Wmi {
                query: query.to_string(),
                detail: e.to_string(),
            })
        }
    }
}

#[cfg(not(windows))]
mod session {
    use crate::schemas::errors::{FrameworkError, Result};
    use serde::de::DeserializeOwned;

    pub struct WmiSession;

    impl WmiSession {
        pub fn connect() -> Result<Self> {
            Err(FrameworkError::UnsupportedPlatform("WMI queries"))
        }

        pub fn query<T: DeserializeOwned>(&self, _query: &str) -> Result<Vec<T>> {
            Err(FrameworkError::UnsupportedPlatform("WMI queries"))
        }
    }
}

pub use session::WmiSession;
