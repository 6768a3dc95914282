//! # Error Types
//!
//! Every fallible operation below the command layer returns `FrameworkError`.
//! Commands wrap it in `anyhow` with additional context before it reaches `main`.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors raised while converging a `.NET` framework resource.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// The requested version is not in the helper's supported set and
    /// `require_support` is enabled.
    #[error("Can't install unsupported .NET version `{0}'")]
    UnsupportedVersion(String),

    /// A version string that is not a dotted list of at most three numbers.
    #[error("Invalid version string '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Neither the command line nor a resource file named a version.
    #[error("No version given: pass VERSION or set `version` in the resource file")]
    MissingVersion,

    /// No version helper exists for the requested major version.
    #[error("No version helper for .NET major version {0}")]
    UnknownMajorVersion(u64),

    /// The resource file or catalog could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource file or catalog is not valid YAML for its schema.
    #[error("Failed to parse {what}: {source}")]
    ConfigParse {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// An external program (dism, cmd, shutdown, an installer) could not be started.
    #[error("Failed to run '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program finished with an exit code outside its success codes.
    #[error("'{program}' exited with code {code}: {output}")]
    CommandFailed {
        program: String,
        code: i32,
        output: String,
    },

    /// A package installer did not finish within the resource timeout.
    #[error("'{program}' did not finish within {seconds} seconds and was terminated")]
    Timeout { program: String, seconds: u64 },

    /// A package could not be downloaded.
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// The downloaded file does not match the checksum from the catalog.
    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// A registry key or value could not be read.
    #[error("Failed to read registry {key}: {source}")]
    Registry {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A WMI connection or query failed, or returned nothing usable.
    #[error("WMI query '{query}' failed: {detail}")]
    Wmi { query: String, detail: String },

    /// A host primitive that only exists on Windows was used elsewhere.
    #[error("{0} requires Windows")]
    UnsupportedPlatform(&'static str),

    /// Filesystem errors not covered by a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameworkError>;
