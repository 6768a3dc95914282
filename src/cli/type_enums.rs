use std::fmt;
use std::str::FromStr;

/// A `--package-source CHECKSUM=PATH` argument: use `PATH` instead of the
/// catalog URL for the package whose checksum is `CHECKSUM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSourceOverride {
    pub checksum: String,
    pub source: String,
}

impl FromStr for PackageSourceOverride {
    type Err = String;

    /// Splits on the first `=`; both sides must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((checksum, source)) if !checksum.trim().is_empty() && !source.trim().is_empty() => Ok(Self {
                checksum: checksum.trim().to_string(),
                source: source.trim().to_string(),
            }),
            _ => Err(format!("Invalid package source '{s}'. Expected CHECKSUM=PATH")),
        }
    }
}

impl fmt::Display for PackageSourceOverride {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.checksum, self.source)
    }
}
