// This file handles the `setup-dotnet version` command.

use crate::log_info;
use colored::Colorize;

/// Prints the name and version this binary was built as.
pub fn run() {
    log_info!("{} {}", env!("CARGO_PKG_NAME").bold(), env!("CARGO_PKG_VERSION").green());
}
