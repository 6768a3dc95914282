// Core logic of `setup-dotnet`, below the command layer.

// Reads `dotnet.yaml` and the package catalog.
pub mod config_loading;
// The `install` action and current-state detection.
pub mod framework_installer;
// `WindowsHost`: every interaction with the machine.
pub mod host;
// Path expansion and default file locations.
pub mod paths;
pub mod utilities;
// Version helpers keyed by framework major version.
pub mod version_helper;
