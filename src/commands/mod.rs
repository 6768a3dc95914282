// Register application subcommands.
// Each module corresponds to a specific `setup-dotnet` command-line action.

// Converges a .NET Framework resource.
pub mod install;
// Reports the installed version and pending reboots.
pub mod status;
// Displays the version of setup-dotnet.
pub mod version;
// Lists the versions the catalog supports on this host.
pub mod versions;
