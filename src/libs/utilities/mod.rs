// Low-level helpers used by the Windows host implementation.

// Downloading and checksum verification of package installers.
pub mod download;
// Spawning external tools, with an optional timeout.
pub mod process;
// Registry reads through `winreg`.
pub mod registry;
// WMI queries through `wmi`.
pub mod wmi_queries;
