// Command-line definition of `setup-dotnet`.

// Subcommands and their arguments.
pub mod cmd_enums;
// Custom argument value types.
pub mod type_enums;
