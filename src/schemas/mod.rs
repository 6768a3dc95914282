// Data types shared by the loaders, the version helpers and the installer.

// The package catalog behind the version helpers.
pub mod catalog;
// `FrameworkError`, the error type of everything below the command layer.
pub mod errors;
// Desired and current state of the framework resource.
pub mod framework;
// Package descriptors and their skip guards.
pub mod package;
// Framework and Windows NT version ordering.
pub mod version;
