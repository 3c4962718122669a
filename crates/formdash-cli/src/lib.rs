// Argument types for the formdash binary, kept in a library so they can be
// unit tested.

pub mod args;

pub use args::{Cli, OutputFormat};
