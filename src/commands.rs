//! UI-facing commands
//!
//! Each command takes the session state by `&mut` and returns
//! `Result<T, String>` with a message ready to show the user.

pub mod export_commands;
pub mod selection_commands;
pub mod session_commands;

// Re-export all commands for easy access
pub use export_commands::*;
pub use selection_commands::*;
pub use session_commands::*;
