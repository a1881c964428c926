//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Program lookup and output helpers
//! - `io` - File I/O with consistent error handling
//! - `shell` - Shell quoting for displayed commands
//! - `validation` - Input validation helpers

pub mod command;
pub mod io;
pub mod shell;
pub mod validation;
