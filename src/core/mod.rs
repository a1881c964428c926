// Public modules
pub mod build;
pub mod config;
pub mod console;
pub mod defaults;
pub mod doctor;
pub mod error;
pub mod executor;
pub mod migration;
pub mod paths;
pub mod requirements;
pub mod scaffold;
pub mod setup;
pub mod test_runner;
pub mod tooling;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use executor::{Invocation, Runner, SystemRunner};
