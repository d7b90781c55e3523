//! # System Interaction Layer
//!
//! The boundary between the settings engine and the machine it runs on.
//!
//! ## Modules
//!
//! - **`executor`**: Runs a resolved tool invocation as a child process, with
//!   cancellation and per-tool success exit codes.
//! - **`filesystem`**: The `Filesystem` trait used by xcconfig loading, with a disk
//!   implementation and an in-memory one.
//! - **`paths`**: Lexical path algebra for setting values, executable lookup and the
//!   configuration directory.
//! - **`user_config`**: Loads and writes `config.toml`.

pub mod executor;
pub mod filesystem;
pub mod paths;
pub mod user_config;
