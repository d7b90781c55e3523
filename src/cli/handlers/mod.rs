// src/cli/handlers/mod.rs

// One module per CLI command.

pub mod commons;
pub mod config;
pub mod expand;
pub mod invoke;
pub mod resolve;
