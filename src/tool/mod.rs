// src/tool/mod.rs

//! # Tools
//!
//! Tool descriptors and the pipeline that turns one tool plus a settings environment
//! into a concrete [`invocation::Invocation`]:
//!
//! `ToolRegistry::lookup` → `ToolEnvironment::create` → `OptionsResult` →
//! `tokens::expand_tool` → `Invocation`.

pub mod environment;
pub mod invocation;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod search_paths;
pub mod spec;
pub mod tokens;
