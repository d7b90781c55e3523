// src/core/mod.rs

//! The build settings engine: values, conditions, settings, levels, the layered
//! environment that resolves them, and xcconfig files.

pub mod condition;
pub mod defaults;
pub mod environment;
pub mod level;
pub mod operations;
pub mod setting;
pub mod types;
pub mod value;
pub mod xcconfig;
