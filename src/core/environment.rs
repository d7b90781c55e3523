// src/core/environment.rs

//! # Build Setting Environment
//!
//! An `Environment` is a prioritized stack of [`Level`]s that resolves a setting name to
//! its final string. Explicit levels always outrank default levels; within each group
//! the front of the stack has the highest priority.
//!
//! ## Self-references
//!
//! A setting may refer to itself, either as `$(inherited)` or by its own name, as in
//! `OTHER_LDFLAGS = $(inherited) -ObjC`. Such a reference continues the scan from the
//! level *below* the one that supplied the value currently being expanded. The scan
//! position travels with each expansion as an explicit parameter, so the stack is never
//! mutated during resolution and concurrent resolutions cannot interfere.

use crate::constants::INHERITED;
use crate::core::condition::Condition;
use crate::core::level::Level;
use crate::core::operations;
use crate::core::setting::Setting;
use crate::core::value::{Value, ValueEntry};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::Arc;

/// Setting-to-setting hops beyond this are treated as a reference cycle.
const MAX_EXPANSION_DEPTH: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    levels: Vec<Arc<Level>>,
    defaults: Vec<Arc<Level>>,
}

/// Where the value currently being expanded came from.
#[derive(Debug, Clone, Copy)]
struct Inheritance<'a> {
    setting: &'a str,
    position: usize,
}

// --- PUBLIC API ---

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `level` with the highest priority of its group.
    pub fn insert_front(&mut self, level: impl Into<Arc<Level>>, is_default: bool) {
        let stack = if is_default {
            &mut self.defaults
        } else {
            &mut self.levels
        };
        stack.insert(0, level.into());
    }

    /// Inserts `level` with the lowest priority of its group.
    pub fn insert_back(&mut self, level: impl Into<Arc<Level>>, is_default: bool) {
        let stack = if is_default {
            &mut self.defaults
        } else {
            &mut self.levels
        };
        stack.push(level.into());
    }

    /// All levels in scan order: explicit levels first, then defaults.
    pub fn levels(&self) -> impl Iterator<Item = &Level> + Clone {
        self.levels
            .iter()
            .chain(self.defaults.iter())
            .map(AsRef::as_ref)
    }

    /// Resolves `name` with an empty evaluation context.
    pub fn resolve(&self, name: &str) -> String {
        self.resolve_with(name, &Condition::empty())
    }

    /// Resolves `name`, letting conditional settings that match `context` apply.
    /// Unknown names resolve to the empty string.
    pub fn resolve_with(&self, name: &str, context: &Condition) -> String {
        self.resolve_assignment(context, name, 0)
    }

    /// Expands every reference in `value`.
    pub fn expand(&self, value: &Value) -> String {
        self.expand_with(value, &Condition::empty())
    }

    pub fn expand_with(&self, value: &Value, context: &Condition) -> String {
        self.resolve_value(context, value, None, 0)
    }

    /// Resolves every setting name assigned anywhere in the stack.
    pub fn compute_values(&self, context: &Condition) -> HashMap<String, String> {
        let mut seen = HashSet::new();
        let names: Vec<&str> = self
            .levels()
            .flat_map(Level::settings)
            .map(Setting::name)
            .filter(|name| seen.insert(*name))
            .collect();

        names
            .par_iter()
            .map(|name| (name.to_string(), self.resolve_with(name, context)))
            .collect()
    }

    /// Renders the stack for diagnostics, one block per level.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (title, stack) in [("Levels", &self.levels), ("Default Levels", &self.defaults)] {
            let _ = writeln!(out, "=== {} ===", title);
            for level in stack {
                let _ = writeln!(out, "Level:");
                for setting in level.settings() {
                    let _ = writeln!(out, "    {}", setting);
                }
                out.push('\n');
            }
        }
        out
    }
}

// --- RESOLUTION ---

impl Environment {
    fn resolve_assignment(&self, context: &Condition, name: &str, depth: usize) -> String {
        if depth > MAX_EXPANSION_DEPTH {
            log::warn!("build setting '{}' references itself through other settings", name);
            return String::new();
        }

        let found = self
            .levels()
            .enumerate()
            .find_map(|(position, level)| level.get(name, context).map(|value| (position, value)));

        if let Some((position, value)) = found {
            log::trace!("resolving '{}' from level {}", name, position);
            let inheritance = Inheritance {
                setting: name,
                position,
            };
            return self.resolve_value(context, value, Some(inheritance), depth + 1);
        }

        if context.is_empty() {
            String::new()
        } else {
            self.resolve_assignment(&Condition::empty(), name, depth)
        }
    }

    /// Continues the scan for the inherited setting below its current level.
    fn resolve_inheritance(
        &self,
        context: &Condition,
        inheritance: Inheritance<'_>,
        depth: usize,
    ) -> String {
        let found = self
            .levels()
            .enumerate()
            .skip(inheritance.position + 1)
            .find_map(|(position, level)| {
                level
                    .get(inheritance.setting, context)
                    .map(|value| (position, value))
            });

        match found {
            Some((position, value)) => {
                let below = Inheritance {
                    position,
                    ..inheritance
                };
                self.resolve_value(context, value, Some(below), depth)
            }
            None => String::new(),
        }
    }

    fn resolve_value(
        &self,
        context: &Condition,
        value: &Value,
        inheritance: Option<Inheritance<'_>>,
        depth: usize,
    ) -> String {
        let mut result = String::new();

        for entry in value.entries() {
            match entry {
                ValueEntry::Literal(text) => result.push_str(text),
                ValueEntry::Reference(inner) => {
                    let expression = self.resolve_value(context, inner, inheritance, depth);
                    match inheritance {
                        Some(current)
                            if expression == current.setting || expression == INHERITED =>
                        {
                            result.push_str(&self.resolve_inheritance(context, current, depth));
                        }
                        _ => result.push_str(&self.resolve_reference(context, &expression, depth)),
                    }
                }
            }
        }

        result
    }

    /// Resolves `NAME:op1:op2`, applying the operations left to right.
    fn resolve_reference(&self, context: &Condition, expression: &str, depth: usize) -> String {
        let mut parts = expression.split(':');
        let name = parts.next().unwrap_or_default();
        let resolved = self.resolve_assignment(context, name, depth);
        parts.fold(resolved, |value, operation| {
            operations::apply_named(&value, operation)
        })
    }
}
