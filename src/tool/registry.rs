// src/tool/registry.rs

//! # Tool Registry
//!
//! Holds every tool declared by the loaded descriptor files, grouped by spec domain,
//! with `BasedOn` inheritance already applied.
//!
//! A `BasedOn` value is either `identifier` (looked up in the child's own domain) or
//! `domain:identifier`. When the named domain has no such tool, the other domains are
//! searched in registration order.

use crate::models::{SpecFile, ToolSpec};
use crate::tool::spec::Tool;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Could not read tool descriptors at '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse tool descriptor file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Tool '{tool}' is based on unknown tool '{base}'.")]
    UnknownBase { tool: String, base: String },
    #[error("Tool '{0}' inherits from itself.")]
    InheritanceCycle(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

type ToolKey = (String, String);

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Domain names in registration order.
    domains: Vec<String>,
    tools: HashMap<ToolKey, Arc<Tool>>,
}

impl ToolRegistry {
    /// Resolves every tool declared in `files`. A later declaration of the same
    /// identifier in the same domain replaces the earlier one.
    pub fn new(files: Vec<SpecFile>) -> RegistryResult<Self> {
        let mut domains: Vec<String> = Vec::new();
        let mut specs = HashMap::new();

        for file in files {
            if !domains.contains(&file.domain) {
                domains.push(file.domain.clone());
            }
            for spec in file.tools {
                let key = (file.domain.clone(), spec.identifier.clone());
                if specs.contains_key(&key) {
                    log::debug!("tool '{}' redeclared in domain '{}'", key.1, key.0);
                }
                specs.insert(key, spec);
            }
        }

        let mut resolver = Inheritance {
            domains: &domains,
            specs: &specs,
            resolved: HashMap::new(),
            visiting: HashSet::new(),
        };
        for key in specs.keys() {
            resolver.resolve(key)?;
        }
        let tools = resolver.resolved;

        log::debug!("registered {} tools in {} domains", tools.len(), domains.len());
        Ok(Self { domains, tools })
    }

    /// Loads descriptor files from `paths`. Directories are walked recursively for
    /// `.toml` and `.json` files.
    pub fn load(paths: &[PathBuf]) -> RegistryResult<Self> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                let mut found: Vec<PathBuf> = WalkDir::new(path)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file())
                    .map(|entry| entry.into_path())
                    .filter(|file| descriptor_format(file).is_some())
                    .collect();
                found.sort();
                for file in found {
                    files.push(read_spec_file(&file)?);
                }
            } else {
                files.push(read_spec_file(path)?);
            }
        }
        Self::new(files)
    }

    /// Finds `identifier` in the first of `domains` that declares it.
    pub fn lookup(&self, identifier: &str, domains: &[String]) -> Option<Arc<Tool>> {
        domains.iter().find_map(|domain| {
            self.tools
                .get(&(domain.clone(), identifier.to_string()))
                .cloned()
        })
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Identifiers of every non-abstract tool, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .tools
            .values()
            .filter(|tool| !tool.is_abstract)
            .map(|tool| tool.identifier.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// --- INHERITANCE ---

struct Inheritance<'a> {
    domains: &'a [String],
    specs: &'a HashMap<ToolKey, ToolSpec>,
    resolved: HashMap<ToolKey, Arc<Tool>>,
    visiting: HashSet<ToolKey>,
}

impl Inheritance<'_> {
    fn resolve(&mut self, key: &ToolKey) -> RegistryResult<Arc<Tool>> {
        if let Some(tool) = self.resolved.get(key) {
            return Ok(Arc::clone(tool));
        }
        if !self.visiting.insert(key.clone()) {
            return Err(RegistryError::InheritanceCycle(key.1.clone()));
        }

        let (domain, identifier) = key;
        let Some(spec) = self.specs.get(key) else {
            return Err(RegistryError::UnknownBase {
                tool: identifier.clone(),
                base: identifier.clone(),
            });
        };

        let tool = match &spec.based_on {
            Some(based_on) => {
                let base_key = self.find_base(key, based_on)?;
                let base = self.resolve(&base_key)?;
                log::trace!("'{}' inherits from '{}:{}'", identifier, base_key.0, base_key.1);
                base.derive(spec).with_domain(domain)
            }
            None => Tool::from_spec(spec, domain),
        };

        self.visiting.remove(key);
        let tool = Arc::new(tool);
        self.resolved.insert(key.clone(), Arc::clone(&tool));
        Ok(tool)
    }

    fn find_base(&self, child: &ToolKey, based_on: &str) -> RegistryResult<ToolKey> {
        let (domain, identifier) = match based_on.split_once(':') {
            Some((domain, identifier)) => (domain.to_string(), identifier.to_string()),
            None => (child.0.clone(), based_on.to_string()),
        };

        let preferred = (domain.clone(), identifier.clone());
        if preferred != *child && self.specs.contains_key(&preferred) {
            return Ok(preferred);
        }

        self.domains
            .iter()
            .filter(|other| **other != domain)
            .map(|other| (other.clone(), identifier.clone()))
            .find(|candidate| candidate != child && self.specs.contains_key(candidate))
            .ok_or_else(|| RegistryError::UnknownBase {
                tool: child.1.clone(),
                base: based_on.to_string(),
            })
    }
}

// --- DESCRIPTOR FILES ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DescriptorFormat {
    Toml,
    Json,
}

fn descriptor_format(path: &Path) -> Option<DescriptorFormat> {
    match path.extension()?.to_str()? {
        "toml" => Some(DescriptorFormat::Toml),
        "json" => Some(DescriptorFormat::Json),
        _ => None,
    }
}

fn read_spec_file(path: &Path) -> RegistryResult<SpecFile> {
    let content = fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("reading tool descriptors from '{}'", path.display());

    let parse_error = |message: String| RegistryError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match descriptor_format(path) {
        Some(DescriptorFormat::Json) => {
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
        _ => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn spec(identifier: &str, based_on: Option<&str>) -> ToolSpec {
        ToolSpec {
            identifier: identifier.to_string(),
            based_on: based_on.map(str::to_string),
            ..ToolSpec::default()
        }
    }

    fn file(domain: &str, tools: Vec<ToolSpec>) -> SpecFile {
        SpecFile {
            domain: domain.to_string(),
            tools,
        }
    }

    fn domains(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_lookup_searches_domains_in_order() {
        let mut mac = spec("com.example.cc", None);
        mac.exec_path = Some(Value::string("mac-cc"));
        let mut default = spec("com.example.cc", None);
        default.exec_path = Some(Value::string("cc"));

        let registry =
            ToolRegistry::new(vec![file("default", vec![default]), file("macosx", vec![mac])])
                .unwrap();

        let tool = registry
            .lookup("com.example.cc", &domains(&["macosx", "default"]))
            .unwrap();
        assert_eq!(tool.exec_path, Some(Value::string("mac-cc")));
        assert_eq!(tool.domain, "macosx");

        let tool = registry.lookup("com.example.cc", &domains(&["default"])).unwrap();
        assert_eq!(tool.exec_path, Some(Value::string("cc")));
        assert!(registry.lookup("com.example.none", &domains(&["default"])).is_none());
    }

    #[test]
    fn test_based_on_chain() {
        let mut base = spec("base", None);
        base.exec_path = Some(Value::string("base-tool"));
        base.is_abstract = Some(true);
        let mut middle = spec("middle", Some("base"));
        middle.rule_name = Some(Value::string("Middle"));
        let leaf = spec("leaf", Some("default:middle"));

        let registry = ToolRegistry::new(vec![file("default", vec![leaf, middle, base])]).unwrap();
        let tool = registry.lookup("leaf", &domains(&["default"])).unwrap();
        assert_eq!(tool.exec_path, Some(Value::string("base-tool")));
        assert_eq!(tool.rule_name, Some(Value::string("Middle")));
        assert_eq!(registry.identifiers(), ["leaf", "middle"]);
    }

    #[test]
    fn test_based_on_falls_back_to_other_domains() {
        let mut base = spec("com.example.cc", None);
        base.exec_path = Some(Value::string("cc"));
        let child = spec("com.example.cc", Some("com.example.cc"));

        let registry =
            ToolRegistry::new(vec![file("default", vec![base]), file("ios", vec![child])]).unwrap();
        let tool = registry.lookup("com.example.cc", &domains(&["ios"])).unwrap();
        assert_eq!(tool.exec_path, Some(Value::string("cc")));
        assert_eq!(tool.domain, "ios");
    }

    #[test]
    fn test_unknown_base() {
        let result = ToolRegistry::new(vec![file("default", vec![spec("a", Some("missing"))])]);
        assert!(matches!(result, Err(RegistryError::UnknownBase { .. })));
    }

    #[test]
    fn test_inheritance_cycle() {
        let result = ToolRegistry::new(vec![file(
            "default",
            vec![spec("a", Some("b")), spec("b", Some("a"))],
        )]);
        assert!(matches!(result, Err(RegistryError::InheritanceCycle(_))));
    }

    #[test]
    fn test_load_descriptor_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tools.toml"),
            r#"
            [[Tools]]
            Identifier = "com.example.copy"
            ExecPath = "/bin/cp"
            "#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("ios")).unwrap();
        fs::write(
            dir.path().join("ios").join("tools.json"),
            r#"{ "Domain": "ios", "Tools": [ { "Identifier": "com.example.copy", "BasedOn": "default:com.example.copy", "RuleName": "Copy" } ] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let registry = ToolRegistry::load(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(registry.len(), 2);
        let tool = registry.lookup("com.example.copy", &domains(&["ios"])).unwrap();
        assert_eq!(tool.exec_path, Some(Value::string("/bin/cp")));
        assert_eq!(tool.rule_name, Some(Value::string("Copy")));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[Tools]\n").unwrap();
        assert!(matches!(
            ToolRegistry::load(&[path]),
            Err(RegistryError::Parse { .. })
        ));
    }
}
