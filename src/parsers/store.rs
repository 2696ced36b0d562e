use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::models::OsFamily;

use super::seeds::{seed_template_data, template_name};
use super::{CommandPurpose, CompiledTemplate, ExtractionTemplate};

/// TemplateStore holds compiled extraction templates keyed by name.
/// Built-in seeds are loaded first; JSON files from a templates directory
/// replace seeds with the same name.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: HashMap<String, CompiledTemplate>,
}

impl TemplateStore {
    /// Store containing only the built-in templates
    pub fn builtin() -> Result<Self> {
        let mut store = Self {
            templates: HashMap::new(),
        };
        for tmpl in seed_template_data() {
            store.insert(&tmpl)?;
        }
        Ok(store)
    }

    /// Built-in templates overlaid with every `*.json` template in `dir`
    pub fn load(dir: Option<&str>) -> Result<Self> {
        let mut store = Self::builtin()?;
        let Some(dir) = dir.filter(|d| !d.is_empty()) else {
            return Ok(store);
        };

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read templates directory {}", dir))?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let tmpl = read_template(&path)?;
            tracing::debug!("Loaded template '{}' from {}", tmpl.name, path.display());
            store.insert(&tmpl)?;
        }

        Ok(store)
    }

    pub fn insert(&mut self, tmpl: &ExtractionTemplate) -> Result<()> {
        let compiled = tmpl.compile()?;
        self.templates.insert(tmpl.name.clone(), compiled);
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&CompiledTemplate> {
        self.templates.get(name)
    }

    /// Template for a command purpose on an OS family, if one is available
    pub fn get(&self, os: OsFamily, purpose: CommandPurpose) -> Option<&CompiledTemplate> {
        self.get_by_name(template_name(os, purpose))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }
}

fn read_template(path: &Path) -> Result<ExtractionTemplate> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid template JSON in {}", path.display()))
}
