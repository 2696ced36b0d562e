pub mod seeds;
pub mod store;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

pub use store::TemplateStore;

/// What a command is run for; together with the OS family this selects a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandPurpose {
    SpanningTreeRoot,
    MacAddressTable,
}

/// ExtractionTemplate is the on-disk / seeded form of a template: field names
/// plus ordered line rules. Each rule is a regex whose named groups are field
/// names; the first rule matching a line turns it into one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<String>,
    pub rules: Vec<String>,
}

impl ExtractionTemplate {
    /// Compile every rule, checking that captured groups name declared fields
    pub fn compile(&self) -> Result<CompiledTemplate, TemplateError> {
        let mut rules = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let re = Regex::new(rule).map_err(|e| TemplateError::InvalidRule {
                template: self.name.clone(),
                rule: rule.clone(),
                reason: e.to_string(),
            })?;

            for group in re.capture_names().flatten() {
                if !self.fields.iter().any(|f| f == group) {
                    return Err(TemplateError::UnknownField {
                        template: self.name.clone(),
                        rule: rule.clone(),
                        field: group.to_string(),
                    });
                }
            }
            rules.push(re);
        }

        Ok(CompiledTemplate {
            name: self.name.clone(),
            fields: self.fields.clone(),
            rules,
        })
    }
}

/// A template ready to apply to raw output
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    name: String,
    fields: Vec<String>,
    rules: Vec<Regex>,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of a field in every record this template produces
    pub fn field_index(&self, field: &str) -> Result<usize, TemplateError> {
        self.fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| TemplateError::MissingField {
                template: self.name.clone(),
                field: field.to_string(),
            })
    }

    /// Parse raw command output into records, one per recognised line, in line order.
    /// With `add_header` the first record is the list of field names.
    pub fn parse(&self, text: &str, add_header: bool) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        if add_header {
            records.push(self.fields.clone());
        }

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if let Some(record) = self.parse_line(line) {
                records.push(record);
            }
        }

        records
    }

    fn parse_line(&self, line: &str) -> Option<Vec<String>> {
        let caps = self.rules.iter().find_map(|re| re.captures(line))?;
        Some(
            self.fields
                .iter()
                .map(|field| {
                    caps.name(field)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default()
                })
                .collect(),
        )
    }
}
