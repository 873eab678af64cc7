use anyhow::{bail, Context, Result};
use payables_core::{Aggregator, FieldMap, FilterSpec, RuleBook, TypeCanonicalizer};
use payables_import::ExtractFormat;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings for a weekly run, read from a TOML file. Every key is optional;
/// command-line flags take precedence over the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub source_dir: Option<PathBuf>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Single-byte field separator of the extract, `^` when unset.
    pub delimiter: Option<char>,
    pub filter: FilterSpec,
    pub fields: FieldMap,
    /// Extra type-label synonyms layered over the built-in table.
    pub synonyms: BTreeMap<String, String>,
    /// Replaces the standard rule book.
    pub rules_file: Option<PathBuf>,
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn extract_format(&self) -> Result<ExtractFormat> {
        match self.delimiter {
            None => Ok(ExtractFormat::default()),
            Some(c) if c.is_ascii() => Ok(ExtractFormat { delimiter: c as u8 }),
            Some(c) => bail!("Delimiter {c:?} is not a single-byte character"),
        }
    }

    pub fn aggregator(&self) -> Result<Aggregator> {
        let rules = match &self.rules_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read rules {}", path.display()))?;
                RuleBook::from_toml(&text)
                    .with_context(|| format!("Invalid rules {}", path.display()))?
            }
            None => RuleBook::standard(),
        };
        let types = TypeCanonicalizer::default().with_synonyms(&self.synonyms);

        Ok(Aggregator::new(self.fields.clone())
            .with_rules(rules)
            .with_types(types))
    }
}
