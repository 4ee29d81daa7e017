use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

const EMBEDDED_STYLE_VARIANTS: &str = include_str!("../../../config/style-variants.json");

/// Wiki pages for style variants are named `Base (Suffix)`.
const DISAMBIGUATION_PATTERN: &str = r"^(?P<base>[^(]+) \((?P<suffix>[^)]+)\)$";

/// Hand prepared overlay lines for items whose styles share one in-game name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleVariantTable {
    entries: BTreeMap<String, String>,
}

impl StyleVariantTable {
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_STYLE_VARIANTS).context("failed to parse embedded style variants")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Use the table at `path` when given, otherwise the embedded default.
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(content).context("style variants must map names to lines")?;
        Ok(Self { entries })
    }

    pub fn get(&self, base: &str) -> Option<&str> {
        self.entries.get(base).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for StyleVariantTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleVariantOutcome<'a> {
    /// Not a disambiguated page name.
    Regular,
    /// First occurrence of a known base; emit this line.
    Substitute(&'a str),
    /// A later occurrence of a base that was already emitted.
    AlreadyIncluded,
    /// Looks like a style variant, but the table has no line for it.
    Missing { base: String },
}

pub struct StyleVariantResolver<'a> {
    table: &'a StyleVariantTable,
    pattern: Regex,
    included: Vec<String>,
}

impl<'a> StyleVariantResolver<'a> {
    pub fn new(table: &'a StyleVariantTable) -> Result<Self> {
        Self::with_pattern(table, DISAMBIGUATION_PATTERN)
    }

    /// `pattern` must capture the shared item name as `base`.
    pub fn with_pattern(table: &'a StyleVariantTable, pattern: &str) -> Result<Self> {
        Ok(Self {
            table,
            pattern: Regex::new(pattern).context("invalid disambiguation pattern")?,
            included: Vec::new(),
        })
    }

    pub fn resolve(&mut self, name: &str) -> StyleVariantOutcome<'a> {
        let Some(base) = self
            .pattern
            .captures(name)
            .and_then(|captures| captures.name("base"))
            .map(|base| base.as_str().trim().to_string())
        else {
            return StyleVariantOutcome::Regular;
        };

        let table = self.table;
        match table.get(&base) {
            Some(_) if self.included.contains(&base) => StyleVariantOutcome::AlreadyIncluded,
            Some(line) => {
                self.included.push(base);
                StyleVariantOutcome::Substitute(line)
            }
            None => StyleVariantOutcome::Missing { base },
        }
    }

    pub fn into_included(self) -> Vec<String> {
        self.included
    }
}

#[cfg(test)]
mod tests {
    use super::{StyleVariantOutcome, StyleVariantResolver, StyleVariantTable};
    use tempfile::tempdir;

    fn table() -> StyleVariantTable {
        [("Item".to_string(), "Item|:Prepared line".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn embedded_table_parses() {
        let table = StyleVariantTable::embedded().expect("embedded table");
        assert!(!table.is_empty());
        assert!(table.get("Doryani's Invitation").is_some());
    }

    #[test]
    fn first_occurrence_wins_and_rest_are_skipped() {
        let table = table();
        let mut resolver = StyleVariantResolver::new(&table).expect("resolver");
        assert_eq!(
            resolver.resolve("Item (A)"),
            StyleVariantOutcome::Substitute("Item|:Prepared line")
        );
        assert_eq!(
            resolver.resolve("Item (B)"),
            StyleVariantOutcome::AlreadyIncluded
        );
        assert_eq!(resolver.into_included(), vec!["Item".to_string()]);
    }

    #[test]
    fn unknown_base_is_reported_as_missing() {
        let table = table();
        let mut resolver = StyleVariantResolver::new(&table).expect("resolver");
        assert_eq!(
            resolver.resolve("Other Thing (Fire)"),
            StyleVariantOutcome::Missing {
                base: "Other Thing".to_string()
            }
        );
        assert_eq!(resolver.resolve("Plain Item"), StyleVariantOutcome::Regular);
    }

    #[test]
    fn load_reads_override_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("variants.json");
        std::fs::write(&path, r#"{"Impresence": "Impresence|:Custom"}"#).expect("write");
        let table = StyleVariantTable::load_or_embedded(Some(&path)).expect("load");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Impresence"), Some("Impresence|:Custom"));
    }

    #[test]
    fn load_rejects_non_string_values() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("variants.json");
        std::fs::write(&path, r#"{"Impresence": 5}"#).expect("write");
        let error = StyleVariantTable::load(&path).expect_err("must fail");
        assert!(error.to_string().contains("failed to parse"));
    }
}
