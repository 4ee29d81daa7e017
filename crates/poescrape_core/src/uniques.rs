use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::markup::{MarkupRules, non_empty};
use crate::mods::format_mod_text;
use crate::ranges::RangePatterns;
use crate::style_variants::{StyleVariantOutcome, StyleVariantResolver, StyleVariantTable};

pub const UNIQUE_CATEGORIES: [&str; 29] = [
    "Amulets",
    "Belts",
    "Rings",
    "Quivers",
    "Body Armours",
    "Boots",
    "Gloves",
    "Helmets",
    "Shields",
    "One Hand Axes",
    "Two Hand Axes",
    "Bows",
    "Claws",
    "Daggers",
    "Fishing Rods",
    "One Hand Maces",
    "Sceptres",
    "Two Hand Maces",
    "Staves",
    "One Hand Swords",
    "Thrusting One Hand Swords",
    "Two Hand Swords",
    "Wands",
    "Life Flasks",
    "Mana Flasks",
    "Hybrid Flasks",
    "Utility Flasks",
    "Jewel",
    "Maps",
];
pub const UNIQUES_OUTPUT_FILENAME: &str = "Uniques.txt";

const IMPLICIT_PRINTOUT: &str = "Has implicit stat text";
const EXPLICIT_PRINTOUT: &str = "Has explicit stat text";
const IMPLICIT_MARKER: char = '@';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub name: String,
    pub implicit_text: Option<String>,
    pub explicit_text: Option<String>,
}

/// Read `query.results` of one ask response, sorted by item name.
pub fn parse_unique_results(payload: &Value, rules: &MarkupRules) -> Result<Vec<ItemRecord>> {
    let results = payload
        .get("query")
        .and_then(|query| query.get("results"))
        .ok_or_else(|| anyhow!("wiki response is missing query.results"))?;
    let results = match results {
        Value::Object(results) => results,
        // An ask query without matches answers with an empty list.
        Value::Array(empty) if empty.is_empty() => return Ok(Vec::new()),
        _ => return Err(anyhow!("query.results has an unexpected shape")),
    };

    let mut names = results.keys().collect::<Vec<_>>();
    names.sort();

    let mut items = Vec::with_capacity(names.len());
    for name in names {
        let printouts = results[name]
            .get("printouts")
            .ok_or_else(|| anyhow!("result for {name} is missing its printouts"))?;
        items.push(ItemRecord {
            name: name.clone(),
            implicit_text: first_printout(printouts, IMPLICIT_PRINTOUT)
                .map(|text| rules.remove_wiki_formats(text)),
            explicit_text: first_printout(printouts, EXPLICIT_PRINTOUT)
                .map(|text| rules.remove_wiki_formats(text)),
        });
    }
    Ok(items)
}

/// Stat text printouts are lists holding at most one string.
fn first_printout<'a>(printouts: &'a Value, key: &str) -> Option<&'a str> {
    let text = printouts
        .get(key)
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .and_then(Value::as_str);
    non_empty(text)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueLines {
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
    /// Style variant bases replaced by their prepared line, in output order.
    pub style_variants_included: Vec<String>,
}

pub fn format_unique_lines(
    items: &[ItemRecord],
    table: &StyleVariantTable,
    patterns: &RangePatterns,
) -> Result<UniqueLines> {
    let mut resolver = StyleVariantResolver::new(table)?;
    let mut output = UniqueLines::default();

    for item in items {
        match resolver.resolve(&item.name) {
            StyleVariantOutcome::Substitute(line) => {
                output.lines.push(line.to_string());
                continue;
            }
            StyleVariantOutcome::AlreadyIncluded => continue,
            StyleVariantOutcome::Missing { base } => output.warnings.push(format!(
                "style variant expected but not found for {} (base {base}); formatted as a regular item",
                item.name
            )),
            StyleVariantOutcome::Regular => {}
        }
        output
            .lines
            .push(format_unique_line(item, patterns, &mut output.warnings));
    }

    output.style_variants_included = resolver.into_included();
    Ok(output)
}

/// `Name|implicit|@lastImplicit|explicit|...`; only the final implicit carries `@`.
pub fn format_unique_line(
    item: &ItemRecord,
    patterns: &RangePatterns,
    warnings: &mut Vec<String>,
) -> String {
    let mut fields = vec![item.name.clone()];

    if let Some(text) = &item.implicit_text {
        let implicits = format_mod_text(text, patterns);
        warnings.extend(implicits.warnings);
        if implicits.tokens.len() > 1 {
            warnings.push(format!("multiple implicits on item {}", item.name));
        }
        let last = implicits.tokens.len().saturating_sub(1);
        for (index, token) in implicits.tokens.into_iter().enumerate() {
            if index == last {
                fields.push(format!("{IMPLICIT_MARKER}{token}"));
            } else {
                fields.push(token);
            }
        }
    }

    if let Some(text) = &item.explicit_text {
        let explicits = format_mod_text(text, patterns);
        warnings.extend(explicits.warnings);
        fields.extend(explicits.tokens);
    }

    fields.join("|")
}

pub fn unique_file_header(source_url: &str, generated_at: &str) -> Vec<String> {
    vec![
        format!("; Data from {source_url} using the SMW API."),
        "; The \"@\" symbol marks a mod as implicit. This means a separator line will be appended after this mod. If there are multiple implicit mods, mark the last one in line.".to_string(),
        "; Comments can be made with \";\", blank lines will be ignored.".to_string(),
        ";".to_string(),
        format!("; This file was auto-generated by poescrape on {generated_at}"),
        String::new(),
    ]
}
