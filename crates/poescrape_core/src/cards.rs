use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::areas::classify_drop_areas;
use crate::markup::MarkupRules;

pub const CARD_CATEGORIES: [&str; 1] = ["Divination Card"];
pub const CARD_OUTPUT_FILENAME: &str = "DivinationCardList.txt";

const CARD_LIST: &str = "divinationCardList";
/// The overlay script's escaped newline.
const NEWLINE: &str = "`n";
const NO_CURRENT_RECORD: &str = " No current record. Generic sources like Diviner's Strongboxes,`n The Eternal Labyrinth or The Putrid Cloister still apply.";
const LEGACY_HEADING: &str = "Additionally these locations were recorded in 3.0:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub name: String,
    pub drop_areas: Option<Vec<String>>,
    pub drop_text: Option<Vec<String>>,
}

/// Read the `cargoquery` rows of one response and clean their wiki markup.
pub fn parse_card_results(payload: &Value, rules: &MarkupRules) -> Result<Vec<CardRecord>> {
    let rows = payload
        .get("cargoquery")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("wiki response is missing the cargoquery list"))?;

    let mut cards = Vec::with_capacity(rows.len());
    for row in rows {
        let fields = row
            .get("title")
            .ok_or_else(|| anyhow!("cargoquery row is missing its title object"))?;
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("cargoquery row is missing the card name"))?;
        cards.push(CardRecord {
            name: name.to_string(),
            drop_areas: rules.split_drop_areas(string_field(fields, "drop areas html")),
            drop_text: rules.split_drop_text(string_field(fields, "drop text")),
        });
    }
    Ok(cards)
}

fn string_field<'a>(fields: &'a Value, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

pub fn format_card_line(card: &CardRecord) -> String {
    let mut text = String::new();

    if let Some(areas) = &card.drop_areas {
        text.push_str("Drop Locations:");
        let locations = classify_drop_areas(areas);
        let recorded = locations.recorded();
        if recorded.is_empty() {
            text.push_str(NEWLINE);
            text.push_str(NO_CURRENT_RECORD);
        } else {
            push_entries(&mut text, recorded);
        }
        if !locations.legacy_only.is_empty() {
            text.push_str(NEWLINE);
            text.push_str(NEWLINE);
            text.push_str(LEGACY_HEADING);
            push_entries(&mut text, locations.legacy_only.iter().map(String::as_str));
        }
    } else if card.drop_text.is_none() {
        text.push_str("No drop information available");
    }

    if let Some(restrictions) = &card.drop_text {
        if card.drop_areas.is_some() {
            text.push_str(NEWLINE);
            text.push_str(NEWLINE);
        }
        text.push_str("Drop Restrictions:");
        push_entries(&mut text, restrictions.iter().map(|entry| entry.trim()));
    }

    format!(
        "{CARD_LIST}[\"{}\"] := \"{}\"",
        escape_quotes(&card.name),
        escape_quotes(&text)
    )
}

fn push_entries<'a>(text: &mut String, entries: impl IntoIterator<Item = &'a str>) {
    for entry in entries {
        text.push_str(NEWLINE);
        text.push(' ');
        text.push_str(entry);
    }
}

/// Quotes inside an overlay string literal are doubled.
fn escape_quotes(value: &str) -> String {
    value.replace('"', "\"\"")
}

pub fn card_file_header(source_url: &str, generated_at: &str) -> Vec<String> {
    vec![
        format!("; Data from {source_url} using the API."),
        "; Comments can be made with \";\", blank lines will be ignored.".to_string(),
        ";".to_string(),
        format!("; This file was auto-generated by poescrape on {generated_at}"),
        String::new(),
        format!("{CARD_LIST} := Object()"),
        String::new(),
        format!("{CARD_LIST}[\"Unknown Card\"] := \"Card not recognised or not supported\""),
        String::new(),
    ]
}
