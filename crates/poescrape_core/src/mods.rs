use crate::markup::normalize_dashes;
use crate::ranges::{RangePatterns, extract_range};

pub const HIDDEN_MARKER: &str = "(Hidden)";
const LINE_BREAK: &str = "<br>";
const LINE_BREAK_VARIANTS: [&str; 2] = ["<br />", "<br/>"];

/// Mod lines ready for the overlay plus anything worth a second look.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModList {
    pub tokens: Vec<String>,
    pub warnings: Vec<String>,
}

/// Split a printout on its `<br>` markers.
pub fn split_mod_text(text: &str) -> Vec<String> {
    let mut normalized = text.to_string();
    for variant in LINE_BREAK_VARIANTS {
        normalized = normalized.replace(variant, LINE_BREAK);
    }
    normalized
        .split(LINE_BREAK)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn remove_hidden_mods(mods: Vec<String>) -> Vec<String> {
    mods.into_iter()
        .filter(|line| !line.contains(HIDDEN_MARKER))
        .collect()
}

pub fn format_mod_text(text: &str, patterns: &RangePatterns) -> ModList {
    let mut list = ModList::default();
    for line in remove_hidden_mods(split_mod_text(text)) {
        let extraction = extract_range(&normalize_dashes(&line), patterns);
        if let Some(warning) = &extraction.warning {
            list.warnings.push(warning.clone());
        }
        list.tokens.push(extraction.to_mod_token());
    }
    list
}
