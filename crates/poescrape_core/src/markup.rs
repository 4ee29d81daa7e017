use anyhow::{Context, Result};
use regex::{Captures, Regex};

/// `[[target]]` stores the text in group 1, `[[target|label]]` in group 2.
const WIKI_LINK_PATTERN: &str = r"\[\[([^\]|]*)\]\]|\[\[[^\]|]*\|([^\]|]*)\]\]";
const ANNOTATION_SPAN_PATTERN: &str = r#"<em class="tc -[a-z-]+">([^<]*)</em>"#;

const DROP_AREA_BULLET: &str = " \u{2022} ";
const LINK_LIST_SEPARATOR: &str = "]], [[";
const LINK_LIST_BOUNDARY: char = '\u{1f}';

/// `&#38;` goes last so a decoded ampersand is never re-read as an entity start.
const NUMERIC_ENTITIES: [(&str, &str); 3] = [("&#60;", "<"), ("&#62;", ">"), ("&#38;", "&")];

/// Compiled wiki markup patterns, built once per run and passed to the cleaners.
#[derive(Debug, Clone)]
pub struct MarkupRules {
    wiki_link: Regex,
    annotation_span: Regex,
}

impl MarkupRules {
    pub fn new() -> Result<Self> {
        Ok(Self {
            wiki_link: Regex::new(WIKI_LINK_PATTERN).context("invalid wiki link pattern")?,
            annotation_span: Regex::new(ANNOTATION_SPAN_PATTERN)
                .context("invalid annotation span pattern")?,
        })
    }

    pub fn strip_wiki_links(&self, text: &str) -> String {
        self.wiki_link
            .replace_all(text, |captures: &Captures<'_>| {
                captures
                    .get(1)
                    .or_else(|| captures.get(2))
                    .map_or(String::new(), |label| label.as_str().to_string())
            })
            .into_owned()
    }

    /// Strip links, `tc` annotation spans and the handful of numeric entities the
    /// wiki emits. Everything else is kept verbatim.
    pub fn remove_wiki_formats(&self, text: &str) -> String {
        let linked = self.strip_wiki_links(text);
        let mut output = self
            .annotation_span
            .replace_all(&linked, "$1")
            .into_owned();
        for (entity, decoded) in NUMERIC_ENTITIES {
            output = output.replace(entity, decoded);
        }
        output
    }

    /// Split a comma separated list of wiki links. Only the boundaries between two
    /// links are split on, so names that contain commas stay whole.
    pub fn split_drop_text(&self, text: Option<&str>) -> Option<Vec<String>> {
        let text = non_empty(text)?;
        let delimited = text.replace(
            LINK_LIST_SEPARATOR,
            &format!("]]{LINK_LIST_BOUNDARY}[["),
        );
        let entries = delimited
            .split(LINK_LIST_BOUNDARY)
            .map(|entry| self.remove_wiki_formats(entry))
            .filter(|entry| !entry.trim().is_empty())
            .collect::<Vec<_>>();
        if entries.is_empty() { None } else { Some(entries) }
    }

    /// Drop areas come either as the bullet separated HTML printout or as a plain
    /// comma separated list of area ids. Commas only separate entries in the id form.
    pub fn split_drop_areas(&self, text: Option<&str>) -> Option<Vec<String>> {
        let text = non_empty(text)?;
        let ids = text.split(',').map(str::trim).collect::<Vec<_>>();
        let segments: Vec<&str> = if text.contains('\u{2022}') || text.contains("[[") {
            text.split(DROP_AREA_BULLET).collect()
        } else if ids.iter().all(|id| is_area_id(id)) {
            ids
        } else {
            vec![text]
        };
        let areas = segments
            .into_iter()
            .map(|segment| self.remove_wiki_formats(segment).trim().to_string())
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();
        if areas.is_empty() { None } else { Some(areas) }
    }
}

fn is_area_id(segment: &str) -> bool {
    segment
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Replace the minus sign and en dash variants the wiki uses in numbers.
pub fn normalize_dashes(text: &str) -> String {
    text.replace(['\u{2212}', '\u{2013}'], "-").trim().to_string()
}

pub fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{MarkupRules, normalize_dashes};

    fn rules() -> MarkupRules {
        MarkupRules::new().expect("markup rules")
    }

    #[test]
    fn strip_wiki_links_keeps_label_text() {
        let rules = rules();
        assert_eq!(rules.strip_wiki_links("[[Zana]]"), "Zana");
        assert_eq!(
            rules.strip_wiki_links("[[The Harvest (area)|The Harvest]]"),
            "The Harvest"
        );
        assert_eq!(rules.strip_wiki_links("Drops in [[map]]s"), "Drops in maps");
        assert_eq!(
            rules.strip_wiki_links("+(10-20) to [[maximum Life]], (uncapped)"),
            "+(10-20) to maximum Life, (uncapped)"
        );
    }

    #[test]
    fn remove_wiki_formats_decodes_annotations_and_entities() {
        let rules = rules();
        assert_eq!(
            rules.remove_wiki_formats(r#"<em class="tc -corrupted">Corrupted</em>"#),
            "Corrupted"
        );
        assert_eq!(
            rules.remove_wiki_formats("Grants &#60;Level 20&#62; [[Anger]]"),
            "Grants <Level 20> Anger"
        );
    }

    #[test]
    fn remove_wiki_formats_is_idempotent_on_clean_text() {
        let rules = rules();
        let clean = "Adds (10-20) to (30-40) Fire Damage, (sometimes) 50%";
        let once = rules.remove_wiki_formats(clean);
        assert_eq!(once, clean);
        assert_eq!(rules.remove_wiki_formats(&once), clean);
    }

    #[test]
    fn split_drop_text_keeps_commas_inside_names() {
        let rules = rules();
        let entries = rules
            .split_drop_text(Some(
                "[[Atziri, Queen of the Vaal]], [[Vaal Pyramid|The Pyramid]], [[Zana]]",
            ))
            .expect("entries");
        assert_eq!(
            entries,
            vec!["Atziri, Queen of the Vaal", "The Pyramid", "Zana"]
        );
    }

    #[test]
    fn split_drop_text_treats_blank_as_absent() {
        let rules = rules();
        assert_eq!(rules.split_drop_text(None), None);
        assert_eq!(rules.split_drop_text(Some("  ")), None);
    }

    #[test]
    fn split_drop_areas_handles_bullets_and_ids() {
        let rules = rules();
        let html = rules
            .split_drop_areas(Some(
                "[[Bone Crypt Map (War for the Atlas)]] \u{2022} [[The Docks]]",
            ))
            .expect("html areas");
        assert_eq!(html, vec!["Bone Crypt Map (War for the Atlas)", "The Docks"]);

        let ids = rules
            .split_drop_areas(Some("MapWorldsBoneCrypt, MapAtlasBoneCrypt"))
            .expect("id areas");
        assert_eq!(ids, vec!["MapWorldsBoneCrypt", "MapAtlasBoneCrypt"]);
    }

    #[test]
    fn split_drop_areas_keeps_commas_in_a_single_linked_area() {
        let rules = rules();
        let areas = rules
            .split_drop_areas(Some("[[Caer Blaidd, Wolfpack's Den (War for the Atlas)]]"))
            .expect("areas");
        assert_eq!(areas, vec!["Caer Blaidd, Wolfpack's Den (War for the Atlas)"]);

        let plain = rules
            .split_drop_areas(Some("Caer Blaidd, Wolfpack's Den"))
            .expect("plain area");
        assert_eq!(plain, vec!["Caer Blaidd, Wolfpack's Den"]);
    }

    #[test]
    fn normalize_dashes_replaces_unicode_minus() {
        assert_eq!(normalize_dashes(" \u{2212}(20\u{2013}10) Taken "), "-(20-10) Taken");
    }
}
