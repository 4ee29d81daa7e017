use anyhow::{Context, Result};
use regex::{Captures, Regex};

/// `(10-20) to (30-40)`, `15 to (30-40)`, `(10-20) to 35` and the static `15 to 35`.
const DOUBLE_RANGE_PATTERN: &str = r"\(?(?P<lowmin>\d+(?:\.\d+)?)(?:-(?P<lowmax>\d+(?:\.\d+)?)\))? to \(?(?P<highmin>\d+(?:\.\d+)?)(?:-(?P<highmax>\d+(?:\.\d+)?)\))?";

/// `(10-20)`, `+(10-20)`, `(0.6-1)%`, `+(-25-50)%` and `-(20-10)`.
const SINGLE_RANGE_PATTERN: &str =
    r"(?P<sign>[+-])?\((?P<low>-?[\d.]+)-(?P<high>-?[\d.]+)\)%?";

#[derive(Debug, Clone)]
pub struct RangePatterns {
    double: Regex,
    single: Regex,
}

impl RangePatterns {
    pub fn new() -> Result<Self> {
        Self::from_patterns(DOUBLE_RANGE_PATTERN, SINGLE_RANGE_PATTERN)
    }

    /// The double pattern must name `lowmin`, `lowmax`, `highmin` and `highmax`; the
    /// single pattern `sign`, `low` and `high`.
    pub fn from_patterns(double: &str, single: &str) -> Result<Self> {
        Ok(Self {
            double: Regex::new(double).context("invalid double range pattern")?,
            single: Regex::new(single).context("invalid single range pattern")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExtraction {
    pub token: String,
    pub description: String,
    pub warning: Option<String>,
}

impl RangeExtraction {
    fn unchanged(text: &str) -> Self {
        Self {
            token: String::new(),
            description: text.to_string(),
            warning: None,
        }
    }

    /// `token:Description`, the overlay's mod syntax.
    pub fn to_mod_token(&self) -> String {
        format!("{}:{}", self.token, self.description)
    }
}

/// Pull at most one rolled range out of a mod line. Double ranges win over single
/// ranges because `(10-20) to (30-40)` also contains two single ranges.
pub fn extract_range(text: &str, patterns: &RangePatterns) -> RangeExtraction {
    if let Some(captures) = patterns.double.captures(text) {
        return extract_double_range(text, &captures);
    }
    if let Some(captures) = patterns.single.captures(text) {
        return extract_single_range(text, &captures);
    }
    RangeExtraction::unchanged(text)
}

fn extract_double_range(text: &str, captures: &Captures<'_>) -> RangeExtraction {
    let group = |name: &str| captures.name(name).map(|value| value.as_str());
    let (Some(lowmin), Some(highmin)) = (group("lowmin"), group("highmin")) else {
        return RangeExtraction::unchanged(text);
    };
    let (lowmax, highmax) = match (group("lowmax"), group("highmax")) {
        (None, None) => return RangeExtraction::unchanged(text),
        (lowmax, highmax) => (lowmax.unwrap_or(lowmin), highmax.unwrap_or(highmin)),
    };

    let token = format!("{lowmin}-{highmin},{lowmax}-{highmax}");
    let ordered = [lowmin, lowmax, highmin, highmax]
        .iter()
        .map(|value| value.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()
        .is_some_and(|values| values.windows(2).all(|pair| pair[0] <= pair[1]));
    let warning = (!ordered).then(|| {
        format!("double range oddity in \"{text}\"; written to file as {token}")
    });

    RangeExtraction {
        token,
        description: remove_match(text, captures),
        warning,
    }
}

fn extract_single_range(text: &str, captures: &Captures<'_>) -> RangeExtraction {
    let (Some(low), Some(high)) = (captures.name("low"), captures.name("high")) else {
        return RangeExtraction::unchanged(text);
    };
    let mut low = low.as_str().to_string();
    let high = high.as_str();
    if captures.name("sign").is_some_and(|sign| sign.as_str() == "-") {
        low = match low.strip_prefix('-') {
            Some(positive) => positive.to_string(),
            None => format!("-{low}"),
        };
    }

    let token = if low.starts_with('-') && !high.starts_with('-') {
        format!("{low}-+{high}")
    } else {
        format!("{low}-{high}")
    };

    RangeExtraction {
        token,
        description: remove_match(text, captures),
        warning: None,
    }
}

fn remove_match(text: &str, captures: &Captures<'_>) -> String {
    let Some(whole) = captures.get(0) else {
        return text.to_string();
    };
    let remainder = format!("{}{}", &text[..whole.start()], &text[whole.end()..]);
    upcase_first_letter(&remainder.trim().replace("  ", " "))
}

pub fn upcase_first_letter(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{RangePatterns, extract_range, upcase_first_letter};

    fn token(text: &str) -> String {
        let patterns = RangePatterns::new().expect("patterns");
        extract_range(text, &patterns).to_mod_token()
    }

    #[test]
    fn single_range_with_sign_and_percent() {
        assert_eq!(
            token("+(10-20)% to Cold Resistance"),
            "10-20:To Cold Resistance"
        );
        assert_eq!(
            token("(0.6-0.8)% of Physical Attack Damage Leeched as Life"),
            "0.6-0.8:Of Physical Attack Damage Leeched as Life"
        );
    }

    #[test]
    fn negative_outer_sign_is_folded_onto_low_bound() {
        assert_eq!(
            token("-(20-10) Physical Damage Taken from Attacks"),
            "-20-+10:Physical Damage Taken from Attacks"
        );
    }

    #[test]
    fn negative_low_bound_inside_parentheses() {
        assert_eq!(
            token("(-40-40)% reduced Rarity of Items found"),
            "-40-+40:Reduced Rarity of Items found"
        );
        assert_eq!(
            token("+(-25-50)% to Fire Resistance"),
            "-25-+50:To Fire Resistance"
        );
    }

    #[test]
    fn negative_high_bound_keeps_its_own_sign() {
        assert_eq!(token("(-20--10)% reduced X"), "-20--10:Reduced X");
    }

    #[test]
    fn removal_keeps_the_rest_of_the_description_verbatim() {
        assert_eq!(
            token("+(10-20) to Strength and\tDexterity"),
            "10-20:To Strength and\tDexterity"
        );
        assert_eq!(
            token("Adds (1-2) to (3-4) Fire Damage\tto Spells"),
            "1-3,2-4:Adds Fire Damage\tto Spells"
        );
    }

    #[test]
    fn double_range_accepts_decimal_bounds() {
        let patterns = RangePatterns::new().expect("patterns");
        let extraction = extract_range("Adds (1-2) to (3.5-4) Fire", &patterns);
        assert_eq!(extraction.to_mod_token(), "1-3.5,2-4:Adds Fire");
        assert_eq!(extraction.warning, None);

        let odd = extract_range("Adds (4.5-5) to (1.5-2) Cold", &patterns);
        assert_eq!(odd.token, "4.5-1.5,5-2");
        assert!(odd.warning.is_some());
    }

    #[test]
    fn double_range_orders_minimums_before_maximums() {
        assert_eq!(
            token("Adds (10-20) to (30-40) Fire Damage"),
            "10-30,20-40:Adds Fire Damage"
        );
        assert_eq!(
            token("Adds 15 to (30-40) Cold Damage to Attacks"),
            "15-30,15-40:Adds Cold Damage to Attacks"
        );
    }

    #[test]
    fn static_double_range_is_left_alone() {
        assert_eq!(
            token("Adds 15 to 35 Lightning Damage"),
            ":Adds 15 to 35 Lightning Damage"
        );
    }

    #[test]
    fn double_range_oddity_is_reported_but_emitted() {
        let patterns = RangePatterns::new().expect("patterns");
        let extraction = extract_range("Adds (30-40) to (10-20) Chaos Damage", &patterns);
        assert_eq!(extraction.token, "30-10,40-20");
        assert_eq!(extraction.description, "Adds Chaos Damage");
        assert!(extraction.warning.is_some());
    }

    #[test]
    fn static_mod_has_empty_token() {
        assert_eq!(
            token("50% increased Global Critical Strike Chance"),
            ":50% increased Global Critical Strike Chance"
        );
    }

    #[test]
    fn upcase_first_letter_handles_empty_and_unicode() {
        assert_eq!(upcase_first_letter(""), "");
        assert_eq!(upcase_first_letter("\u{e9}lan"), "\u{c9}lan");
    }
}
