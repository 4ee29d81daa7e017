pub const CURRENT_MAP_TAG: &str = "(War for the Atlas)";
pub const LEGACY_MAP_TAG: &str = "(Atlas of Worlds)";

const CURRENT_MAP_PREFIX: &str = "MapWorlds";
const LEGACY_MAP_PREFIX: &str = "MapAtlas";
const MAP_SUFFIX: &str = " Map";

/// Unique maps whose display name cannot be derived from the id stem.
const RENAMED_MAPS: [(&str, &str); 20] = [
    ("ActonsNightmare", "Acton's Nightmare"),
    ("CaerBlaiddWolfpacksDen", "Caer Blaidd, Wolfpack's Den"),
    ("DeathAndTaxes", "Death and Taxes"),
    ("DoryanisMachinarium", "Doryani's Machinarium"),
    ("HallOfGrandmasters", "Hall of Grandmasters"),
    ("HallowedGround", "Hallowed Ground"),
    ("MaelstromOfChaos", "Maelstr\u{f6}m of Chaos"),
    ("MaoKun", "Mao Kun"),
    ("ObasCursedTrove", "Oba's Cursed Trove"),
    ("OlmecsSanctum", "Olmec's Sanctum"),
    ("PerandusManor", "Perandus Manor"),
    ("PillarsOfArun", "Pillars of Arun"),
    ("PoorjoysAsylum", "Poorjoy's Asylum"),
    ("TheBeachhead", "The Beachhead"),
    ("TheCowardsTrial", "The Coward's Trial"),
    ("ThePutridCloister", "The Putrid Cloister"),
    ("TheVinktarSquare", "The Vinktar Square"),
    ("UntaintedParadise", "Untainted Paradise"),
    ("VaultsOfAtziri", "Vaults of Atziri"),
    ("WhakawairuaTuahu", "Whakawairua Tuahu"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaPool {
    /// Maps recorded on the current atlas.
    Current,
    /// Maps only recorded on the 3.0 atlas.
    Legacy,
    /// Story areas, hideouts and anything else that is not a map.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArea {
    pub name: String,
    pub pool: AreaPool,
}

pub fn resolve_area(raw: &str) -> ResolvedArea {
    let raw = raw.trim();
    if let Some(stem) = map_id_stem(raw, CURRENT_MAP_PREFIX) {
        return ResolvedArea {
            name: map_display_name(stem),
            pool: AreaPool::Current,
        };
    }
    if let Some(stem) = map_id_stem(raw, LEGACY_MAP_PREFIX) {
        return ResolvedArea {
            name: map_display_name(stem),
            pool: AreaPool::Legacy,
        };
    }
    classify_tagged_name(raw)
}

fn map_id_stem<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    let stem = raw.strip_prefix(prefix)?;
    let starts_upper = stem.chars().next().is_some_and(char::is_uppercase);
    (starts_upper && stem.chars().all(|ch| ch.is_ascii_alphanumeric())).then_some(stem)
}

fn classify_tagged_name(name: &str) -> ResolvedArea {
    for (tag, pool) in [
        (CURRENT_MAP_TAG, AreaPool::Current),
        (LEGACY_MAP_TAG, AreaPool::Legacy),
    ] {
        if let Some(base) = name.strip_suffix(tag) {
            return ResolvedArea {
                name: base.trim_end().to_string(),
                pool,
            };
        }
    }
    ResolvedArea {
        name: name.to_string(),
        pool: AreaPool::Plain,
    }
}

pub fn map_display_name(stem: &str) -> String {
    RENAMED_MAPS
        .iter()
        .find(|(id, _)| *id == stem)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("{}{MAP_SUFFIX}", split_camel_case(stem)))
}

/// `VaalPyramid` -> `Vaal Pyramid`, `UndergroundSea2` -> `Underground Sea 2`.
pub fn split_camel_case(stem: &str) -> String {
    let chars = stem.chars().collect::<Vec<_>>();
    let mut output = String::with_capacity(stem.len() + 4);
    for (index, &ch) in chars.iter().enumerate() {
        if index > 0 {
            let previous = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            let word_start = (ch.is_uppercase()
                && (previous.is_lowercase()
                    || previous.is_ascii_digit()
                    || (previous.is_uppercase() && next_is_lower)))
                || (ch.is_ascii_digit() && previous.is_alphabetic());
            if word_start {
                output.push(' ');
            }
        }
        output.push(ch);
    }
    output
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropLocations {
    pub current: Vec<String>,
    pub plain: Vec<String>,
    /// Legacy maps that are not also recorded on the current atlas.
    pub legacy_only: Vec<String>,
}

impl DropLocations {
    /// Current maps first, then plain areas.
    pub fn recorded(&self) -> Vec<&str> {
        self.current
            .iter()
            .chain(self.plain.iter())
            .map(String::as_str)
            .collect()
    }
}

pub fn classify_drop_areas(areas: &[String]) -> DropLocations {
    let mut locations = DropLocations::default();
    let mut legacy = Vec::new();
    for area in areas {
        let resolved = resolve_area(area);
        let pool = match resolved.pool {
            AreaPool::Current => &mut locations.current,
            AreaPool::Plain => &mut locations.plain,
            AreaPool::Legacy => &mut legacy,
        };
        if !pool.contains(&resolved.name) {
            pool.push(resolved.name);
        }
    }
    locations.legacy_only = legacy
        .into_iter()
        .filter(|name| !locations.current.contains(name))
        .collect();
    locations
}
