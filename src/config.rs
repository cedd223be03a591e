//! Fixed page lists and runtime knobs shared by the scrape passes.

use std::time::Duration;

/// Base URL of the wiki. `ELDERMYTH_WIKI_BASE` overrides it for mirrors.
pub const DEFAULT_WIKI_BASE: &str = "https://eldermyth.fandom.com";

/// Pause between successive requests, wiki etiquette.
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Page titles requested per allpages batch.
pub const PAGE_BATCH: usize = 50;

pub fn wiki_base() -> String {
    std::env::var("ELDERMYTH_WIKI_BASE").unwrap_or_else(|_| DEFAULT_WIKI_BASE.to_string())
}

pub fn api_endpoint(base: &str) -> String {
    format!("{base}/api.php")
}

pub fn page_url(base: &str, page: &str) -> String {
    format!("{base}/wiki/{page}")
}

/// Filename slug for a page title: `General_Encounter` -> `general-encounter`.
pub fn page_slug(page: &str) -> String {
    page.replace('_', "-").to_lowercase()
}

/// Encounter reference pages scraped as rendered HTML.
pub const ENCOUNTER_PAGES: &[&str] = &[
    "General_Encounter",
    "Combat_Encounter",
    "Location_Encounter",
    "Research_Encounter",
    "Other_World_Encounters",
    "Expedition_Encounters",
    "Special_Encounters",
    "Defeated",
];

/// Research encounter pages, base set and Forsaken Lore antagonists only.
pub struct ResearchPage {
    pub antagonist: &'static str,
    pub page: &'static str,
    /// Set cell text as it appears in encounter tables, e.g. "01Core".
    pub set_text: &'static str,
    pub expansion: &'static str,
}

pub const RESEARCH_PAGES: &[ResearchPage] = &[
    ResearchPage {
        antagonist: "Azathoth",
        page: "Azathoth_Research_Encounters",
        set_text: "01Core",
        expansion: "Core",
    },
    ResearchPage {
        antagonist: "Cthulhu",
        page: "Cthulhu_Research_Encounters",
        set_text: "01Core",
        expansion: "Core",
    },
    ResearchPage {
        antagonist: "Shub-Niggurath",
        page: "Shub-Niggurath_Research_Encounters",
        set_text: "01Core",
        expansion: "Core",
    },
    ResearchPage {
        antagonist: "Yog-Sothoth",
        page: "Yog-Sothoth_Research_Encounters",
        set_text: "01Core",
        expansion: "Core",
    },
    ResearchPage {
        antagonist: "Yig",
        page: "Yig_Research_Encounters",
        set_text: "02Forsaken Lore",
        expansion: "Forsaken Lore",
    },
    ResearchPage {
        antagonist: "Ithaqua",
        page: "Ithaqua_Research_Encounters",
        set_text: "02Forsaken Lore",
        expansion: "Forsaken Lore",
    },
];

/// Other-world location pages scraped as rendered HTML.
pub const OTHER_WORLD_PAGES: &[&str] = &[
    "The_Underworld_(Other_World)",
    "The_Abyss",
    "City_of_the_Great_Race",
    "Great_Hall_of_Celaeno",
    "Plateau_of_Leng",
    "The_Future",
    "Lost_Carcosa",
    "Yuggoth",
    "The_Past",
    "The_Dreamlands_(Other_World)",
];

/// Expansion abbreviations as used by infobox set templates.
pub const EXPANSION_NAMES: &[(&str, &str)] = &[
    ("Core", "Core Game"),
    ("FL", "Forsaken Lore"),
    ("MoM", "Mountains of Madness"),
    ("SR", "Strange Remnants"),
    ("UtP", "Under the Pyramids"),
    ("SoC", "Signs of Carcosa"),
    ("TD", "The Dreamlands"),
    ("CiR", "Cities in Ruin"),
    ("MoN", "Masks of Nyarlathotep"),
];

pub fn expansion_full_name(abbrev: &str) -> Option<&'static str> {
    EXPANSION_NAMES
        .iter()
        .find(|(short, _)| *short == abbrev)
        .map(|(_, full)| *full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_dashes() {
        assert_eq!(page_slug("General_Encounter"), "general-encounter");
        assert_eq!(
            page_slug("The_Underworld_(Other_World)"),
            "the-underworld-(other-world)"
        );
    }

    #[test]
    fn research_pages_cover_both_sets() {
        let core = RESEARCH_PAGES.iter().filter(|r| r.set_text == "01Core").count();
        let fl = RESEARCH_PAGES
            .iter()
            .filter(|r| r.set_text == "02Forsaken Lore")
            .count();
        assert_eq!(core, 4);
        assert_eq!(fl, 2);
    }

    #[test]
    fn expansion_lookup() {
        assert_eq!(expansion_full_name("FL"), Some("Forsaken Lore"));
        assert_eq!(expansion_full_name("Core"), Some("Core Game"));
        assert_eq!(expansion_full_name("XYZ"), None);
    }
}
