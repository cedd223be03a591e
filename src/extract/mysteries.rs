//! Mystery card details and the research encounter tables embedded in
//! page text.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::model::{MysteryDetail, Page, ResearchEncounterDetail, ResearchEncounterDetails};
use crate::wikitext::normalize::{normalize, truncate_chars};
use crate::wikitext::table::{cell_value, row_lines};

use super::normalized_clip;

static RE_MYSTERY_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mystery Type\s*=\s*([^\n|]+)").unwrap());
static RE_FLAVOR_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Flavor Text\s*=\s*([^\n|]+)").unwrap());
static RE_MYSTERY_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Mystery Text\s*=\s*(.+?)(?:\}\}|$)").unwrap());
static RE_MYSTERY_TEXT_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\}|\[\[Category").unwrap());

static RE_CITY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)\[City Encounters\s*\](.*?)(?:\[Wilderness Encounters|\[Sea Encounters|$)")
        .unwrap()
});
static RE_WILDERNESS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)\[Wilderness Encounters\s*\](.*?)(?:\[Sea Encounters|$)").unwrap()
});
static RE_SEA_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)\[Sea Encounters\s*\](.*?)(?:\[References|$)").unwrap());

/// Infobox boolean flags and their raw-markup fallbacks. The rendered
/// flag can be lost when a nested template cuts the infobox capture
/// short, so the full text is probed as well.
const BOOLEAN_FLAGS: &[(&str, &str)] = &[
    ("clue boolean", "Clue Boolean = Yes"),
    ("spell boolean", "Spell Boolean = Yes"),
    ("et boolean", "ET Boolean = Yes"),
    ("artifact boolean", "Artifact Boolean = Yes"),
    ("monster boolean", "Monster Boolean = Yes"),
];

fn boolean_flag(page: &Page, index: usize) -> bool {
    let (key, marker) = BOOLEAN_FLAGS[index];
    page.infobox
        .get(key)
        .is_some_and(|value| value.contains("Yes"))
        || page.full_text.contains(marker)
}

/// Extract one mystery card. Pages without an antagonist binding are
/// navigation or overview pages, not cards.
pub fn mystery_detail(page: &Page) -> Option<MysteryDetail> {
    let antagonist_raw = page.infobox.get("antagonist")?;
    let antagonist = antagonist_raw.replace("[[", "").replace("]]", "").trim().to_string();
    if antagonist.is_empty() {
        return None;
    }

    let name = page
        .infobox
        .get("mystery name")
        .cloned()
        .unwrap_or_else(|| page.title.clone());

    let kind = RE_MYSTERY_TYPE
        .captures(&page.raw_markup)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default();

    let flavor_text = RE_FLAVOR_TEXT
        .captures(&page.raw_markup)
        .map(|caps| normalized_clip(caps[1].trim(), 500))
        .unwrap_or_default();

    let mystery_text = RE_MYSTERY_TEXT
        .captures(&page.raw_markup)
        .map(|caps| {
            let body = RE_MYSTERY_TEXT_STOP
                .split(&caps[1])
                .next()
                .unwrap_or_default();
            normalized_clip(body.trim(), 1000)
        })
        .unwrap_or_default();

    let expansion = page
        .infobox
        .get("expansion")
        .map(|value| normalize(value))
        .unwrap_or_default();

    Some(MysteryDetail {
        name,
        antagonist,
        kind,
        expansion,
        flavor_text,
        mystery_text,
        requires_clues: boolean_flag(page, 0),
        requires_spells: boolean_flag(page, 1),
        has_eldritch_tokens: boolean_flag(page, 2),
        requires_artifact: boolean_flag(page, 3),
        has_monster: boolean_flag(page, 4),
    })
}

/// All mystery cards of a bucket, grouped by the antagonist they belong to.
pub fn mysteries_by_antagonist(pages: &[Page]) -> IndexMap<String, Vec<MysteryDetail>> {
    let mut grouped: IndexMap<String, Vec<MysteryDetail>> = IndexMap::new();
    for page in pages {
        if let Some(detail) = mystery_detail(page) {
            grouped.entry(detail.antagonist.clone()).or_default().push(detail);
        }
    }
    grouped
}

fn parse_block(block: &str) -> Vec<ResearchEncounterDetail> {
    let mut encounters = Vec::new();
    for row in block.split("|-") {
        if row.contains("! scope") || row.contains("ID #") {
            continue;
        }
        let lines = row_lines(row);
        if lines.len() < 3 {
            continue;
        }
        let id = cell_value(lines[0]);
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let expansion = cell_value(lines[1]);
        let expansion = if expansion.is_empty() { "Core" } else { expansion };
        let description: String = lines[2..]
            .iter()
            .map(|line| cell_value(line))
            .collect::<Vec<_>>()
            .join(" ");
        let description = normalize(&description);
        if description.chars().count() <= 20 {
            continue;
        }
        encounters.push(ResearchEncounterDetail {
            id: id.to_string(),
            expansion: expansion.to_string(),
            description: truncate_chars(&description, 1500),
        });
    }
    encounters
}

/// Pull the city, wilderness, and sea research tables out of a page's
/// flat text, anchored on its `[Heading]` markers.
pub fn parse_research_encounters(full_text: &str) -> ResearchEncounterDetails {
    let block = |re: &Regex| {
        re.captures(full_text)
            .map(|caps| parse_block(&caps[1]))
            .unwrap_or_default()
    };
    ResearchEncounterDetails {
        city: block(&RE_CITY_BLOCK),
        wilderness: block(&RE_WILDERNESS_BLOCK),
        sea: block(&RE_SEA_BLOCK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikitext::parse_page;

    const MYSTERY_MARKUP: &str = "{{Mystery Card\n\
        |Mystery Name = The Third Eye\n\
        |antagonist = [[Azathoth]]\n\
        |Mystery Type = Active\n\
        |Flavor Text = ''The sky splits.''\n\
        |Clue Boolean = Yes\n\
        |Expansion = Core Game\n\
        |Mystery Text = Spend 3 [[Clue|Clues]] to solve this Mystery.\n\
        }}\n\
        [[Category:Mysteries]]";

    #[test]
    fn mystery_detail_reads_infobox_and_raw_markup() {
        let page = parse_page("The Third Eye", 7, vec!["Mysteries".into()], MYSTERY_MARKUP);
        let detail = mystery_detail(&page).expect("card should be extracted");
        assert_eq!(detail.name, "The Third Eye");
        assert_eq!(detail.antagonist, "Azathoth");
        assert_eq!(detail.kind, "Active");
        assert_eq!(detail.expansion, "Core Game");
        assert_eq!(detail.flavor_text, "The sky splits.");
        assert_eq!(detail.mystery_text, "Spend 3 Clues to solve this Mystery.");
        assert!(detail.requires_clues);
        assert!(!detail.requires_spells);
        assert!(!detail.has_monster);
    }

    #[test]
    fn pages_without_antagonist_are_skipped() {
        let page = parse_page(
            "Mystery",
            1,
            vec!["Mysteries".into()],
            "{{Mystery Card|Mystery Name = Overview}}\nAn overview page.",
        );
        assert!(mystery_detail(&page).is_none());
    }

    #[test]
    fn grouping_collects_cards_per_antagonist() {
        let first = parse_page("The Third Eye", 7, vec![], MYSTERY_MARKUP);
        let second = parse_page(
            "Stars Align",
            8,
            vec![],
            "{{Mystery Card|antagonist = [[Azathoth]]|Mystery Type = Passive}}",
        );
        let grouped = mysteries_by_antagonist(&[first, second]);
        assert_eq!(grouped["Azathoth"].len(), 2);
    }

    const RESEARCH_TEXT: &str = "\
        [City Encounters ]\n\
        {| class=\"wikitable\"\n\
        ! scope=\"col\" | ID #\n\
        |-\n\
        | 1\n\
        | 01Core\n\
        | You push through the crowded market as whispers follow your every step.\n\
        |-\n\
        | 2\n\
        |\n\
        | short\n\
        |}\n\
        [Sea Encounters ]\n\
        |-\n\
        | 7\n\
        | 02Forsaken Lore\n\
        | The waves part to reveal something vast and silent beneath the water.\n";

    #[test]
    fn research_blocks_parse_ids_and_defaults() {
        let details = parse_research_encounters(RESEARCH_TEXT);
        assert_eq!(details.city.len(), 1, "short description row should drop");
        assert_eq!(details.city[0].id, "1");
        assert_eq!(details.city[0].expansion, "01Core");
        assert!(details.city[0].description.starts_with("You push through"));
        assert!(details.wilderness.is_empty());
        assert_eq!(details.sea.len(), 1);
        assert_eq!(details.sea[0].expansion, "02Forsaken Lore");
    }

    #[test]
    fn missing_expansion_cell_defaults_to_core() {
        let text = "[City Encounters ]\n|-\n| 4\n|\n| A long enough description to keep this row in the output.\n";
        let details = parse_research_encounters(text);
        assert_eq!(details.city[0].expansion, "Core");
    }
}
