//! Antagonist page extraction.
//!
//! Pulls the narrative and card fields for one antagonist out of its parsed
//! wiki page. The meta table fields (difficulty, doom, deck size) are merged
//! in later by the reconcile step, so everything here comes from the page.

use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::model::{AntagonistDetail, CultistInfo, MythosDeck, MythosStage, Page};

use super::{first_section, normalized_clip, section_clip};

/// Section names with a dedicated output field. The first section outside
/// this list names the antagonist's epithet.
const SKIP_SECTIONS: &[&str] = &[
    "Gameplay",
    "Setup",
    "Cultists",
    "Mysteries",
    "Research Encounters",
    "Special Encounters",
    "Awakening",
    "Lore",
    "References",
    "Strategy",
    "Appearance",
    "Current Residence",
    "Disposition",
    "Adversaries",
    "Source",
    "Mythos Deck",
];

/// Link texts that plausibly name a mystery card when the Mysteries section
/// has no table to read.
const MYSTERY_LINK_HINTS: &[&str] = &[
    "Research",
    "Encounter",
    "Eldritch",
    "Epic",
    "Monster",
    "Token",
];

static RE_FINAL_MYSTERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)'''Final Mystery'''(.+?)(?:\n'''[A-Z]|$)").unwrap());
static RE_WIN_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([^.]*?\d+\s+Mysteries[^.]*?win the game[^.]*\.)").unwrap());
static RE_SOLVED_WIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)When\s+\d+\s+Mysteries\s+have\s+been\s+solved[^.]*?win[^.]*\.").unwrap()
});
static RE_MYSTERY_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|([A-Z][^|\n]+)\n\|").unwrap());

/// Extract every page-derived field for one antagonist. Merge fields stay at
/// their defaults until the meta table is applied.
pub fn antagonist_detail(page: &Page) -> AntagonistDetail {
    let sections = &page.sections;
    let (epithet, short_description) = sections
        .iter()
        .find(|(name, _)| !SKIP_SECTIONS.contains(&name.as_str()))
        .map(|(name, body)| (name.clone(), normalized_clip(body, 1500)))
        .unwrap_or_default();
    let lore = first_section(sections, &["Lore", "Background", "History", "Origin"])
        .map(|body| normalized_clip(body, 4000))
        .unwrap_or_default();
    let awakening = sections.get("Awakening").map(String::as_str).unwrap_or("");
    let gameplay = sections.get("Gameplay").map(String::as_str).unwrap_or("");

    AntagonistDetail {
        name: page.title.clone(),
        page_id: page.page_id,
        epithet,
        short_description,
        lore,
        gameplay_rules: section_clip(sections, "Gameplay", 2000),
        setup_instructions: section_clip(sections, "Setup", 500),
        awakening_title: page.infobox.get("title").cloned().unwrap_or_default(),
        awakening_flavor: page
            .infobox
            .get("flavor")
            .map(|flavor| normalized_clip(flavor, 1000))
            .unwrap_or_default(),
        awakening_effects: section_clip(sections, "Awakening", 1000),
        final_mystery: final_mystery(awakening, gameplay),
        cultist_info: CultistInfo {
            raw: section_clip(sections, "Cultists", 500),
        },
        mystery_names: mystery_names(page),
        research_encounters: section_clip(sections, "Research Encounters", 500),
        mythos_deck: mythos_deck(&page.infobox),
        appearance: section_clip(sections, "Appearance", 500),
        residence: section_clip(sections, "Current Residence", 500),
        disposition: section_clip(sections, "Disposition", 200),
        adversaries: section_clip(sections, "Adversaries", 300),
        source: section_clip(sections, "Source", 200),
        ..AntagonistDetail::default()
    }
}

/// Victory condition text. Prefers an explicit bold Final Mystery note in the
/// awakening or gameplay text, then the "win the game" sentence, then the
/// "Mysteries have been solved" phrasing.
fn final_mystery(awakening: &str, gameplay: &str) -> String {
    let combined = format!("{awakening}\n{gameplay}");
    if let Some(caps) = RE_FINAL_MYSTERY.captures(&combined) {
        return normalized_clip(caps[1].trim(), 1200);
    }
    if let Some(caps) = RE_WIN_SENTENCE.captures(gameplay) {
        return normalized_clip(caps[1].trim(), 1200);
    }
    if let Some(found) = RE_SOLVED_WIN.find(gameplay) {
        return normalized_clip(found.as_str().trim(), 1200);
    }
    String::new()
}

/// Mystery card names, read from the Mysteries section table when present and
/// otherwise guessed from page links. Capped at ten after deduplication.
fn mystery_names(page: &Page) -> Vec<String> {
    let mut names: Vec<String> = page
        .sections
        .get("Mysteries")
        .map(|body| {
            RE_MYSTERY_ROW
                .captures_iter(body)
                .map(|caps| caps[1].trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    if names.is_empty() {
        names = page
            .links
            .iter()
            .filter(|link| {
                MYSTERY_LINK_HINTS.iter().any(|hint| link.contains(hint))
                    && !link.to_lowercase().contains("file:")
            })
            .cloned()
            .collect();
    }
    let mut seen = HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
    names.truncate(10);
    names
}

fn mythos_deck(infobox: &IndexMap<String, String>) -> MythosDeck {
    MythosDeck {
        stage1: deck_stage(infobox, 1),
        stage2: deck_stage(infobox, 2),
        stage3: deck_stage(infobox, 3),
    }
}

fn deck_stage(infobox: &IndexMap<String, String>, stage: u8) -> MythosStage {
    let field = |color: &str| {
        infobox
            .get(&format!("{color}{stage}"))
            .cloned()
            .unwrap_or_default()
    };
    MythosStage {
        green: field("green"),
        yellow: field("yellow"),
        blue: field("blue"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wikitext::parse_page;

    const AZATHOTH_MARKUP: &str = "\
{{Antagonist
|title = The Primal Chaos Awakens
|flavor = ''The blind idiot god stirs at the center of all things.''
|green1 = 2
|yellow1 = 2
|blue1 = 1
|green2 = 3
|yellow2 = 2
|blue2 = 1
|green3 = 2
|yellow3 = 4
|blue3 = 0
}}
== The Primal Chaos ==
Azathoth waits beyond the veil of reality.

== Lore ==
At the center of chaos dances the blind idiot god.

== Gameplay ==
'''Final Mystery''' Defeat the cult before dawn.
'''Awakened Azathoth''' ends the game immediately.

== Setup ==
Place doom on 15.

== Awakening ==
When doom reaches 0, the world is devoured.

== Cultists ==
Cultists have 2 health and 2 horror.

== Mysteries ==
{| class=\"wikitable\"
|-
|The Big Chill
|Solve with clues.
|-
|Infinite Gyre
|Solve with spells.
|}

== Research Encounters ==
Spend clues to retrieve tokens.

== Appearance ==
A roiling mass outside time.

== Current Residence ==
The court at the center of the universe.

== Disposition ==
Mindless.

== Adversaries ==
None recorded.

== Source ==
First described in 1922.
";

    #[test]
    fn antagonist_detail_extracts_page_fields() {
        let page = parse_page("Azathoth", 41, vec!["Antagonists".into()], AZATHOTH_MARKUP);
        let detail = antagonist_detail(&page);
        assert_eq!(detail.name, "Azathoth");
        assert_eq!(detail.page_id, 41);
        assert_eq!(detail.epithet, "The Primal Chaos");
        assert_eq!(
            detail.short_description,
            "Azathoth waits beyond the veil of reality."
        );
        assert_eq!(
            detail.lore,
            "At the center of chaos dances the blind idiot god."
        );
        assert_eq!(detail.awakening_title, "The Primal Chaos Awakens");
        assert_eq!(
            detail.awakening_flavor,
            "The blind idiot god stirs at the center of all things."
        );
        assert_eq!(detail.final_mystery, "Defeat the cult before dawn.");
        assert_eq!(detail.mystery_names, vec!["The Big Chill", "Infinite Gyre"]);
        assert_eq!(detail.mythos_deck.stage1.green, "2");
        assert_eq!(detail.mythos_deck.stage3.yellow, "4");
        assert_eq!(detail.cultist_info.raw, "Cultists have 2 health and 2 horror.");
        assert_eq!(detail.disposition, "Mindless.");
        assert_eq!(detail.difficulty, "");
        assert_eq!(detail.starting_doom, 0);
        assert!(detail.research_encounter_details.is_none());
    }

    #[test]
    fn final_mystery_falls_back_to_win_sentence() {
        let gameplay = "Players must solve 3 Mysteries to win the game. Otherwise doom.";
        assert_eq!(
            final_mystery("", gameplay),
            "Players must solve 3 Mysteries to win the game."
        );
    }

    #[test]
    fn final_mystery_falls_back_to_solved_phrase() {
        let gameplay = "When 3 Mysteries have been solved, investigators win. More text.";
        assert_eq!(
            final_mystery("", gameplay),
            "When 3 Mysteries have been solved, investigators win."
        );
    }

    #[test]
    fn final_mystery_empty_when_nothing_matches() {
        assert_eq!(final_mystery("", "No victory text here."), "");
    }

    #[test]
    fn mystery_names_fall_back_to_page_links() {
        let page = Page {
            title: "Yog-Sothoth".into(),
            links: vec![
                "Void Research Encounters".into(),
                "File:Token.png".into(),
                "Epic Monster".into(),
                "Void Research Encounters".into(),
                "Local Map".into(),
            ],
            ..Page::default()
        };
        let names = mystery_names(&page);
        assert_eq!(names, vec!["Void Research Encounters", "Epic Monster"]);
    }
}
