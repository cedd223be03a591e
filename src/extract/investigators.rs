//! Investigator page extraction.
//!
//! Investigator infoboxes routinely hold nested image templates, which the
//! template scanner stores as unclosed fragments and whose trailing params
//! never reach the infobox map. Numeric stats and equipment are therefore
//! read back out of the page text, preferring the cleaned text and falling
//! back to raw markup.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::config::expansion_full_name;
use crate::model::{DefeatedTexts, EquipmentItem, InvestigatorDetail, Page, Skills};
use crate::wikitext::normalize::normalize;
use crate::wikitext::table::{row_cells, split_rows, strip_table_markup};

use super::aliases::{best_match, build_aliases};
use super::{first_section, normalized_clip};

static RE_STAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\|(lore|influence|observation|strength|will|health|sanity)\s*=\s*(\d+)")
        .unwrap()
});
static RE_SET_ABBREV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{([A-Za-z]+)").unwrap());
static RE_STARTEQUIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\|startequip\s*=\s*([^|]+)").unwrap());
static RE_EQUIP_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\s*(\d+)\s+(.+?)(?:\n|\|)").unwrap());
static RE_STARTLOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|startloc\s*=\s*([^\n|]+)").unwrap());
static RE_PERSONAL_STORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|personal_story\s*=\s*([^\n|]+)").unwrap());
static RE_QUOTE_DOUBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\"([^\"]{10,})\"").unwrap());
static RE_QUOTE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"''([^']{15,})''").unwrap());
static RE_DEFEATED_HEALTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{Defeated Health\|([^}]+)\}\}").unwrap());
static RE_DEFEATED_SANITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{Defeated Sanity\|([^}]+)\}\}").unwrap());
static RE_DEFEATED_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)text\s*=\s*(.+?)(?:\||$)").unwrap());

/// Extract every field for one investigator. `defeated_rows` comes from
/// [`parse_defeated_table`] run once over the shared Defeated page.
pub fn investigator_detail(page: &Page, defeated_rows: &[(String, String)]) -> InvestigatorDetail {
    let sections = &page.sections;
    let profession = page
        .infobox
        .get("profession")
        .or_else(|| page.infobox.get("occupation"))
        .map(|value| normalize(value))
        .unwrap_or_default();
    let abilities = abilities_text(sections, &profession);
    let full_stats = stat_map(&page.full_text);
    let raw_stats = stat_map(&page.raw_markup);
    let stat = |name: &str| *full_stats.get(name).or_else(|| raw_stats.get(name)).unwrap_or(&0);
    let section_text = |name: &str| {
        sections
            .get(name)
            .map(|body| normalize(body))
            .unwrap_or_default()
    };

    InvestigatorDetail {
        name: page.title.clone(),
        page_id: page.page_id,
        profession,
        role: page
            .infobox
            .get("role")
            .map(|value| normalize(value))
            .unwrap_or_default(),
        set: investigator_set(&page.infobox),
        skills: Skills {
            lore: stat("lore"),
            influence: stat("influence"),
            observation: stat("observation"),
            strength: stat("strength"),
            will: stat("will"),
        },
        health: stat("health"),
        sanity: stat("sanity"),
        starting_location: capture_both(&RE_STARTLOC, page)
            .map(normalize)
            .unwrap_or_default(),
        starting_equipment: starting_equipment(page),
        personal_story: capture_both(&RE_PERSONAL_STORY, page)
            .map(normalize)
            .unwrap_or_default(),
        quote: quote(sections),
        biography: first_section(sections, &["Bio", "Biography"])
            .map(normalize)
            .unwrap_or_default(),
        abilities,
        team_role: section_text("Team Role"),
        rulings: first_section(
            sections,
            &[
                "Rulings, clarifications, and reminders",
                "Rulings, Clarifications, and Reminders",
                "Rulings",
            ],
        )
        .map(normalize)
        .unwrap_or_default(),
        origin: section_text("Origin"),
        defeated_encounters: defeated_encounters(page, defeated_rows),
    }
}

/// First occurrence of each stat key in the text. Later duplicates lose.
fn stat_map(text: &str) -> IndexMap<String, i64> {
    let mut stats = IndexMap::new();
    for caps in RE_STAT.captures_iter(text) {
        let key = caps[1].to_lowercase();
        let value = caps[2].parse().unwrap_or(0);
        stats.entry(key).or_insert(value);
    }
    stats
}

/// Group 1 of `re` against the cleaned text, then the raw markup.
fn capture_both<'a>(re: &Regex, page: &'a Page) -> Option<&'a str> {
    re.captures(&page.full_text)
        .and_then(|caps| caps.get(1))
        .map(|found| found.as_str())
        .or_else(|| {
            re.captures(&page.raw_markup)
                .and_then(|caps| caps.get(1))
                .map(|found| found.as_str())
        })
}

/// Expansion name from the set infobox value. The value is usually an
/// unclosed image template fragment, so the abbreviation is read straight
/// out of the opening braces.
fn investigator_set(infobox: &IndexMap<String, String>) -> String {
    let Some(raw) = infobox.get("set") else {
        return String::new();
    };
    if let Some(caps) = RE_SET_ABBREV.captures(raw) {
        if let Some(full) = expansion_full_name(&caps[1]) {
            return full.to_string();
        }
    }
    normalize(raw)
}

fn starting_equipment(page: &Page) -> Vec<EquipmentItem> {
    let Some(block) = capture_both(&RE_STARTEQUIP, page) else {
        return Vec::new();
    };
    RE_EQUIP_ITEM
        .captures_iter(block)
        .map(|caps| EquipmentItem {
            count: caps[1].parse().unwrap_or(0),
            item: normalize(&caps[2]),
        })
        .collect()
}

fn quote(sections: &IndexMap<String, String>) -> String {
    let Some(flavor) = first_section(sections, &["Flavor Text", "Quote"]) else {
        return String::new();
    };
    if let Some(caps) = RE_QUOTE_DOUBLE.captures(flavor) {
        return normalized_clip(&caps[1], 500);
    }
    if let Some(caps) = RE_QUOTE_ITALIC.captures(flavor) {
        return normalized_clip(&caps[1], 500);
    }
    let trimmed = flavor.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        normalized_clip(trimmed, 500)
    }
}

fn abilities_text(sections: &IndexMap<String, String>, profession: &str) -> String {
    if let Some(body) = sections.get("Abilities") {
        return normalize(body);
    }
    if !profession.is_empty() {
        if let Some(body) = sections.get(profession) {
            if body.contains("Abilities") {
                return normalize(body);
            }
        }
    }
    String::new()
}

// ── Defeated encounters ─────────────────────────────────────────────────────

/// (health, sanity) text pairs from the shared Defeated page. The last two
/// cells of each data row carry the narrative texts.
pub fn parse_defeated_table(defeated_page: &Page) -> Vec<(String, String)> {
    let Some(body) = defeated_page
        .sections
        .get("Defeated Investigator Encounters")
    else {
        return Vec::new();
    };
    let stripped = strip_table_markup(body);
    split_rows(&stripped)
        .iter()
        .filter_map(|row| {
            let cells = row_cells(row);
            if cells.len() < 2 {
                return None;
            }
            let health = normalize(&cells[cells.len() - 2]);
            let sanity = normalize(&cells[cells.len() - 1]);
            Some((health, sanity))
        })
        .collect()
}

/// Defeated texts for one investigator, from their own page when present and
/// otherwise by alias-matching the shared table rows. Row texts name the
/// investigator in the narrative, which is what the aliases score against.
pub fn defeated_encounters(page: &Page, defeated_rows: &[(String, String)]) -> DefeatedTexts {
    let mut texts = DefeatedTexts {
        loss_of_health: defeated_text(page, "Loss of Health", &RE_DEFEATED_HEALTH),
        loss_of_sanity: defeated_text(page, "Loss of Sanity", &RE_DEFEATED_SANITY),
    };
    if (texts.loss_of_health.is_empty() || texts.loss_of_sanity.is_empty())
        && !defeated_rows.is_empty()
    {
        let aliases = build_aliases(&page.title);
        let haystacks: Vec<String> = defeated_rows
            .iter()
            .map(|(health, sanity)| format!("{health} {sanity}"))
            .collect();
        if let Some(index) = best_match(&aliases, &haystacks) {
            let (health, sanity) = &defeated_rows[index];
            if texts.loss_of_health.is_empty() {
                texts.loss_of_health = health.clone();
            }
            if texts.loss_of_sanity.is_empty() {
                texts.loss_of_sanity = sanity.clone();
            }
        }
    }
    texts
}

fn defeated_text(page: &Page, section: &str, re_template: &Regex) -> String {
    if let Some(body) = page.sections.get(section) {
        // stripped templates leave empty parens behind
        let cleaned = body.replace("()", "").replace("  ", " ");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            return normalize(cleaned);
        }
    }
    if let Some(caps) = re_template.captures(&page.raw_markup) {
        let body = &caps[1];
        if let Some(inner) = RE_DEFEATED_TEXT.captures(body) {
            return normalize(inner[1].trim());
        }
        return normalize(body.trim());
    }
    String::new()
}
