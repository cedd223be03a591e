//! Heading-based section splitting.
//!
//! Bodies get a light cleanup (links resolved, templates and HTML tags
//! stripped) but keep wiki emphasis, so downstream extractors can still
//! anchor on markers like `'''Final Mystery'''`.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

static RE_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={2,6})\s*([^=]+?)\s*(={2,6})\s*$").unwrap());
static RE_PIPED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^|\]]+)\|([^\]]+)\]\]").unwrap());
static RE_BARE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static RE_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^}]+\}\}").unwrap());
static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Split wikitext into `heading -> body`. A heading line must carry the
/// same number of `=` on both sides; anything else stays in the current
/// body. Text before the first heading is dropped, empty bodies are
/// omitted, and a repeated heading keeps the last non-empty body.
pub fn split_sections(text: &str) -> IndexMap<String, String> {
    let mut sections: IndexMap<String, String> = IndexMap::new();
    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = RE_HEADING_LINE.captures(line) {
            if caps[1].len() == caps[3].len() {
                flush(&mut sections, current.take(), &body);
                body.clear();
                current = Some(caps[2].to_string());
                continue;
            }
        }
        if current.is_some() {
            body.push(line);
        }
    }
    flush(&mut sections, current.take(), &body);

    sections
}

fn flush(sections: &mut IndexMap<String, String>, heading: Option<String>, body: &[&str]) {
    let Some(heading) = heading else { return };
    let content = clean_section_body(&body.join("\n"));
    if !content.is_empty() {
        sections.insert(heading, content);
    }
}

fn clean_section_body(body: &str) -> String {
    let text = RE_PIPED_LINK.replace_all(body, "$2");
    let text = RE_BARE_LINK.replace_all(&text, "$1");
    let text = RE_TEMPLATE.replace_all(&text, "");
    let text = RE_HTML_TAG.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_headings() {
        let sections = split_sections("== Gameplay ==\nRoll dice.\n=== Setup ===\nPlace doom.");
        assert_eq!(sections.len(), 2, "Expected 2 sections, got: {:?}", sections);
        assert_eq!(sections.get("Gameplay").map(String::as_str), Some("Roll dice."));
        assert_eq!(sections.get("Setup").map(String::as_str), Some("Place doom."));
    }

    #[test]
    fn text_before_first_heading_ignored() {
        let sections = split_sections("lead paragraph\n== Lore ==\nAn old tale.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("Lore").map(String::as_str), Some("An old tale."));
    }

    #[test]
    fn empty_sections_omitted() {
        let sections = split_sections("== Empty ==\n\n== Full ==\ncontent");
        assert!(!sections.contains_key("Empty"));
        assert_eq!(sections.get("Full").map(String::as_str), Some("content"));
    }

    #[test]
    fn duplicate_heading_last_wins() {
        let sections = split_sections("== Lore ==\nfirst\n== Lore ==\nsecond");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections.get("Lore").map(String::as_str), Some("second"));
    }

    #[test]
    fn body_cleanup_resolves_links_and_strips_templates() {
        let sections =
            split_sections("== Cultists ==\nSee [[Cultist|the cult]] and [[Azathoth]]. {{Clear}}<br/>");
        assert_eq!(
            sections.get("Cultists").map(String::as_str),
            Some("See the cult and Azathoth.")
        );
    }

    #[test]
    fn emphasis_survives_cleanup() {
        let sections = split_sections("== Awakening ==\n'''Final Mystery''' Solve it.");
        assert_eq!(
            sections.get("Awakening").map(String::as_str),
            Some("'''Final Mystery''' Solve it.")
        );
    }

    #[test]
    fn unbalanced_heading_stays_in_body() {
        let sections = split_sections("== Ok ==\nline one\n== Bad ===\nline two");
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections.get("Ok").map(String::as_str),
            Some("line one\n== Bad ===\nline two")
        );
    }

    #[test]
    fn heading_with_equals_inside_is_not_a_heading() {
        let sections = split_sections("== Ok ==\n== a = b ==\ntail");
        assert_eq!(
            sections.get("Ok").map(String::as_str),
            Some("== a = b ==\ntail")
        );
    }
}
