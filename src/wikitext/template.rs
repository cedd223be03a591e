//! Template parameter extraction.
//!
//! Every `{{...}}` invocation in the page is scanned for `|key=value`
//! segments. The body match stops at the first `}`, so a template nested
//! inside a value arrives as an unclosed `{{Name` fragment. Extractors
//! downstream rely on that exact shape when they probe for `{{Abbrev`.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use super::normalize::clean_inline;

static RE_TEMPLATE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{([^}]+)\}\}").unwrap());

/// Keys mirrored into the card-data map for direct lookup.
const CARD_DATA_KEYS: &[&str] = &[
    "effect",
    "action",
    "text",
    "description",
    "flavor",
    "lore",
    "pass",
    "fail",
    "test",
    "initial",
    "reckoning",
    "cost",
    "toughness",
    "horror",
    "damage",
    "spawn",
    "trait",
    "type",
    "expansion",
    "set",
];

/// Pull `(infobox, card_data)` out of raw wikitext. Keys are lower-cased
/// and trimmed, values cleaned inline. Last occurrence of a key wins but
/// keeps its original map position.
pub fn extract_fields(text: &str) -> (IndexMap<String, String>, IndexMap<String, String>) {
    let mut infobox: IndexMap<String, String> = IndexMap::new();
    let mut card_data: IndexMap<String, String> = IndexMap::new();

    for caps in RE_TEMPLATE_BODY.captures_iter(text) {
        let body = &caps[1];
        for segment in body.split('|').skip(1) {
            let Some((raw_key, raw_value)) = segment.split_once('=') else {
                continue;
            };
            let key = raw_key.trim();
            if key.is_empty() || key.contains('\n') {
                continue;
            }
            let key = key.to_lowercase();
            let value = clean_inline(raw_value.trim());
            if value.is_empty() {
                continue;
            }
            if CARD_DATA_KEYS.contains(&key.as_str()) {
                card_data.insert(key.clone(), value.clone());
            }
            infobox.insert(key, value);
        }
    }

    (infobox, card_data)
}
