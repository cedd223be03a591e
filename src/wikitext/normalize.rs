//! Markup stripping for wikitext.
//!
//! `normalize` runs a fixed pass order: file embeds, links, templates,
//! emphasis, table and heading markup, whitespace. Passes repeat until the
//! text stops changing, so the function is idempotent even on pathological
//! nesting. `clean_inline` applies just the link/template/emphasis passes
//! and is what infobox values go through.

use std::sync::LazyLock;

use regex::Regex;

static RE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[[Ff]ile:[^\]]+\]\]").unwrap());
static RE_PIPED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^|\]]+)\|([^\]]+)\]\]").unwrap());
static RE_BARE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static RE_SKILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(Observation|Lore|Influence|Will|Strength)\}\}").unwrap());
static RE_SKILL_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(Observation|Lore|Influence|Will|Strength)\|[^}]*\}\}").unwrap()
});
static RE_ICON_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{Icon\|[^}]*\}\}").unwrap());
static RE_HEALTH_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{Health\|value=(\d+)\}\}").unwrap());
static RE_SANITY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{Sanity\|value=(\d+)\}\}").unwrap());
static RE_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^}]+\}\}").unwrap());
static RE_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").unwrap());
static RE_TABLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\|[^}]*\|\}").unwrap());
static RE_ROW_SEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|-").unwrap());
static RE_CELL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|[^\n]*\n").unwrap());
static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"={2,}[^=]+=+").unwrap());
static RE_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Templates rewritten to display text before the generic removal pass.
const TEMPLATE_REWRITES: &[(&str, &str)] = &[
    ("{{Core Game}}", "Core"),
    ("{{FL imagelink}}", "Forsaken Lore"),
    ("{{TD imagelink}}", "The Dreamlands"),
    ("{{MoM imagelink}}", "Mountains of Madness"),
    ("{{SR imagelink}}", "Strange Remnants"),
    ("{{UtP imagelink}}", "Under the Pyramids"),
    ("{{CiR imagelink}}", "Cities in Ruin"),
    ("{{SoC imagelink}}", "Signs of Carcosa"),
    ("{{MoN imagelink}}", "Masks of Nyarlathotep"),
    ("{{Icon|clue}}", "Clue"),
    ("{{Icon|et}}", "Eldritch Token"),
    ("{{Icon|sea}}", "Sea"),
    ("{{Icon|city}}", "City"),
    ("{{Icon|wilderness}}", "Wilderness"),
];

fn resolve_links(text: &str) -> String {
    // Piped form first, the pipe would corrupt the bare pattern.
    let out = RE_PIPED_LINK.replace_all(text, "$2");
    RE_BARE_LINK.replace_all(&out, "$1").into_owned()
}

fn resolve_templates(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, display) in TEMPLATE_REWRITES {
        out = out.replace(pattern, display);
    }
    out = RE_SKILL.replace_all(&out, "($1)").into_owned();
    out = RE_SKILL_ARGS.replace_all(&out, "($1)").into_owned();
    out = RE_ICON_ANY.replace_all(&out, "").into_owned();
    out = RE_HEALTH_VALUE.replace_all(&out, "$1 Health").into_owned();
    out = RE_SANITY_VALUE.replace_all(&out, "$1 Sanity").into_owned();
    out = out.replace("{{Health}}", "Health").replace("{{Sanity}}", "Sanity");

    // Anything unrecognized is dropped wholesale. One scan is not enough
    // once braces nest, so repeat until stable. A template wrapping
    // another template still loses its tail brace pair, that imprecision
    // is accepted.
    loop {
        let next = RE_TEMPLATE.replace_all(&out, "").into_owned();
        if next == out {
            return out;
        }
        out = next;
    }
}

fn normalize_once(text: &str) -> String {
    let mut out = RE_FILE.replace_all(text, "").into_owned();
    out = resolve_links(&out);
    out = resolve_templates(&out);
    out = RE_EMPHASIS.replace_all(&out, "").into_owned();
    out = RE_TABLE_BLOCK.replace_all(&out, "").into_owned();
    out = RE_ROW_SEP.replace_all(&out, "").into_owned();
    out = RE_CELL_LINE.replace_all(&out, "").into_owned();
    out = RE_HEADING.replace_all(&out, "").into_owned();
    out = RE_BLANK_LINES.replace_all(&out, "\n\n").into_owned();
    out = RE_SPACES.replace_all(&out, " ").into_owned();
    out.trim().to_string()
}

/// Strip all wiki markup from `text`. Total and idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = normalize_once(text);
    loop {
        let next = normalize_once(&out);
        if next == out {
            return out;
        }
        out = next;
    }
}

/// Clean a single template parameter value: links, templates, emphasis.
/// Structural passes (tables, headings) do not apply inside a value.
pub fn clean_inline(text: &str) -> String {
    let out = resolve_links(text);
    let out = resolve_templates(&out);
    RE_EMPHASIS.replace_all(&out, "").trim().to_string()
}

/// Hard cut after `max` characters. Never splits a UTF-8 scalar.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
