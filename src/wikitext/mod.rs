//! Raw wiki markup parsing.
//!
//! [`parse_page`] turns one page's wikitext into the structured [`Page`]
//! record the snapshot stores: template fields, sections, link and
//! template inventories, and a plain-text rendering with `[Heading]`
//! markers.

pub mod normalize;
pub mod sections;
pub mod table;
pub mod template;

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Page;

static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").unwrap());
static RE_TEMPLATE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{([^}|]+)").unwrap());

static FT_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^}]+\}\}").unwrap());
static FT_FILE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[File:[^\]]+\]\]").unwrap());
static FT_CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[Category:[^\]]+\]\]").unwrap());
static FT_PIPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^|\]]+)\|([^\]]+)\]\]").unwrap());
static FT_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static FT_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'''([^']+)'''").unwrap());
static FT_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"''([^']+)''").unwrap());
static FT_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==+\s*([^=]+)\s*==+").unwrap());
static FT_HTML: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static FT_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Parse one page of raw wikitext into its snapshot record.
pub fn parse_page(title: &str, page_id: i64, categories: Vec<String>, content: &str) -> Page {
    let (infobox, card_data) = template::extract_fields(content);
    Page {
        title: title.to_string(),
        page_id,
        categories,
        infobox,
        card_data,
        sections: sections::split_sections(content),
        links: extract_links(content),
        templates: extract_templates(content),
        full_text: build_full_text(content),
        raw_markup: content.to_string(),
    }
}

/// Internal link targets in order of appearance, duplicates kept.
/// File, Category, and Image links are not content links.
pub fn extract_links(content: &str) -> Vec<String> {
    RE_LINK
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|target| {
            !target.starts_with("File:")
                && !target.starts_with("Category:")
                && !target.starts_with("Image:")
        })
        .collect()
}

/// Template names in order of appearance, duplicates kept. Parser
/// functions (`#`-prefixed) and runaway matches are dropped.
pub fn extract_templates(content: &str) -> Vec<String> {
    RE_TEMPLATE_NAME
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.starts_with('#') && name.chars().count() < 50)
        .collect()
}

/// Plain-text rendering of the page. Headings become `[Heading]` markers
/// on their own line so positional extractors can find their bearings.
pub fn build_full_text(content: &str) -> String {
    let text = FT_TEMPLATE.replace_all(content, "");
    let text = FT_FILE.replace_all(&text, "");
    let text = FT_CATEGORY.replace_all(&text, "");
    let text = FT_PIPED.replace_all(&text, "$2");
    let text = FT_BARE.replace_all(&text, "$1");
    let text = FT_BOLD.replace_all(&text, "$1");
    let text = FT_ITALIC.replace_all(&text, "$1");
    let text = FT_HEADING.replace_all(&text, "\n[$1]\n");
    let text = FT_HTML.replace_all(&text, "");
    let text = FT_BLANK.replace_all(&text, "\n\n");
    text.trim().to_string()
}
