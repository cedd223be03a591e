//! Rendered-HTML extraction for the encounter reference pages.
//!
//! The wiki API returns raw markup, but encounter tables only take their
//! final shape once MediaWiki renders them, so these passes work on the
//! delivered HTML instead. Cells keep their anchors and images, rows keep
//! the section they were found under.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config;
use crate::filter::is_allowed_set_text;
use crate::model::{
    AntagonistResearch, CellValue, DocumentSection, ImageRef, LinkRef, ListItem, LocationPage,
    OtherWorldDocument, ResearchBuckets, ResearchDocument, RichCell, ScrapedDocument, TableRow,
};

static SEL_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.mw-parser-output").unwrap());
static SEL_CONTENT_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#mw-content-text").unwrap());
static SEL_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.page-header__title").unwrap());
static SEL_FIRST_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#firstHeading").unwrap());
static SEL_PAGE_CATEGORIES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.page-header__categories a").unwrap());
static SEL_TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static SEL_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());
static SEL_THEAD_TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("thead th").unwrap());
static SEL_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static SEL_IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());
static SEL_LIST: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul, ol").unwrap());
static SEL_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static SEL_WALK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4, table, ul, ol, p").unwrap());
static SEL_RESEARCH_WALK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4, table").unwrap());

static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const RESEARCH_INTRO: &str = "A Research Encounter is a type of Card that is used when playing \
    Eldermyth. A player may choose to draw a Research Encounter if he is on a space with a Clue \
    token during the Encounter Phase. Research Encounters are specific to the Antagonist that is \
    in play during the game.";

const OTHER_WORLD_INTRO: &str = "Other World Encounters occur when an investigator enters a gate \
    during the Encounter Phase. These encounters represent different otherworldly locations from \
    the mythos.";

/// Header keywords that mark a table as an encounter table.
const ENCOUNTER_HEADER_HINTS: &[&str] = &["id", "set", "initial", "pass", "fail", "encounter"];

fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    RE_WS.replace_all(&raw, " ").trim().to_string()
}

fn has_ancestor(element: ElementRef<'_>, names: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| names.contains(&ancestor.value().name()))
}

fn cell_links(cell: ElementRef<'_>) -> Vec<LinkRef> {
    cell.select(&SEL_ANCHOR)
        .filter_map(|anchor| {
            let text = element_text(anchor);
            let href = anchor.value().attr("href").unwrap_or_default();
            (!text.is_empty() && !href.is_empty()).then(|| LinkRef {
                text,
                href: href.to_string(),
            })
        })
        .collect()
}

fn cell_images(cell: ElementRef<'_>) -> Vec<ImageRef> {
    cell.select(&SEL_IMAGE)
        .filter_map(|img| {
            let src = img.value().attr("src").unwrap_or_default();
            (!src.is_empty()).then(|| ImageRef {
                alt: img.value().attr("alt").unwrap_or_default().to_string(),
                src: src.to_string(),
            })
        })
        .collect()
}

fn table_rows(
    table: ElementRef<'_>,
    section: Option<&str>,
    research: Option<(&str, &str)>,
) -> Vec<TableRow> {
    let mut headers: Vec<String> = table
        .select(&SEL_TR)
        .next()
        .map(|first| first.select(&SEL_CELL).map(element_text).collect())
        .unwrap_or_default();
    if headers.is_empty() {
        headers = table.select(&SEL_THEAD_TH).map(element_text).collect();
    }

    let mut rows = Vec::new();
    for tr in table.select(&SEL_TR).skip(1) {
        let mut columns: IndexMap<String, CellValue> = IndexMap::new();
        for (i, cell) in tr.select(&SEL_CELL).enumerate() {
            let text = element_text(cell);
            let links = cell_links(cell);
            let images = cell_images(cell);
            let value = if links.is_empty() && images.is_empty() {
                CellValue::Text(text)
            } else {
                CellValue::Rich(RichCell {
                    text,
                    links: (!links.is_empty()).then_some(links),
                    images: (!images.is_empty()).then_some(images),
                })
            };
            let key = match headers.get(i) {
                Some(header) if !header.is_empty() => header.clone(),
                _ => format!("column_{i}"),
            };
            columns.insert(key, value);
        }

        let mut row = TableRow {
            columns,
            ..TableRow::default()
        };
        if row.is_blank() {
            continue;
        }
        row.section = section.filter(|s| !s.is_empty()).map(str::to_string);
        if let Some((antagonist, set_text)) = research {
            row.antagonist = Some(antagonist.to_string());
            let set_missing = row
                .column_text("Set")
                .map_or(true, |text| text.trim().is_empty());
            if set_missing {
                row.columns
                    .insert("Set".to_string(), CellValue::Text(set_text.to_string()));
            }
        }
        rows.push(row);
    }
    rows
}

/// Rows of one table. The first `tr` supplies the column keys.
pub fn extract_table_rows(table: ElementRef<'_>, section: Option<&str>) -> Vec<TableRow> {
    table_rows(table, section, None)
}

/// Research variant: rows also carry the antagonist they belong to, and
/// get the page's set text when the `Set` column is missing or blank.
pub fn extract_research_rows(
    table: ElementRef<'_>,
    section: Option<&str>,
    antagonist: &str,
    set_text: &str,
) -> Vec<TableRow> {
    table_rows(table, section, Some((antagonist, set_text)))
}

/// Items of a list element and every list nested inside it. Each list
/// contributes its direct `li` children, so nested items show up once on
/// their own and once inside the parent item's text.
pub fn extract_list_items(element: ElementRef<'_>, section: Option<&str>) -> Vec<ListItem> {
    let mut items = Vec::new();
    for list in std::iter::once(element).chain(element.select(&SEL_LIST)) {
        for li in list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
        {
            let text = element_text(li);
            if text.is_empty() {
                continue;
            }
            let links = cell_links(li);
            items.push(ListItem {
                text,
                links: (!links.is_empty()).then_some(links),
                section: section.filter(|s| !s.is_empty()).map(str::to_string),
            });
        }
    }
    items
}

#[derive(Default)]
struct SectionAccum {
    text_parts: Vec<String>,
    tables: Vec<TableRow>,
    lists: Vec<ListItem>,
}

impl SectionAccum {
    fn into_section(self) -> DocumentSection {
        DocumentSection {
            text: (!self.text_parts.is_empty()).then(|| self.text_parts.join(" ")),
            tables: (!self.tables.is_empty()).then_some(self.tables),
            lists: (!self.lists.is_empty()).then_some(self.lists),
        }
    }
}

fn content_root<'a>(doc: &'a Html) -> ElementRef<'a> {
    doc.select(&SEL_CONTENT)
        .next()
        .or_else(|| doc.select(&SEL_CONTENT_FALLBACK).next())
        .unwrap_or_else(|| doc.root_element())
}

fn page_title(doc: &Html, page: &str) -> String {
    doc.select(&SEL_TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            doc.select(&SEL_FIRST_HEADING)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| page.replace('_', " "))
}

fn page_categories(doc: &Html) -> Vec<String> {
    doc.select(&SEL_PAGE_CATEGORIES)
        .map(element_text)
        .filter(|t| !t.is_empty() && t != "Categories")
        .collect()
}

fn clean_heading(element: ElementRef<'_>) -> String {
    element_text(element)
        .replace("[edit]", "")
        .replace("[]", "")
        .trim()
        .to_string()
}

/// Paragraphs sitting directly under the content root, before the first
/// heading or table.
fn leading_paragraphs(content: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for child in content.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "p" => {
                let text = element_text(child);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            "h2" | "h3" | "table" => break,
            _ => {}
        }
    }
    parts.join(" ")
}

/// Walk one rendered encounter page into its document record. Content
/// before the first heading lands in a `_intro` pseudo-section.
pub fn parse_encounter_document(html: &str, url: &str, page: &str) -> ScrapedDocument {
    let doc = Html::parse_document(html);
    let content = content_root(&doc);
    let title = page_title(&doc, page);
    let intro = leading_paragraphs(content);
    let categories = page_categories(&doc);

    let mut sections: IndexMap<String, SectionAccum> = IndexMap::new();
    let mut all_encounters: Vec<TableRow> = Vec::new();
    let mut all_list_items: Vec<ListItem> = Vec::new();
    let mut current = "_intro".to_string();

    for element in content.select(&SEL_WALK) {
        match element.value().name() {
            "h2" | "h3" | "h4" => {
                let heading = clean_heading(element);
                if !heading.is_empty() {
                    current = heading;
                }
            }
            "table" => {
                let rows = extract_table_rows(element, Some(&current));
                if !rows.is_empty() {
                    all_encounters.extend(rows.iter().cloned());
                    sections.entry(current.clone()).or_default().tables.extend(rows);
                }
            }
            "ul" | "ol" => {
                // nested lists are covered by their outermost list, and
                // lists inside tables already live in the row cells
                if has_ancestor(element, &["table", "ul", "ol"]) {
                    continue;
                }
                let items = extract_list_items(element, Some(&current));
                if !items.is_empty() {
                    all_list_items.extend(items.iter().cloned());
                    sections.entry(current.clone()).or_default().lists.extend(items);
                }
            }
            "p" => {
                if has_ancestor(element, &["table"]) {
                    continue;
                }
                let text = element_text(element);
                if !text.is_empty() {
                    sections.entry(current.clone()).or_default().text_parts.push(text);
                }
            }
            _ => {}
        }
    }

    let sections: IndexMap<String, DocumentSection> = sections
        .into_iter()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, accum)| (name, accum.into_section()))
        .filter(|(_, section)| !section.is_empty())
        .collect();

    ScrapedDocument {
        url: url.to_string(),
        title,
        intro: (!intro.is_empty()).then_some(intro),
        categories: (!categories.is_empty()).then_some(categories),
        sections: (!sections.is_empty()).then_some(sections),
        all_encounters: (!all_encounters.is_empty()).then_some(all_encounters),
        all_list_items: (!all_list_items.is_empty()).then_some(all_list_items),
    }
}

/// Sort one antagonist's research page into city, wilderness, and sea
/// buckets. Tables only count while the last heading named a bucket.
pub fn parse_research_page(html: &str, antagonist: &str, set_text: &str) -> ResearchBuckets {
    let doc = Html::parse_document(html);
    let content = content_root(&doc);

    let mut buckets = ResearchBuckets::default();
    let mut current: Option<&'static str> = None;

    for element in content.select(&SEL_RESEARCH_WALK) {
        if element.value().name() == "table" {
            let Some(section) = current else { continue };
            let rows = extract_research_rows(element, Some(section), antagonist, set_text);
            match section {
                "City Encounters" => buckets.city.extend(rows),
                "Wilderness Encounters" => buckets.wilderness.extend(rows),
                _ => buckets.sea.extend(rows),
            }
        } else {
            let heading = element_text(element).to_lowercase();
            current = if heading.contains("city") {
                Some("City Encounters")
            } else if heading.contains("wilderness") {
                Some("Wilderness Encounters")
            } else if heading.contains("sea") {
                Some("Sea Encounters")
            } else {
                None
            };
        }
    }

    buckets
}

/// Merge the per-antagonist research results into the aggregate document.
pub fn build_research_document(
    base: &str,
    entries: Vec<AntagonistResearch>,
) -> ResearchDocument {
    let mut city: Vec<TableRow> = Vec::new();
    let mut wilderness: Vec<TableRow> = Vec::new();
    let mut sea: Vec<TableRow> = Vec::new();
    let mut all_encounters: Vec<TableRow> = Vec::new();
    let mut antagonists = IndexMap::new();

    for entry in entries {
        all_encounters.extend(entry.encounters.city.iter().cloned());
        all_encounters.extend(entry.encounters.wilderness.iter().cloned());
        all_encounters.extend(entry.encounters.sea.iter().cloned());
        city.extend(entry.encounters.city.iter().cloned());
        wilderness.extend(entry.encounters.wilderness.iter().cloned());
        sea.extend(entry.encounters.sea.iter().cloned());
        antagonists.insert(entry.antagonist.clone(), entry);
    }

    let mut sections = IndexMap::new();
    for (name, rows) in [
        ("City Encounters", city),
        ("Wilderness Encounters", wilderness),
        ("Sea Encounters", sea),
    ] {
        sections.insert(
            name.to_string(),
            DocumentSection {
                text: None,
                tables: Some(rows),
                lists: None,
            },
        );
    }

    ResearchDocument {
        url: config::page_url(base, "Research_Encounter"),
        title: "Research Encounter".to_string(),
        intro: RESEARCH_INTRO.to_string(),
        categories: vec!["Cards".to_string(), "Encounters".to_string()],
        sections,
        all_encounters,
        antagonists,
    }
}

fn is_encounter_table(table: ElementRef<'_>) -> bool {
    let Some(first_row) = table.select(&SEL_TR).next() else {
        return false;
    };
    let header = element_text(first_row).to_lowercase();
    ENCOUNTER_HEADER_HINTS.iter().any(|hint| header.contains(hint))
}

/// Pull the encounter tables out of one other-world location page and
/// keep only rows from the allowed sets.
pub fn parse_other_world_page(html: &str, base: &str, page: &str) -> LocationPage {
    let location = page.replace("_(Other_World)", "").replace('_', " ");
    let doc = Html::parse_document(html);
    let content = content_root(&doc);

    let mut intro_parts = Vec::new();
    for child in content.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "p" => {
                let text = element_text(child);
                if !text.is_empty() {
                    intro_parts.push(text);
                }
            }
            "h2" | "table" => break,
            _ => {}
        }
    }
    let intro = intro_parts.join(" ");

    let mut encounters = Vec::new();
    for table in content.select(&SEL_TABLE) {
        if !is_encounter_table(table) {
            continue;
        }
        let mut rows = extract_table_rows(table, None);
        for row in &mut rows {
            row.location = Some(location.clone());
        }
        encounters.extend(rows);
    }
    encounters.retain(|row| is_allowed_set_text(row.column_text("Set").unwrap_or_default()));

    LocationPage {
        location,
        url: config::page_url(base, page),
        intro: (!intro.is_empty()).then_some(intro),
        encounters,
    }
}

/// Merge the per-location pages into the aggregate other-world document.
/// Locations without surviving encounters are dropped.
pub fn build_other_world_document(base: &str, locations: Vec<LocationPage>) -> OtherWorldDocument {
    let mut sections = IndexMap::new();
    let mut all_encounters = Vec::new();
    let mut kept = IndexMap::new();

    for location in locations {
        if location.encounters.is_empty() {
            continue;
        }
        all_encounters.extend(location.encounters.iter().cloned());
        sections.insert(
            location.location.clone(),
            DocumentSection {
                text: location.intro.clone(),
                tables: Some(location.encounters.clone()),
                lists: None,
            },
        );
        kept.insert(location.location.clone(), location);
    }

    OtherWorldDocument {
        url: config::page_url(base, "Other_World_Encounters"),
        title: "Other World Encounters".to_string(),
        intro: OTHER_WORLD_INTRO.to_string(),
        categories: vec!["Cards".to_string(), "Encounters".to_string()],
        sections,
        all_encounters,
        locations: kept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_table(doc: &Html) -> ElementRef<'_> {
        doc.select(&SEL_TABLE).next().expect("fixture should have a table")
    }

    #[test]
    fn table_rows_key_cells_by_header() {
        let doc = Html::parse_document(
            "<table><tr><th>ID</th><th>Set</th></tr>\
             <tr><td>1</td><td>Core</td><td>overflow</td></tr></table>",
        );
        let rows = extract_table_rows(first_table(&doc), None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].column_text("ID"), Some("1"));
        assert_eq!(rows[0].column_text("Set"), Some("Core"));
        assert_eq!(rows[0].column_text("column_2"), Some("overflow"));
    }

    #[test]
    fn cells_with_anchors_become_rich() {
        let doc = Html::parse_document(
            "<table><tr><th>Card</th></tr>\
             <tr><td><a href=\"/wiki/Cthulhu\">Cthulhu</a></td></tr></table>",
        );
        let rows = extract_table_rows(first_table(&doc), Some("Sleepers"));
        let CellValue::Rich(cell) = &rows[0].columns["Card"] else {
            panic!("expected rich cell, got: {:?}", rows[0].columns["Card"]);
        };
        assert_eq!(cell.text, "Cthulhu");
        let links = cell.links.as_ref().expect("links should be present");
        assert_eq!(links[0].href, "/wiki/Cthulhu");
        assert_eq!(rows[0].section.as_deref(), Some("Sleepers"));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let doc = Html::parse_document(
            "<table><tr><th>ID</th><th>Text</th></tr>\
             <tr><td></td><td> </td></tr>\
             <tr><td>2</td><td>real</td></tr></table>",
        );
        let rows = extract_table_rows(first_table(&doc), Some("Arkham"));
        assert_eq!(rows.len(), 1, "blank row should be skipped, got: {rows:?}");
        assert_eq!(rows[0].column_text("ID"), Some("2"));
    }

    #[test]
    fn research_rows_get_antagonist_and_default_set() {
        let doc = Html::parse_document(
            "<table><tr><th>ID</th><th>Set</th></tr>\
             <tr><td>1</td><td></td></tr>\
             <tr><td>2</td><td>02Forsaken Lore</td></tr></table>",
        );
        let rows = extract_research_rows(first_table(&doc), Some("City Encounters"), "Azathoth", "01Core");
        assert_eq!(rows[0].antagonist.as_deref(), Some("Azathoth"));
        assert_eq!(rows[0].column_text("Set"), Some("01Core"));
        assert_eq!(rows[1].column_text("Set"), Some("02Forsaken Lore"));
    }

    #[test]
    fn list_items_cover_nested_lists() {
        let doc = Html::parse_document(
            "<ul><li>First note</li><li>Second<ul><li>Nested note</li></ul></li></ul>",
        );
        let list = doc.select(&SEL_LIST).next().expect("fixture should have a list");
        let items = extract_list_items(list, Some("Notes"));
        let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["First note", "SecondNested note", "Nested note"]);
        assert!(items.iter().all(|i| i.section.as_deref() == Some("Notes")));
    }

    const ENCOUNTER_PAGE: &str = r##"
        <div class="page-header__categories">
            <a href="#">Categories</a><a href="#">Cards</a><a href="#">Encounters</a>
        </div>
        <div class="mw-parser-output">
            <p>General encounters happen on the main board.</p>
            <h2>Arkham<span>[edit]</span></h2>
            <p>Streets of Arkham.</p>
            <table>
                <tr><th>ID</th><th>Set</th></tr>
                <tr><td>1</td><td><a href="/wiki/Core_Game">Core Game</a></td></tr>
            </table>
            <ul><li>First note</li><li>Second<ul><li>Nested note</li></ul></li></ul>
        </div>"##;

    #[test]
    fn encounter_document_walks_sections_in_order() {
        let doc = parse_encounter_document(
            ENCOUNTER_PAGE,
            "https://eldermyth.fandom.com/wiki/General_Encounter",
            "General_Encounter",
        );
        assert_eq!(doc.title, "General Encounter");
        assert_eq!(
            doc.intro.as_deref(),
            Some("General encounters happen on the main board.")
        );
        assert_eq!(
            doc.categories,
            Some(vec!["Cards".to_string(), "Encounters".to_string()])
        );

        let sections = doc.sections.as_ref().expect("sections should be present");
        assert!(sections.contains_key("_intro"));
        let arkham = &sections["Arkham"];
        assert_eq!(arkham.text.as_deref(), Some("Streets of Arkham."));
        assert_eq!(arkham.tables.as_ref().map(Vec::len), Some(1));
        assert_eq!(arkham.lists.as_ref().map(Vec::len), Some(3));

        let rows = doc.all_encounters.as_ref().expect("rows should be present");
        assert_eq!(rows[0].section.as_deref(), Some("Arkham"));
        assert_eq!(doc.all_list_items.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn empty_page_serializes_nulls_not_defaults() {
        let doc = parse_encounter_document("<html><body></body></html>", "u", "Defeated");
        assert_eq!(doc.title, "Defeated");
        assert!(doc.intro.is_none());
        assert!(doc.sections.is_none());
        let json = serde_json::to_value(&doc).expect("document should serialize");
        assert!(json["intro"].is_null());
        assert!(json["all_encounters"].is_null());
    }

    const RESEARCH_PAGE: &str = r#"
        <div class="mw-parser-output">
            <h2>City Encounters</h2>
            <table>
                <tr><th>ID</th><th>Set</th><th>Encounter</th></tr>
                <tr><td>1</td><td></td><td>You chant beneath the moon.</td></tr>
            </table>
            <h2>Sea Encounters</h2>
            <table>
                <tr><th>ID</th><th>Set</th><th>Encounter</th></tr>
                <tr><td>7</td><td>02Forsaken Lore</td><td>The tide recedes.</td></tr>
            </table>
            <h2>References</h2>
            <table><tr><td>junk</td></tr></table>
        </div>"#;

    #[test]
    fn research_page_routes_tables_by_heading() {
        let buckets = parse_research_page(RESEARCH_PAGE, "Azathoth", "01Core");
        assert_eq!(buckets.city.len(), 1);
        assert_eq!(buckets.wilderness.len(), 0);
        assert_eq!(buckets.sea.len(), 1);
        assert_eq!(buckets.total(), 2);
        assert_eq!(buckets.city[0].column_text("Set"), Some("01Core"));
        assert_eq!(buckets.city[0].section.as_deref(), Some("City Encounters"));
        assert_eq!(buckets.sea[0].antagonist.as_deref(), Some("Azathoth"));
    }

    const OTHER_WORLD_PAGE: &str = r#"
        <div class="mw-parser-output">
            <p>The black gulf between the stars.</p>
            <table>
                <tr><th>ID</th><th>Set</th><th>Pass</th></tr>
                <tr><td>3</td><td>Core</td><td>You return changed.</td></tr>
                <tr><td>9</td><td>Under the Pyramids</td><td>Sand everywhere.</td></tr>
            </table>
            <table><tr><th>Gallery</th></tr><tr><td>art</td></tr></table>
        </div>"#;

    #[test]
    fn other_world_page_filters_sets_and_names_location() {
        let base = "https://eldermyth.fandom.com";
        let page = parse_other_world_page(OTHER_WORLD_PAGE, base, "The_Abyss");
        assert_eq!(page.location, "The Abyss");
        assert_eq!(page.url, "https://eldermyth.fandom.com/wiki/The_Abyss");
        assert_eq!(page.intro.as_deref(), Some("The black gulf between the stars."));
        assert_eq!(page.encounters.len(), 1, "expansion row should be filtered out");
        assert_eq!(page.encounters[0].column_text("ID"), Some("3"));
        assert_eq!(page.encounters[0].location.as_deref(), Some("The Abyss"));
    }

    #[test]
    fn other_world_document_drops_empty_locations() {
        let base = "https://eldermyth.fandom.com";
        let full = parse_other_world_page(OTHER_WORLD_PAGE, base, "The_Abyss");
        let empty = LocationPage {
            location: "Yuggoth".to_string(),
            url: config::page_url(base, "Yuggoth"),
            intro: None,
            encounters: Vec::new(),
        };
        let doc = build_other_world_document(base, vec![full, empty]);
        assert_eq!(doc.title, "Other World Encounters");
        assert_eq!(doc.locations.len(), 1);
        assert!(doc.sections.contains_key("The Abyss"));
        assert!(!doc.sections.contains_key("Yuggoth"));
        assert_eq!(doc.all_encounters.len(), 1);
    }
}
