//! Serde types for the wiki snapshot and every derived JSON document.
//!
//! Field names mirror the JSON the pipeline reads and writes, so most
//! structs carry a camelCase rename. Maps are `IndexMap` so re-serializing
//! a document keeps its key order stable across runs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Snapshot ────────────────────────────────────────────────────────────────

/// One scraped wiki page with everything derived from its markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub title: String,
    pub page_id: i64,
    pub categories: Vec<String>,
    /// Lower-cased template parameter key -> cleaned value, last write wins.
    pub infobox: IndexMap<String, String>,
    /// Allow-listed card fields mirrored out of the infobox.
    pub card_data: IndexMap<String, String>,
    /// Section heading -> cleaned body. Emphasis markers survive here.
    pub sections: IndexMap<String, String>,
    /// Linked titles in document order, duplicates kept.
    pub links: Vec<String>,
    pub templates: Vec<String>,
    /// Fully de-markup'd page text with `[Heading]` markers.
    pub full_text: String,
    pub raw_markup: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotMetadata {
    pub source: String,
    pub scraped_at: String,
    pub version: String,
    pub total_pages: usize,
    pub stats: IndexMap<String, usize>,
}

/// Pages bucketed by domain category. Every page also lives in `allPages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Categories {
    pub investigators: Vec<Page>,
    pub antagonists: Vec<Page>,
    pub monsters: Vec<Page>,
    pub epic_monsters: Vec<Page>,
    pub assets: Vec<Page>,
    pub unique_assets: Vec<Page>,
    pub artifacts: Vec<Page>,
    pub spells: Vec<Page>,
    pub conditions: Vec<Page>,
    pub encounters: EncounterCategories,
    pub mythos: Vec<Page>,
    pub mysteries: Vec<Page>,
    pub preludes: Vec<Page>,
    pub adventures: Vec<Page>,
    pub personal_stories: Vec<Page>,
    pub game_sets: Vec<Page>,
    pub game_boards: Vec<Page>,
    pub mechanics: Vec<Page>,
    pub other: Vec<Page>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncounterCategories {
    pub general: Vec<Page>,
    pub location: Vec<Page>,
    pub research: Vec<Page>,
    pub other_world: Vec<Page>,
    pub expedition: Vec<Page>,
    pub mystic_ruins: Vec<Page>,
    pub dream_quest: Vec<Page>,
    pub devastation: Vec<Page>,
    pub special: Vec<Page>,
    pub combat: Vec<Page>,
    pub other: Vec<Page>,
}

impl EncounterCategories {
    pub fn total(&self) -> usize {
        self.general.len()
            + self.location.len()
            + self.research.len()
            + self.other_world.len()
            + self.expedition.len()
            + self.mystic_ruins.len()
            + self.dream_quest.len()
            + self.devastation.len()
            + self.special.len()
            + self.combat.len()
            + self.other.len()
    }
}

/// The full wiki dump: one file, everything downstream reads from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub categories: Categories,
    pub all_pages: IndexMap<String, Page>,
}

// ── Table rows (HTML scrape passes) ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRef {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichCell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub links: Option<Vec<LinkRef>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub images: Option<Vec<ImageRef>>,
}

/// A table cell: a bare string when it holds only text, a structured
/// object as soon as anchors or images are present. Consumers must
/// handle both shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Rich(RichCell),
}

impl CellValue {
    pub fn text(&self) -> &str {
        match self {
            CellValue::Text(s) => s,
            CellValue::Rich(r) => &r.text,
        }
    }

    /// A rich cell always counts as non-empty, it only exists when the
    /// cell carried links or images.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::Rich(_) => false,
        }
    }
}

/// One extracted table row. Column keys come from the table header,
/// `column_<i>` when the header runs short. The underscore fields are
/// provenance, not columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(flatten)]
    pub columns: IndexMap<String, CellValue>,
    #[serde(rename = "_section", skip_serializing_if = "Option::is_none", default)]
    pub section: Option<String>,
    #[serde(rename = "_antagonist", skip_serializing_if = "Option::is_none", default)]
    pub antagonist: Option<String>,
    #[serde(rename = "_location", skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
}

impl TableRow {
    /// True when every column value is empty. Provenance fields do not count.
    pub fn is_blank(&self) -> bool {
        self.columns.values().all(|v| v.is_empty())
    }

    pub fn column_text(&self, key: &str) -> Option<&str> {
        self.columns.get(key).map(|v| v.text())
    }
}

/// One `li` pulled from a page list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub links: Option<Vec<LinkRef>>,
    #[serde(rename = "_section", skip_serializing_if = "Option::is_none", default)]
    pub section: Option<String>,
}

// ── Scraped HTML documents ──────────────────────────────────────────────────

/// Content under one heading of a scraped page. Empty parts are omitted
/// from the JSON entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<TableRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<ListItem>>,
}

impl DocumentSection {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.tables.is_none() && self.lists.is_none()
    }
}

/// One encounter reference page scraped from rendered HTML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedDocument {
    pub url: String,
    pub title: String,
    pub intro: Option<String>,
    pub categories: Option<Vec<String>>,
    pub sections: Option<IndexMap<String, DocumentSection>>,
    pub all_encounters: Option<Vec<TableRow>>,
    pub all_list_items: Option<Vec<ListItem>>,
}

/// Per-page entry in the encounter scrape `_summary.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterPageSummary {
    pub file: String,
    pub title: String,
    pub encounter_count: usize,
    pub list_count: usize,
    pub section_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterScrapeSummary {
    pub scraped_at: String,
    pub total_pages: usize,
    pub pages: IndexMap<String, EncounterPageSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetRef {
    pub text: String,
    pub expansion: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchBuckets {
    #[serde(rename = "City")]
    pub city: Vec<TableRow>,
    #[serde(rename = "Wilderness")]
    pub wilderness: Vec<TableRow>,
    #[serde(rename = "Sea")]
    pub sea: Vec<TableRow>,
}

impl ResearchBuckets {
    pub fn total(&self) -> usize {
        self.city.len() + self.wilderness.len() + self.sea.len()
    }
}

/// Research encounters for a single antagonist page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AntagonistResearch {
    pub antagonist: String,
    pub url: String,
    pub set: SetRef,
    pub encounters: ResearchBuckets,
}

/// Aggregate research encounter document across all tracked antagonists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchDocument {
    pub url: String,
    pub title: String,
    pub intro: String,
    pub categories: Vec<String>,
    pub sections: IndexMap<String, DocumentSection>,
    pub all_encounters: Vec<TableRow>,
    pub antagonists: IndexMap<String, AntagonistResearch>,
}

/// One other-world location page, already filtered to the allowed sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationPage {
    pub location: String,
    pub url: String,
    pub intro: Option<String>,
    pub encounters: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherWorldDocument {
    pub url: String,
    pub title: String,
    pub intro: String,
    pub categories: Vec<String>,
    pub sections: IndexMap<String, DocumentSection>,
    pub all_encounters: Vec<TableRow>,
    pub locations: IndexMap<String, LocationPage>,
}

// ── Mythos cards ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MythosMetadata {
    pub source: String,
    pub extracted_at: String,
    pub total_mythos_cards: usize,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MythosDocument {
    pub metadata: MythosMetadata,
    pub mythos_cards: Vec<Page>,
}

// ── Antagonist meta + detail ────────────────────────────────────────────────

/// Hand-maintained setup record. Indexed by every alias in `titles`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AntagonistMeta {
    pub titles: Vec<String>,
    pub difficulty: Option<String>,
    pub starting_doom: Option<i64>,
    pub mythos_deck_size: Option<i64>,
    pub mysteries: Option<String>,
    pub set: Option<String>,
    pub requires_side_board: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultistInfo {
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MythosStage {
    pub green: String,
    pub yellow: String,
    pub blue: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MythosDeck {
    pub stage1: MythosStage,
    pub stage2: MythosStage,
    pub stage3: MythosStage,
}

/// One research encounter card parsed out of an antagonist's research page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchEncounterDetail {
    pub id: String,
    pub expansion: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchEncounterDetails {
    pub city: Vec<ResearchEncounterDetail>,
    pub wilderness: Vec<ResearchEncounterDetail>,
    pub sea: Vec<ResearchEncounterDetail>,
}

/// One mystery card associated with an antagonist by its infobox reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MysteryDetail {
    pub name: String,
    pub antagonist: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub expansion: String,
    pub flavor_text: String,
    pub mystery_text: String,
    pub requires_clues: bool,
    pub requires_spells: bool,
    pub has_eldritch_tokens: bool,
    pub requires_artifact: bool,
    pub has_monster: bool,
}

/// The merged output record for one antagonist. Built once per run from
/// the base page plus the meta table; the enrichment pass appends the two
/// trailing detail fields in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AntagonistDetail {
    pub name: String,
    pub titles: Vec<String>,
    pub page_id: i64,
    pub difficulty: String,
    pub starting_doom: i64,
    pub mythos_deck_size: i64,
    pub mysteries: String,
    pub set: String,
    /// Side board name when the antagonist needs one, serialized as null
    /// otherwise so consumers can rely on the key.
    pub requires_side_board: Option<String>,
    pub notes: String,
    pub epithet: String,
    pub short_description: String,
    pub lore: String,
    pub gameplay_rules: String,
    pub setup_instructions: String,
    pub awakening_title: String,
    pub awakening_flavor: String,
    pub awakening_effects: String,
    pub final_mystery: String,
    pub cultist_info: CultistInfo,
    pub mystery_names: Vec<String>,
    pub research_encounters: String,
    pub mythos_deck: MythosDeck,
    pub appearance: String,
    pub residence: String,
    pub disposition: String,
    pub adversaries: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_encounter_details: Option<ResearchEncounterDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mystery_details: Option<Vec<MysteryDetail>>,
}

// ── Investigator detail ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub lore: i64,
    pub influence: i64,
    pub observation: i64,
    pub strength: i64,
    pub will: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentItem {
    pub count: i64,
    pub item: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefeatedTexts {
    pub loss_of_health: String,
    pub loss_of_sanity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestigatorDetail {
    pub name: String,
    pub page_id: i64,
    pub profession: String,
    pub role: String,
    pub set: String,
    pub skills: Skills,
    pub health: i64,
    pub sanity: i64,
    pub starting_location: String,
    pub starting_equipment: Vec<EquipmentItem>,
    pub personal_story: String,
    pub quote: String,
    pub biography: String,
    pub abilities: String,
    pub team_role: String,
    pub rulings: String,
    pub origin: String,
    pub defeated_encounters: DefeatedTexts,
}

// ── Filter stats ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCounts {
    pub before: usize,
    pub after: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterStats {
    pub filter: String,
    pub allowed_sets: Vec<String>,
    pub files: IndexMap<String, FilterCounts>,
    pub totals: FilterCounts,
}
