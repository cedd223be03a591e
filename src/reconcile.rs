//! Reconciliation of extracted antagonist pages with the hand-maintained
//! meta table, plus the enrichment pass that attaches research encounter and
//! mystery card details to an already-written detail file.
//!
//! Output order is stable: details are sorted by name, and enrichment always
//! writes both detail fields so a re-run produces identical bytes.

use indexmap::IndexMap;

use crate::extract::antagonists::antagonist_detail;
use crate::extract::mysteries::{mysteries_by_antagonist, parse_research_encounters};
use crate::model::{AntagonistDetail, AntagonistMeta, Page, ResearchEncounterDetails, Snapshot};

#[derive(Debug, Default)]
pub struct ReconcileCounts {
    pub pages: usize,
    pub with_meta: usize,
    pub defaulted: usize,
}

impl ReconcileCounts {
    pub fn print(&self) {
        println!("Merged {} antagonists:", self.pages);
        println!("  With meta entries: {}", self.with_meta);
        println!("  Defaulted:         {}", self.defaulted);
    }
}

#[derive(Debug, Default)]
pub struct EnrichCounts {
    pub details: usize,
    pub with_research: usize,
    pub with_mysteries: usize,
}

impl EnrichCounts {
    pub fn print(&self) {
        println!("Enriched {} antagonist records:", self.details);
        println!("  With research encounters: {}", self.with_research);
        println!("  With mystery details:     {}", self.with_mysteries);
    }
}

/// Build the detail record for every antagonist page in the snapshot and
/// merge in the meta table. Meta entries whose titles match no scraped page
/// are dropped; the snapshot decides what exists.
pub fn build_antagonist_details(
    snapshot: &Snapshot,
    meta: &[AntagonistMeta],
) -> (Vec<AntagonistDetail>, ReconcileCounts) {
    let index = meta_index(meta);
    let mut counts = ReconcileCounts::default();
    let mut details: Vec<AntagonistDetail> = snapshot
        .categories
        .antagonists
        .iter()
        .map(|page| {
            let entry = index.get(page.title.as_str()).copied();
            if entry.is_some() {
                counts.with_meta += 1;
            } else {
                counts.defaulted += 1;
            }
            let mut detail = antagonist_detail(page);
            apply_meta(&mut detail, entry);
            detail
        })
        .collect();
    counts.pages = details.len();
    details.sort_by(|a, b| a.name.cmp(&b.name));
    (details, counts)
}

/// Attach research encounter and mystery card details in place. Every record
/// gets both fields, empty when the snapshot has nothing for that name.
pub fn enrich_details(details: &mut [AntagonistDetail], snapshot: &Snapshot) -> EnrichCounts {
    let research = research_by_antagonist(&snapshot.categories.encounters.research);
    let mut mysteries = mysteries_by_antagonist(&snapshot.categories.mysteries);
    let mut counts = EnrichCounts {
        details: details.len(),
        ..EnrichCounts::default()
    };
    for detail in details.iter_mut() {
        let parsed = research.get(detail.name.as_str()).cloned().unwrap_or_default();
        if !(parsed.city.is_empty() && parsed.wilderness.is_empty() && parsed.sea.is_empty()) {
            counts.with_research += 1;
        }
        detail.research_encounter_details = Some(parsed);

        let cards = mysteries.shift_remove(&detail.name).unwrap_or_default();
        if !cards.is_empty() {
            counts.with_mysteries += 1;
        }
        detail.mystery_details = Some(cards);
    }
    counts
}

/// Meta entries indexed by every alias in their title lists. The first entry
/// claiming an alias keeps it.
fn meta_index(meta: &[AntagonistMeta]) -> IndexMap<&str, &AntagonistMeta> {
    let mut index = IndexMap::new();
    for entry in meta {
        for title in &entry.titles {
            index.entry(title.as_str()).or_insert(entry);
        }
    }
    index
}

fn apply_meta(detail: &mut AntagonistDetail, meta: Option<&AntagonistMeta>) {
    detail.titles = meta
        .filter(|entry| !entry.titles.is_empty())
        .map(|entry| entry.titles.clone())
        .unwrap_or_else(|| vec![detail.name.clone()]);
    detail.difficulty = meta
        .and_then(|entry| entry.difficulty.clone())
        .unwrap_or_else(|| "Medium".into());
    detail.starting_doom = meta.and_then(|entry| entry.starting_doom).unwrap_or(12);
    detail.mythos_deck_size = meta.and_then(|entry| entry.mythos_deck_size).unwrap_or(16);
    detail.mysteries = meta
        .and_then(|entry| entry.mysteries.clone())
        .unwrap_or_else(|| "3/6".into());
    detail.set = meta
        .and_then(|entry| entry.set.clone())
        .unwrap_or_else(|| "Unknown".into());
    detail.requires_side_board = meta.and_then(|entry| entry.requires_side_board.clone());
    detail.notes = meta.and_then(|entry| entry.notes.clone()).unwrap_or_default();
}

/// Parsed research encounters keyed by antagonist. The page infobox names the
/// antagonist; failing that the page title carries a standard suffix.
fn research_by_antagonist(pages: &[Page]) -> IndexMap<String, ResearchEncounterDetails> {
    let mut by_name = IndexMap::new();
    for page in pages {
        let name = match page
            .infobox
            .get("antagonist")
            .filter(|value| !value.is_empty())
        {
            Some(value) => value.clone(),
            None => page.title.replace(" Research Encounters", ""),
        };
        by_name.insert(name, parse_research_encounters(&page.full_text));
    }
    by_name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn antagonist_page(title: &str, page_id: i64) -> Page {
        Page {
            title: title.into(),
            page_id,
            categories: vec!["Antagonists".into()],
            ..Page::default()
        }
    }

    #[test]
    fn merge_applies_meta_and_defaults() {
        let mut snapshot = Snapshot::default();
        snapshot.categories.antagonists = vec![
            antagonist_page("Cthulhu", 2),
            antagonist_page("Azathoth", 1),
        ];
        let meta = vec![
            AntagonistMeta {
                titles: vec!["Azathoth".into(), "The Primal Chaos".into()],
                difficulty: Some("High".into()),
                starting_doom: Some(15),
                requires_side_board: Some("The Void".into()),
                ..AntagonistMeta::default()
            },
            // no scraped page carries this title, so it never reaches the output
            AntagonistMeta {
                titles: vec!["Tsathoggua".into()],
                ..AntagonistMeta::default()
            },
        ];

        let (details, counts) = build_antagonist_details(&snapshot, &meta);
        assert_eq!(counts.pages, 2);
        assert_eq!(counts.with_meta, 1);
        assert_eq!(counts.defaulted, 1);
        assert_eq!(details.len(), 2, "Expected 2 details, got: {:?}", details.len());

        // sorted by name
        assert_eq!(details[0].name, "Azathoth");
        assert_eq!(details[0].titles, vec!["Azathoth", "The Primal Chaos"]);
        assert_eq!(details[0].difficulty, "High");
        assert_eq!(details[0].starting_doom, 15);
        assert_eq!(details[0].mythos_deck_size, 16);
        assert_eq!(details[0].requires_side_board.as_deref(), Some("The Void"));

        assert_eq!(details[1].name, "Cthulhu");
        assert_eq!(details[1].titles, vec!["Cthulhu"]);
        assert_eq!(details[1].difficulty, "Medium");
        assert_eq!(details[1].starting_doom, 12);
        assert_eq!(details[1].mysteries, "3/6");
        assert_eq!(details[1].set, "Unknown");
        assert!(details[1].requires_side_board.is_none());
        assert_eq!(details[1].notes, "");
    }

    #[test]
    fn enrich_fills_placeholders_when_snapshot_has_nothing() {
        let snapshot = Snapshot::default();
        let mut details = vec![AntagonistDetail {
            name: "Azathoth".into(),
            ..AntagonistDetail::default()
        }];
        let counts = enrich_details(&mut details, &snapshot);
        assert_eq!(counts.details, 1);
        assert_eq!(counts.with_research, 0);
        assert_eq!(counts.with_mysteries, 0);
        let research = details[0].research_encounter_details.as_ref().unwrap();
        assert!(research.city.is_empty());
        assert_eq!(details[0].mystery_details.as_deref(), Some(&[][..]));
    }

    #[test]
    fn enrich_attaches_research_and_mysteries() {
        let mut snapshot = Snapshot::default();
        let mut research = Page::default();
        research.title = "Azathoth Research Encounters".into();
        research.full_text = "\
[City Encounters ]\n|-\n|1\n|Core\n|Gain 2 Clues after a test of observation and resolve.\n\
[Wilderness Encounters ]\n|-\n|2\n|Core\n|Lose 1 Sanity while the storm rages over the plain.\n\
[Sea Encounters ]\n|-\n|3\n|Core\n|The waves whisper secrets of the deep to you alone.\n"
            .into();
        snapshot.categories.encounters.research = vec![research];

        let mut mystery = Page::default();
        mystery.title = "The Big Chill".into();
        mystery
            .infobox
            .insert("antagonist".into(), "Azathoth".into());
        mystery.raw_markup =
            "|Mystery Type = Clue\n|Flavor Text = Cold winds rise.\nMystery Text = Spend clues.}}"
                .into();
        snapshot.categories.mysteries = vec![mystery];

        let mut details = vec![AntagonistDetail {
            name: "Azathoth".into(),
            ..AntagonistDetail::default()
        }];
        let counts = enrich_details(&mut details, &snapshot);
        assert_eq!(counts.with_research, 1);
        assert_eq!(counts.with_mysteries, 1);

        let research = details[0].research_encounter_details.as_ref().unwrap();
        assert_eq!(research.city.len(), 1);
        assert_eq!(research.city[0].id, "1");
        assert_eq!(research.wilderness[0].id, "2");
        assert_eq!(research.sea[0].id, "3");

        let mysteries = details[0].mystery_details.as_ref().unwrap();
        assert_eq!(mysteries.len(), 1);
        assert_eq!(mysteries[0].name, "The Big Chill");
        assert_eq!(mysteries[0].antagonist, "Azathoth");
    }

    #[test]
    fn enrichment_reruns_are_byte_identical() {
        let mut snapshot = Snapshot::default();
        let mut mystery = Page::default();
        mystery.title = "The Big Chill".into();
        mystery
            .infobox
            .insert("antagonist".into(), "Azathoth".into());
        snapshot.categories.mysteries = vec![mystery];

        let mut details = vec![AntagonistDetail {
            name: "Azathoth".into(),
            ..AntagonistDetail::default()
        }];
        enrich_details(&mut details, &snapshot);
        let first = serde_json::to_string_pretty(&details).unwrap();
        enrich_details(&mut details, &snapshot);
        let second = serde_json::to_string_pretty(&details).unwrap();
        assert_eq!(first, second);
    }
}
