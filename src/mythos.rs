//! Mythos card extraction and its expansion filter.
//!
//! Extraction lifts the card pages out of a snapshot into a standalone
//! document with its own metadata stamp. The filter pass later cuts that
//! document down to the base game and Forsaken Lore, recording when and why
//! in the same metadata block.

use indexmap::IndexMap;

use crate::model::{MythosDocument, MythosMetadata, Page, Snapshot};
use crate::snapshot::now_iso;

const MYTHOS_DESCRIPTION: &str =
    "Complete mythos card data including all properties, categories, tags, and text";

#[derive(Debug, Default)]
pub struct MythosSummary {
    pub total: usize,
    pub by_expansion: IndexMap<String, usize>,
    pub rumors: usize,
    pub events: usize,
    pub ongoing: usize,
}

impl MythosSummary {
    pub fn print(&self) {
        println!("Extracted {} mythos cards:", self.total);
        for (expansion, count) in &self.by_expansion {
            println!("  {:<28} {}", expansion, count);
        }
        println!(
            "  Rumors: {}  Events: {}  Ongoing: {}",
            self.rumors, self.events, self.ongoing
        );
    }
}

#[derive(Debug, Default)]
pub struct MythosCounts {
    pub before: usize,
    pub after: usize,
    pub core: usize,
    pub forsaken: usize,
}

impl MythosCounts {
    pub fn print(&self) {
        println!("  Cards before filter: {}", self.before);
        println!("  Cards after filter:  {}", self.after);
        println!("  Core Game: {}  Forsaken Lore: {}", self.core, self.forsaken);
    }
}

/// Pull every mythos card out of the snapshot. The category bucket is
/// authoritative; a raw category scan of all pages covers snapshots written
/// before bucketing existed.
pub fn extract_mythos(snapshot: &Snapshot, source: &str) -> (MythosDocument, MythosSummary) {
    let mut cards: Vec<Page> = snapshot.categories.mythos.clone();
    if cards.is_empty() {
        cards = snapshot
            .all_pages
            .values()
            .filter(|page| page.categories.iter().any(|c| c == "Mythos"))
            .cloned()
            .collect();
    }

    let summary = summarize(&cards);
    let doc = MythosDocument {
        metadata: MythosMetadata {
            source: source.to_string(),
            extracted_at: now_iso(),
            total_mythos_cards: cards.len(),
            description: MYTHOS_DESCRIPTION.to_string(),
            filtered_at: None,
            filter_description: None,
        },
        mythos_cards: cards,
    };
    (doc, summary)
}

/// Cut a mythos document down to the allowed sets and stamp the metadata
/// with the filter pass.
pub fn filter_mythos(doc: &mut MythosDocument) -> MythosCounts {
    let before = doc.mythos_cards.len();
    doc.mythos_cards.retain(is_core_or_forsaken);
    let after = doc.mythos_cards.len();
    let forsaken = doc.mythos_cards.iter().filter(|c| is_forsaken(c)).count();

    doc.metadata.filtered_at = Some(now_iso());
    doc.metadata.total_mythos_cards = after;
    doc.metadata.filter_description =
        Some("Filtered to only Core Game and Forsaken Lore expansions".to_string());

    MythosCounts {
        before,
        after,
        core: after - forsaken,
        forsaken,
    }
}

fn summarize(cards: &[Page]) -> MythosSummary {
    let mut summary = MythosSummary {
        total: cards.len(),
        ..MythosSummary::default()
    };
    for card in cards {
        *summary
            .by_expansion
            .entry(summary_expansion(card))
            .or_insert(0) += 1;
        if card.categories.iter().any(|c| c == "Rumor") {
            summary.rumors += 1;
        }
        if card.categories.iter().any(|c| c == "Event") {
            summary.events += 1;
        }
        if card.categories.iter().any(|c| c == "Ongoing") {
            summary.ongoing += 1;
        }
    }
    summary
}

fn card_expansion(card: &Page) -> &str {
    card.infobox
        .get("expansion")
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| card.card_data.get("expansion").map(String::as_str))
        .unwrap_or_default()
}

/// Expansion label for the summary tally. Cards with no expansion value fall
/// back to their first category outside the card-type ones.
fn summary_expansion(card: &Page) -> String {
    let expansion = card_expansion(card);
    if !expansion.is_empty() {
        return expansion.to_string();
    }
    card.categories
        .iter()
        .find(|c| !matches!(c.as_str(), "Mythos" | "Rumor" | "Event" | "Ongoing"))
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string())
}

// Expansion values hold unclosed template fragments like "{{FL imagelink",
// so a plain substring probe is enough to spot the Forsaken Lore marker.
fn is_core_or_forsaken(card: &Page) -> bool {
    let expansion = card_expansion(card);
    if expansion.contains("Core Game") || expansion.contains("FL imagelink") {
        return true;
    }
    card.categories
        .iter()
        .any(|c| c == "Core Game" || c == "Forsaken Lore")
}

fn is_forsaken(card: &Page) -> bool {
    card_expansion(card).contains("FL imagelink")
        || card.categories.iter().any(|c| c == "Forsaken Lore")
}
