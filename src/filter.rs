//! Expansion filtering.
//!
//! The reference corpus only covers the base game and its first small
//! expansion, so every scraped document gets cut down to those sets.
//! Documents are filtered as loose JSON values because the encounter,
//! research, and other-world files all shape their sections differently.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::model::{FilterCounts, FilterStats};
use crate::snapshot;

/// Set spellings that survive the filter, as they appear in the wild.
pub const ALLOWED_SETS: &[&str] = &["core", "forsaken lore", "01core", "02forsaken lore"];

// Sort keys like "01Core" put a digit in front of the set name, and
// "Hardcore" style false positives must not slip through.
static RE_CORE_SET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\d)core").unwrap());

/// Decide whether a `Set` cell's text names an allowed expansion.
pub fn is_allowed_set_text(text: &str) -> bool {
    let lowered = text.to_lowercase();
    let t = lowered.trim();
    if t.contains("forsaken") {
        return t.contains("lore");
    }
    RE_CORE_SET.is_match(t)
}

/// `Set` cells are either bare strings or rich objects with a `text` key.
pub fn is_allowed_set(value: Option<&Value>) -> bool {
    let Some(value) = value else { return false };
    let text = match value {
        Value::Object(obj) => obj.get("text").and_then(Value::as_str).unwrap_or_default(),
        Value::String(s) => s.as_str(),
        _ => return false,
    };
    is_allowed_set_text(text)
}

/// Filter one scraped document in place: the flat `all_encounters` list,
/// then the tables under `sections` and `encounters`. Sections left with
/// no tables, lists, or text are dropped, and an empty flat list is
/// rebuilt from whatever section tables survived.
pub fn filter_document(doc: &mut Value) {
    if let Some(rows) = doc.get_mut("all_encounters").and_then(Value::as_array_mut) {
        rows.retain(|row| is_allowed_set(row.get("Set")));
    }

    for key in ["sections", "encounters"] {
        let Some(sections) = doc.get_mut(key).and_then(Value::as_object_mut) else {
            continue;
        };
        let names: Vec<String> = sections.keys().cloned().collect();
        for name in names {
            let Some(section) = sections.get_mut(&name).and_then(Value::as_object_mut) else {
                continue;
            };
            if let Some(tables) = section.get_mut("tables").and_then(Value::as_array_mut) {
                tables.retain(|row| is_allowed_set(row.get("Set")));
            }
            let keep = section
                .get("tables")
                .and_then(Value::as_array)
                .is_some_and(|tables| !tables.is_empty())
                || section
                    .get("lists")
                    .and_then(Value::as_array)
                    .is_some_and(|lists| !lists.is_empty())
                || section
                    .get("text")
                    .and_then(Value::as_str)
                    .is_some_and(|text| !text.is_empty());
            if !keep {
                sections.remove(&name);
            }
        }
    }

    let flat_empty = doc
        .get("all_encounters")
        .and_then(Value::as_array)
        .is_none_or(|rows| rows.is_empty());
    if flat_empty {
        let mut rebuilt = Vec::new();
        for key in ["sections", "encounters"] {
            if let Some(sections) = doc.get(key).and_then(Value::as_object) {
                for section in sections.values() {
                    if let Some(tables) = section.get("tables").and_then(Value::as_array) {
                        rebuilt.extend(tables.iter().cloned());
                    }
                }
            }
        }
        if !rebuilt.is_empty() {
            if let Some(obj) = doc.as_object_mut() {
                obj.insert("all_encounters".to_string(), Value::Array(rebuilt));
            }
        }
    }
}

/// Row tally of one document. Counts the flat list and the per-section
/// tables, so a row present in both views counts twice.
pub fn count_all_encounters(doc: &Value) -> usize {
    let mut count = doc
        .get("all_encounters")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    for key in ["sections", "encounters"] {
        if let Some(sections) = doc.get(key).and_then(Value::as_object) {
            for section in sections.values() {
                count += section
                    .get("tables")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
            }
        }
    }
    count
}

/// Filter every `*.json` document from `input` into `output` and drop a
/// `_filter_stats.json` summary next to the results. Files whose names
/// start with `_` are bookkeeping, not documents.
pub fn filter_encounter_dir(input: &Path, output: &Path) -> Result<FilterStats> {
    fs::create_dir_all(output)
        .with_context(|| format!("creating output dir {}", output.display()))?;

    let mut names: Vec<String> = fs::read_dir(input)
        .with_context(|| format!("reading input dir {}", input.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json") && !name.starts_with('_'))
        .collect();
    names.sort();

    let mut files: IndexMap<String, FilterCounts> = IndexMap::new();
    let mut totals = FilterCounts::default();
    for name in names {
        let path = input.join(&name);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut doc: Value = serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;

        let before = count_all_encounters(&doc);
        filter_document(&mut doc);
        let after = count_all_encounters(&doc);
        snapshot::write_json_atomic(&output.join(&name), &doc)?;

        let counts = FilterCounts {
            before,
            after,
            removed: before.saturating_sub(after),
        };
        totals.before += counts.before;
        totals.after += counts.after;
        totals.removed += counts.removed;
        files.insert(name, counts);
    }

    let stats = FilterStats {
        filter: "Core and Forsaken Lore only".to_string(),
        allowed_sets: ALLOWED_SETS.iter().map(|s| s.to_string()).collect(),
        files,
        totals,
    };
    snapshot::write_json_atomic(&output.join("_filter_stats.json"), &stats)?;
    Ok(stats)
}
