//! Structured extraction from snapshot pages.
//!
//! Each submodule turns the generic [`Page`](crate::model::Page) records
//! of one category bucket into the typed detail documents the reference
//! corpus ships.

pub mod aliases;
pub mod antagonists;
pub mod investigators;
pub mod mysteries;

use indexmap::IndexMap;

use crate::wikitext::normalize::{normalize, truncate_chars};

/// First section present among `names`.
pub(crate) fn first_section<'a>(
    sections: &'a IndexMap<String, String>,
    names: &[&str],
) -> Option<&'a str> {
    names.iter().find_map(|name| sections.get(*name).map(String::as_str))
}

/// Normalize markup leftovers, then clip to `max` characters.
pub(crate) fn normalized_clip(text: &str, max: usize) -> String {
    truncate_chars(&normalize(text), max)
}

/// Clip of one named section, empty when the section is absent.
pub(crate) fn section_clip(
    sections: &IndexMap<String, String>,
    name: &str,
    max: usize,
) -> String {
    sections.get(name).map(|s| normalized_clip(s, max)).unwrap_or_default()
}
