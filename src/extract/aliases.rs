//! Name alias generation and fuzzy row matching.
//!
//! Defeated-encounter tables name investigators loosely: sometimes the
//! full title, sometimes a nickname, sometimes just a surname inside the
//! flavor text. Each investigator gets a weighted alias list, and a row
//! belongs to whoever scores highest on it.

use std::sync::LazyLock;

use regex::Regex;

static RE_NICKNAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());
static RE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*""#).unwrap());

/// Words too common to identify anyone.
const STOPWORDS: &[&str] = &["The", "and"];

/// Aliases for one investigator title: the title itself, a quoted
/// nickname if present, and the first and last name tokens. Short tokens
/// and stopwords are dropped. Duplicates are kept on purpose, a name
/// that shows up twice should weigh twice.
pub fn build_aliases(title: &str) -> Vec<String> {
    let mut aliases: Vec<String> = vec![title.to_string()];

    if let Some(caps) = RE_NICKNAME.captures(title) {
        aliases.push(caps[1].to_string());
    }

    let without_nick = RE_QUOTED.replace_all(title, "");
    let parts: Vec<&str> = without_nick.split_whitespace().collect();
    if parts.len() > 1 {
        aliases.push(parts[0].to_string());
        aliases.push(parts[parts.len() - 1].to_string());
    }

    if title.contains("Father Mateo") {
        aliases.push("Mateo".to_string());
    }
    if title.contains("Sister Mary") {
        aliases.push("Mary".to_string());
    }

    aliases
        .into_iter()
        .filter(|alias| alias.chars().count() >= 3 && !STOPWORDS.contains(&alias.as_str()))
        .collect()
}

/// Sum of alias lengths over the aliases found in `haystack`. Longer
/// aliases are stronger evidence than short ones.
pub fn alias_score(aliases: &[String], haystack: &str) -> usize {
    aliases
        .iter()
        .filter(|alias| haystack.contains(alias.as_str()))
        .map(|alias| alias.chars().count())
        .sum()
}

/// Index of the best-scoring haystack, if any alias matched at all.
/// Ties keep the earlier entry.
pub fn best_match(aliases: &[String], haystacks: &[String]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_score = 0;
    for (i, haystack) in haystacks.iter().enumerate() {
        let score = alias_score(aliases, haystack);
        if score > best_score {
            best = Some(i);
            best_score = score;
        }
    }
    best
}
