//! Category-tag bucketing.
//!
//! A page lands in the first bucket whose keyword matches any of its
//! category tags, so rule order is load-bearing: `epic monster` must be
//! probed before `monster`, the encounter kinds before the generic
//! `encounter` catch-all, and `location encounter` before the game-board
//! rule that also matches `location`.

use indexmap::IndexMap;

use crate::model::{Categories, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Investigators,
    Antagonists,
    EpicMonsters,
    Monsters,
    UniqueAssets,
    Artifacts,
    Spells,
    Conditions,
    Assets,
    Mysteries,
    Preludes,
    Adventures,
    PersonalStories,
    Mythos,
    Encounter(EncounterKind),
    GameSets,
    GameBoards,
    Mechanics,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterKind {
    General,
    Location,
    Research,
    OtherWorld,
    Expedition,
    MysticRuins,
    DreamQuest,
    Devastation,
    Special,
    Combat,
    Other,
}

const RULES: &[(&[&str], Bucket)] = &[
    (&["investigator"], Bucket::Investigators),
    (&["antagonist"], Bucket::Antagonists),
    (&["epic monster"], Bucket::EpicMonsters),
    (&["monster"], Bucket::Monsters),
    (&["unique asset"], Bucket::UniqueAssets),
    (&["artifact"], Bucket::Artifacts),
    (&["spell"], Bucket::Spells),
    (&["condition"], Bucket::Conditions),
    (&["asset"], Bucket::Assets),
    (&["myster"], Bucket::Mysteries),
    (&["prelude"], Bucket::Preludes),
    (&["adventure"], Bucket::Adventures),
    (&["personal stor"], Bucket::PersonalStories),
    (&["mythos"], Bucket::Mythos),
    (&["general encounter"], Bucket::Encounter(EncounterKind::General)),
    (&["location encounter"], Bucket::Encounter(EncounterKind::Location)),
    (&["research encounter"], Bucket::Encounter(EncounterKind::Research)),
    (&["other world"], Bucket::Encounter(EncounterKind::OtherWorld)),
    (&["expedition"], Bucket::Encounter(EncounterKind::Expedition)),
    (&["mystic ruins"], Bucket::Encounter(EncounterKind::MysticRuins)),
    (&["dream-quest", "dreamquest"], Bucket::Encounter(EncounterKind::DreamQuest)),
    (&["devastation"], Bucket::Encounter(EncounterKind::Devastation)),
    (&["special encounter"], Bucket::Encounter(EncounterKind::Special)),
    (&["combat"], Bucket::Encounter(EncounterKind::Combat)),
    (&["encounter"], Bucket::Encounter(EncounterKind::Other)),
    (&["expansion", "game set"], Bucket::GameSets),
    (&["board", "location", "space"], Bucket::GameBoards),
    (&["mechanic", "rule", "action", "phase"], Bucket::Mechanics),
];

/// First matching bucket for a page's category tags.
pub fn categorize(categories: &[String]) -> Bucket {
    for (keywords, bucket) in RULES {
        for keyword in *keywords {
            if categories.iter().any(|tag| tag.to_lowercase().contains(keyword)) {
                return *bucket;
            }
        }
    }
    Bucket::Other
}

/// Route a page into its bucket of the snapshot's category tree.
pub fn assign(categories: &mut Categories, page: Page) {
    match categorize(&page.categories) {
        Bucket::Investigators => categories.investigators.push(page),
        Bucket::Antagonists => categories.antagonists.push(page),
        Bucket::EpicMonsters => categories.epic_monsters.push(page),
        Bucket::Monsters => categories.monsters.push(page),
        Bucket::UniqueAssets => categories.unique_assets.push(page),
        Bucket::Artifacts => categories.artifacts.push(page),
        Bucket::Spells => categories.spells.push(page),
        Bucket::Conditions => categories.conditions.push(page),
        Bucket::Assets => categories.assets.push(page),
        Bucket::Mysteries => categories.mysteries.push(page),
        Bucket::Preludes => categories.preludes.push(page),
        Bucket::Adventures => categories.adventures.push(page),
        Bucket::PersonalStories => categories.personal_stories.push(page),
        Bucket::Mythos => categories.mythos.push(page),
        Bucket::Encounter(kind) => {
            let enc = &mut categories.encounters;
            match kind {
                EncounterKind::General => enc.general.push(page),
                EncounterKind::Location => enc.location.push(page),
                EncounterKind::Research => enc.research.push(page),
                EncounterKind::OtherWorld => enc.other_world.push(page),
                EncounterKind::Expedition => enc.expedition.push(page),
                EncounterKind::MysticRuins => enc.mystic_ruins.push(page),
                EncounterKind::DreamQuest => enc.dream_quest.push(page),
                EncounterKind::Devastation => enc.devastation.push(page),
                EncounterKind::Special => enc.special.push(page),
                EncounterKind::Combat => enc.combat.push(page),
                EncounterKind::Other => enc.other.push(page),
            }
        }
        Bucket::GameSets => categories.game_sets.push(page),
        Bucket::GameBoards => categories.game_boards.push(page),
        Bucket::Mechanics => categories.mechanics.push(page),
        Bucket::Other => categories.other.push(page),
    }
}

/// Headline counts recorded in the snapshot metadata.
pub fn bucket_stats(categories: &Categories) -> IndexMap<String, usize> {
    let mut stats = IndexMap::new();
    stats.insert("investigators".to_string(), categories.investigators.len());
    stats.insert("antagonists".to_string(), categories.antagonists.len());
    stats.insert("monsters".to_string(), categories.monsters.len());
    stats.insert("epicMonsters".to_string(), categories.epic_monsters.len());
    stats.insert("assets".to_string(), categories.assets.len());
    stats.insert("uniqueAssets".to_string(), categories.unique_assets.len());
    stats.insert("artifacts".to_string(), categories.artifacts.len());
    stats.insert("spells".to_string(), categories.spells.len());
    stats.insert("conditions".to_string(), categories.conditions.len());
    stats.insert("totalEncounters".to_string(), categories.encounters.total());
    stats.insert("mythos".to_string(), categories.mythos.len());
    stats.insert("mysteries".to_string(), categories.mysteries.len());
    stats.insert("preludes".to_string(), categories.preludes.len());
    stats.insert("gameSets".to_string(), categories.game_sets.len());
    stats.insert("mechanics".to_string(), categories.mechanics.len());
    stats.insert("other".to_string(), categories.other.len());
    stats
}
