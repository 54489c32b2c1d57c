use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DeckError;

/// Shown in place of any recipe field the generator left out.
pub const NO_DATA: &str = "No data available";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSummary {
    pub calories: Option<u32>,
    pub protein_g: Option<u32>,
    pub carbs_g: Option<u32>,
    pub fat_g: Option<u32>,
}

/// A recipe suggestion in the swipe stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub time_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub macros: Option<MacroSummary>,
    pub image: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: NO_DATA.to_owned(),
            time_minutes: None,
            servings: None,
            difficulty: None,
            tags: Vec::new(),
            macros: None,
            image: None,
        }
    }

    pub fn time_label(&self) -> String {
        match self.time_minutes {
            Some(minutes) => format!("{} min", minutes),
            None => NO_DATA.to_owned(),
        }
    }

    pub fn servings_label(&self) -> String {
        match self.servings {
            Some(1) => "1 serving".to_owned(),
            Some(count) => format!("{} servings", count),
            None => NO_DATA.to_owned(),
        }
    }

    pub fn difficulty_label(&self) -> &str {
        self.difficulty.as_deref().unwrap_or(NO_DATA)
    }

    pub fn macros_label(&self) -> String {
        let Some(macros) = &self.macros else {
            return NO_DATA.to_owned();
        };

        let parts: Vec<String> = [
            macros.calories.map(|v| format!("{} kcal", v)),
            macros.protein_g.map(|v| format!("{}g protein", v)),
            macros.carbs_g.map(|v| format!("{}g carbs", v)),
            macros.fat_g.map(|v| format!("{}g fat", v)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            NO_DATA.to_owned()
        } else {
            parts.join(" · ")
        }
    }
}

/// Wire shape of a recipe; every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCandidate {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(alias = "time")]
    time_minutes: Option<u32>,
    servings: Option<u32>,
    difficulty: Option<String>,
    tags: Vec<String>,
    macros: Option<MacroSummary>,
    image: Option<String>,
}

/// Parses a JSON array of recipes into stack-ready candidates.
///
/// Ids are derived from titles when absent and made unique; missing text
/// fields fall back to [`NO_DATA`].
pub fn parse_deck(text: &str) -> Result<Vec<Candidate>, DeckError> {
    let raw: Vec<RawCandidate> = serde_json::from_str(text)?;
    if raw.is_empty() {
        return Err(DeckError::Empty);
    }

    let mut seen = HashSet::new();
    let mut incomplete = 0;
    let mut deck = Vec::with_capacity(raw.len());

    for (index, entry) in raw.into_iter().enumerate() {
        let title = non_empty(entry.title);
        let description = non_empty(entry.description);
        if title.is_none() || description.is_none() || entry.time_minutes.is_none() {
            incomplete += 1;
        }

        let mut base = non_empty(entry.id)
            .or_else(|| title.as_deref().map(slugify))
            .unwrap_or_default();
        if base.is_empty() {
            base = format!("item-{}", index);
        }

        deck.push(Candidate {
            id: ensure_unique_id(&mut seen, base),
            title: title.unwrap_or_else(|| NO_DATA.to_owned()),
            description: description.unwrap_or_else(|| NO_DATA.to_owned()),
            time_minutes: entry.time_minutes,
            servings: entry.servings,
            difficulty: non_empty(entry.difficulty),
            tags: entry
                .tags
                .into_iter()
                .map(|tag| tag.trim().to_owned())
                .filter(|tag| !tag.is_empty())
                .collect(),
            macros: entry.macros,
            image: non_empty(entry.image),
        });
    }

    if incomplete > 0 {
        warn!(
            "{} of {} recipes are missing fields; showing '{}' instead",
            incomplete,
            deck.len(),
            NO_DATA
        );
    }

    Ok(deck)
}

/// Returns `deck` in a random order.
pub fn shuffled<R: Rng + ?Sized>(mut deck: Vec<Candidate>, rng: &mut R) -> Vec<Candidate> {
    deck.shuffle(rng);
    deck
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn ensure_unique_id(seen: &mut HashSet<String>, base: String) -> String {
    if seen.insert(base.clone()) {
        return base;
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

fn slugify(input: &str) -> String {
    let mut slug = String::new();

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || matches!(ch, '-' | '_')) && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_matches('-').to_string()
}
