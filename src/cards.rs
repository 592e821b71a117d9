use crate::card::{ArtRef, CardBody, CardIdentity, CardTemplate, Creature, Instant};
use crate::effect::{Effect, EffectHandle};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

static CARDS: Lazy<Cards> = Lazy::new(|| {
    Cards::load("data/cards").unwrap_or_else(|error| {
        warn!(%error, "card data could not be loaded, using an empty pool");
        Cards::default()
    })
});

/// A card as the external catalog describes it. Missing numbers are 0,
/// missing strings are empty.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CardRecord {
    pub name: String,
    #[serde(alias = "desc")]
    pub text: String,
    pub id: u32,
    /// e.g. "Normal Monster", "Effect Monster", "Spell Card", "Trap Card"
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(alias = "atk")]
    pub attack: u32,
    #[serde(alias = "def")]
    pub defense: u32,
    pub level: u8,
    pub attribute: String,
    pub race: String,
    pub subtype: String,
    #[serde(alias = "image_url")]
    pub image_ref: Option<String>,
    pub effects: Vec<Box<dyn Effect>>,
}

impl CardRecord {
    /// `None` for kinds the engine does not play.
    pub fn into_template(self) -> Option<CardTemplate> {
        let CardRecord {
            name,
            text,
            id,
            kind,
            attack,
            defense,
            level,
            attribute,
            race,
            subtype,
            image_ref,
            effects,
        } = self;
        // the catalog files spells and traps under "race"
        let subtype = if subtype.is_empty() { race.clone() } else { subtype };
        let effects: Vec<EffectHandle> = effects.into_iter().map(Arc::from).collect();
        let body = if kind.contains("Monster") {
            CardBody::Creature(Creature {
                attribute,
                race,
                ..Creature::new(attack, defense, level)
            })
        } else if kind == "Spell Card" {
            CardBody::Spell(Instant {
                persists_on_field: subtype.contains("Continuous") || subtype.contains("Field"),
                subtype,
                effects,
            })
        } else if kind == "Trap Card" {
            CardBody::Trap(Instant {
                persists_on_field: subtype.contains("Continuous"),
                subtype,
                effects,
            })
        } else {
            debug!(%name, %kind, "skipping card of unknown kind");
            return None;
        };
        Some(CardTemplate {
            identity: CardIdentity {
                name,
                text,
                id,
                art: ArtRef::parse(image_ref.as_deref()),
            },
            body,
        })
    }
}

/// One set file: a list of records.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CardSet {
    #[serde(default)]
    pub cards: Vec<CardRecord>,
}

#[derive(Debug, Default)]
pub struct Cards {
    cards: Vec<CardTemplate>,
}

impl Cards {
    /// Pool read from `data/cards` on first use. Hosts only; the duel itself
    /// takes its cards explicitly.
    pub fn global() -> &'static Self {
        &CARDS
    }

    /// Reads every `.toml` set file in `dir`, in file name order.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            sources.push(String::from_utf8(fs::read(path)?)?);
        }
        Self::from_sets(sources.iter().map(String::as_str))
    }

    pub fn from_sets<'a, I: IntoIterator<Item = &'a str>>(sources: I) -> Result<Self, Box<dyn std::error::Error>> {
        let mut cards = Vec::new();
        for source in sources {
            let set: CardSet = toml::from_str(source)?;
            cards.extend(set.cards.into_iter().filter_map(CardRecord::into_template));
        }
        Ok(Cards { cards })
    }

    pub fn card<R: Into<Reference>>(&self, reference: R) -> Option<&CardTemplate> {
        let reference: Reference = reference.into();
        match reference {
            Reference::Identifier(name) => self.cards.iter().find(|card| card.identity.name == name),
            Reference::StaticIdentifier(name) => self.cards.iter().find(|card| card.identity.name == name),
            Reference::ID(id) => self.cards.iter().find(|card| card.identity.id == id),
        }
    }

    /// Builds a deck list, leaving out references the pool does not know.
    pub fn deck<R, I>(&self, references: I) -> Vec<CardTemplate>
    where
        R: Into<Reference>,
        I: IntoIterator<Item = R>,
    {
        references
            .into_iter()
            .filter_map(|reference| {
                let reference: Reference = reference.into();
                let found = match &reference {
                    Reference::Identifier(name) => self.card(name.clone()),
                    Reference::StaticIdentifier(name) => self.card(*name),
                    Reference::ID(id) => self.card(*id),
                };
                if found.is_none() {
                    warn!(?reference, "card not in pool");
                }
                found.cloned()
            })
            .collect()
    }

    pub fn templates(&self) -> &[CardTemplate] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug)]
pub enum Reference {
    Identifier(String),
    StaticIdentifier(&'static str),
    ID(u32),
}

impl From<u32> for Reference {
    fn from(id: u32) -> Self {
        Reference::ID(id)
    }
}

impl From<&'static str> for Reference {
    fn from(identifier: &'static str) -> Self {
        Reference::StaticIdentifier(identifier)
    }
}

impl From<String> for Reference {
    fn from(identifier: String) -> Self {
        Reference::Identifier(identifier)
    }
}
