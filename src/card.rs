use crate::effect::EffectHandle;

use std::fmt;

/// A unique id assigned to a Card to uniquely identify the copy
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CardInstance(pub u32);

/// Which side of the duel a card or participant belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    pub fn opponent(self) -> Seat {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Seat::A => 0,
            Seat::B => 1,
        }
    }
}

/// Where the artwork for a card lives. Rendering is the host's problem.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArtRef {
    Url(String),
    Placeholder,
}

impl ArtRef {
    /// Anything that is not an http(s) url falls back to the placeholder.
    pub fn parse(raw: Option<&str>) -> ArtRef {
        match raw {
            Some(url) if url.starts_with("http") => ArtRef::Url(url.to_owned()),
            _ => ArtRef::Placeholder,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardIdentity {
    pub name: String,
    pub text: String,
    /// Key into the external catalog, not unique per copy.
    pub id: u32,
    pub art: ArtRef,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BattlePosition {
    Attack,
    Defense,
    FaceDownDefense,
}

impl BattlePosition {
    pub fn is_defense(self) -> bool {
        !matches!(self, BattlePosition::Attack)
    }
}

impl fmt::Display for BattlePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattlePosition::Attack => write!(f, "ATK"),
            BattlePosition::Defense => write!(f, "DEF"),
            BattlePosition::FaceDownDefense => write!(f, "face-down DEF"),
        }
    }
}

/// Creature payload. The position and the two turn flags are the mutable
/// overlay; everything else is fixed by the catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Creature {
    pub attack: u32,
    pub defense: u32,
    pub level: u8,
    pub attribute: String,
    pub race: String,
    pub position: BattlePosition,
    pub has_attacked: bool,
    pub has_changed_position: bool,
}

impl Creature {
    pub fn new(attack: u32, defense: u32, level: u8) -> Self {
        Creature {
            attack,
            defense,
            level,
            attribute: String::new(),
            race: String::new(),
            position: BattlePosition::Attack,
            has_attacked: false,
            has_changed_position: false,
        }
    }

    /// Number of own creatures that must be tributed to normal summon this.
    pub fn tributes_required(&self) -> usize {
        tributes_for_level(self.level)
    }

    pub fn reset_turn_flags(&mut self) {
        self.has_attacked = false;
        self.has_changed_position = false;
    }
}

pub fn tributes_for_level(level: u8) -> usize {
    match level {
        0..=4 => 0,
        5 | 6 => 1,
        _ => 2,
    }
}

/// Payload shared by spells and traps.
#[derive(Clone, Debug)]
pub struct Instant {
    pub subtype: String,
    pub persists_on_field: bool,
    pub effects: Vec<EffectHandle>,
}

impl Instant {
    pub fn is_field_spell(&self) -> bool {
        self.subtype.contains("Field")
    }
}

#[derive(Clone, Debug)]
pub enum CardBody {
    Creature(Creature),
    Spell(Instant),
    Trap(Instant),
}

/// Catalog-side description of a card, before it is dealt into a duel.
#[derive(Clone, Debug)]
pub struct CardTemplate {
    pub identity: CardIdentity,
    pub body: CardBody,
}

impl CardTemplate {
    pub fn instantiate(&self, instance: CardInstance, owner: Seat) -> Card {
        Card {
            instance,
            owner,
            face_down: false,
            identity: self.identity.clone(),
            body: self.body.clone(),
        }
    }
}

/// One physical copy of a card inside a duel. Zones own cards by value, so a
/// card is only ever in one place.
#[derive(Debug)]
pub struct Card {
    pub instance: CardInstance,
    pub owner: Seat,
    pub face_down: bool,
    pub identity: CardIdentity,
    pub body: CardBody,
}

impl Card {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn creature(&self) -> Option<&Creature> {
        match &self.body {
            CardBody::Creature(creature) => Some(creature),
            _ => None,
        }
    }

    pub fn creature_mut(&mut self) -> Option<&mut Creature> {
        match &mut self.body {
            CardBody::Creature(creature) => Some(creature),
            _ => None,
        }
    }

    pub fn instant(&self) -> Option<&Instant> {
        match &self.body {
            CardBody::Spell(instant) | CardBody::Trap(instant) => Some(instant),
            CardBody::Creature(_) => None,
        }
    }

    pub fn is_trap(&self) -> bool {
        matches!(self.body, CardBody::Trap(_))
    }

    pub fn set_owner(&mut self, owner: Seat) {
        self.owner = owner;
    }

    /// Attack of a creature, 0 for anything else.
    pub fn attack(&self) -> u32 {
        self.creature().map_or(0, |creature| creature.attack)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.face_down {
            return write!(f, "Face-down card");
        }
        match &self.body {
            CardBody::Creature(creature) => write!(
                f,
                "{} (Lv{} {}/{})",
                self.identity.name, creature.level, creature.attack, creature.defense
            ),
            CardBody::Spell(instant) => write!(f, "{} ({} Spell)", self.identity.name, instant.subtype),
            CardBody::Trap(instant) => write!(f, "{} ({} Trap)", self.identity.name, instant.subtype),
        }
    }
}
