use crate::card::{BattlePosition, Card, CardBody, CardInstance, Seat};
use crate::error::Rejection;
use crate::field::Field;
use crate::zone::{Hand, Library, SideLibrary};

use tracing::{debug, info, warn};

pub const STARTING_LIFE: u32 = 8000;

/// How a creature enters the field on a normal summon.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SummonMode {
    /// Face-up in Attack position.
    Attack,
    /// Face-down in Defense position.
    Set,
}

impl SummonMode {
    fn position(self) -> BattlePosition {
        match self {
            SummonMode::Attack => BattlePosition::Attack,
            SummonMode::Set => BattlePosition::FaceDownDefense,
        }
    }
}

/// Whether a creature of `level` can be normal summoned with the given number
/// of creatures already on the summoner's field.
pub fn is_summonable(level: u8, creatures_on_field: usize) -> bool {
    creatures_on_field >= crate::card::tributes_for_level(level)
}

#[derive(Debug)]
pub struct Participant {
    pub name: String,
    pub seat: Seat,
    life: u32,
    pub library: Library,
    pub side_library: SideLibrary,
    pub hand: Hand,
    pub field: Field,
    has_normal_summoned: bool,
    decked_out: bool,
}

impl Participant {
    pub fn new(name: impl Into<String>, seat: Seat, life: u32, library: Library, side_library: SideLibrary) -> Self {
        Participant {
            name: name.into(),
            seat,
            life,
            library,
            side_library,
            hand: Hand::default(),
            field: Field::default(),
            has_normal_summoned: false,
            decked_out: false,
        }
    }

    pub fn life(&self) -> u32 {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn has_normal_summoned(&self) -> bool {
        self.has_normal_summoned
    }

    /// Set once a draw was attempted from an empty library.
    pub fn is_decked_out(&self) -> bool {
        self.decked_out
    }

    /// Floors at zero.
    pub fn lose_life(&mut self, amount: u32) {
        self.life = self.life.saturating_sub(amount);
        info!(participant = %self.name, amount, life = self.life, "life lost");
    }

    pub fn gain_life(&mut self, amount: u32) {
        self.life = self.life.saturating_add(amount);
        info!(participant = %self.name, amount, life = self.life, "life gained");
    }

    /// Moves the top card of the library into the hand.
    pub fn draw(&mut self) -> Option<CardInstance> {
        match self.library.draw() {
            Some(card) => {
                let instance = card.instance;
                debug!(participant = %self.name, card = card.name(), "drew");
                self.hand.add(card);
                Some(instance)
            }
            None => {
                warn!(participant = %self.name, "cannot draw from an empty library");
                self.decked_out = true;
                None
            }
        }
    }

    /// Normal or tribute summon from hand. The number of tributes must match
    /// what the creature's level demands; tributes go to the discard pile
    /// before the summoned creature lands in `slot`, which may be one of the
    /// freed slots.
    pub fn normal_summon(
        &mut self,
        hand_index: usize,
        slot: usize,
        mode: SummonMode,
        tributes: &[usize],
    ) -> Result<CardInstance, Rejection> {
        let result = self.check_normal_summon(hand_index, slot, tributes);
        if let Err(reason) = result {
            warn!(participant = %self.name, %reason, "summon refused");
            return Err(reason);
        }
        for &tribute in tributes {
            self.field.remove_creature(tribute);
        }
        let mut card = match self.hand.take(hand_index) {
            Some(card) => card,
            None => return Err(Rejection::HandIndexOutOfRange(hand_index)),
        };
        card.face_down = false;
        let instance = card.instance;
        self.field
            .place_creature(card, slot, mode.position())
            .map_err(|refused| {
                let reason = refused.reason;
                self.hand.restore(hand_index, refused.card);
                reason
            })?;
        self.has_normal_summoned = true;
        info!(participant = %self.name, tributes = tributes.len(), ?mode, "normal summon");
        Ok(instance)
    }

    fn check_normal_summon(&self, hand_index: usize, slot: usize, tributes: &[usize]) -> Result<(), Rejection> {
        if self.has_normal_summoned {
            return Err(Rejection::AlreadyNormalSummoned);
        }
        let card = self
            .hand
            .get(hand_index)
            .ok_or(Rejection::HandIndexOutOfRange(hand_index))?;
        let creature = card.creature().ok_or(Rejection::NotACreature)?;
        let required = creature.tributes_required();
        if tributes.len() != required {
            return Err(Rejection::TributeMismatch {
                required,
                offered: tributes.len(),
            });
        }
        for (n, &tribute) in tributes.iter().enumerate() {
            if self.field.creature(tribute).is_none() || tributes[..n].contains(&tribute) {
                return Err(Rejection::InvalidTribute(tribute));
            }
        }
        match self.field.check_creature_slot(slot) {
            Err(Rejection::SlotOccupied(_)) if tributes.contains(&slot) => Ok(()),
            other => other,
        }
    }

    /// Sets a spell or trap face-down in an instant slot.
    pub fn set_instant(&mut self, hand_index: usize, slot: usize) -> Result<CardInstance, Rejection> {
        let card = self
            .hand
            .get(hand_index)
            .ok_or(Rejection::HandIndexOutOfRange(hand_index))?;
        card.instant().ok_or(Rejection::NotAnInstant)?;
        self.field.check_instant_slot(slot)?;
        let mut card = self
            .hand
            .take(hand_index)
            .ok_or(Rejection::HandIndexOutOfRange(hand_index))?;
        card.face_down = true;
        let instance = card.instance;
        self.place_instant_from_hand(hand_index, card, slot)?;
        Ok(instance)
    }

    /// Plays a spell straight from hand. Field spells go to the global slot,
    /// the rest pass through the first free instant slot.
    pub fn activate_spell(&mut self, hand_index: usize) -> Result<CardInstance, Rejection> {
        let card = self
            .hand
            .get(hand_index)
            .ok_or(Rejection::HandIndexOutOfRange(hand_index))?;
        let is_field_spell = match &card.body {
            CardBody::Spell(instant) => instant.is_field_spell(),
            CardBody::Trap(_) => return Err(Rejection::TrapFromHand),
            CardBody::Creature(_) => return Err(Rejection::NotAnInstant),
        };
        let slot = if is_field_spell {
            None
        } else {
            Some(self.field.first_free_instant_slot().ok_or(Rejection::ZoneFull)?)
        };
        let mut card = self
            .hand
            .take(hand_index)
            .ok_or(Rejection::HandIndexOutOfRange(hand_index))?;
        card.face_down = false;
        match slot {
            None => self.field.activate_global(card).map_err(|refused| {
                let reason = refused.reason;
                self.hand.restore(hand_index, refused.card);
                reason
            }),
            Some(slot) => {
                self.place_instant_from_hand(hand_index, card, slot)?;
                self.field.activate_instant(slot).map_err(|reason| {
                    if let Some(card) = self.field.remove_instant(slot) {
                        self.hand.restore(hand_index, card);
                    }
                    reason
                })
            }
        }
    }

    /// Activates a set spell or trap.
    pub fn activate_instant(&mut self, slot: usize) -> Result<CardInstance, Rejection> {
        self.field.activate_instant(slot)
    }

    fn place_instant_from_hand(&mut self, hand_index: usize, card: Card, slot: usize) -> Result<(), Rejection> {
        self.field.place_instant(card, slot).map_err(|refused| {
            let reason = refused.reason;
            self.hand.restore(hand_index, refused.card);
            reason
        })
    }

    /// Clears the normal summon gate at the end of this participant's turn.
    pub fn end_turn(&mut self) {
        self.has_normal_summoned = false;
        debug!(participant = %self.name, "turn ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ArtRef, CardIdentity, CardTemplate, Creature, Instant};
    use crate::field::INSTANT_SLOTS;

    fn template(name: &str, body: CardBody) -> CardTemplate {
        CardTemplate {
            identity: CardIdentity {
                name: name.to_owned(),
                text: String::new(),
                id: 0,
                art: ArtRef::Placeholder,
            },
            body,
        }
    }

    fn creature(instance: u32, attack: u32, level: u8) -> Card {
        template("Beast", CardBody::Creature(Creature::new(attack, 1000, level)))
            .instantiate(CardInstance(instance), Seat::A)
    }

    fn participant_with_hand(cards: Vec<Card>) -> Participant {
        let mut participant = Participant::new("Tester", Seat::A, STARTING_LIFE, Library::default(), SideLibrary::default());
        for card in cards {
            participant.hand.add(card);
        }
        participant
    }

    #[test]
    fn summonable_by_level_and_field_size() {
        assert!(is_summonable(4, 0));
        assert!(!is_summonable(5, 0));
        assert!(is_summonable(5, 1));
        assert!(!is_summonable(7, 1));
        assert!(is_summonable(7, 2));
    }

    #[test]
    fn one_normal_summon_per_turn() {
        let mut participant = participant_with_hand(vec![creature(0, 1000, 4), creature(1, 1200, 4)]);
        participant
            .normal_summon(0, 0, SummonMode::Attack, &[])
            .expect("first summon");
        assert_eq!(
            participant.normal_summon(0, 1, SummonMode::Attack, &[]),
            Err(Rejection::AlreadyNormalSummoned)
        );
        participant.end_turn();
        participant
            .normal_summon(0, 1, SummonMode::Set, &[])
            .expect("summon on next turn");
        assert!(participant.field.creature(1).map_or(false, |card| card.face_down));
    }

    #[test]
    fn tribute_count_is_enforced_at_summon() {
        let mut participant = participant_with_hand(vec![creature(0, 1000, 4), creature(1, 2500, 7)]);
        participant.normal_summon(0, 0, SummonMode::Attack, &[]).expect("level 4");
        participant.end_turn();
        assert_eq!(
            participant.normal_summon(0, 1, SummonMode::Attack, &[0]),
            Err(Rejection::TributeMismatch { required: 2, offered: 1 })
        );
        assert_eq!(
            participant.normal_summon(0, 1, SummonMode::Attack, &[0, 0]),
            Err(Rejection::InvalidTribute(0))
        );
        assert_eq!(participant.hand.len(), 1);
        assert_eq!(participant.field.creature_count(), 1);
    }

    #[test]
    fn tribute_summon_can_reuse_a_freed_slot() {
        let mut participant = participant_with_hand(vec![creature(0, 1000, 4), creature(1, 2400, 6)]);
        participant.normal_summon(0, 0, SummonMode::Attack, &[]).expect("level 4");
        participant.end_turn();
        participant
            .normal_summon(0, 0, SummonMode::Attack, &[0])
            .expect("tribute into the same slot");
        assert_eq!(participant.field.creature(0).map(|card| card.instance), Some(CardInstance(1)));
        assert!(participant.field.discard.contains(CardInstance(0)));
    }

    #[test]
    fn life_is_floored_at_zero() {
        let mut participant = participant_with_hand(Vec::new());
        participant.lose_life(9000);
        assert_eq!(participant.life(), 0);
        assert!(!participant.is_alive());
        participant.gain_life(500);
        assert_eq!(participant.life(), 500);
    }

    #[test]
    fn drawing_from_empty_library_marks_deck_out() {
        let mut participant = participant_with_hand(Vec::new());
        assert_eq!(participant.draw(), None);
        assert!(participant.is_decked_out());
    }

    #[test]
    fn traps_cannot_be_activated_from_hand() {
        let trap = template(
            "Pitfall",
            CardBody::Trap(Instant {
                subtype: "Normal".to_owned(),
                persists_on_field: false,
                effects: Vec::new(),
            }),
        )
        .instantiate(CardInstance(0), Seat::A);
        let mut participant = participant_with_hand(vec![trap]);
        assert_eq!(participant.activate_spell(0), Err(Rejection::TrapFromHand));
        participant.set_instant(0, 3).expect("set trap");
        assert!(participant.field.instant(3).map_or(false, |card| card.face_down));
        participant.activate_instant(3).expect("activate set trap");
        assert!(participant.field.discard.contains(CardInstance(0)));
    }

    #[test]
    fn spells_from_hand_need_a_free_back_row_slot() {
        let spell = |instance| {
            template(
                "Gust",
                CardBody::Spell(Instant {
                    subtype: "Normal".to_owned(),
                    persists_on_field: false,
                    effects: Vec::new(),
                }),
            )
            .instantiate(CardInstance(instance), Seat::A)
        };
        let mut participant = participant_with_hand((0..=INSTANT_SLOTS as u32).map(spell).collect());
        for slot in 0..INSTANT_SLOTS {
            participant.set_instant(0, slot).expect("back row has room");
        }
        assert_eq!(participant.activate_spell(0), Err(Rejection::ZoneFull));
        assert_eq!(participant.hand.len(), 1);
        assert_eq!(participant.field.instant_count(), INSTANT_SLOTS);
    }
}
