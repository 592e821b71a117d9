use crate::card::{BattlePosition, Card, CardInstance};
use crate::effect::ActivationStatus;
use crate::error::{Refused, Rejection};
use crate::zone::{Discard, Exile};

use tracing::{debug, info, warn};

pub const CREATURE_SLOTS: usize = 5;
pub const INSTANT_SLOTS: usize = 5;

/// One participant's side of the board, including where its cards go when
/// they leave it.
#[derive(Debug, Default)]
pub struct Field {
    creatures: [Option<Card>; CREATURE_SLOTS],
    instants: [Option<Card>; INSTANT_SLOTS],
    global: Option<Card>,
    last_summoned: Option<CardInstance>,
    last_destroyed: Option<CardInstance>,
    pub discard: Discard,
    pub exile: Exile,
}

impl Field {
    pub fn creature(&self, slot: usize) -> Option<&Card> {
        self.creatures.get(slot).and_then(Option::as_ref)
    }

    pub fn creature_mut(&mut self, slot: usize) -> Option<&mut Card> {
        self.creatures.get_mut(slot).and_then(Option::as_mut)
    }

    /// Occupied creature slots in slot order.
    pub fn creatures(&self) -> impl Iterator<Item = (usize, &Card)> {
        self.creatures
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| card.as_ref().map(|card| (slot, card)))
    }

    pub fn instant(&self, slot: usize) -> Option<&Card> {
        self.instants.get(slot).and_then(Option::as_ref)
    }

    pub fn instants(&self) -> impl Iterator<Item = (usize, &Card)> {
        self.instants
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| card.as_ref().map(|card| (slot, card)))
    }

    pub fn global(&self) -> Option<&Card> {
        self.global.as_ref()
    }

    pub fn last_summoned(&self) -> Option<CardInstance> {
        self.last_summoned
    }

    pub fn last_destroyed(&self) -> Option<CardInstance> {
        self.last_destroyed
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.iter().flatten().count()
    }

    pub fn instant_count(&self) -> usize {
        self.instants.iter().flatten().count()
    }

    pub fn total_cards(&self) -> usize {
        self.creature_count() + self.instant_count() + usize::from(self.global.is_some())
    }

    pub fn first_free_creature_slot(&self) -> Option<usize> {
        self.creatures.iter().position(Option::is_none)
    }

    pub fn first_free_instant_slot(&self) -> Option<usize> {
        self.instants.iter().position(Option::is_none)
    }

    /// True if the card is anywhere on this side: slots or piles.
    pub fn contains(&self, instance: CardInstance) -> bool {
        self.creatures
            .iter()
            .chain(self.instants.iter())
            .chain(std::iter::once(&self.global))
            .flatten()
            .any(|card| card.instance == instance)
            || self.discard.contains(instance)
            || self.exile.contains(instance)
    }

    pub fn check_creature_slot(&self, slot: usize) -> Result<(), Rejection> {
        match self.creatures.get(slot) {
            None => Err(Rejection::SlotOutOfRange(slot)),
            Some(Some(_)) => Err(Rejection::SlotOccupied(slot)),
            Some(None) => Ok(()),
        }
    }

    pub fn check_instant_slot(&self, slot: usize) -> Result<(), Rejection> {
        match self.instants.get(slot) {
            None => Err(Rejection::SlotOutOfRange(slot)),
            Some(Some(_)) => Err(Rejection::SlotOccupied(slot)),
            Some(None) => Ok(()),
        }
    }

    pub fn place_creature(
        &mut self,
        mut card: Card,
        slot: usize,
        position: BattlePosition,
    ) -> Result<(), Refused> {
        let checked = match card.creature_mut() {
            None => Err(Rejection::NotACreature),
            Some(creature) => self.check_creature_slot(slot).map(|()| {
                creature.position = position;
            }),
        };
        if let Err(reason) = checked {
            warn!(card = card.name(), slot, %reason, "creature placement refused");
            return Err(Refused { reason, card });
        }
        debug_assert!(!self.contains(card.instance), "card already on this field");
        card.face_down = position == BattlePosition::FaceDownDefense;
        info!(card = card.name(), slot, %position, "creature placed");
        self.last_summoned = Some(card.instance);
        self.creatures[slot] = Some(card);
        Ok(())
    }

    /// Destroys the creature in the slot, routing it to the discard pile.
    pub fn remove_creature(&mut self, slot: usize) -> Option<CardInstance> {
        let mut card = self.take_creature(slot)?;
        let instance = card.instance;
        card.face_down = false;
        info!(card = card.name(), slot, "creature destroyed");
        self.last_destroyed = Some(instance);
        self.discard.add(card);
        Some(instance)
    }

    /// Detaches the creature without deciding where it goes next.
    pub fn take_creature(&mut self, slot: usize) -> Option<Card> {
        let mut card = self.creatures.get_mut(slot)?.take()?;
        if let Some(creature) = card.creature_mut() {
            creature.position = BattlePosition::Attack;
            creature.reset_turn_flags();
        }
        Some(card)
    }

    pub fn place_instant(&mut self, card: Card, slot: usize) -> Result<(), Refused> {
        let checked = match card.instant() {
            None => Err(Rejection::NotAnInstant),
            Some(_) => self.check_instant_slot(slot),
        };
        if let Err(reason) = checked {
            warn!(card = card.name(), slot, %reason, "spell/trap placement refused");
            return Err(Refused { reason, card });
        }
        debug_assert!(!self.contains(card.instance), "card already on this field");
        debug!(slot, face_down = card.face_down, "spell/trap placed");
        self.instants[slot] = Some(card);
        Ok(())
    }

    /// Caller decides where the removed card goes.
    pub fn remove_instant(&mut self, slot: usize) -> Option<Card> {
        self.instants.get_mut(slot)?.take()
    }

    /// Resolves the effect of the spell or trap in `slot`. Persistent cards
    /// stay face-up in the slot, everything else goes to the discard pile.
    pub fn activate_instant(&mut self, slot: usize) -> Result<CardInstance, Rejection> {
        let mut card = match self.instants.get_mut(slot) {
            None => return Err(Rejection::SlotOutOfRange(slot)),
            Some(entry) => entry.take().ok_or(Rejection::SlotEmpty(slot))?,
        };
        if let Err(reason) = self.run_effect(&card) {
            self.instants[slot] = Some(card);
            return Err(reason);
        }
        let instance = card.instance;
        card.face_down = false;
        let persists = card.instant().map_or(false, |instant| instant.persists_on_field);
        if persists && self.instants[slot].is_none() {
            self.instants[slot] = Some(card);
        } else {
            self.discard.add(card);
        }
        Ok(instance)
    }

    /// Activates a field spell into the global slot. Any previous occupant
    /// is discarded.
    pub fn activate_global(&mut self, mut card: Card) -> Result<CardInstance, Refused> {
        if card.instant().is_none() {
            return Err(Refused {
                reason: Rejection::NotAnInstant,
                card,
            });
        }
        if let Err(reason) = self.run_effect(&card) {
            return Err(Refused { reason, card });
        }
        card.face_down = false;
        let instance = card.instance;
        if let Some(previous) = self.set_global(card) {
            self.discard.add(previous);
        }
        Ok(instance)
    }

    /// Replaces the global slot and hands back whatever was there.
    pub fn set_global(&mut self, card: Card) -> Option<Card> {
        info!(card = card.name(), "global effect set");
        self.global.replace(card)
    }

    pub fn clear_global(&mut self) -> Option<Card> {
        self.global.take()
    }

    fn run_effect(&mut self, card: &Card) -> Result<(), Rejection> {
        let instant = card.instant().ok_or(Rejection::NotAnInstant)?;
        if instant.effects.is_empty() {
            debug!(card = card.name(), "activated without an effect");
            return Ok(());
        }
        // every effect must be able to activate before any of them resolves
        let blocked = instant
            .effects
            .iter()
            .any(|effect| effect.can_activate(card, self) == ActivationStatus::Cannot);
        if blocked {
            warn!(card = card.name(), "effect cannot be activated");
            return Err(Rejection::EffectCannotActivate);
        }
        for effect in &instant.effects {
            effect.resolve(card, self);
        }
        info!(card = card.name(), effects = instant.effects.len(), "effects resolved");
        Ok(())
    }

    /// Toggles Attack and Defense once per turn.
    pub fn change_position(&mut self, slot: usize) -> Result<BattlePosition, Rejection> {
        let card = self.creature_slot_mut(slot)?;
        let face_down = card.face_down;
        let creature = card.creature_mut().ok_or(Rejection::NotACreature)?;
        if creature.has_changed_position {
            return Err(Rejection::AlreadyChangedPosition);
        }
        if face_down {
            return Err(Rejection::NotInAttackPosition);
        }
        creature.position = match creature.position {
            BattlePosition::Attack => BattlePosition::Defense,
            _ => BattlePosition::Attack,
        };
        creature.has_changed_position = true;
        Ok(creature.position)
    }

    /// Face-down Defense to face-up Attack. Uses up the turn's position change.
    pub fn flip(&mut self, slot: usize) -> Result<(), Rejection> {
        let card = self.creature_slot_mut(slot)?;
        if !card.face_down {
            return Err(Rejection::NotFaceDown);
        }
        let creature = card.creature_mut().ok_or(Rejection::NotACreature)?;
        if creature.has_changed_position {
            return Err(Rejection::AlreadyChangedPosition);
        }
        creature.position = BattlePosition::Attack;
        creature.has_changed_position = true;
        card.face_down = false;
        info!(card = card.name(), slot, "flipped face-up");
        Ok(())
    }

    /// Turns an attacked face-down creature face-up in Defense. Does not use
    /// up the turn's position change. Face-up creatures are left alone.
    pub fn reveal(&mut self, slot: usize) -> Result<bool, Rejection> {
        let card = self.creature_slot_mut(slot)?;
        if !card.face_down {
            return Ok(false);
        }
        card.face_down = false;
        if let Some(creature) = card.creature_mut() {
            creature.position = BattlePosition::Defense;
        }
        info!(card = card.name(), slot, "revealed");
        Ok(true)
    }

    fn creature_slot_mut(&mut self, slot: usize) -> Result<&mut Card, Rejection> {
        self.creatures
            .get_mut(slot)
            .ok_or(Rejection::SlotOutOfRange(slot))?
            .as_mut()
            .ok_or(Rejection::SlotEmpty(slot))
    }

    /// Clears `has_attacked` and `has_changed_position` on every creature.
    pub fn reset_turn_flags(&mut self) {
        for card in self.creatures.iter_mut().flatten() {
            if let Some(creature) = card.creature_mut() {
                creature.reset_turn_flags();
            }
        }
    }

    pub fn send_to_discard(&mut self, card: Card) {
        self.discard.add(card);
    }

    pub fn banish(&mut self, card: Card) {
        self.exile.add(card);
    }
}
