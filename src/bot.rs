//! Rule-following automated opponent. It plays through the same [`Duel`]
//! entry points a human-driven layer would use and only ever reads the
//! opposing side.

use crate::battle::Combatant;
use crate::card::{BattlePosition, Creature, Seat};
use crate::duel::Duel;
use crate::error::Rejection;
use crate::field::Field;
use crate::participant::{is_summonable, SummonMode};
use crate::phase::Phase;
use crate::zone::Hand;

use tracing::{debug, info};

/// Creatures below this attack are set face-down when the opponent has
/// something at or above it.
pub const DEFENSIVE_THRESHOLD: u32 = 1500;

/// Hand index of the strongest creature that can legally be normal summoned
/// with the creatures already on `field`. Ties go to the earlier card.
pub fn find_best_summonable_candidate(hand: &Hand, field: &Field) -> Option<usize> {
    let on_field = field.creature_count();
    let mut best: Option<(usize, u32)> = None;
    for (index, card) in hand.cards().iter().enumerate() {
        let creature = match card.creature() {
            Some(creature) => creature,
            None => continue,
        };
        if !is_summonable(creature.level, on_field) {
            continue;
        }
        if best.map_or(true, |(_, attack)| creature.attack > attack) {
            best = Some((index, creature.attack));
        }
    }
    best.map(|(index, _)| index)
}

pub fn should_play_defensive(candidate: &Creature, opponent: &Field) -> bool {
    candidate.attack < DEFENSIVE_THRESHOLD
        && opponent
            .creatures()
            .any(|(_, card)| card.attack() >= DEFENSIVE_THRESHOLD)
}

/// The `count` weakest creature slots on `field`, weakest first.
pub fn tribute_slots(field: &Field, count: usize) -> Vec<usize> {
    let mut creatures: Vec<(usize, u32)> = field
        .creatures()
        .map(|(slot, card)| (slot, card.attack()))
        .collect();
    creatures.sort_by_key(|&(_, attack)| attack);
    creatures.into_iter().take(count).map(|(slot, _)| slot).collect()
}

/// The opposing creature `attacker` destroys for sure while losing nothing,
/// preferring the one with the highest stat it has to beat.
pub fn find_best_target(attacker: &Creature, opponent: &Field) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (slot, card) in opponent.creatures() {
        let stat = match Combatant::from_card(card) {
            Some(defender) => defender.guarding_stat(),
            None => continue,
        };
        if attacker.attack <= stat {
            continue;
        }
        if best.map_or(true, |(_, best_stat)| stat > best_stat) {
            best = Some((slot, stat));
        }
    }
    best.map(|(slot, _)| slot)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Bot {
    seat: Seat,
}

impl Bot {
    pub fn new(seat: Seat) -> Self {
        Bot { seat }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// Plays a whole turn: draw, standby, summon, battle, second summon
    /// chance, end. Stops early if the duel ends along the way.
    pub fn play_turn(&self, duel: &mut Duel) -> Result<(), Rejection> {
        if duel.is_over() {
            return Err(Rejection::DuelOver);
        }
        if duel.active() != self.seat {
            return Err(Rejection::NotActiveParticipant);
        }
        info!(seat = ?self.seat, turn = duel.turn(), "bot turn");
        let steps: [fn(&Bot, &mut Duel) -> Result<(), Rejection>; 6] = [
            Bot::draw_step,
            Bot::standby_step,
            |bot, duel| bot.summon_step(duel, Phase::Main1),
            Bot::battle_step,
            |bot, duel| bot.summon_step(duel, Phase::Main2),
            Bot::end_step,
        ];
        for step in steps.iter() {
            step(self, duel)?;
            if duel.is_over() {
                debug!("duel ended during the bot's turn");
                break;
            }
        }
        Ok(())
    }

    pub fn draw_step(&self, duel: &mut Duel) -> Result<(), Rejection> {
        duel.set_phase(Phase::Draw)?;
        let drawn = duel.draw_for_turn()?;
        debug!(?drawn, "bot draw");
        Ok(())
    }

    pub fn standby_step(&self, duel: &mut Duel) -> Result<(), Rejection> {
        duel.set_phase(Phase::Standby)
    }

    /// Normal summons the best legal candidate, tributing the weakest own
    /// creatures when its level demands it.
    pub fn summon_step(&self, duel: &mut Duel, phase: Phase) -> Result<(), Rejection> {
        duel.set_phase(phase)?;
        let me = duel.participant(self.seat);
        if me.has_normal_summoned() {
            debug!("bot already normal summoned this turn");
            return Ok(());
        }
        let index = match find_best_summonable_candidate(&me.hand, &me.field) {
            Some(index) => index,
            None => {
                debug!("bot has no summonable creature");
                return Ok(());
            }
        };
        let creature = match me.hand.get(index).and_then(|card| card.creature()) {
            Some(creature) => creature,
            None => return Ok(()),
        };
        let tributes = tribute_slots(&me.field, creature.tributes_required());
        let mode = if tributes.is_empty()
            && should_play_defensive(creature, &duel.participant(self.seat.opponent()).field)
        {
            SummonMode::Set
        } else {
            SummonMode::Attack
        };
        let slot = match me
            .field
            .first_free_creature_slot()
            .or_else(|| tributes.first().copied())
        {
            Some(slot) => slot,
            None => {
                debug!("bot has no free creature slot");
                return Ok(());
            }
        };
        if let Err(reason) = duel.normal_summon(index, slot, mode, &tributes) {
            debug!(%reason, "bot summon failed");
        }
        Ok(())
    }

    /// Attacks directly if the opponent had no creatures when the battle
    /// began, otherwise only into targets the attacker is sure to destroy.
    pub fn battle_step(&self, duel: &mut Duel) -> Result<(), Rejection> {
        duel.set_phase(Phase::Battle)?;
        let attackers: Vec<usize> = duel
            .participant(self.seat)
            .field
            .creatures()
            .filter(|(_, card)| {
                !card.face_down
                    && card.creature().map_or(false, |creature| {
                        creature.position == BattlePosition::Attack && !creature.has_attacked
                    })
            })
            .map(|(slot, _)| slot)
            .collect();
        // decided once: clearing the field mid-battle does not open it up
        let attack_directly = duel.participant(self.seat.opponent()).field.creature_count() == 0;
        for slot in attackers {
            if duel.is_over() {
                break;
            }
            let attacker = match duel.participant(self.seat).field.creature(slot).and_then(|card| card.creature()) {
                Some(creature) => creature,
                None => continue,
            };
            let opponent = &duel.participant(self.seat.opponent()).field;
            let target = if attack_directly {
                None
            } else {
                match find_best_target(attacker, opponent) {
                    Some(target) => Some(target),
                    None => {
                        debug!(slot, "bot cannot attack advantageously");
                        continue;
                    }
                }
            };
            if let Err(reason) = duel.attack(slot, target) {
                debug!(slot, %reason, "bot attack failed");
            }
        }
        Ok(())
    }

    pub fn end_step(&self, duel: &mut Duel) -> Result<(), Rejection> {
        duel.set_phase(Phase::End)?;
        duel.end_turn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ArtRef, Card, CardBody, CardIdentity, CardInstance, CardTemplate};

    fn creature_card(instance: u32, attack: u32, defense: u32, level: u8) -> Card {
        CardTemplate {
            identity: CardIdentity {
                name: format!("Creature {}", instance),
                text: String::new(),
                id: instance,
                art: ArtRef::Placeholder,
            },
            body: CardBody::Creature(Creature::new(attack, defense, level)),
        }
        .instantiate(CardInstance(instance), Seat::B)
    }

    fn field_with(creatures: Vec<(Card, BattlePosition)>) -> Field {
        let mut field = Field::default();
        for (slot, (card, position)) in creatures.into_iter().enumerate() {
            field.place_creature(card, slot, position).expect("slot is free");
        }
        field
    }

    #[test]
    fn level_four_is_always_a_candidate() {
        let mut hand = Hand::default();
        hand.add(creature_card(0, 1400, 1000, 4));
        assert_eq!(find_best_summonable_candidate(&hand, &Field::default()), Some(0));
    }

    #[test]
    fn high_levels_need_creatures_on_field() {
        let mut hand = Hand::default();
        hand.add(creature_card(0, 1000, 1000, 4));
        hand.add(creature_card(1, 2400, 1000, 5));
        hand.add(creature_card(2, 3000, 2500, 7));

        let empty = Field::default();
        assert_eq!(find_best_summonable_candidate(&hand, &empty), Some(0));

        let one = field_with(vec![(creature_card(10, 500, 500, 2), BattlePosition::Attack)]);
        assert_eq!(find_best_summonable_candidate(&hand, &one), Some(1));

        let two = field_with(vec![
            (creature_card(10, 500, 500, 2), BattlePosition::Attack),
            (creature_card(11, 600, 500, 2), BattlePosition::Attack),
        ]);
        assert_eq!(find_best_summonable_candidate(&hand, &two), Some(2));
    }

    #[test]
    fn attack_ties_go_to_the_first_card_in_hand() {
        let mut hand = Hand::default();
        hand.add(creature_card(0, 1500, 1000, 4));
        hand.add(creature_card(1, 1500, 2000, 4));
        assert_eq!(find_best_summonable_candidate(&hand, &Field::default()), Some(0));
    }

    #[test]
    fn weak_candidates_are_set_against_strong_opponents() {
        let weak = Creature::new(1200, 1500, 4);
        let strong = Creature::new(1800, 1000, 4);
        let opponent = field_with(vec![(creature_card(0, 1500, 1000, 4), BattlePosition::Attack)]);
        assert!(should_play_defensive(&weak, &opponent));
        assert!(!should_play_defensive(&strong, &opponent));
        assert!(!should_play_defensive(&weak, &Field::default()));
    }

    #[test]
    fn tributes_are_the_weakest_creatures() {
        let field = field_with(vec![
            (creature_card(0, 1800, 1000, 4), BattlePosition::Attack),
            (creature_card(1, 300, 1000, 2), BattlePosition::Attack),
            (creature_card(2, 900, 1000, 3), BattlePosition::Defense),
        ]);
        assert_eq!(tribute_slots(&field, 2), vec![1, 2]);
        assert_eq!(tribute_slots(&field, 0), Vec::<usize>::new());
    }

    #[test]
    fn targets_must_be_strictly_beaten() {
        let attacker = Creature::new(1800, 1000, 4);
        let opponent = field_with(vec![
            (creature_card(0, 1800, 500, 4), BattlePosition::Attack),
            (creature_card(1, 2500, 1700, 6), BattlePosition::Defense),
            (creature_card(2, 1200, 900, 3), BattlePosition::Attack),
            (creature_card(3, 3000, 1900, 7), BattlePosition::FaceDownDefense),
        ]);
        assert_eq!(find_best_target(&attacker, &opponent), Some(1));

        let weak = Creature::new(800, 800, 2);
        assert_eq!(find_best_target(&weak, &opponent), None);
    }
}
