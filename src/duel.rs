use crate::battle::{self, Combatant, Outcome};
use crate::card::{BattlePosition, Card, CardBody, CardInstance, CardTemplate, Seat};
use crate::config::DuelConfig;
use crate::error::Rejection;
use crate::field::CREATURE_SLOTS;
use crate::participant::{Participant, SummonMode};
use crate::phase::Phase;
use crate::zone::{Library, SideLibrary};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// Name and cards one side brings to the duel.
#[derive(Clone, Debug, Default)]
pub struct DuelistSetup {
    pub name: String,
    pub deck: Vec<CardTemplate>,
    pub side_deck: Vec<CardTemplate>,
}

impl DuelistSetup {
    pub fn new(name: impl Into<String>, deck: Vec<CardTemplate>) -> Self {
        DuelistSetup {
            name: name.into(),
            deck,
            side_deck: Vec::new(),
        }
    }
}

fn rejected(action: &'static str, reason: Rejection) -> Rejection {
    warn!(action, %reason, "action rejected");
    reason
}

/// Owns both participants and the turn structure. Every mutating entry point
/// refuses with [`Rejection::DuelOver`] once a winner is known.
#[derive(Debug)]
pub struct Duel {
    participants: [Participant; 2],
    active: Seat,
    phase: Phase,
    turn: u32,
    started: bool,
    over: bool,
    winner: Option<Seat>,
    config: DuelConfig,
    rng: StdRng,
}

impl Duel {
    pub fn new(config: DuelConfig, a: DuelistSetup, b: DuelistSetup) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut next_instance = 0;
        let mut deal = |templates: &[CardTemplate], owner: Seat| -> Vec<Card> {
            templates
                .iter()
                .map(|template| {
                    let card = template.instantiate(CardInstance(next_instance), owner);
                    next_instance += 1;
                    card
                })
                .collect()
        };
        let mut seat_up = |setup: DuelistSetup, seat: Seat| {
            let library = Library::new(deal(&setup.deck, seat));
            let side_library = SideLibrary::new(deal(&setup.side_deck, seat));
            Participant::new(setup.name, seat, config.starting_life, library, side_library)
        };
        let participants = [seat_up(a, Seat::A), seat_up(b, Seat::B)];
        Duel {
            participants,
            active: Seat::A,
            phase: Phase::Draw,
            turn: 1,
            started: false,
            over: false,
            winner: None,
            config,
            rng,
        }
    }

    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.participants[seat.index()]
    }

    pub fn active(&self) -> Seat {
        self.active
    }

    pub fn active_participant(&self) -> &Participant {
        self.participant(self.active)
    }

    pub fn opponent(&self) -> &Participant {
        self.participant(self.active.opponent())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    fn participant_mut(&mut self, seat: Seat) -> &mut Participant {
        &mut self.participants[seat.index()]
    }

    /// The given seat's participant first, its opponent second.
    fn sides_mut(&mut self, seat: Seat) -> (&mut Participant, &mut Participant) {
        let (first, second) = self.participants.split_at_mut(1);
        match seat {
            Seat::A => (&mut first[0], &mut second[0]),
            Seat::B => (&mut second[0], &mut first[0]),
        }
    }

    fn ensure_running(&self) -> Result<(), Rejection> {
        if self.over {
            Err(Rejection::DuelOver)
        } else {
            Ok(())
        }
    }

    fn ensure_main_phase(&self) -> Result<(), Rejection> {
        self.ensure_running()?;
        if self.phase.is_main() {
            Ok(())
        } else {
            Err(Rejection::WrongPhase)
        }
    }

    /// Shuffles (if configured), hands the first turn to A and deals the
    /// opening draw to both sides. Only once per duel.
    pub fn start(&mut self) -> Result<(), Rejection> {
        self.ensure_running().map_err(|reason| rejected("start", reason))?;
        if self.started {
            return Err(rejected("start", Rejection::AlreadyStarted));
        }
        self.started = true;
        info!(
            a = %self.participants[0].name,
            b = %self.participants[1].name,
            "duel starts"
        );
        if self.config.shuffle_on_start {
            for participant in self.participants.iter_mut() {
                participant.library.shuffle(&mut self.rng);
            }
        }
        self.active = Seat::A;
        self.phase = Phase::Draw;
        self.turn = 1;
        for _ in 0..self.config.opening_draw {
            for participant in self.participants.iter_mut() {
                participant.draw();
            }
        }
        self.check_win_condition();
        Ok(())
    }

    pub fn advance_phase(&mut self) -> Result<Phase, Rejection> {
        self.ensure_running().map_err(|reason| rejected("advance phase", reason))?;
        self.phase = self.phase.next();
        info!(phase = %self.phase, "next phase");
        Ok(self.phase)
    }

    /// Unconditional override, for effects that skip phases.
    pub fn set_phase(&mut self, phase: Phase) -> Result<(), Rejection> {
        self.ensure_running().map_err(|reason| rejected("set phase", reason))?;
        self.phase = phase;
        info!(phase = %self.phase, "phase set");
        Ok(())
    }

    /// Hands the turn over: clears the summon gate, rewinds to Draw and
    /// resets the per-turn creature flags on both fields.
    pub fn end_turn(&mut self) -> Result<(), Rejection> {
        self.ensure_running().map_err(|reason| rejected("end turn", reason))?;
        let active = self.active;
        self.participant_mut(active).end_turn();
        self.phase = Phase::Draw;
        self.active = active.opponent();
        self.turn += 1;
        self.reset_turn_flags()?;
        info!(turn = self.turn, active = %self.active_participant().name, "turn starts");
        Ok(())
    }

    pub fn reset_turn_flags(&mut self) -> Result<(), Rejection> {
        self.ensure_running().map_err(|reason| rejected("reset turn flags", reason))?;
        for participant in self.participants.iter_mut() {
            participant.field.reset_turn_flags();
        }
        Ok(())
    }

    /// The active participant's draw for the turn. An empty library ends the
    /// duel on the spot.
    pub fn draw_for_turn(&mut self) -> Result<Option<CardInstance>, Rejection> {
        self.ensure_running().map_err(|reason| rejected("draw", reason))?;
        if self.turn == 1 && self.config.skip_first_turn_draw {
            info!("first turn draw skipped");
            return Ok(None);
        }
        let active = self.active;
        let drawn = self.participant_mut(active).draw();
        if drawn.is_none() {
            self.check_win_condition();
        }
        Ok(drawn)
    }

    /// Moves the first library card with a matching name to the hand, then
    /// shuffles the library.
    pub fn search_library(&mut self, seat: Seat, name: &str) -> Result<Option<CardInstance>, Rejection> {
        self.ensure_running().map_err(|reason| rejected("search", reason))?;
        let participant = &mut self.participants[seat.index()];
        let found = participant
            .library
            .cards()
            .iter()
            .find(|card| card.name().eq_ignore_ascii_case(name))
            .map(|card| card.instance);
        if let Some(card) = found.and_then(|instance| participant.library.take(instance)) {
            participant.hand.add(card);
        }
        participant.library.shuffle(&mut self.rng);
        Ok(found)
    }

    pub fn shuffle_library(&mut self, seat: Seat) -> Result<(), Rejection> {
        self.ensure_running().map_err(|reason| rejected("shuffle", reason))?;
        let participant = &mut self.participants[seat.index()];
        participant.library.shuffle(&mut self.rng);
        Ok(())
    }

    /// Ends the duel if a side is out of life or has decked out. Side A is
    /// checked first.
    pub fn check_win_condition(&mut self) -> Option<Seat> {
        if self.over {
            return self.winner;
        }
        let lost = |participant: &Participant| !participant.is_alive() || participant.is_decked_out();
        if lost(&self.participants[0]) {
            self.declare_winner(Seat::B);
        } else if lost(&self.participants[1]) {
            self.declare_winner(Seat::A);
        }
        self.winner
    }

    /// Ends the duel with `winner`, e.g. on a concession. A decided duel
    /// keeps its winner.
    pub fn end(&mut self, winner: Seat) -> Result<(), Rejection> {
        self.ensure_running().map_err(|reason| rejected("end", reason))?;
        self.declare_winner(winner);
        Ok(())
    }

    fn declare_winner(&mut self, winner: Seat) {
        self.over = true;
        self.winner = Some(winner);
        info!(winner = %self.participant(winner).name, "duel over");
    }

    pub fn normal_summon(
        &mut self,
        hand_index: usize,
        slot: usize,
        mode: SummonMode,
        tributes: &[usize],
    ) -> Result<CardInstance, Rejection> {
        self.ensure_main_phase().map_err(|reason| rejected("summon", reason))?;
        let active = self.active;
        self.participant_mut(active).normal_summon(hand_index, slot, mode, tributes)
    }

    pub fn set_instant(&mut self, hand_index: usize, slot: usize) -> Result<CardInstance, Rejection> {
        self.ensure_main_phase().map_err(|reason| rejected("set", reason))?;
        let active = self.active;
        self.participant_mut(active)
            .set_instant(hand_index, slot)
            .map_err(|reason| rejected("set", reason))
    }

    pub fn activate_spell(&mut self, hand_index: usize) -> Result<CardInstance, Rejection> {
        self.ensure_main_phase().map_err(|reason| rejected("activate", reason))?;
        let active = self.active;
        self.participant_mut(active)
            .activate_spell(hand_index)
            .map_err(|reason| rejected("activate", reason))
    }

    /// Set traps may be activated by either side at any point; set spells
    /// only by the active participant during a main phase.
    pub fn activate_instant(&mut self, seat: Seat, slot: usize) -> Result<CardInstance, Rejection> {
        self.ensure_running().map_err(|reason| rejected("activate", reason))?;
        let card = self
            .participant(seat)
            .field
            .instant(slot)
            .ok_or(Rejection::SlotEmpty(slot))
            .map_err(|reason| rejected("activate", reason))?;
        if let CardBody::Spell(_) = card.body {
            if seat != self.active {
                return Err(rejected("activate", Rejection::NotActiveParticipant));
            }
            self.ensure_main_phase().map_err(|reason| rejected("activate", reason))?;
        }
        self.participant_mut(seat)
            .activate_instant(slot)
            .map_err(|reason| rejected("activate", reason))
    }

    pub fn change_position(&mut self, slot: usize) -> Result<BattlePosition, Rejection> {
        self.ensure_main_phase().map_err(|reason| rejected("change position", reason))?;
        let active = self.active;
        self.participant_mut(active)
            .field
            .change_position(slot)
            .map_err(|reason| rejected("change position", reason))
    }

    pub fn flip(&mut self, slot: usize) -> Result<(), Rejection> {
        self.ensure_main_phase().map_err(|reason| rejected("flip", reason))?;
        let active = self.active;
        self.participant_mut(active)
            .field
            .flip(slot)
            .map_err(|reason| rejected("flip", reason))
    }

    /// Declares an attack by the active participant's creature in
    /// `attacker_slot` on the opposing creature in `target`, or directly when
    /// `target` is `None`. Applies the battle outcome and checks for a winner.
    pub fn attack(&mut self, attacker_slot: usize, target: Option<usize>) -> Result<Outcome, Rejection> {
        let (attacker, defender) = self
            .check_attack(attacker_slot, target)
            .map_err(|reason| rejected("attack", reason))?;
        let outcome = battle::resolve(attacker, defender);
        let (own, other) = self.sides_mut(self.active);
        if let Some(creature) = own.field.creature_mut(attacker_slot).and_then(Card::creature_mut) {
            creature.has_attacked = true;
        }
        if let Some(slot) = target {
            // checked above, the slot holds a creature
            let _ = other.field.reveal(slot);
        }
        info!(attacker = attacker_slot, ?target, ?outcome, "battle resolved");
        if outcome.attacker_destroyed {
            own.field.remove_creature(attacker_slot);
        }
        if outcome.defender_destroyed {
            if let Some(slot) = target {
                other.field.remove_creature(slot);
            }
        }
        if outcome.attacker_damage > 0 {
            own.lose_life(outcome.attacker_damage);
        }
        if outcome.defender_damage > 0 {
            other.lose_life(outcome.defender_damage);
        }
        self.check_win_condition();
        Ok(outcome)
    }

    fn check_attack(
        &self,
        attacker_slot: usize,
        target: Option<usize>,
    ) -> Result<(Combatant, Option<Combatant>), Rejection> {
        self.ensure_running()?;
        if self.phase != Phase::Battle {
            return Err(Rejection::WrongPhase);
        }
        let attacker_card = creature_in(self.active_participant(), attacker_slot)?;
        let creature = attacker_card.creature().ok_or(Rejection::NotACreature)?;
        if creature.has_attacked {
            return Err(Rejection::AlreadyAttacked);
        }
        if attacker_card.face_down || creature.position != BattlePosition::Attack {
            return Err(Rejection::NotInAttackPosition);
        }
        let attacker = Combatant::new(creature.attack, creature.defense, creature.position);
        let defender = match target {
            None if self.opponent().field.creature_count() > 0 => {
                return Err(Rejection::DirectAttackBlocked)
            }
            None => None,
            Some(slot) => {
                let card = creature_in(self.opponent(), slot)?;
                Some(Combatant::from_card(card).ok_or(Rejection::NotACreature)?)
            }
        };
        Ok((attacker, defender))
    }
}

fn creature_in(participant: &Participant, slot: usize) -> Result<&Card, Rejection> {
    if slot >= CREATURE_SLOTS {
        return Err(Rejection::SlotOutOfRange(slot));
    }
    participant.field.creature(slot).ok_or(Rejection::SlotEmpty(slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ArtRef, CardIdentity, Creature};

    fn creature(name: &str, attack: u32, level: u8) -> CardTemplate {
        CardTemplate {
            identity: CardIdentity {
                name: name.to_owned(),
                text: String::new(),
                id: 0,
                art: ArtRef::Placeholder,
            },
            body: CardBody::Creature(Creature::new(attack, 1000, level)),
        }
    }

    fn config() -> DuelConfig {
        DuelConfig {
            shuffle_on_start: false,
            seed: Some(1),
            ..DuelConfig::default()
        }
    }

    fn duel(a: Vec<CardTemplate>, b: Vec<CardTemplate>) -> Duel {
        Duel::new(config(), DuelistSetup::new("Alpha", a), DuelistSetup::new("Beta", b))
    }

    #[test]
    fn start_deals_one_card_to_each_side() {
        let mut duel = duel(vec![creature("A1", 1000, 4), creature("A2", 1000, 4)], vec![creature("B1", 1000, 4)]);
        duel.start().expect("fresh duel starts");
        assert_eq!(duel.participant(Seat::A).hand.len(), 1);
        assert_eq!(duel.participant(Seat::B).hand.len(), 1);
        assert_eq!(duel.participant(Seat::A).library.len(), 1);
        assert_eq!(duel.active(), Seat::A);
        assert_eq!(duel.turn(), 1);
        assert_eq!(duel.phase(), Phase::Draw);
        assert!(!duel.is_over());
    }

    #[test]
    fn instances_are_unique_and_owned_by_their_seat() {
        let duel = duel(vec![creature("A1", 1000, 4)], vec![creature("B1", 1000, 4)]);
        let a = duel.participant(Seat::A).library.peek().expect("card");
        let b = duel.participant(Seat::B).library.peek().expect("card");
        assert_ne!(a.instance, b.instance);
        assert_eq!(a.owner, Seat::A);
        assert_eq!(b.owner, Seat::B);
    }

    #[test]
    fn end_turn_swaps_sides_and_rewinds_phase() {
        let mut duel = duel(vec![creature("A1", 1000, 4)], vec![creature("B1", 1000, 4)]);
        duel.start().expect("starts");
        duel.set_phase(Phase::Main1).expect("running");
        duel.normal_summon(0, 0, SummonMode::Attack, &[]).expect("summon");
        assert!(duel.participant(Seat::A).has_normal_summoned());
        duel.end_turn().expect("running");
        assert!(!duel.participant(Seat::A).has_normal_summoned());
        assert_eq!(duel.active(), Seat::B);
        assert_eq!(duel.phase(), Phase::Draw);
        assert_eq!(duel.turn(), 2);
    }

    #[test]
    fn summoning_outside_main_phase_is_rejected() {
        let mut duel = duel(vec![creature("A1", 1000, 4)], vec![creature("B1", 1000, 4)]);
        duel.start().expect("starts");
        assert_eq!(
            duel.normal_summon(0, 0, SummonMode::Attack, &[]),
            Err(Rejection::WrongPhase)
        );
        assert_eq!(duel.participant(Seat::A).hand.len(), 1);
    }

    #[test]
    fn empty_library_draw_hands_the_win_to_the_opponent() {
        let mut duel = duel(vec![creature("A1", 1000, 4)], vec![creature("B1", 1000, 4)]);
        duel.start().expect("starts");
        assert_eq!(duel.draw_for_turn(), Ok(None));
        assert!(duel.is_over());
        assert_eq!(duel.winner(), Some(Seat::B));
        assert_eq!(duel.advance_phase(), Err(Rejection::DuelOver));
        assert_eq!(duel.end_turn(), Err(Rejection::DuelOver));
    }

    #[test]
    fn first_turn_draw_can_be_skipped() {
        let config = DuelConfig {
            skip_first_turn_draw: true,
            ..config()
        };
        let mut duel = Duel::new(
            config,
            DuelistSetup::new("Alpha", vec![creature("A1", 1000, 4)]),
            DuelistSetup::new("Beta", vec![creature("B1", 1000, 4)]),
        );
        duel.start().expect("starts");
        assert_eq!(duel.draw_for_turn(), Ok(None));
        assert!(!duel.is_over());
    }

    #[test]
    fn direct_attack_is_blocked_by_a_defender() {
        let mut duel = duel(vec![creature("A1", 800, 4)], vec![creature("B1", 1000, 4)]);
        duel.start().expect("starts");
        duel.end_turn().expect("running");
        duel.set_phase(Phase::Main1).expect("running");
        duel.normal_summon(0, 0, SummonMode::Set, &[]).expect("B sets");
        duel.end_turn().expect("running");
        duel.set_phase(Phase::Main1).expect("running");
        duel.normal_summon(0, 0, SummonMode::Attack, &[]).expect("A summons");
        duel.set_phase(Phase::Battle).expect("running");
        assert_eq!(duel.attack(0, None), Err(Rejection::DirectAttackBlocked));

        let outcome = duel.attack(0, Some(0)).expect("attack the set creature");
        assert!(!outcome.defender_destroyed);
        assert_eq!(duel.participant(Seat::A).life(), 7800);
        let revealed = duel.participant(Seat::B).field.creature(0).expect("survived");
        assert!(!revealed.face_down);
        assert_eq!(revealed.creature().map(|c| c.position), Some(BattlePosition::Defense));
        assert_eq!(duel.attack(0, Some(0)), Err(Rejection::AlreadyAttacked));
    }

    #[test]
    fn lethal_damage_ends_the_duel() {
        let config = DuelConfig {
            starting_life: 1000,
            ..config()
        };
        let mut duel = Duel::new(
            config,
            DuelistSetup::new("Alpha", vec![creature("A1", 1500, 4)]),
            DuelistSetup::new("Beta", vec![creature("B1", 1000, 4)]),
        );
        duel.start().expect("starts");
        duel.set_phase(Phase::Main1).expect("running");
        duel.normal_summon(0, 2, SummonMode::Attack, &[]).expect("summon");
        duel.set_phase(Phase::Battle).expect("running");
        duel.attack(2, None).expect("direct attack");
        assert_eq!(duel.participant(Seat::B).life(), 0);
        assert_eq!(duel.winner(), Some(Seat::A));
        assert_eq!(duel.set_phase(Phase::Main2), Err(Rejection::DuelOver));
        assert_eq!(duel.reset_turn_flags(), Err(Rejection::DuelOver));
        assert_eq!(duel.start(), Err(Rejection::DuelOver));
    }

    #[test]
    fn a_decided_duel_keeps_its_winner() {
        let mut duel = duel(vec![creature("A1", 1000, 4)], Vec::new());
        duel.start().expect("starts");
        assert_eq!(duel.winner(), Some(Seat::A));
        assert_eq!(duel.end(Seat::B), Err(Rejection::DuelOver));
        assert_eq!(duel.winner(), Some(Seat::A));
    }

    #[test]
    fn conceding_ends_a_running_duel() {
        let mut duel = duel(vec![creature("A1", 1000, 4)], vec![creature("B1", 1000, 4)]);
        duel.start().expect("starts");
        duel.end(Seat::B).expect("running");
        assert!(duel.is_over());
        assert_eq!(duel.winner(), Some(Seat::B));
    }

    #[test]
    fn a_duel_only_starts_once() {
        let mut duel = duel(
            vec![creature("A1", 1000, 4), creature("A2", 1000, 4), creature("A3", 1000, 4)],
            vec![creature("B1", 1000, 4), creature("B2", 1000, 4)],
        );
        duel.start().expect("starts");
        duel.end_turn().expect("running");
        assert_eq!(duel.start(), Err(Rejection::AlreadyStarted));
        assert_eq!(duel.turn(), 2);
        assert_eq!(duel.active(), Seat::B);
        assert_eq!(duel.participant(Seat::A).hand.len(), 1);
        assert_eq!(duel.participant(Seat::B).hand.len(), 1);
    }

    #[test]
    fn search_moves_named_card_to_hand() {
        let mut duel = duel(
            vec![creature("A1", 1000, 4), creature("Needle", 1000, 4), creature("A3", 1000, 4)],
            Vec::new(),
        );
        let found = duel.search_library(Seat::A, "needle").expect("running");
        assert!(found.is_some());
        assert_eq!(duel.participant(Seat::A).hand.cards()[0].name(), "Needle");
        assert_eq!(duel.participant(Seat::A).library.len(), 2);
        assert_eq!(duel.search_library(Seat::A, "missing"), Ok(None));
    }
}
