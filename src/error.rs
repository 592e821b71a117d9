use crate::card::Card;

use std::fmt;

/// Why the engine refused an action. Refusals never change duel state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    DuelOver,
    AlreadyStarted,
    NotActiveParticipant,
    WrongPhase,
    SlotOutOfRange(usize),
    SlotOccupied(usize),
    SlotEmpty(usize),
    ZoneFull,
    HandIndexOutOfRange(usize),
    NotACreature,
    NotAnInstant,
    AlreadyNormalSummoned,
    TributeMismatch { required: usize, offered: usize },
    InvalidTribute(usize),
    AlreadyAttacked,
    NotInAttackPosition,
    DirectAttackBlocked,
    AlreadyChangedPosition,
    NotFaceDown,
    EffectCannotActivate,
    TrapFromHand,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DuelOver => write!(f, "The duel is already over"),
            Rejection::AlreadyStarted => write!(f, "The duel has already started"),
            Rejection::NotActiveParticipant => write!(f, "Not this participant's turn"),
            Rejection::WrongPhase => write!(f, "Action not allowed in the current phase"),
            Rejection::SlotOutOfRange(slot) => write!(f, "Slot {} is out of range", slot),
            Rejection::SlotOccupied(slot) => write!(f, "Slot {} is already occupied", slot),
            Rejection::SlotEmpty(slot) => write!(f, "Slot {} is empty", slot),
            Rejection::ZoneFull => write!(f, "No free slot left in that zone"),
            Rejection::HandIndexOutOfRange(index) => {
                write!(f, "No card at hand index {}", index)
            }
            Rejection::NotACreature => write!(f, "Card is not a creature"),
            Rejection::NotAnInstant => write!(f, "Card is not a spell or trap"),
            Rejection::AlreadyNormalSummoned => {
                write!(f, "Already normal summoned this turn")
            }
            Rejection::TributeMismatch { required, offered } => write!(
                f,
                "Summon requires {} tribute(s) but {} were offered",
                required, offered
            ),
            Rejection::InvalidTribute(slot) => write!(f, "Slot {} cannot be tributed", slot),
            Rejection::AlreadyAttacked => write!(f, "Creature has already attacked this turn"),
            Rejection::NotInAttackPosition => write!(f, "Creature is not in face-up attack position"),
            Rejection::DirectAttackBlocked => {
                write!(f, "Cannot attack directly while the opponent controls a creature")
            }
            Rejection::AlreadyChangedPosition => {
                write!(f, "Creature has already changed position this turn")
            }
            Rejection::NotFaceDown => write!(f, "Card is not face-down"),
            Rejection::EffectCannotActivate => write!(f, "Effect cannot be activated now"),
            Rejection::TrapFromHand => write!(f, "Traps must be set before they can be activated"),
        }
    }
}

impl std::error::Error for Rejection {}

/// A refused placement. The card is handed back to the caller untouched.
#[derive(Debug)]
pub struct Refused {
    pub reason: Rejection,
    pub card: Card,
}

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} refused: {}", self.card.name(), self.reason)
    }
}

impl std::error::Error for Refused {}
