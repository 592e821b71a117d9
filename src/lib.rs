//! Turn-based card duel engine: two participants, a six-phase turn cycle,
//! creature combat and a rule-following automated opponent.

pub mod battle;
pub mod bot;
pub mod card;
pub mod cards;
pub mod config;
pub mod duel;
pub mod effect;
pub mod error;
pub mod field;
pub mod participant;
pub mod phase;
pub mod zone;

pub use crate::bot::Bot;
pub use crate::card::{BattlePosition, Card, CardInstance, CardTemplate, Seat};
pub use crate::config::DuelConfig;
pub use crate::duel::{Duel, DuelistSetup};
pub use crate::error::Rejection;
pub use crate::participant::SummonMode;
pub use crate::phase::Phase;
