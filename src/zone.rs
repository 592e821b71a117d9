//! The ordered card piles each participant owns. Cards are held by value, so
//! moving a card is always a take from one pile followed by an add to another.

use crate::card::{Card, CardInstance};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

fn position_of(cards: &[Card], instance: CardInstance) -> Option<usize> {
    cards.iter().position(|card| card.instance == instance)
}

/// Draw pile. Index 0 is the next card drawn.
#[derive(Debug, Default)]
pub struct Library {
    cards: Vec<Card>,
}

impl Library {
    pub fn new(cards: Vec<Card>) -> Self {
        Library { cards }
    }

    /// `None` when empty, which is the deck-out signal.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            debug!("library is empty, cannot draw");
            return None;
        }
        Some(self.cards.remove(0))
    }

    pub fn peek(&self) -> Option<&Card> {
        self.cards.first()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        debug!(cards = self.cards.len(), "library shuffled");
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn take(&mut self, instance: CardInstance) -> Option<Card> {
        position_of(&self.cards, instance).map(|index| self.cards.remove(index))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Extra deck. Cards are chosen by index rather than drawn.
#[derive(Debug, Default)]
pub struct SideLibrary {
    cards: Vec<Card>,
}

impl SideLibrary {
    pub fn new(cards: Vec<Card>) -> Self {
        SideLibrary { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn choose(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Creatures whose race matches, ignoring case.
    pub fn search_by_race(&self, race: &str) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| {
                card.creature()
                    .map_or(false, |creature| creature.race.eq_ignore_ascii_case(race))
            })
            .collect()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn take(&mut self, index: usize) -> Option<Card> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    /// Puts a card back at the index it was taken from.
    pub(crate) fn restore(&mut self, index: usize, card: Card) {
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
    }

    pub fn contains(&self, instance: CardInstance) -> bool {
        position_of(&self.cards, instance).is_some()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Graveyard. The tail is the most recently discarded card.
#[derive(Debug, Default)]
pub struct Discard {
    cards: Vec<Card>,
}

impl Discard {
    pub fn add(&mut self, card: Card) {
        debug!(card = card.name(), "sent to the discard pile");
        self.cards.push(card);
    }

    pub fn take(&mut self, instance: CardInstance) -> Option<Card> {
        position_of(&self.cards, instance).map(|index| self.cards.remove(index))
    }

    pub fn most_recent(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn take_most_recent(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn search_by_name(&self, name: &str) -> Option<&Card> {
        self.cards
            .iter()
            .find(|card| card.name().eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, instance: CardInstance) -> bool {
        position_of(&self.cards, instance).is_some()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Banished cards.
#[derive(Debug, Default)]
pub struct Exile {
    cards: Vec<Card>,
}

impl Exile {
    pub fn add(&mut self, card: Card) {
        debug!(card = card.name(), "banished");
        self.cards.push(card);
    }

    pub fn most_recent(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn contains(&self, instance: CardInstance) -> bool {
        position_of(&self.cards, instance).is_some()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
