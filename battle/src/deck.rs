//! Decks: a commander, optional fortresses, and a drawable card sequence.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId};
use crate::error::{SimError, SimResult};
use crate::rng::BattleRng;
use crate::types::{CardType, VipSet};

/// How the card sequence is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeckStrategy {
    /// Fisher-Yates shuffle, then draw from the top.
    Random,
    /// Draw the card closest to its listed position among the top three.
    Ordered,
    /// Draw in exactly the listed order, no shuffle.
    ExactOrdered,
}

/// One player's deck for a single battle.
///
/// `shuffle` rebuilds the shuffled views from the pristine lists, so the same
/// deck value can seed any number of battles.
#[derive(Debug, Clone)]
pub struct Deck<'a> {
    pub commander: &'a Card,
    pub cards: Vec<&'a Card>,
    pub forts: Vec<&'a Card>,
    pub strategy: DeckStrategy,
    /// Card ids whose death immediately zeroes the owner's commander.
    pub vip_cards: VipSet,

    pub shuffled_forts: Vec<&'a Card>,
    pub shuffled_cards: VecDeque<&'a Card>,
    order: HashMap<CardId, VecDeque<usize>>,
}

impl<'a> Deck<'a> {
    pub fn new(commander: &'a Card, cards: Vec<&'a Card>) -> SimResult<Self> {
        if commander.card_type != CardType::Commander {
            return Err(SimError::InvalidCommander { card_id: commander.id });
        }
        if let Some(card) = cards.iter().find(|c| c.card_type == CardType::Commander) {
            return Err(SimError::CommanderInDeck { card_id: card.id });
        }
        Ok(Deck {
            commander,
            cards,
            forts: Vec::new(),
            strategy: DeckStrategy::Random,
            vip_cards: VipSet::new(),
            shuffled_forts: Vec::new(),
            shuffled_cards: VecDeque::new(),
            order: HashMap::new(),
        })
    }

    pub fn with_forts(mut self, forts: Vec<&'a Card>) -> SimResult<Self> {
        if let Some(card) = forts.iter().find(|c| c.card_type != CardType::Structure) {
            return Err(SimError::InvalidFort { card_id: card.id });
        }
        self.forts = forts;
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: DeckStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_vip_cards(mut self, vip_cards: VipSet) -> Self {
        self.vip_cards = vip_cards;
        self
    }

    /// Full size of the drawable sequence, independent of draws so far.
    pub fn deck_size(&self) -> usize {
        self.cards.len()
    }

    /// Cards not yet drawn.
    pub fn remaining(&self) -> usize {
        self.shuffled_cards.len()
    }

    /// Rebuild the shuffled views for a fresh battle.
    pub fn shuffle<R: BattleRng>(&mut self, rng: &mut R) {
        self.shuffled_forts = self.forts.clone();
        let mut cards = self.cards.clone();
        match self.strategy {
            DeckStrategy::Random => rng.shuffle(&mut cards),
            DeckStrategy::Ordered => {
                self.order.clear();
                for (i, card) in cards.iter().enumerate() {
                    self.order.entry(card.id).or_default().push_back(i);
                }
                rng.shuffle(&mut cards);
            }
            DeckStrategy::ExactOrdered => {}
        }
        self.shuffled_cards = cards.into();
    }

    /// Draw the next card, or `None` once the deck is depleted.
    pub fn next(&mut self) -> Option<&'a Card> {
        if self.shuffled_cards.is_empty() {
            return None;
        }
        match self.strategy {
            DeckStrategy::Random | DeckStrategy::ExactOrdered => self.shuffled_cards.pop_front(),
            DeckStrategy::Ordered => {
                // Among the top three, draw the card whose next listed
                // position is earliest.
                let window = self.shuffled_cards.len().min(3);
                let mut best = 0;
                let mut best_order: Option<usize> = self.next_order(self.shuffled_cards[0].id);
                for i in 1..window {
                    let order = self.next_order(self.shuffled_cards[i].id);
                    match (best_order, order) {
                        (None, Some(_)) => {
                            best = i;
                            best_order = order;
                        }
                        (Some(b), Some(o)) if o < b => {
                            best = i;
                            best_order = order;
                        }
                        _ => {}
                    }
                }
                let card = self.shuffled_cards.remove(best);
                if let Some(card) = card {
                    if let Some(positions) = self.order.get_mut(&card.id) {
                        positions.pop_front();
                    }
                }
                card
            }
        }
    }

    fn next_order(&self, id: CardId) -> Option<usize> {
        self.order.get(&id).and_then(|positions| positions.front().copied())
    }
}
