//! The battle field: both hands plus everything the turn machine tracks.

use std::collections::{BTreeMap, VecDeque};

use crate::cards::Card;
use crate::deck::Deck;
use crate::rng::{BattleRng, XorShiftRng};
use crate::status::CardStatus;
use crate::types::{
    CardType, GameMode, OptimizationMode, PassiveBge, Quest, QuestType, SkillSpec,
};

#[inline]
pub fn opponent(player: usize) -> usize {
    (player + 1) % 2
}

/// Which board slot a unit occupies.
///
/// Slots are stable for the duration of a turn: units are appended when
/// played and dead units are only compacted out at the end of the turn, so a
/// `UnitRef` captured inside a turn stays valid until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Commander,
    Assault(usize),
    Structure(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRef {
    pub player: usize,
    pub slot: Slot,
}

impl UnitRef {
    pub fn commander(player: usize) -> Self {
        UnitRef { player, slot: Slot::Commander }
    }

    pub fn assault(player: usize, index: usize) -> Self {
        UnitRef { player, slot: Slot::Assault(index) }
    }

    pub fn structure(player: usize, index: usize) -> Self {
        UnitRef { player, slot: Slot::Structure(index) }
    }
}

/// One player's board.
#[derive(Debug)]
pub struct Hand<'a> {
    pub deck: Deck<'a>,
    pub commander: CardStatus<'a>,
    pub assaults: Vec<CardStatus<'a>>,
    pub structures: Vec<CardStatus<'a>>,
}

impl<'a> Hand<'a> {
    /// Shuffle the deck and set up a fresh board around its commander.
    pub fn new<R: BattleRng>(mut deck: Deck<'a>, rng: &mut R) -> Self {
        deck.shuffle(rng);
        let commander = CardStatus::new(deck.commander);
        Hand { deck, commander, assaults: Vec::new(), structures: Vec::new() }
    }
}

/// Turn phase. Starts at `PlayCard`, then the active player's commander,
/// structures and assaults act in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PlayCard,
    Commander,
    Structures,
    Assaults,
    End,
}

/// The whole battle state.
///
/// A single skill can trigger arbitrarily many follow-up skills (on-death
/// effects, diverted casts, retaliation); those flow through `skill_queue`,
/// which supports prepending so on-death skills resolve before whatever was
/// already queued.
pub struct Field<'a> {
    pub end: bool,
    pub rng: XorShiftRng,
    /// players[0]: the attacker, players[1]: the defender.
    pub players: [Hand<'a>; 2],
    /// Current turn's active player index, and the inactive one.
    pub tapi: usize,
    pub tipi: usize,
    pub turn: u32,
    pub turn_limit: u32,
    pub gamemode: GameMode,
    pub optimization_mode: OptimizationMode,
    pub quest: Quest,
    pub bg_effects: BTreeMap<PassiveBge, u32>,
    /// Active background skills, cast by each commander every own turn.
    pub bg_skills: [Vec<SkillSpec>; 2],
    pub skill_queue: VecDeque<(UnitRef, SkillSpec)>,
    pub killed_units: Vec<UnitRef>,
    /// Reusable scratch buffer for target selection.
    pub selection: Vec<UnitRef>,
    pub current_phase: Phase,
    /// Index of the card being evaluated in the current phase.
    pub current_ci: usize,
    pub assault_bloodlusted: bool,
    pub bloodlust_value: u32,
    pub quest_counter: u32,
}

impl<'a> Field<'a> {
    pub fn hand(&self, player: usize) -> &Hand<'a> {
        &self.players[player]
    }

    pub fn hand_mut(&mut self, player: usize) -> &mut Hand<'a> {
        &mut self.players[player]
    }

    /// The active player's hand.
    pub fn tap(&self) -> &Hand<'a> {
        &self.players[self.tapi]
    }

    pub fn tap_mut(&mut self) -> &mut Hand<'a> {
        &mut self.players[self.tapi]
    }

    /// The inactive player's hand.
    pub fn tip(&self) -> &Hand<'a> {
        &self.players[self.tipi]
    }

    pub fn tip_mut(&mut self) -> &mut Hand<'a> {
        &mut self.players[self.tipi]
    }

    pub fn unit(&self, r: UnitRef) -> &CardStatus<'a> {
        let hand = &self.players[r.player];
        match r.slot {
            Slot::Commander => &hand.commander,
            Slot::Assault(i) => &hand.assaults[i],
            Slot::Structure(i) => &hand.structures[i],
        }
    }

    pub fn unit_mut(&mut self, r: UnitRef) -> &mut CardStatus<'a> {
        let hand = &mut self.players[r.player];
        match r.slot {
            Slot::Commander => &mut hand.commander,
            Slot::Assault(i) => &mut hand.assaults[i],
            Slot::Structure(i) => &mut hand.structures[i],
        }
    }

    pub fn card(&self, r: UnitRef) -> &'a Card {
        self.unit(r).card
    }

    /// Inclusive-bounds random draw, the engine's only randomness consumer
    /// besides the initial deck shuffles.
    pub fn rand(&mut self, lo: usize, hi: usize) -> usize {
        self.rng.rand_range(lo, hi)
    }

    /// The living assault directly left of `r`, if any.
    pub fn left_assault(&self, r: UnitRef) -> Option<UnitRef> {
        let Slot::Assault(index) = r.slot else { return None };
        if index == 0 {
            return None;
        }
        let left = UnitRef::assault(r.player, index - 1);
        self.unit(left).is_alive().then_some(left)
    }

    /// The living assault directly right of `r`, if any.
    pub fn right_assault(&self, r: UnitRef) -> Option<UnitRef> {
        let Slot::Assault(index) = r.slot else { return None };
        if index + 1 >= self.players[r.player].assaults.len() {
            return None;
        }
        let right = UnitRef::assault(r.player, index + 1);
        self.unit(right).is_alive().then_some(right)
    }

    pub fn adjacent_assaults(&self, r: UnitRef) -> Vec<UnitRef> {
        let mut adjacent = Vec::with_capacity(2);
        if let Some(left) = self.left_assault(r) {
            adjacent.push(left);
        }
        if let Some(right) = self.right_assault(r) {
            adjacent.push(right);
        }
        adjacent
    }

    pub fn bge(&self, bge: PassiveBge) -> Option<u32> {
        self.bg_effects.get(&bge).copied()
    }

    pub fn has_bge(&self, bge: PassiveBge) -> bool {
        self.bg_effects.contains_key(&bge)
    }

    /// Record quest progress if the event matches the configured quest.
    pub fn inc_counter(&mut self, quest_type: QuestType, key: u32, second_key: u32, amount: u32) {
        if self.quest.quest_type == quest_type
            && self.quest.key == key
            && (self.quest.second_key == 0 || self.quest.second_key == second_key)
        {
            self.quest_counter += amount;
        }
    }

    pub fn is_commander(&self, r: UnitRef) -> bool {
        self.card(r).card_type == CardType::Commander
    }
}
