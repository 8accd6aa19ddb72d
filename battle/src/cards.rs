//! Immutable card templates and the pool that owns them.

use crate::types::{CardType, Faction, Skill, SkillSpec};

pub type CardId = u32;

/// An immutable card template.
///
/// Templates are built once (normally from an external card database) and
/// shared by reference into every battle; the engine never mutates or clones
/// them. `skill_value` is the dense per-skill base-magnitude table that skill
/// lookups index through the unit's current Evolve offsets.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub card_type: CardType,
    pub faction: Faction,
    pub attack: u32,
    pub health: u32,
    pub delay: u32,
    pub rarity: u32,
    pub skills: Vec<SkillSpec>,
    pub skill_value: [u32; Skill::COUNT],
    /// Next upgrade level of this card, if any.
    pub upgraded_id: Option<CardId>,
}

impl Card {
    pub fn new(
        id: CardId,
        name: &str,
        card_type: CardType,
        faction: Faction,
        attack: u32,
        health: u32,
        delay: u32,
    ) -> Self {
        Card {
            id,
            name: name.to_string(),
            card_type,
            faction,
            attack,
            health,
            delay,
            rarity: 1,
            skills: Vec::new(),
            skill_value: [0; Skill::COUNT],
            upgraded_id: None,
        }
    }

    pub fn rarity(mut self, rarity: u32) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn upgrades_to(mut self, id: CardId) -> Self {
        self.upgraded_id = Some(id);
        self
    }

    /// Add a skill line, replacing any earlier line with the same id.
    ///
    /// The base-magnitude table entry is `x`, falling back to `n`, falling
    /// back to 1, so valueless skills (e.g. plain Wall) still register as
    /// present.
    pub fn with_skill(mut self, spec: SkillSpec) -> Self {
        if let Some(pos) = self.skills.iter().position(|ss| ss.id == spec.id) {
            self.skills.remove(pos);
        }
        self.skill_value[spec.id.index()] = if spec.x > 0 {
            spec.x
        } else if spec.n > 0 {
            spec.n
        } else {
            1
        };
        self.skills.push(spec);
        self
    }

    /// One-line summary used by diagnostics.
    pub fn description(&self) -> String {
        let mut desc = self.name.clone();
        match self.card_type {
            CardType::Assault => {
                desc.push_str(&format!(": {}/{}/{}", self.attack, self.health, self.delay))
            }
            CardType::Structure => desc.push_str(&format!(": {}/{}", self.health, self.delay)),
            CardType::Commander => desc.push_str(&format!(": hp:{}", self.health)),
        }
        for ss in &self.skills {
            desc.push_str(&format!(", {:?} {}", ss.id, ss.x));
        }
        desc
    }
}

/// Owning registry of card templates, keyed by card id.
///
/// Battles borrow `&Card` out of the pool, so the pool must outlive every
/// battle built from it. Templates are `Sync`; one pool serves any number of
/// concurrently simulated battles.
#[derive(Debug, Default)]
pub struct CardPool {
    cards: Vec<Card>,
}

impl CardPool {
    pub fn new() -> Self {
        CardPool { cards: Vec::new() }
    }

    pub fn add(&mut self, card: Card) -> CardId {
        let id = card.id;
        debug_assert!(
            !self.cards.iter().any(|c| c.id == id),
            "duplicate card id {id}"
        );
        self.cards.push(card);
        id
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
