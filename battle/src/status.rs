//! Runtime state of a single card on the board.

use crate::cards::Card;
use crate::types::{CardStep, CardType, Faction, Skill};

/// A card in play: the template plus everything that can change during a
/// battle.
///
/// The three offset/enhance tables and the cooldown table are indexed by
/// dense skill ordinal. `primary_skill_offset` redirects value lookups after
/// an Evolve swap, `evolved_skill_offset` redirects the dispatched skill id,
/// and `enhanced_value` holds Enhance bonuses keyed by the redirected slot.
#[derive(Debug, Clone)]
pub struct CardStatus<'a> {
    pub card: &'a Card,
    pub index: usize,
    pub player: usize,
    pub delay: u32,
    pub faction: Faction,
    pub attack: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub step: CardStep,

    pub corroded_rate: u32,
    pub corroded_weakened: u32,
    pub enfeebled: u32,
    pub evaded: u32,
    pub inhibited: u32,
    pub jammed: bool,
    pub overloaded: bool,
    pub paybacked: u32,
    pub poisoned: u32,
    pub protected: u32,
    pub rallied: u32,
    pub derallied: u32,
    pub enraged: u32,
    pub rush_attempted: bool,
    pub sundered: bool,
    pub weakened: u32,

    pub primary_skill_offset: [i32; Skill::COUNT],
    pub evolved_skill_offset: [i32; Skill::COUNT],
    pub enhanced_value: [u32; Skill::COUNT],
    pub skill_cd: [u32; Skill::COUNT],
}

impl<'a> CardStatus<'a> {
    pub fn new(card: &'a Card) -> Self {
        CardStatus {
            card,
            index: 0,
            player: 0,
            delay: card.delay,
            faction: card.faction,
            attack: card.attack,
            hp: card.health,
            max_hp: card.health,
            step: CardStep::None,
            corroded_rate: 0,
            corroded_weakened: 0,
            enfeebled: 0,
            evaded: 0,
            inhibited: 0,
            jammed: false,
            overloaded: false,
            paybacked: 0,
            poisoned: 0,
            protected: 0,
            rallied: 0,
            derallied: 0,
            enraged: 0,
            rush_attempted: false,
            sundered: false,
            weakened: 0,
            primary_skill_offset: [0; Skill::COUNT],
            evolved_skill_offset: [0; Skill::COUNT],
            enhanced_value: [0; Skill::COUNT],
            skill_cd: [0; Skill::COUNT],
        }
    }

    /// Base value of a skill through the current Evolve redirection.
    /// Enrage feeds straight into Berserk's base value.
    pub fn skill_base_value(&self, skill: Skill) -> u32 {
        let slot = (skill.index() as i32 + self.primary_skill_offset[skill.index()]) as usize;
        self.card.skill_value[slot] + if skill == Skill::Berserk { self.enraged } else { 0 }
    }

    /// Effective value: base plus Enhance.
    pub fn skill(&self, skill: Skill) -> u32 {
        self.skill_base_value(skill) + self.enhanced(skill)
    }

    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skill_base_value(skill) > 0
    }

    pub fn enhanced(&self, skill: Skill) -> u32 {
        let slot = (skill.index() as i32 + self.primary_skill_offset[skill.index()]) as usize;
        self.enhanced_value[slot]
    }

    pub fn protected_value(&self) -> u32 {
        self.protected
    }

    /// Current effective attack: base attack less weaken/corrosion, plus
    /// rally, less derally, never below zero.
    pub fn attack_power(&self) -> u32 {
        self.attack
            .saturating_sub(self.weakened + self.corroded_weakened)
            .saturating_add(self.rallied)
            .saturating_sub(self.derallied)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.jammed
    }

    pub fn is_active(&self) -> bool {
        self.can_act() && self.delay == 0
    }

    pub fn is_active_next_turn(&self) -> bool {
        self.can_act() && self.delay <= 1
    }

    pub fn has_attacked(&self) -> bool {
        self.step == CardStep::Attacked
    }

    pub fn can_be_healed(&self) -> bool {
        self.is_alive() && self.hp < self.max_hp
    }

    pub fn add_hp(&mut self, v: u32) {
        self.hp = (self.hp + v).min(self.max_hp);
    }

    /// One-line description for the diagnostic trace.
    pub fn description(&self) -> String {
        let mut desc = format!("P{} ", self.player);
        match self.card.card_type {
            CardType::Commander => desc.push_str("Commander "),
            CardType::Assault => desc.push_str(&format!("Assault {} ", self.index)),
            CardType::Structure => desc.push_str(&format!("Structure {} ", self.index)),
        }
        desc.push('[');
        desc.push_str(&self.card.name);
        if self.card.card_type == CardType::Assault {
            desc.push_str(&format!(" att:{}", self.attack_power()));
        }
        desc.push_str(&format!(" hp:{}", self.hp));
        if self.delay > 0 {
            desc.push_str(&format!(" cd:{}", self.delay));
        }
        if self.jammed {
            desc.push_str(", jammed");
        }
        if self.overloaded {
            desc.push_str(", overloaded");
        }
        if self.sundered {
            desc.push_str(", sundered");
        }
        if self.corroded_rate > 0 {
            desc.push_str(&format!(", corroded {}", self.corroded_rate));
        }
        if self.enfeebled > 0 {
            desc.push_str(&format!(", enfeebled {}", self.enfeebled));
        }
        if self.inhibited > 0 {
            desc.push_str(&format!(", inhibited {}", self.inhibited));
        }
        if self.poisoned > 0 {
            desc.push_str(&format!(", poisoned {}", self.poisoned));
        }
        if self.protected > 0 {
            desc.push_str(&format!(", protected {}", self.protected));
        }
        if self.enraged > 0 {
            desc.push_str(&format!(", enraged {}", self.enraged));
        }
        desc.push(']');
        desc
    }
}
