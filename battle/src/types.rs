//! Shared enums and plain data types for the battle engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Card faction. `Progenitor` counts as every faction for targeting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Faction {
    AllFactions,
    Imperial,
    Raider,
    Bloodthirsty,
    Xeno,
    Righteous,
    Progenitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Commander,
    Assault,
    Structure,
}

/// Where an assault is within its own activation this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardStep {
    None,
    Attacking,
    Attacked,
}

/// Every skill in the game, in a dense ordinal layout.
///
/// The ordinal of each variant is load-bearing: Evolve works by storing signed
/// offsets between skill ordinals on a unit, so the per-skill tables on
/// `CardStatus` (and `Card::skill_value`) are indexed by `Skill::index()` plus
/// a current offset. Reordering variants changes battle semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    NoSkill,

    // Activation (harmful)
    Enfeeble,
    Jam,
    Mortar,
    Siege,
    Strike,
    Sunder,
    Weaken,

    // Activation (helpful)
    Enhance,
    Evolve,
    Heal,
    Mend,
    Overload,
    Protect,
    Rally,
    Enrage,
    Rush,

    // Defensive
    Armor,
    Avenge,
    Corrosive,
    Counter,
    Evade,
    Payback,
    Revenge,
    Refresh,
    Wall,

    // Combat modifier
    Legion,
    Pierce,
    Rupture,
    Swipe,
    Venom,

    // Damage dependent
    Berserk,
    Inhibit,
    Leech,
    Poison,

    // Triggered
    Allegiance,
    Flurry,
    Valor,
}

/// How an activation skill is resolved once it reaches the front of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillFamily {
    TargetedAllied,
    TargetedHostile,
    Rush,
}

impl Skill {
    pub const COUNT: usize = 38;

    pub const ALL: [Skill; Self::COUNT] = [
        Skill::NoSkill,
        Skill::Enfeeble,
        Skill::Jam,
        Skill::Mortar,
        Skill::Siege,
        Skill::Strike,
        Skill::Sunder,
        Skill::Weaken,
        Skill::Enhance,
        Skill::Evolve,
        Skill::Heal,
        Skill::Mend,
        Skill::Overload,
        Skill::Protect,
        Skill::Rally,
        Skill::Enrage,
        Skill::Rush,
        Skill::Armor,
        Skill::Avenge,
        Skill::Corrosive,
        Skill::Counter,
        Skill::Evade,
        Skill::Payback,
        Skill::Revenge,
        Skill::Refresh,
        Skill::Wall,
        Skill::Legion,
        Skill::Pierce,
        Skill::Rupture,
        Skill::Swipe,
        Skill::Venom,
        Skill::Berserk,
        Skill::Inhibit,
        Skill::Leech,
        Skill::Poison,
        Skill::Allegiance,
        Skill::Flurry,
        Skill::Valor,
    ];

    /// Dense ordinal of this skill, the index into per-skill tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Skill {
        Self::ALL[index]
    }

    /// Ordinal arithmetic used by Evolve offsets.
    #[inline]
    pub fn offset_by(self, offset: i32) -> Skill {
        Self::from_index((self.index() as i32 + offset) as usize)
    }

    pub fn is_activation_harmful(self) -> bool {
        matches!(
            self,
            Skill::Enfeeble
                | Skill::Jam
                | Skill::Mortar
                | Skill::Siege
                | Skill::Strike
                | Skill::Sunder
                | Skill::Weaken
        )
    }

    pub fn is_activation_helpful(self) -> bool {
        matches!(
            self,
            Skill::Enhance
                | Skill::Evolve
                | Skill::Heal
                | Skill::Mend
                | Skill::Overload
                | Skill::Protect
                | Skill::Rally
                | Skill::Enrage
                | Skill::Rush
        )
    }

    pub fn is_activation(self) -> bool {
        self.is_activation_harmful() || self.is_activation_helpful()
    }

    /// Resolution family of an activation skill. `None` for skills that never
    /// enter the skill queue (defensive, combat-modifier, damage-dependent and
    /// triggered skills are handled at their own hook points).
    pub fn family(self) -> Option<SkillFamily> {
        match self {
            Skill::Enfeeble
            | Skill::Jam
            | Skill::Mortar
            | Skill::Siege
            | Skill::Strike
            | Skill::Sunder
            | Skill::Weaken => Some(SkillFamily::TargetedHostile),
            Skill::Enhance
            | Skill::Evolve
            | Skill::Heal
            | Skill::Mend
            | Skill::Overload
            | Skill::Protect
            | Skill::Rally
            | Skill::Enrage => Some(SkillFamily::TargetedAllied),
            Skill::Rush => Some(SkillFamily::Rush),
            _ => None,
        }
    }
}

/// Passive background effects active for the whole battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassiveBge {
    Bloodlust,
    Brigade,
    Counterflux,
    Divert,
    EnduringRage,
    Fortification,
    Heroism,
    ZealotsPreservation,
    Metamorphosis,
    Revenge,
    TurningTides,
    Virulence,
    HaltedOrders,
}

/// Who takes the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// The attacker (player 0) goes first.
    Fight,
    /// The defender (player 1) goes first.
    Surge,
}

/// How the battle outcome is folded into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptimizationMode {
    NotSet,
    Winrate,
    Defense,
    War,
    Brawl,
    BrawlDefense,
    Raid,
    Campaign,
    Quest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestType {
    None,
    SkillUse,
    SkillDamage,
    FactionAssaultCardUse,
    TypeCardUse,
    FactionAssaultCardKill,
    TypeCardKill,
    CardSurvival,
}

/// A quest objective tracked over one battle.
///
/// Keys are raw ids in the quest database's own encoding: skill ordinals for
/// skill quests, faction ordinals for faction quests, card ids for survival
/// quests. The secondary key narrows skill quests to a specific target card
/// (0 matches anything).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub quest_type: QuestType,
    #[serde(default)]
    pub key: u32,
    #[serde(default)]
    pub second_key: u32,
    /// Target progress for full credit.
    pub value: u32,
    /// Score awarded for quest progress.
    pub score: u32,
    /// Extra score awarded only on a win.
    #[serde(default)]
    pub win_score: u32,
    /// All-or-nothing instead of proportional credit.
    #[serde(default)]
    pub must_fulfill: bool,
    /// No quest credit unless the battle is won.
    #[serde(default)]
    pub must_win: bool,
}

impl Default for Quest {
    fn default() -> Self {
        Quest {
            quest_type: QuestType::None,
            key: 0,
            second_key: 0,
            value: 1,
            score: 0,
            win_score: 0,
            must_fulfill: false,
            must_win: false,
        }
    }
}

/// One skill line on a card: id plus the x/y/n/c/s/s2/all parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSpec {
    pub id: Skill,
    /// Magnitude.
    #[serde(default)]
    pub x: u32,
    /// Faction restriction for targeting.
    #[serde(default = "SkillSpec::default_faction")]
    pub y: Faction,
    /// Number of targets.
    #[serde(default)]
    pub n: u32,
    /// Cooldown in own turns.
    #[serde(default)]
    pub c: u32,
    /// First linked skill (Enhance/Evolve).
    #[serde(default = "SkillSpec::default_skill")]
    pub s: Skill,
    /// Second linked skill (Evolve).
    #[serde(default = "SkillSpec::default_skill")]
    pub s2: Skill,
    /// Target every candidate instead of sampling.
    #[serde(default)]
    pub all: bool,
}

impl SkillSpec {
    fn default_faction() -> Faction {
        Faction::AllFactions
    }

    fn default_skill() -> Skill {
        Skill::NoSkill
    }

    /// A plain activation skill with magnitude `x` and no restrictions.
    pub fn new(id: Skill, x: u32) -> Self {
        SkillSpec {
            id,
            x,
            y: Faction::AllFactions,
            n: 0,
            c: 0,
            s: Skill::NoSkill,
            s2: Skill::NoSkill,
            all: false,
        }
    }

    pub fn faction(mut self, y: Faction) -> Self {
        self.y = y;
        self
    }

    pub fn targets(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub fn cooldown(mut self, c: u32) -> Self {
        self.c = c;
        self
    }

    pub fn linked(mut self, s: Skill) -> Self {
        self.s = s;
        self
    }

    pub fn linked2(mut self, s2: Skill) -> Self {
        self.s2 = s2;
        self
    }

    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }
}

/// Outcome of a single battle from the attacker's point of view.
///
/// Exactly one of `wins`/`draws`/`losses` is 1; `points` is the score of the
/// configured optimization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u64,
}

impl Results {
    pub fn win(points: u64) -> Self {
        Results { wins: 1, draws: 0, losses: 0, points }
    }

    pub fn draw(points: u64) -> Self {
        Results { wins: 0, draws: 1, losses: 0, points }
    }

    pub fn loss(points: u64) -> Self {
        Results { wins: 0, draws: 0, losses: 1, points }
    }
}

pub const DEFAULT_TURN_LIMIT: u32 = 50;

/// Everything about a battle that is not the two decks or the RNG seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BattleConfig {
    pub mode: GameMode,
    pub optimization: OptimizationMode,
    pub turn_limit: u32,
    /// Passive background effects with their magnitudes (0 means "use the
    /// effect's built-in default" where one exists).
    pub bg_effects: BTreeMap<PassiveBge, u32>,
    /// Per-player skills the commander casts at the start of every own turn.
    pub bg_skills: [Vec<SkillSpec>; 2],
    pub quest: Option<Quest>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            mode: GameMode::Fight,
            optimization: OptimizationMode::Winrate,
            turn_limit: DEFAULT_TURN_LIMIT,
            bg_effects: BTreeMap::new(),
            bg_skills: [Vec::new(), Vec::new()],
            quest: None,
        }
    }
}

/// Card ids whose death immediately loses the battle for their owner.
pub type VipSet = BTreeSet<u32>;
