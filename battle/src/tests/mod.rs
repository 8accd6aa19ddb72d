mod attack;
mod config;
mod targeting;

use crate::cards::Card;
use crate::deck::Deck;
use crate::field::{Field, Hand, Phase, UnitRef};
use crate::rng::XorShiftRng;
use crate::status::CardStatus;
use crate::types::*;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

fn commander_card(id: u32, hp: u32) -> Card {
    Card::new(id, "Commander", CardType::Commander, Faction::Imperial, 0, hp, 0)
}

fn assault_card(id: u32, attack: u32, health: u32, delay: u32) -> Card {
    Card::new(id, "Assault", CardType::Assault, Faction::Imperial, attack, health, delay)
}

fn faction_assault_card(id: u32, faction: Faction, attack: u32, health: u32, delay: u32) -> Card {
    Card::new(id, "Assault", CardType::Assault, faction, attack, health, delay)
}

fn structure_card(id: u32, health: u32, delay: u32) -> Card {
    Card::new(id, "Structure", CardType::Structure, Faction::Imperial, 0, health, delay)
}

fn make_field<'a>(
    attacker: Deck<'a>,
    defender: Deck<'a>,
    config: BattleConfig,
    seed: u64,
) -> Field<'a> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut players = [Hand::new(attacker, &mut rng), Hand::new(defender, &mut rng)];
    players[0].commander.player = 0;
    players[1].commander.player = 1;
    Field {
        end: false,
        rng,
        players,
        tapi: 0,
        tipi: 1,
        turn: 1,
        turn_limit: config.turn_limit,
        gamemode: config.mode,
        optimization_mode: config.optimization,
        quest: config.quest.unwrap_or_default(),
        bg_effects: config.bg_effects,
        bg_skills: config.bg_skills,
        skill_queue: Default::default(),
        killed_units: Vec::new(),
        selection: Vec::new(),
        current_phase: Phase::PlayCard,
        current_ci: 0,
        assault_bloodlusted: false,
        bloodlust_value: 0,
        quest_counter: 0,
    }
}

/// A field with two empty boards, for placing units by hand.
fn empty_field<'a>(cmd0: &'a Card, cmd1: &'a Card) -> Field<'a> {
    let attacker = Deck::new(cmd0, Vec::new()).unwrap();
    let defender = Deck::new(cmd1, Vec::new()).unwrap();
    make_field(attacker, defender, BattleConfig::default(), 42)
}

fn place_assault<'a>(fd: &mut Field<'a>, player: usize, card: &'a Card) -> UnitRef {
    let mut status = CardStatus::new(card);
    status.player = player;
    status.index = fd.players[player].assaults.len();
    fd.players[player].assaults.push(status);
    UnitRef::assault(player, fd.players[player].assaults.len() - 1)
}

fn place_structure<'a>(fd: &mut Field<'a>, player: usize, card: &'a Card) -> UnitRef {
    let mut status = CardStatus::new(card);
    status.player = player;
    status.index = fd.players[player].structures.len();
    fd.players[player].structures.push(status);
    UnitRef::structure(player, fd.players[player].structures.len() - 1)
}
