//! Target selection: pools, predicates, faction filters and sampling.

use super::*;
use crate::skills::{perform_targeted_allied, perform_targeted_hostile, select_targets};
use crate::types::Skill;

#[test]
fn test_faction_filter_admits_progenitor() {
    let cmd = commander_card(1, 50);
    let raider = faction_assault_card(2, Faction::Raider, 1, 10, 0);
    let imperial = faction_assault_card(3, Faction::Imperial, 1, 10, 0);
    let progenitor = faction_assault_card(4, Faction::Progenitor, 1, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let a = place_assault(&mut fd, 0, &raider);
    let b = place_assault(&mut fd, 0, &imperial);
    let c = place_assault(&mut fd, 0, &progenitor);

    let rally = SkillSpec::new(Skill::Rally, 2).faction(Faction::Raider).all();
    perform_targeted_allied(&mut fd, UnitRef::commander(0), &rally);

    assert_eq!(fd.unit(a).rallied, 2);
    assert_eq!(fd.unit(b).rallied, 0);
    assert_eq!(fd.unit(c).rallied, 2);
}

#[test]
fn test_metamorphosis_ignores_faction_restrictions() {
    let cmd = commander_card(1, 50);
    let raider = faction_assault_card(2, Faction::Raider, 1, 10, 0);
    let imperial = faction_assault_card(3, Faction::Imperial, 1, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    fd.bg_effects.insert(PassiveBge::Metamorphosis, 1);
    let a = place_assault(&mut fd, 0, &raider);
    let b = place_assault(&mut fd, 0, &imperial);

    let rally = SkillSpec::new(Skill::Rally, 2).faction(Faction::Raider).all();
    perform_targeted_allied(&mut fd, UnitRef::commander(0), &rally);

    assert_eq!(fd.unit(a).rallied, 2);
    assert_eq!(fd.unit(b).rallied, 2);
}

#[test]
fn test_sampled_targets_are_deterministic_and_in_slot_order() {
    let cmd = commander_card(1, 50);
    let target_card = assault_card(2, 0, 10, 0);
    let strike = SkillSpec::new(Skill::Strike, 1).targets(2);

    let mut selections = Vec::new();
    for _ in 0..2 {
        let mut fd = empty_field(&cmd, &cmd);
        for _ in 0..4 {
            place_assault(&mut fd, 1, &target_card);
        }
        let n = select_targets(&mut fd, UnitRef::commander(0), &strike);
        assert_eq!(n, 2);
        let indexes: Vec<usize> =
            fd.selection.iter().map(|r| fd.unit(*r).index).collect();
        assert!(indexes[0] < indexes[1]);
        selections.push(indexes);
    }
    assert_eq!(selections[0], selections[1]);
}

#[test]
fn test_all_flag_targets_every_candidate() {
    let cmd = commander_card(1, 50);
    let target_card = assault_card(2, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    for _ in 0..4 {
        place_assault(&mut fd, 1, &target_card);
    }
    let strike = SkillSpec::new(Skill::Strike, 1).all();
    assert_eq!(select_targets(&mut fd, UnitRef::commander(0), &strike), 4);
}

#[test]
fn test_jam_targets_only_units_active_next_turn() {
    let cmd = commander_card(1, 50);
    let active = assault_card(2, 1, 10, 0);
    let almost = assault_card(3, 1, 10, 1);
    let dormant = assault_card(4, 1, 10, 2);
    let mut fd = empty_field(&cmd, &cmd);
    let a = place_assault(&mut fd, 1, &active);
    let b = place_assault(&mut fd, 1, &almost);
    let c = place_assault(&mut fd, 1, &dormant);

    let jam = SkillSpec::new(Skill::Jam, 1).all();
    perform_targeted_hostile(&mut fd, UnitRef::commander(0), &jam);

    assert!(fd.unit(a).jammed);
    assert!(fd.unit(b).jammed);
    assert!(!fd.unit(c).jammed);
}

#[test]
fn test_weaken_skips_zeroed_targets() {
    let cmd = commander_card(1, 50);
    let armed = assault_card(2, 3, 10, 0);
    let toothless = assault_card(3, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let a = place_assault(&mut fd, 1, &armed);
    let b = place_assault(&mut fd, 1, &toothless);

    let weaken = SkillSpec::new(Skill::Weaken, 2).all();
    perform_targeted_hostile(&mut fd, UnitRef::commander(0), &weaken);

    assert_eq!(fd.unit(a).weakened, 2);
    assert_eq!(fd.unit(b).weakened, 0);
}

#[test]
fn test_overload_wants_a_pending_harmful_skill() {
    let cmd = commander_card(1, 50);
    let striker_card =
        assault_card(2, 1, 10, 0).with_skill(SkillSpec::new(Skill::Strike, 2));
    let vanilla_card = assault_card(3, 1, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let vanilla = place_assault(&mut fd, 0, &vanilla_card);
    let striker = place_assault(&mut fd, 0, &striker_card);

    let overload = SkillSpec::new(Skill::Overload, 1);
    perform_targeted_allied(&mut fd, UnitRef::commander(0), &overload);

    assert!(fd.unit(striker).overloaded);
    assert!(!fd.unit(vanilla).overloaded);
}

#[test]
fn test_siege_targets_structures() {
    let cmd = commander_card(1, 50);
    let tower_card = structure_card(2, 10, 0);
    let bystander_card = assault_card(3, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let tower = place_structure(&mut fd, 1, &tower_card);
    let bystander = place_assault(&mut fd, 1, &bystander_card);

    let siege = SkillSpec::new(Skill::Siege, 4);
    perform_targeted_hostile(&mut fd, UnitRef::commander(0), &siege);

    assert_eq!(fd.unit(tower).hp, 6);
    assert_eq!(fd.unit(bystander).hp, 10);
}

#[test]
fn test_no_candidates_means_no_effect() {
    let cmd = commander_card(1, 50);
    let mut fd = empty_field(&cmd, &cmd);
    let strike = SkillSpec::new(Skill::Strike, 3);
    assert_eq!(select_targets(&mut fd, UnitRef::commander(0), &strike), 0);
    perform_targeted_hostile(&mut fd, UnitRef::commander(0), &strike);
    assert!(!fd.end);
}
