//! The attack-damage pipeline, one stage at a time.

use super::*;
use crate::attack::attack_phase;
use crate::types::Skill;

#[test]
fn test_armor_and_protect_reduced_by_pierce() {
    let cmd = commander_card(1, 50);
    let attacker_card =
        assault_card(2, 5, 10, 0).with_skill(SkillSpec::new(Skill::Pierce, 1));
    let defender_card = assault_card(3, 0, 10, 0)
        .with_skill(SkillSpec::new(Skill::Armor, 2));
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);
    fd.unit_mut(def).protected = 1;

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));

    // 5 attack against armor 2 + protect 1, pierced by 1: 5 - 2 = 3.
    assert_eq!(fd.unit(def).hp, 7);
}

#[test]
fn test_legion_counts_living_same_faction_neighbors() {
    let cmd = commander_card(1, 50);
    let legionnaire =
        assault_card(2, 2, 10, 0).with_skill(SkillSpec::new(Skill::Legion, 2));
    let grunt = assault_card(3, 1, 10, 0);
    let blocker = assault_card(4, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &grunt);
    place_assault(&mut fd, 0, &legionnaire);
    place_assault(&mut fd, 0, &grunt);
    place_assault(&mut fd, 1, &blocker);
    let def = place_assault(&mut fd, 1, &blocker);

    fd.current_ci = 1;
    assert!(attack_phase(&mut fd));

    // 2 base + 2 per same-faction neighbor on each side.
    assert_eq!(fd.unit(def).hp, 4);
}

#[test]
fn test_legion_with_one_neighbor_against_armor() {
    let cmd = commander_card(1, 50);
    let legionnaire =
        assault_card(2, 5, 10, 0).with_skill(SkillSpec::new(Skill::Legion, 2));
    let grunt = assault_card(3, 1, 10, 0);
    let armored = assault_card(4, 0, 10, 0)
        .with_skill(SkillSpec::new(Skill::Armor, 1));
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &grunt);
    place_assault(&mut fd, 0, &legionnaire);
    place_assault(&mut fd, 1, &armored);
    let def = place_assault(&mut fd, 1, &armored);

    fd.current_ci = 1;
    assert!(attack_phase(&mut fd));

    // (5 + 2) - 1 armor = 6.
    assert_eq!(fd.unit(def).hp, 4);
}

#[test]
fn test_counter_hits_back_through_enfeeble() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 4, 10, 0);
    let defender_card =
        assault_card(3, 0, 10, 0).with_skill(SkillSpec::new(Skill::Counter, 3));
    let mut fd = empty_field(&cmd, &cmd);
    let att = place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);
    fd.unit_mut(att).enfeebled = 1;

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));

    // Defender takes 4 + 1 enfeeble; attacker takes counter 3 + 1 enfeeble.
    assert_eq!(fd.unit(def).hp, 5);
    assert_eq!(fd.unit(att).hp, 6);
}

#[test]
fn test_poison_and_inhibit_only_raise() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 1, 10, 0)
        .with_skill(SkillSpec::new(Skill::Poison, 2))
        .with_skill(SkillSpec::new(Skill::Inhibit, 2));
    let defender_card = assault_card(3, 0, 20, 0);
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);
    fd.unit_mut(def).poisoned = 3;
    fd.unit_mut(def).inhibited = 3;

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.unit(def).poisoned, 3);
    assert_eq!(fd.unit(def).inhibited, 3);

    fd.unit_mut(def).poisoned = 1;
    fd.unit_mut(def).inhibited = 1;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.unit(def).poisoned, 2);
    assert_eq!(fd.unit(def).inhibited, 2);
}

#[test]
fn test_berserk_raises_attack_after_damage() {
    let cmd = commander_card(1, 50);
    let attacker_card =
        assault_card(2, 3, 10, 0).with_skill(SkillSpec::new(Skill::Berserk, 2));
    let defender_card = assault_card(3, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let att = place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));

    assert_eq!(fd.unit(def).hp, 7);
    assert_eq!(fd.unit(att).attack, 5);
}

#[test]
fn test_leech_heals_up_to_damage_dealt() {
    let cmd = commander_card(1, 50);
    let attacker_card =
        assault_card(2, 3, 10, 0).with_skill(SkillSpec::new(Skill::Leech, 5));
    let defender_card = assault_card(3, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let att = place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);
    fd.unit_mut(att).hp = 4;

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));

    assert_eq!(fd.unit(def).hp, 7);
    // Leech is capped by the damage dealt, not its own magnitude.
    assert_eq!(fd.unit(att).hp, 7);
}

#[test]
fn test_corrosion_only_ratchets_upward() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 2, 10, 0);
    let defender_card =
        assault_card(3, 0, 20, 0).with_skill(SkillSpec::new(Skill::Corrosive, 3));
    let mut fd = empty_field(&cmd, &cmd);
    let att = place_assault(&mut fd, 0, &attacker_card);
    place_assault(&mut fd, 1, &defender_card);
    fd.unit_mut(att).corroded_rate = 4;

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.unit(att).corroded_rate, 4);

    fd.unit_mut(att).corroded_rate = 1;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.unit(att).corroded_rate, 3);
}

#[test]
fn test_wall_intercepts_commander_attack() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 4, 10, 0);
    let wall_card =
        structure_card(3, 10, 0).with_skill(SkillSpec::new(Skill::Wall, 1));
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);
    let wall = place_structure(&mut fd, 1, &wall_card);

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));

    assert_eq!(fd.unit(wall).hp, 6);
    assert_eq!(fd.players[1].commander.hp, 50);
}

#[test]
fn test_unblocked_attack_hits_commander() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 4, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.players[1].commander.hp, 46);
    assert!(!fd.end);
}

#[test]
fn test_commander_kill_ends_battle() {
    let cmd = commander_card(1, 3);
    let attacker_card = assault_card(2, 100, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.players[1].commander.hp, 0);
    assert!(fd.end);
}

#[test]
fn test_damage_saturates_at_zero_hp() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 100, 10, 0);
    let defender_card = assault_card(3, 0, 5, 0);
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));
    assert_eq!(fd.unit(def).hp, 0);
    assert!(!fd.unit(def).is_alive());
}

#[test]
fn test_swipe_splashes_blocker_neighbors() {
    let cmd = commander_card(1, 50);
    let attacker_card =
        assault_card(2, 3, 10, 0).with_skill(SkillSpec::new(Skill::Swipe, 2));
    let defender_card = assault_card(3, 0, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    place_assault(&mut fd, 0, &attacker_card);
    let def = place_assault(&mut fd, 1, &defender_card);
    let right = place_assault(&mut fd, 1, &defender_card);
    let far = place_assault(&mut fd, 1, &defender_card);

    fd.current_ci = 0;
    assert!(attack_phase(&mut fd));

    assert_eq!(fd.unit(def).hp, 7);
    assert_eq!(fd.unit(right).hp, 8);
    assert_eq!(fd.unit(far).hp, 10);
}

#[test]
fn test_zeroed_attacker_stands_down() {
    let cmd = commander_card(1, 50);
    let attacker_card = assault_card(2, 3, 10, 0);
    let mut fd = empty_field(&cmd, &cmd);
    let att = place_assault(&mut fd, 0, &attacker_card);
    fd.unit_mut(att).weakened = 3;

    fd.current_ci = 0;
    assert!(!attack_phase(&mut fd));
    assert_eq!(fd.players[1].commander.hp, 50);
}

#[test]
fn test_rally_and_weaken_shift_attack_power() {
    let card = assault_card(2, 4, 10, 0);
    let mut status = CardStatus::new(&card);
    status.rallied = 3;
    status.weakened = 2;
    assert_eq!(status.attack_power(), 5);
    status.derallied = 1;
    assert_eq!(status.attack_power(), 4);
    status.weakened = 10;
    assert_eq!(status.attack_power(), 2);
}
