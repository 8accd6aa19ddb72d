//! The attack-damage pipeline for one assault attack.

use log::debug;

use crate::field::{Field, UnitRef};
use crate::skills::{prepend_on_death, remove_commander_hp, remove_hp, resolve_skill};
use crate::types::{CardType, PassiveBge, QuestType, Skill};

/// Counter damage dealt to the attacker by the defender.
fn counter_damage(fd: &Field, att: UnitRef, def: UnitRef) -> u32 {
    debug_assert!(fd.card(att).card_type == CardType::Assault);
    let att_status = fd.unit(att);
    (fd.unit(def).skill(Skill::Counter) + att_status.enfeebled)
        .saturating_sub(att_status.protected_value())
}

/// First living enemy structure with Wall, if any. Walls intercept attacks
/// aimed at the commander.
fn select_first_enemy_wall(fd: &Field) -> Option<UnitRef> {
    for (index, status) in fd.tip().structures.iter().enumerate() {
        if status.has_skill(Skill::Wall) && status.is_alive() {
            return Some(UnitRef::structure(fd.tipi, index));
        }
    }
    None
}

fn alive_assault(fd: &Field, player: usize, index: usize) -> bool {
    fd.players[player].assaults.len() > index
        && fd.players[player].assaults[index].is_alive()
}

/// One attack by `att` against `def`, start to finish.
///
/// Order: modify damage, deal it (with on-death processing), then the
/// damage-dependent aftermath in fixed order: poison/inhibit, counter (and
/// Counterflux), corrosion, berserk (and EnduringRage), leech, Heroism valor.
/// Returns the damage dealt.
fn perform_attack(fd: &mut Field, att: UnitRef, def: UnitRef) -> u32 {
    let def_cardtype = fd.card(def).card_type;
    let pre_modifier_dmg = fd.unit(att).attack_power();

    let att_dmg = modify_attack_damage(fd, att, def, pre_modifier_dmg);
    if att_dmg == 0 {
        return 0;
    }

    // deal damage
    if def_cardtype == CardType::Commander {
        let def_player = fd.unit(def).player;
        remove_commander_hp(fd, def_player, att_dmg);
    } else {
        remove_hp(fd, def, att_dmg);
        prepend_on_death(fd);
        resolve_skill(fd);
    }
    if fd.end {
        return att_dmg;
    }

    // poison / inhibit, assault defenders only, raise-only
    if def_cardtype == CardType::Assault {
        let poison_value = fd
            .unit(att)
            .skill(Skill::Poison)
            .max(fd.unit(att).skill(Skill::Venom));
        if poison_value > fd.unit(def).poisoned {
            if fd.unit(att).player == 0 {
                fd.inc_counter(QuestType::SkillUse, Skill::Poison.index() as u32, 0, 1);
            }
            debug!(
                "{} poisons {} by {}",
                fd.unit(att).description(),
                fd.unit(def).description(),
                poison_value
            );
            fd.unit_mut(def).poisoned = poison_value;
        }
        let inhibit_value = fd.unit(att).skill(Skill::Inhibit);
        if inhibit_value > fd.unit(def).inhibited {
            debug!(
                "{} inhibits {} by {}",
                fd.unit(att).description(),
                fd.unit(def).description(),
                inhibit_value
            );
            fd.unit_mut(def).inhibited = inhibit_value;
        }
    }

    // counter
    if fd.unit(att).is_alive() && fd.unit(def).has_skill(Skill::Counter) {
        let counter_dmg = counter_damage(fd, att, def);
        if fd.unit(def).player == 0 {
            fd.inc_counter(QuestType::SkillUse, Skill::Counter.index() as u32, 0, 1);
            fd.inc_counter(QuestType::SkillDamage, Skill::Counter.index() as u32, 0, counter_dmg);
        }
        debug!(
            "{} takes {} counter damage from {}",
            fd.unit(att).description(),
            counter_dmg,
            fd.unit(def).description()
        );
        remove_hp(fd, att, counter_dmg);
        prepend_on_death(fd);
        resolve_skill(fd);
        if def_cardtype == CardType::Assault
            && fd.unit(def).is_alive()
            && fd.has_bge(PassiveBge::Counterflux)
        {
            let configured = fd.bge(PassiveBge::Counterflux).unwrap_or(0);
            let flux_denominator = if configured > 0 { configured } else { 4 };
            let flux_value = (fd.unit(def).skill(Skill::Counter) - 1) / flux_denominator + 1;
            debug!(
                "Counterflux: {} heals itself and berserks for {}",
                fd.unit(def).description(),
                flux_value
            );
            let def_status = fd.unit_mut(def);
            def_status.add_hp(flux_value);
            if !def_status.sundered {
                def_status.attack += flux_value;
            }
        }
    }

    // corrosion only ratchets upward
    let corrosive_value = fd.unit(def).skill(Skill::Corrosive);
    if fd.unit(att).is_alive() && corrosive_value > fd.unit(att).corroded_rate {
        debug!(
            "{} corrodes {} by {}",
            fd.unit(def).description(),
            fd.unit(att).description(),
            corrosive_value
        );
        fd.unit_mut(att).corroded_rate = corrosive_value;
    }

    // berserk
    let berserk_value = fd.unit(att).skill(Skill::Berserk);
    if fd.unit(att).is_alive() && !fd.unit(att).sundered && berserk_value > 0 {
        fd.unit_mut(att).attack += berserk_value;
        if fd.unit(att).player == 0 {
            fd.inc_counter(QuestType::SkillUse, Skill::Berserk.index() as u32, 0, 1);
        }
        if fd.has_bge(PassiveBge::EnduringRage) {
            let configured = fd.bge(PassiveBge::EnduringRage).unwrap_or(0);
            let bge_denominator = if configured > 0 { configured } else { 2 };
            let bge_value = (berserk_value - 1) / bge_denominator + 1;
            debug!(
                "EnduringRage: {} heals and protects itself for {}",
                fd.unit(att).description(),
                bge_value
            );
            let att_status = fd.unit_mut(att);
            att_status.add_hp(bge_value);
            att_status.protected += bge_value;
        }
    }

    // leech, only when the defender was an assault
    if def_cardtype == CardType::Assault {
        let leech_value = att_dmg.min(fd.unit(att).skill(Skill::Leech));
        if leech_value > 0 && fd.unit(att).can_be_healed() {
            if fd.unit(att).player == 0 {
                fd.inc_counter(QuestType::SkillUse, Skill::Leech.index() as u32, 0, 1);
            }
            debug!("{} leeches {} health", fd.unit(att).description(), leech_value);
            fd.unit_mut(att).add_hp(leech_value);
        }
    }

    // Heroism: valor triggers again on a killing blow
    let valor_value = fd.unit(att).skill(Skill::Valor);
    if valor_value > 0
        && !fd.unit(att).sundered
        && fd.has_bge(PassiveBge::Heroism)
        && def_cardtype == CardType::Assault
        && fd.unit(def).hp == 0
    {
        debug!("Heroism: {} gains {} attack", fd.unit(att).description(), valor_value);
        fd.unit_mut(att).attack += valor_value;
    }

    att_dmg
}

/// Damage modification: additive bonuses (Legion, Rupture, Venom, Bloodlust,
/// Enfeeble) unless the attacker is sundered, then mitigation (armor with
/// Fortification sharing, plus Protect, reduced by Pierce + Rupture),
/// saturating at zero.
fn modify_attack_damage(fd: &mut Field, att: UnitRef, def: UnitRef, pre_modifier_dmg: u32) -> u32 {
    debug_assert!(fd.card(att).card_type == CardType::Assault);
    let mut att_dmg = pre_modifier_dmg;
    if att_dmg == 0 {
        return 0;
    }
    let mut legion_value = 0;
    if !fd.unit(att).sundered {
        let legion_base = fd.unit(att).skill(Skill::Legion);
        if legion_base > 0 {
            let att_status = fd.unit(att);
            let att_player = att_status.player;
            let att_index = att_status.index;
            let att_faction = att_status.faction;
            let assaults = &fd.players[att_player].assaults;
            let mut neighbors = 0;
            if att_index > 0 {
                let left = &assaults[att_index - 1];
                if left.is_alive() && left.faction == att_faction {
                    neighbors += 1;
                }
            }
            if att_index + 1 < assaults.len() {
                let right = &assaults[att_index + 1];
                if right.is_alive() && right.faction == att_faction {
                    neighbors += 1;
                }
            }
            if neighbors > 0 && fd.unit(att).is_active() {
                legion_value = neighbors * legion_base;
                att_dmg += legion_value;
            }
        }
        let rupture_value = fd.unit(att).skill(Skill::Rupture);
        att_dmg += rupture_value;
        let venom_value = fd.unit(att).skill(Skill::Venom);
        if venom_value > 0 && fd.unit(def).poisoned > 0 {
            att_dmg += venom_value;
        }
        att_dmg += fd.bloodlust_value;
        att_dmg += fd.unit(def).enfeebled;
    }
    // prevent damage
    let mut armor_value = fd.unit(def).skill(Skill::Armor);
    if fd.card(def).card_type == CardType::Assault && fd.has_bge(PassiveBge::Fortification) {
        for adj in fd.adjacent_assaults(def) {
            armor_value = armor_value.max(fd.unit(adj).skill(Skill::Armor));
        }
    }
    let mut reduced_dmg = armor_value + fd.unit(def).protected_value();
    let pierce_value = fd.unit(att).skill(Skill::Pierce) + fd.unit(att).skill(Skill::Rupture);
    if reduced_dmg > 0 && pierce_value > 0 {
        reduced_dmg = reduced_dmg.saturating_sub(pierce_value);
    }
    att_dmg = att_dmg.saturating_sub(reduced_dmg);
    debug!(
        "{} attacks {} for {} ({} base) damage",
        fd.unit(att).description(),
        fd.unit(def).description(),
        att_dmg,
        pre_modifier_dmg
    );
    if legion_value > 0 && fd.unit(att).can_be_healed() && fd.has_bge(PassiveBge::Brigade) {
        debug!("Brigade: {} heals itself for {}", fd.unit(att).description(), legion_value);
        fd.unit_mut(att).add_hp(legion_value);
    }
    att_dmg
}

/// Attack aimed at the enemy commander, intercepted by the first wall.
fn attack_commander(fd: &mut Field, att: UnitRef) -> u32 {
    match select_first_enemy_wall(fd) {
        Some(wall) => perform_attack(fd, att, wall),
        None => {
            let commander = UnitRef::commander(fd.tipi);
            perform_attack(fd, att, commander)
        }
    }
}

/// The attack of the assault currently being evaluated. Returns whether an
/// attack actually happened (zeroed attackers stand down).
pub(crate) fn attack_phase(fd: &mut Field) -> bool {
    let att = UnitRef::assault(fd.tapi, fd.current_ci);
    if fd.unit(att).attack_power() == 0 {
        debug!("{} cannot attack (zeroed)", fd.unit(att).description());
        return false;
    }

    let att_dmg;
    if alive_assault(fd, fd.tipi, fd.current_ci) {
        let def = UnitRef::assault(fd.tipi, fd.current_ci);
        att_dmg = perform_attack(fd, att, def);
        // Swipe splashes the blocker's neighbors, honoring the blocker's
        // enfeeble and protection.
        let swipe_value = fd.unit(att).skill(Skill::Swipe);
        if swipe_value > 0 {
            for adj in fd.adjacent_assaults(def) {
                let def_status = fd.unit(def);
                let swipe_dmg = (swipe_value + def_status.enfeebled)
                    .saturating_sub(def_status.protected_value());
                debug!(
                    "{} swipes {} for {} damage",
                    fd.unit(att).description(),
                    fd.unit(adj).description(),
                    swipe_dmg
                );
                remove_hp(fd, adj, swipe_dmg);
            }
            prepend_on_death(fd);
            resolve_skill(fd);
        }
    } else {
        // might be blocked by walls
        att_dmg = attack_commander(fd, att);
    }

    if att_dmg > 0 && !fd.assault_bloodlusted {
        if let Some(bloodlust_value) = fd.bge(PassiveBge::Bloodlust) {
            fd.bloodlust_value += bloodlust_value;
            fd.assault_bloodlusted = true;
        }
    }

    true
}
