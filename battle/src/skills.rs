//! Skill resolution: the queue, targeting, activation handlers and the
//! on-death prepend pass.

use log::{debug, trace};

use crate::attack::attack_phase;
use crate::field::{opponent, Field, Slot, UnitRef};
use crate::types::{
    CardStep, CardType, Faction, PassiveBge, QuestType, Skill, SkillFamily, SkillSpec,
};

/// Re-target a spec through an Evolve offset.
fn apply_evolve(s: &SkillSpec, offset: i32) -> SkillSpec {
    let mut evolved = s.clone();
    evolved.id = evolved.id.offset_by(offset);
    evolved
}

/// Raise a spec's magnitude by an Enhance bonus.
fn apply_enhance(s: &SkillSpec, enhanced_value: u32) -> SkillSpec {
    let mut enhanced = s.clone();
    enhanced.x += enhanced_value;
    enhanced
}

/// Lose health, with all the bookkeeping a death entails: quest credit,
/// the kill queue for on-death effects, and VIP loss.
pub(crate) fn remove_hp(fd: &mut Field, r: UnitRef, dmg: u32) {
    debug_assert!(fd.unit(r).is_alive());
    trace!("{} takes {} damage", fd.unit(r).description(), dmg);
    let status = fd.unit_mut(r);
    status.hp = status.hp.saturating_sub(dmg);
    if status.hp > 0 {
        return;
    }
    let player = status.player;
    let card_type = status.card.card_type;
    let faction = status.card.faction;
    let card_id = status.card.id;
    if player == 1 {
        if card_type == CardType::Assault {
            fd.inc_counter(QuestType::FactionAssaultCardKill, faction as u32, 0, 1);
        }
        fd.inc_counter(QuestType::TypeCardKill, card_type as u32, 0, 1);
    }
    debug!("{} dies", fd.unit(r).description());
    if card_type != CardType::Commander {
        fd.killed_units.push(r);
    }
    if player == 0 && fd.players[0].deck.vip_cards.contains(&card_id) {
        fd.players[0].commander.hp = 0;
        fd.end = true;
    }
}

/// Commander damage ends the battle at zero.
pub(crate) fn remove_commander_hp(fd: &mut Field, player: usize, dmg: u32) {
    let commander = &mut fd.players[player].commander;
    debug_assert!(commander.card.card_type == CardType::Commander);
    commander.hp = commander.hp.saturating_sub(dmg);
    if commander.hp == 0 {
        debug!("{} dies", fd.players[player].commander.description());
        fd.end = true;
    }
}

/// On-death effects for everything in the kill queue, prepended to the skill
/// queue so they resolve before whatever triggered them continues.
///
/// Avenge boosts neighbors directly. Virulence spreads a dead unit's poison
/// left, and a contiguous run of deaths stacks its poison onto the survivor
/// on the right. The Revenge effect queues a Heal-all and Rally-all cast by
/// the dead unit's commander.
pub(crate) fn prepend_on_death(fd: &mut Field) {
    if fd.killed_units.is_empty() {
        return;
    }
    let mut od_skills: Vec<(UnitRef, SkillSpec)> = Vec::new();
    let assaults_player = fd.killed_units[0].player;
    let mut stacked_poison_value: u32 = 0;
    let mut last_index: Option<usize> = None;
    let mut left_virulence_victim: Option<UnitRef> = None;
    let killed: Vec<UnitRef> = std::mem::take(&mut fd.killed_units);
    for status_ref in &killed {
        let status_ref = *status_ref;
        if let Slot::Assault(dead_index) = status_ref.slot {
            // Avenge
            for adj in fd.adjacent_assaults(status_ref) {
                let avenge_value = fd.unit(adj).skill(Skill::Avenge);
                if avenge_value > 0 {
                    debug!("{} activates Avenge {}", fd.unit(adj).description(), avenge_value);
                    let adj_status = fd.unit_mut(adj);
                    if !adj_status.sundered {
                        adj_status.attack += avenge_value;
                    }
                    adj_status.max_hp += avenge_value;
                    adj_status.hp += avenge_value;
                }
            }
            // Virulence
            if fd.has_bge(PassiveBge::Virulence) {
                if last_index.map_or(true, |last| dead_index != last + 1) {
                    stacked_poison_value = 0;
                    left_virulence_victim = None;
                    if dead_index > 0 {
                        let left = UnitRef::assault(assaults_player, dead_index - 1);
                        if fd.unit(left).is_alive() {
                            left_virulence_victim = Some(left);
                        }
                    }
                }
                let poisoned = fd.unit(status_ref).poisoned;
                if poisoned > 0 {
                    if let Some(victim) = left_virulence_victim {
                        debug!(
                            "Virulence: {} spreads left poison +{} to {}",
                            fd.unit(status_ref).description(),
                            poisoned,
                            fd.unit(victim).description()
                        );
                        fd.unit_mut(victim).poisoned += poisoned;
                    }
                    stacked_poison_value += poisoned;
                }
                if dead_index + 1 < fd.players[assaults_player].assaults.len() {
                    let right = UnitRef::assault(assaults_player, dead_index + 1);
                    if fd.unit(right).is_alive() {
                        debug!(
                            "Virulence: spreads stacked poison +{} to {}",
                            stacked_poison_value,
                            fd.unit(right).description()
                        );
                        fd.unit_mut(right).poisoned += stacked_poison_value;
                    }
                }
                last_index = Some(dead_index);
            }
        }
        // Revenge
        if let Some(revenge_value) = fd.bge(PassiveBge::Revenge) {
            let mut ss_heal = SkillSpec::new(Skill::Heal, revenge_value);
            ss_heal.all = true;
            let mut ss_rally = SkillSpec::new(Skill::Rally, revenge_value);
            ss_rally.all = true;
            let commander = UnitRef::commander(status_ref.player);
            od_skills.push((commander, ss_heal));
            od_skills.push((commander, ss_rally));
        }
    }
    for entry in od_skills.into_iter().rev() {
        fd.skill_queue.push_front(entry);
    }
}

/// Drain the skill queue, dispatching each entry through the caster's Evolve
/// offsets and Enhance bonuses. Jammed and dead casters forfeit their queued
/// skills.
pub(crate) fn resolve_skill(fd: &mut Field) {
    while let Some((src, ss)) = fd.skill_queue.pop_front() {
        {
            let status = fd.unit(src);
            if status.jammed {
                trace!("{} is jammed and forfeits {:?}", status.description(), ss.id);
                continue;
            }
            if !status.is_alive() {
                trace!("{} is dead and forfeits {:?}", status.description(), ss.id);
                continue;
            }
        }
        let evolved_offset = fd.unit(src).evolved_skill_offset[ss.id.index()];
        let evolved_s = if evolved_offset != 0 { apply_evolve(&ss, evolved_offset) } else { ss };
        let enhanced_value = fd.unit(src).enhanced(evolved_s.id);
        let modified_s =
            if enhanced_value > 0 { apply_enhance(&evolved_s, enhanced_value) } else { evolved_s };
        match modified_s.id.family() {
            Some(SkillFamily::TargetedAllied) => perform_targeted_allied(fd, src, &modified_s),
            Some(SkillFamily::TargetedHostile) => perform_targeted_hostile(fd, src, &modified_s),
            Some(SkillFamily::Rush) => perform_rush(fd, src, &modified_s),
            None => unreachable!("non-activation skill {:?} dispatched", modified_s.id),
        }
    }
}

/// Run one unit's turn: queue each off-cooldown activation skill, attack if
/// it is an assault, and repeat the whole action for Flurry.
pub(crate) fn evaluate_skills(fd: &mut Field, r: UnitRef, mut attacked: Option<&mut bool>) {
    let card = fd.card(r);
    let is_assault = card.card_type == CardType::Assault;
    let skills = &card.skills;
    let mut num_actions: u32 = 1;
    let mut action_index: u32 = 0;
    while action_index < num_actions {
        debug_assert!(fd.skill_queue.is_empty());
        for ss in skills {
            if ss.id.family().is_none() {
                continue;
            }
            if fd.unit(r).skill_cd[ss.id.index()] > 0 {
                continue;
            }
            trace!("evaluating {} skill {:?}", fd.unit(r).description(), ss.id);
            fd.skill_queue.push_back((r, ss.clone()));
            resolve_skill(fd);
            if fd.end {
                break;
            }
        }
        if is_assault {
            if fd.unit(r).can_act() {
                if attack_phase(fd) {
                    if let Some(flag) = attacked.as_deref_mut() {
                        if !*flag {
                            *flag = true;
                            if fd.end {
                                break;
                            }
                        }
                    }
                }
            } else {
                trace!("{} cannot attack", fd.unit(r).description());
            }
        }
        // Flurry
        let flurry_ready = {
            let status = fd.unit(r);
            status.can_act()
                && fd.tip().commander.is_alive()
                && status.has_skill(Skill::Flurry)
                && status.skill_cd[Skill::Flurry.index()] == 0
        };
        if flurry_ready {
            if fd.unit(r).player == 0 {
                fd.inc_counter(QuestType::SkillUse, Skill::Flurry.index() as u32, 0, 1);
            }
            let flurry_value = fd.unit(r).skill_base_value(Skill::Flurry);
            debug!("{} activates Flurry x {}", fd.unit(r).description(), flurry_value);
            num_actions += flurry_value;
            for ss in skills {
                let evolved_id = ss.id.offset_by(fd.unit(r).evolved_skill_offset[ss.id.index()]);
                if evolved_id == Skill::Flurry {
                    fd.unit_mut(r).skill_cd[ss.id.index()] = ss.c;
                }
            }
        }
        action_index += 1;
    }
}

/// Valor fires when the unit becomes active and its direct blocker is alive
/// and hits harder than it does.
pub(crate) fn check_and_perform_valor(fd: &mut Field, src: UnitRef) -> bool {
    let (valor_value, sundered, player, index, own_power) = {
        let status = fd.unit(src);
        (
            status.skill(Skill::Valor),
            status.sundered,
            status.player,
            status.index,
            status.attack_power(),
        )
    };
    if valor_value == 0 || sundered {
        return false;
    }
    let opp = opponent(player);
    if fd.players[opp].assaults.len() <= index {
        debug!("{} loses Valor (no blocker)", fd.unit(src).description());
        return false;
    }
    let blocker = UnitRef::assault(opp, index);
    let blocker_status = fd.unit(blocker);
    if !blocker_status.is_alive() {
        debug!("{} loses Valor (no blocker)", fd.unit(src).description());
        return false;
    }
    if blocker_status.attack_power() <= own_power {
        debug!(
            "{} loses Valor (weak blocker {})",
            fd.unit(src).description(),
            blocker_status.description()
        );
        return false;
    }
    if player == 0 {
        fd.inc_counter(QuestType::SkillUse, Skill::Valor.index() as u32, 0, 1);
    }
    debug!("{} activates Valor {}", fd.unit(src).description(), valor_value);
    fd.unit_mut(src).attack += valor_value;
    true
}

// ---------------------------------------------------------------------------
// Targeting

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetPool {
    HostileAssaults,
    AlliedAssaults,
    HostileStructures,
}

fn target_pool(id: Skill) -> TargetPool {
    match id {
        Skill::Enfeeble | Skill::Jam | Skill::Strike | Skill::Sunder | Skill::Weaken => {
            TargetPool::HostileAssaults
        }
        Skill::Enhance
        | Skill::Evolve
        | Skill::Heal
        | Skill::Mend
        | Skill::Overload
        | Skill::Protect
        | Skill::Rally
        | Skill::Enrage
        | Skill::Rush => TargetPool::AlliedAssaults,
        Skill::Siege => TargetPool::HostileStructures,
        _ => unreachable!("skill {id:?} has no target pool"),
    }
}

/// Per-skill target legality, beyond being in the right pool.
fn skill_predicate(fd: &Field, src: UnitRef, dst: UnitRef, s: &SkillSpec) -> bool {
    let d = fd.unit(dst);
    match s.id {
        Skill::Enhance => d.has_skill(s.s) && (!s.s.is_activation() || d.is_active()),
        Skill::Evolve => {
            d.has_skill(s.s)
                && !d.has_skill(s.s2)
                && (!s.s2.is_activation() || d.is_active())
        }
        Skill::Heal | Skill::Mend => d.can_be_healed(),
        Skill::Jam => d.is_active_next_turn(),
        Skill::Overload => overload_predicate(fd, dst),
        Skill::Rally => {
            !d.sundered
                && if fd.tapi == d.player {
                    d.is_active() && !d.has_attacked()
                } else {
                    d.is_active_next_turn()
                }
        }
        Skill::Enrage => d.is_active() && d.step == CardStep::None && d.attack_power() > 0,
        Skill::Rush => {
            let src_status = fd.unit(src);
            let min_delay = if src_status.card.card_type == CardType::Assault
                && d.index < src_status.index
            {
                2
            } else {
                1
            };
            !src_status.rush_attempted && d.delay >= min_delay
        }
        Skill::Weaken | Skill::Sunder => d.attack_power() > 0 && d.is_active_next_turn(),
        _ => d.is_alive(),
    }
}

/// Overload only has a point on a unit that still has something to overload:
/// a pending harmful skill, or a helpful one that inhibition could block.
fn overload_predicate(fd: &Field, dst: UnitRef) -> bool {
    let d = fd.unit(dst);
    if d.overloaded || d.has_attacked() || !d.is_active() {
        return false;
    }
    let has_inhibited_unit = fd.players[d.player]
        .assaults
        .iter()
        .any(|c| c.is_alive() && c.inhibited > 0);
    for ss in &d.card.skills {
        if d.skill_cd[ss.id.index()] > 0 {
            continue;
        }
        let evolved_id = ss.id.offset_by(d.evolved_skill_offset[ss.id.index()]);
        if evolved_id.is_activation_harmful() {
            return true;
        }
        if has_inhibited_unit && evolved_id != Skill::Mend && evolved_id.is_activation_helpful() {
            return true;
        }
    }
    false
}

/// Fill the selection buffer with every legal candidate, in slot order.
fn select_fast(fd: &mut Field, src: UnitRef, pool: TargetPool, s: &SkillSpec) -> usize {
    let mut selection = std::mem::take(&mut fd.selection);
    selection.clear();
    if s.id == Skill::Mend {
        // Mend only ever reaches the caster's neighbors.
        for adj in fd.adjacent_assaults(src) {
            if skill_predicate(fd, src, adj, s) {
                selection.push(adj);
            }
        }
        let count = selection.len();
        fd.selection = selection;
        return count;
    }
    let src_player = fd.unit(src).player;
    let (pool_player, structures) = match pool {
        TargetPool::HostileAssaults => (opponent(src_player), false),
        TargetPool::AlliedAssaults => (src_player, false),
        TargetPool::HostileStructures => (opponent(src_player), true),
    };
    let ignore_faction = s.y == Faction::AllFactions || fd.has_bge(PassiveBge::Metamorphosis);
    let count = if structures {
        fd.players[pool_player].structures.len()
    } else {
        fd.players[pool_player].assaults.len()
    };
    for index in 0..count {
        let candidate = if structures {
            UnitRef::structure(pool_player, index)
        } else {
            UnitRef::assault(pool_player, index)
        };
        let faction_ok = ignore_faction || {
            let f = fd.unit(candidate).faction;
            f == s.y || f == Faction::Progenitor
        };
        if faction_ok && skill_predicate(fd, src, candidate, s) {
            selection.push(candidate);
        }
    }
    let count = selection.len();
    fd.selection = selection;
    count
}

/// Select the skill's targets into the field's selection buffer.
///
/// Mortar tries enemy structures first and falls back to enemy assaults.
/// Unless the spec targets everything, `n` targets are sampled by partial
/// shuffle and then put back in slot order.
pub(crate) fn select_targets(fd: &mut Field, src: UnitRef, s: &SkillSpec) -> usize {
    let n_candidates = if s.id == Skill::Mortar {
        let n = select_fast(fd, src, TargetPool::HostileStructures, s);
        if n == 0 {
            select_fast(fd, src, TargetPool::HostileAssaults, s)
        } else {
            n
        }
    } else {
        select_fast(fd, src, target_pool(s.id), s)
    };
    if n_candidates == 0 {
        return 0;
    }
    let n_targets = if s.n > 0 { s.n as usize } else { 1 };
    if s.all || n_targets >= n_candidates || s.id == Skill::Mend {
        return n_candidates;
    }
    let mut selection = std::mem::take(&mut fd.selection);
    for i in 0..n_targets {
        let j = fd.rand(i, n_candidates - 1);
        selection.swap(i, j);
    }
    selection.truncate(n_targets);
    if n_targets > 1 {
        selection.sort_by_key(|r| fd.unit(*r).index);
    }
    fd.selection = selection;
    n_targets
}

// ---------------------------------------------------------------------------
// Performing

/// Apply one activation skill to one target, unconditionally.
pub(crate) fn perform_skill(fd: &mut Field, src: UnitRef, dst: UnitRef, s: &SkillSpec) {
    match s.id {
        Skill::Enfeeble => fd.unit_mut(dst).enfeebled += s.x,
        Skill::Enhance => {
            let dst_status = fd.unit_mut(dst);
            let slot =
                (s.s.index() as i32 + dst_status.primary_skill_offset[s.s.index()]) as usize;
            dst_status.enhanced_value[slot] += s.x;
        }
        Skill::Evolve => {
            // Swap the two skills' value slots and point the dispatch
            // offsets at each other; a second identical Evolve undoes it.
            let dst_status = fd.unit_mut(dst);
            let s1 = s.s.index() as i32;
            let s2 = s.s2.index() as i32;
            let primary_s1 = dst_status.primary_skill_offset[s1 as usize] + s1;
            let primary_s2 = dst_status.primary_skill_offset[s2 as usize] + s2;
            dst_status.primary_skill_offset[s1 as usize] = primary_s2 - s1;
            dst_status.primary_skill_offset[s2 as usize] = primary_s1 - s2;
            dst_status.evolved_skill_offset[primary_s1 as usize] = s2 - primary_s1;
            dst_status.evolved_skill_offset[primary_s2 as usize] = s1 - primary_s2;
        }
        Skill::Heal => {
            fd.unit_mut(dst).add_hp(s.x);
            if fd.card(src).card_type == CardType::Assault
                && fd.has_bge(PassiveBge::ZealotsPreservation)
            {
                let bge_value = (s.x + 1) / 2;
                debug!(
                    "Zealot's Preservation: {} Protect {} on {}",
                    fd.unit(src).description(),
                    bge_value,
                    fd.unit(dst).description()
                );
                fd.unit_mut(dst).protected += bge_value;
            }
        }
        Skill::Jam => fd.unit_mut(dst).jammed = true,
        Skill::Mend => fd.unit_mut(dst).add_hp(s.x),
        Skill::Mortar => {
            if fd.card(dst).card_type == CardType::Structure {
                remove_hp(fd, dst, s.x);
            } else {
                let protection =
                    if fd.unit(src).overloaded { 0 } else { fd.unit(dst).protected_value() };
                let strike_dmg =
                    ((s.x + 1) / 2 + fd.unit(dst).enfeebled).saturating_sub(protection);
                remove_hp(fd, dst, strike_dmg);
            }
        }
        Skill::Overload => fd.unit_mut(dst).overloaded = true,
        Skill::Protect => fd.unit_mut(dst).protected += s.x,
        Skill::Rally => fd.unit_mut(dst).rallied += s.x,
        Skill::Enrage => fd.unit_mut(dst).enraged += s.x,
        Skill::Rush => {
            let dst_status = fd.unit_mut(dst);
            dst_status.delay -= 1;
            if dst_status.delay == 0 {
                check_and_perform_valor(fd, dst);
            }
        }
        Skill::Siege => remove_hp(fd, dst, s.x),
        Skill::Strike => {
            let protection =
                if fd.unit(src).overloaded { 0 } else { fd.unit(dst).protected_value() };
            let strike_dmg = (s.x + fd.unit(dst).enfeebled).saturating_sub(protection);
            remove_hp(fd, dst, strike_dmg);
        }
        Skill::Weaken => perform_weaken(fd, dst, s.x),
        Skill::Sunder => {
            fd.unit_mut(dst).sundered = true;
            perform_weaken(fd, dst, s.x);
        }
        _ => unreachable!("skill {:?} cannot be performed", s.id),
    }
}

/// Weaken strips Rally first, then reduces attack, never past zero.
fn perform_weaken(fd: &mut Field, dst: UnitRef, x: u32) {
    let dst_status = fd.unit_mut(dst);
    let mut weaken_value = x;
    if dst_status.rallied > dst_status.derallied {
        let derally_value = weaken_value.min(dst_status.rallied - dst_status.derallied);
        dst_status.derallied += derally_value;
        weaken_value -= derally_value;
    }
    if weaken_value > 0 {
        let cap = dst_status.attack_power();
        dst_status.weakened += weaken_value.min(cap);
    }
}

/// Evade check plus perform plus cooldown bookkeeping. Returns whether the
/// skill actually landed.
pub(crate) fn check_and_perform_skill(
    fd: &mut Field,
    src: UnitRef,
    dst: UnitRef,
    s: &SkillSpec,
    is_evadable: bool,
    has_counted_quest: &mut bool,
) -> bool {
    if fd.unit(src).player == 0 && !*has_counted_quest {
        let dst_card_id = fd.card(dst).id;
        fd.inc_counter(QuestType::SkillUse, s.id.index() as u32, dst_card_id, 1);
        *has_counted_quest = true;
    }
    if is_evadable {
        let src_player = fd.unit(src).player;
        let dst_status = fd.unit(dst);
        if dst_status.evaded < dst_status.skill(Skill::Evade) && dst_status.player != src_player {
            fd.unit_mut(dst).evaded += 1;
            debug!(
                "{} {:?} on {} but it evades",
                fd.unit(src).description(),
                s.id,
                fd.unit(dst).description()
            );
            return false;
        }
    }
    debug!(
        "{} {:?} {} on {}",
        fd.unit(src).description(),
        s.id,
        s.x,
        fd.unit(dst).description()
    );
    perform_skill(fd, src, dst, s);
    if s.c > 0 {
        fd.unit_mut(src).skill_cd[s.id.index()] = s.c;
    }
    true
}

/// Helpful skill against the caster's own side. Inhibited targets absorb the
/// cast (unless the caster is overloaded); under the Divert effect each
/// absorbed cast is re-aimed at the defending side instead.
pub(crate) fn perform_targeted_allied(fd: &mut Field, src: UnitRef, s: &SkillSpec) {
    select_targets(fd, src, s);
    let targets: Vec<UnitRef> = fd.selection.clone();
    let mut num_inhibited: u32 = 0;
    let mut has_counted_quest = false;
    for dst in targets {
        let src_overloaded = fd.unit(src).overloaded;
        if fd.unit(dst).inhibited > 0 && (!src_overloaded || s.id == Skill::Mend) {
            debug!(
                "{} {:?} on {} but it is inhibited",
                fd.unit(src).description(),
                s.id,
                fd.unit(dst).description()
            );
            fd.unit_mut(dst).inhibited -= 1;
            num_inhibited += 1;
            continue;
        }
        check_and_perform_skill(fd, src, dst, s, false, &mut has_counted_quest);
    }
    if num_inhibited > 0 && fd.has_bge(PassiveBge::Divert) {
        let mut diverted_s = s.clone();
        diverted_s.y = Faction::AllFactions;
        diverted_s.n = 1;
        diverted_s.all = false;
        for _ in 0..num_inhibited {
            // Diverted casts are selected from the defending commander's
            // perspective, so they land on the opposing side.
            select_targets(fd, UnitRef::commander(fd.tipi), &diverted_s);
            let diverted_targets: Vec<UnitRef> = fd.selection.clone();
            for dst in diverted_targets {
                if fd.unit(dst).inhibited > 0 {
                    debug!(
                        "{} {:?} (diverted) on {} but it is inhibited",
                        fd.unit(src).description(),
                        diverted_s.id,
                        fd.unit(dst).description()
                    );
                    fd.unit_mut(dst).inhibited -= 1;
                    continue;
                }
                debug!(
                    "{} {:?} (diverted) on {}",
                    fd.unit(src).description(),
                    diverted_s.id,
                    fd.unit(dst).description()
                );
                perform_skill(fd, src, dst, &diverted_s);
            }
        }
    }
}

/// Rush is attempted once per unit per battle; commander-cast Rush (from
/// background skills) is exempt from the guard.
pub(crate) fn perform_rush(fd: &mut Field, src: UnitRef, s: &SkillSpec) {
    if fd.card(src).card_type == CardType::Commander {
        perform_targeted_allied(fd, src, s);
        return;
    }
    if fd.unit(src).rush_attempted {
        trace!("{} does not check Rush again", fd.unit(src).description());
        return;
    }
    debug!("{} attempts to activate Rush", fd.unit(src).description());
    perform_targeted_allied(fd, src, s);
    fd.unit_mut(src).rush_attempted = true;
}

/// Harmful skill against the defending side, with evasion, Payback/Revenge
/// retaliation, and the TurningTides rally on attack reduction.
pub(crate) fn perform_targeted_hostile(fd: &mut Field, src: UnitRef, s: &SkillSpec) {
    select_targets(fd, src, s);
    let targets: Vec<UnitRef> = fd.selection.clone();
    let mut paybackers: Vec<UnitRef> = Vec::new();
    let mut has_counted_quest = false;
    let has_turningtides =
        fd.has_bge(PassiveBge::TurningTides) && matches!(s.id, Skill::Weaken | Skill::Sunder);
    let mut turningtides_value: u32 = 0;

    let src_is_alive_assault = {
        let src_status = fd.unit(src);
        src_status.card.card_type == CardType::Assault && src_status.is_alive()
    };

    for dst in targets {
        let old_attack = if has_turningtides { fd.unit(dst).attack_power() } else { 0 };
        let src_overloaded = fd.unit(src).overloaded;
        if check_and_perform_skill(fd, src, dst, s, !src_overloaded, &mut has_counted_quest) {
            if has_turningtides {
                turningtides_value = turningtides_value
                    .max(old_attack.saturating_sub(fd.unit(dst).attack_power()));
            }
            // Retaliation budget: Payback + Revenge values, consumed once
            // per harmful cast answered. Only assault casters can be paid
            // back.
            let dst_status = fd.unit(dst);
            let payback_value =
                dst_status.skill(Skill::Payback) + dst_status.skill(Skill::Revenge);
            if dst_status.paybacked < payback_value && src_is_alive_assault {
                paybackers.push(dst);
            }
        }
    }

    if has_turningtides && turningtides_value > 0 {
        let mut ss_rally = SkillSpec::new(Skill::Rally, turningtides_value);
        ss_rally.all = s.all;
        debug!("TurningTides {}!", turningtides_value);
        let src_player = fd.unit(src).player;
        perform_targeted_allied(fd, UnitRef::commander(src_player), &ss_rally);
    }

    prepend_on_death(fd);

    for pb_status in paybackers {
        if has_turningtides {
            turningtides_value = 0;
        }
        if fd.unit(pb_status).skill(Skill::Revenge) > 0 {
            // Revenge echoes the skill at the caster's neighborhood: left,
            // the caster itself, then right.
            let mut revenged_count = 0;
            let candidates =
                [fd.left_assault(src), Some(src), fd.right_assault(src)];
            for target in candidates.into_iter().flatten() {
                if !skill_predicate(fd, target, target, s) {
                    continue;
                }
                if !fd.unit(target).is_alive() {
                    continue;
                }
                let old_attack =
                    if has_turningtides { fd.unit(target).attack_power() } else { 0 };
                debug!(
                    "{} Revenge {:?} on {}",
                    fd.unit(pb_status).description(),
                    s.id,
                    fd.unit(target).description()
                );
                perform_skill(fd, pb_status, target, s);
                revenged_count += 1;
                if has_turningtides {
                    turningtides_value = turningtides_value
                        .max(old_attack.saturating_sub(fd.unit(target).attack_power()));
                }
            }
            if revenged_count > 0 {
                fd.unit_mut(pb_status).paybacked += 1;
                if has_turningtides && turningtides_value > 0 {
                    let ss_rally = SkillSpec::new(Skill::Rally, turningtides_value);
                    debug!("Paybacked TurningTides {}!", turningtides_value);
                    let pb_player = fd.unit(pb_status).player;
                    perform_targeted_allied(fd, UnitRef::commander(pb_player), &ss_rally);
                }
            }
        } else {
            // Plain Payback mirrors the skill back at the caster.
            if !skill_predicate(fd, src, src, s) {
                continue;
            }
            if !fd.unit(src).is_alive() {
                continue;
            }
            let old_attack = if has_turningtides { fd.unit(src).attack_power() } else { 0 };
            debug!(
                "{} Payback {:?} on {}",
                fd.unit(pb_status).description(),
                s.id,
                fd.unit(src).description()
            );
            perform_skill(fd, pb_status, src, s);
            fd.unit_mut(pb_status).paybacked += 1;
            if has_turningtides {
                turningtides_value = turningtides_value
                    .max(old_attack.saturating_sub(fd.unit(src).attack_power()));
                if turningtides_value > 0 {
                    let ss_rally = SkillSpec::new(Skill::Rally, turningtides_value);
                    debug!("Paybacked TurningTides {}!", turningtides_value);
                    let pb_player = fd.unit(pb_status).player;
                    perform_targeted_allied(fd, UnitRef::commander(pb_player), &ss_rally);
                }
            }
        }
    }

    prepend_on_death(fd);
}
