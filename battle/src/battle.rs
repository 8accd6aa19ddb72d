//! The turn state machine, battle entry point and per-mode scoring.

use log::{debug, trace};

use crate::cards::Card;
use crate::deck::Deck;
use crate::error::{SimError, SimResult};
use crate::field::{opponent, Field, Hand, Phase, UnitRef};
use crate::rng::XorShiftRng;
use crate::skills::{
    check_and_perform_skill, check_and_perform_valor, evaluate_skills, perform_skill,
    prepend_on_death, remove_hp, resolve_skill, select_targets,
};
use crate::status::CardStatus;
use crate::types::{
    BattleConfig, CardStep, CardType, GameMode, PassiveBge, Quest, QuestType, Results, Skill,
    SkillSpec,
};

/// A configured battle, ready to run.
///
/// Construction validates the decks and quest, shuffles both decks with the
/// supplied RNG and builds the field; `run` plays the battle to completion.
pub struct Battle<'a> {
    field: Field<'a>,
}

impl<'a> Battle<'a> {
    pub fn new(
        attacker: Deck<'a>,
        defender: Deck<'a>,
        config: BattleConfig,
        rng: XorShiftRng,
    ) -> SimResult<Self> {
        let quest = match &config.quest {
            Some(quest) if quest.value == 0 => return Err(SimError::InvalidQuest),
            Some(quest) => quest.clone(),
            None => Quest::default(),
        };
        let mut rng = rng;
        let players = [
            Hand::new(attacker, &mut rng),
            Hand::new(defender, &mut rng),
        ];
        let field = Field {
            end: false,
            rng,
            players,
            tapi: 0,
            tipi: 1,
            turn: 1,
            turn_limit: config.turn_limit,
            gamemode: config.mode,
            optimization_mode: config.optimization,
            quest,
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
        };
        Ok(Battle { field })
    }

    /// Play the battle to completion and score it.
    pub fn run(&mut self) -> Results {
        play(&mut self.field)
    }

    pub fn field(&self) -> &Field<'a> {
        &self.field
    }
}

/// Put a drawn card onto the active player's board.
fn play_card<'a>(fd: &mut Field<'a>, card: &'a Card) {
    let player = fd.tapi;
    let mut status = CardStatus::new(card);
    status.player = player;
    let r = match card.card_type {
        CardType::Assault => {
            let assaults = &mut fd.players[player].assaults;
            status.index = assaults.len();
            assaults.push(status);
            UnitRef::assault(player, fd.players[player].assaults.len() - 1)
        }
        CardType::Structure => {
            let structures = &mut fd.players[player].structures;
            status.index = structures.len();
            structures.push(status);
            UnitRef::structure(player, fd.players[player].structures.len() - 1)
        }
        CardType::Commander => unreachable!("commander card #{} drawn from deck", card.id),
    };
    if player == 0 {
        if card.card_type == CardType::Assault {
            fd.inc_counter(QuestType::FactionAssaultCardUse, card.faction as u32, 0, 1);
        }
        fd.inc_counter(QuestType::TypeCardUse, card.card_type as u32, 0, 1);
    }
    debug!(
        "{} plays {}",
        fd.players[player].commander.description(),
        card.description()
    );
    if fd.unit(r).delay == 0 {
        check_and_perform_valor(fd, r);
    }
}

/// Turn upkeep: the active side re-indexes, ticks unit delays (Valor fires
/// the moment a unit becomes active) and skill cooldowns; the inactive side
/// only re-indexes.
fn turn_start_phase(fd: &mut Field) {
    cooldown_skills(&mut fd.players[fd.tapi].commander);
    let tapi = fd.tapi;
    for index in 0..fd.players[tapi].assaults.len() {
        fd.players[tapi].assaults[index].index = index;
        let r = UnitRef::assault(tapi, index);
        if fd.unit(r).delay > 0 {
            debug!("{} reduces its timer", fd.unit(r).description());
            let status = fd.unit_mut(r);
            status.delay -= 1;
            if status.delay == 0 {
                check_and_perform_valor(fd, r);
            }
        } else {
            cooldown_skills(&mut fd.players[tapi].assaults[index]);
        }
    }
    for index in 0..fd.players[tapi].structures.len() {
        let status = &mut fd.players[tapi].structures[index];
        status.index = index;
        if status.delay > 0 {
            debug!("{} reduces its timer", status.description());
            status.delay -= 1;
        } else {
            cooldown_skills(status);
        }
    }
    let tipi = fd.tipi;
    for (index, status) in fd.players[tipi].assaults.iter_mut().enumerate() {
        status.index = index;
    }
    for (index, status) in fd.players[tipi].structures.iter_mut().enumerate() {
        status.index = index;
    }
}

fn cooldown_skills(status: &mut CardStatus) {
    for ss in &status.card.skills {
        if status.skill_cd[ss.id.index()] > 0 {
            trace!(
                "{} reduces timer ({}) of skill {:?}",
                status.description(),
                status.skill_cd[ss.id.index()],
                ss.id
            );
            status.skill_cd[ss.id.index()] -= 1;
        }
    }
}

/// End-of-turn cleanup: expire the modifiers scoped to "until your next
/// turn", apply poison ticks, then flush deaths and compact the boards.
fn turn_end_phase(fd: &mut Field) {
    // Inactive player's assault cards
    for status in fd.players[fd.tipi].assaults.iter_mut() {
        if status.hp == 0 {
            continue;
        }
        status.enfeebled = 0;
        status.protected = 0;
        status.primary_skill_offset = [0; Skill::COUNT];
        status.evolved_skill_offset = [0; Skill::COUNT];
        status.enhanced_value = [0; Skill::COUNT];
        status.evaded = 0;
        status.paybacked = 0;
    }
    // Inactive player's structure cards
    for status in fd.players[fd.tipi].structures.iter_mut() {
        if status.hp == 0 {
            continue;
        }
        status.evaded = 0;
    }
    // Active player's assault cards
    let tapi = fd.tapi;
    for index in 0..fd.players[tapi].assaults.len() {
        let r = UnitRef::assault(tapi, index);
        if !fd.unit(r).is_alive() {
            continue;
        }
        let refresh_value = fd.unit(r).skill(Skill::Refresh);
        if refresh_value > 0 && fd.unit(r).can_be_healed() {
            debug!("{} refreshes {} health", fd.unit(r).description(), refresh_value);
            fd.unit_mut(r).add_hp(refresh_value);
        }
        if fd.unit(r).poisoned > 0 {
            let status = fd.unit(r);
            let poison_dmg =
                (status.poisoned + status.enfeebled).saturating_sub(status.protected_value());
            if poison_dmg > 0 {
                if fd.unit(r).player == 1 {
                    fd.inc_counter(
                        QuestType::SkillDamage,
                        Skill::Poison.index() as u32,
                        0,
                        poison_dmg,
                    );
                }
                debug!("{} takes poison damage {}", fd.unit(r).description(), poison_dmg);
                remove_hp(fd, r, poison_dmg);
            }
        }
        let status = fd.unit_mut(r);
        status.jammed = false;
        status.rallied = 0;
        status.enraged = 0;
        status.derallied = 0;
        status.sundered = false;
        status.weakened = 0;
        status.inhibited = 0;
        status.overloaded = false;
        status.step = CardStep::None;
    }

    prepend_on_death(fd);
    resolve_skill(fd);
    remove_dead(&mut fd.players[fd.tapi].assaults);
    remove_dead(&mut fd.players[fd.tapi].structures);
    remove_dead(&mut fd.players[fd.tipi].assaults);
    remove_dead(&mut fd.players[fd.tipi].structures);
}

fn remove_dead(storage: &mut Vec<CardStatus>) {
    storage.retain(|status| {
        if status.hp == 0 {
            debug!("dead and removed: {}", status.description());
            false
        } else {
            true
        }
    });
}

/// Heroism: the commander casts Protect (valor+1)/2 on each assault with
/// Valor, blockable by inhibition and divertable like any allied cast.
fn heroism_phase(fd: &mut Field) {
    let tapi = fd.tapi;
    let mut index = 0;
    while index < fd.players[tapi].assaults.len() {
        let dst = UnitRef::assault(tapi, index);
        index += 1;
        let bge_value = (fd.unit(dst).skill(Skill::Valor) + 1) / 2;
        if bge_value == 0 {
            continue;
        }
        let ss_protect = SkillSpec::new(Skill::Protect, bge_value);
        if fd.unit(dst).inhibited > 0 {
            debug!(
                "Heroism: Protect {} on {} but it is inhibited",
                bge_value,
                fd.unit(dst).description()
            );
            fd.unit_mut(dst).inhibited -= 1;
            if fd.has_bge(PassiveBge::Divert) {
                divert_protect(fd, &ss_protect);
            }
            continue;
        }
        let mut has_counted_quest = false;
        let commander = UnitRef::commander(tapi);
        check_and_perform_skill(fd, commander, dst, &ss_protect, false, &mut has_counted_quest);
    }
}

/// Diverted Heroism protect: one cast re-aimed at the opposing side,
/// selected from the defending commander's perspective.
fn divert_protect(fd: &mut Field, ss_protect: &SkillSpec) {
    let mut diverted_s = ss_protect.clone();
    diverted_s.y = crate::types::Faction::AllFactions;
    diverted_s.n = 1;
    diverted_s.all = false;
    let caster = UnitRef::commander(fd.tapi);
    let defender_commander = UnitRef::commander(fd.tipi);
    select_targets(fd, defender_commander, &diverted_s);
    let targets: Vec<UnitRef> = fd.selection.clone();
    for dst in targets {
        if fd.unit(dst).inhibited > 0 {
            debug!(
                "Heroism: Protect (diverted) on {} but it is inhibited",
                fd.unit(dst).description()
            );
            fd.unit_mut(dst).inhibited -= 1;
            continue;
        }
        debug!("Heroism: Protect (diverted) on {}", fd.unit(dst).description());
        perform_skill(fd, caster, dst, &diverted_s);
    }
}

/// Play one battle to the end and fold the outcome into a `Results`.
pub fn play(fd: &mut Field) -> Results {
    fd.players[0].commander.player = 0;
    fd.players[1].commander.player = 1;
    fd.tapi = if fd.gamemode == GameMode::Surge { 1 } else { 0 };
    fd.tipi = opponent(fd.tapi);
    fd.end = false;

    // Play fortresses for both players before the first turn.
    for _ in 0..2 {
        let forts: Vec<&Card> = fd.tap().deck.shuffled_forts.clone();
        for card in forts {
            play_card(fd, card);
        }
        std::mem::swap(&mut fd.tapi, &mut fd.tipi);
    }

    while fd.turn <= fd.turn_limit && !fd.end {
        fd.current_phase = Phase::PlayCard;
        debug!(
            "TURN {} begins for {}",
            fd.turn,
            fd.tap().commander.description()
        );
        turn_start_phase(fd);

        // Play a card
        if let Some(played_card) = fd.tap_mut().deck.next() {
            // Allegiance triggers on the play, before placement.
            for index in 0..fd.players[fd.tapi].assaults.len() {
                let r = UnitRef::assault(fd.tapi, index);
                let allegiance_value = fd.unit(r).skill(Skill::Allegiance);
                if allegiance_value > 0
                    && fd.unit(r).is_alive()
                    && fd.card(r).faction == played_card.faction
                {
                    debug!(
                        "{} activates Allegiance {}",
                        fd.unit(r).description(),
                        allegiance_value
                    );
                    let status = fd.unit_mut(r);
                    if !status.sundered {
                        status.attack += allegiance_value;
                    }
                    status.max_hp += allegiance_value;
                    status.hp += allegiance_value;
                }
            }
            play_card(fd, played_card);
        }
        if fd.end {
            break;
        }

        // Heroism protect casts
        if fd.has_bge(PassiveBge::Heroism) {
            heroism_phase(fd);
        }

        // Activation background skills, cast by the commander
        let bg_skills = fd.bg_skills[fd.tapi].clone();
        for bg_skill in bg_skills {
            trace!("evaluating background skill {:?}", bg_skill.id);
            fd.skill_queue
                .push_back((UnitRef::commander(fd.tapi), bg_skill));
            resolve_skill(fd);
        }
        if fd.end {
            break;
        }

        // Commander
        fd.current_phase = Phase::Commander;
        evaluate_skills(fd, UnitRef::commander(fd.tapi), None);
        if fd.end {
            break;
        }

        // Structures
        fd.current_phase = Phase::Structures;
        fd.current_ci = 0;
        while !fd.end && fd.current_ci < fd.tap().structures.len() {
            let r = UnitRef::structure(fd.tapi, fd.current_ci);
            if fd.unit(r).is_active() {
                evaluate_skills(fd, r, None);
            } else {
                trace!("{} cannot take action", fd.unit(r).description());
            }
            fd.current_ci += 1;
        }

        // Assaults
        fd.current_phase = Phase::Assaults;
        fd.bloodlust_value = 0;
        fd.current_ci = 0;
        while !fd.end && fd.current_ci < fd.tap().assaults.len() {
            let r = UnitRef::assault(fd.tapi, fd.current_ci);
            let mut attacked = false;
            if !fd.unit(r).is_active() {
                trace!("{} cannot take action", fd.unit(r).description());
                // Halted Orders: a delayed assault with Inhibit locks down
                // its direct opponent.
                if fd.has_bge(PassiveBge::HaltedOrders) && fd.unit(r).delay > 0 {
                    let across_alive = fd.players[fd.tipi].assaults.len() > fd.current_ci
                        && fd.players[fd.tipi].assaults[fd.current_ci].is_alive();
                    if across_alive {
                        let across = UnitRef::assault(fd.tipi, fd.current_ci);
                        let inhibit_value = fd.unit(r).skill(Skill::Inhibit);
                        if inhibit_value > fd.unit(across).inhibited {
                            debug!(
                                "Halted Orders: {} inhibits {} by {}",
                                fd.unit(r).description(),
                                fd.unit(across).description(),
                                inhibit_value
                            );
                            fd.unit_mut(across).inhibited = inhibit_value;
                        }
                    }
                }
            } else {
                fd.assault_bloodlusted = false;
                fd.unit_mut(r).step = CardStep::Attacking;
                evaluate_skills(fd, r, Some(&mut attacked));
                if fd.end {
                    break;
                }
            }
            if fd.unit(r).corroded_rate > 0 {
                if attacked {
                    let status = fd.unit(r);
                    let v = status.corroded_rate.min(status.attack_power());
                    debug!("{} loses attack by {}", fd.unit(r).description(), v);
                    fd.unit_mut(r).corroded_weakened += v;
                } else {
                    debug!("{} loses corroded status", fd.unit(r).description());
                    let status = fd.unit_mut(r);
                    status.corroded_rate = 0;
                    status.corroded_weakened = 0;
                }
            }
            fd.unit_mut(r).step = CardStep::Attacked;
            fd.current_ci += 1;
        }

        fd.current_phase = Phase::End;
        turn_end_phase(fd);
        if fd.end {
            break;
        }
        debug!("TURN {} ends for {}", fd.turn, fd.tap().commander.description());
        std::mem::swap(&mut fd.tapi, &mut fd.tipi);
        fd.turn += 1;
    }

    score(fd)
}

fn clamp_points(points: i64) -> u64 {
    points.max(0) as u64
}

/// Fold the final field into a `Results` under the configured optimization
/// mode. The per-mode formulas are fixed constants of the game's scoring.
fn score(fd: &mut Field) -> Results {
    const BRAWL_MAX_SCORE: i64 = 67;
    const BRAWL_MIN_SCORE: i64 = 5;

    let raid_damage: i64 = {
        let enemy = &fd.players[1];
        15 + (enemy.deck.deck_size() as i64).min((fd.turn as i64 + 1) / 2)
            - enemy.assaults.len() as i64
            - enemy.structures.len() as i64
            - (10 * enemy.commander.hp as i64 / enemy.commander.max_hp as i64)
    };
    let quest_score: i64 = {
        if fd.quest.quest_type == QuestType::CardSurvival {
            let mut survived = 0;
            for status in &fd.players[0].assaults {
                survived += u32::from(fd.quest.key == status.card.id);
            }
            for status in &fd.players[0].structures {
                survived += u32::from(fd.quest.key == status.card.id);
            }
            for card in &fd.players[0].deck.shuffled_cards {
                survived += u32::from(fd.quest.key == card.id);
            }
            fd.quest_counter += survived;
        }
        if fd.quest.must_fulfill {
            if fd.quest_counter >= fd.quest.value {
                fd.quest.score as i64
            } else {
                0
            }
        } else {
            (fd.quest.score as i64)
                .min(fd.quest.score as i64 * fd.quest_counter as i64 / fd.quest.value as i64)
        }
    };
    let brawl_score = |fd: &Field, winner: usize| -> i64 {
        let me = &fd.players[winner];
        let enemy = &fd.players[opponent(winner)];
        57 - (10 * (me.commander.max_hp as i64 - me.commander.hp as i64)
            / me.commander.max_hp as i64)
            + (me.assaults.len() + me.structures.len() + me.deck.remaining()) as i64
            - (enemy.assaults.len() + enemy.structures.len() + enemy.deck.remaining()) as i64
            - fd.turn as i64 / 4
    };

    use crate::types::OptimizationMode as Om;
    // loss
    if !fd.players[0].commander.is_alive() {
        debug!("attacker loses");
        return match fd.optimization_mode {
            Om::Raid => Results::loss(clamp_points(raid_damage)),
            Om::Brawl => Results::loss(BRAWL_MIN_SCORE as u64),
            Om::BrawlDefense => {
                let enemy_brawl_score = brawl_score(fd, 1);
                Results::loss(clamp_points(BRAWL_MAX_SCORE - enemy_brawl_score))
            }
            Om::Quest => {
                Results::loss(if fd.quest.must_win { 0 } else { clamp_points(quest_score) })
            }
            _ => Results::loss(0),
        };
    }
    // win
    if !fd.players[1].commander.is_alive() {
        debug!("attacker wins");
        return match fd.optimization_mode {
            Om::Brawl => Results::win(clamp_points(brawl_score(fd, 0))),
            Om::BrawlDefense => Results::win((BRAWL_MAX_SCORE - BRAWL_MIN_SCORE) as u64),
            Om::Campaign => {
                let me = &fd.players[0];
                let campaign_score = 100
                    - 10 * ((me.deck.deck_size() as i64).min((fd.turn as i64 + 1) / 2)
                        - me.assaults.len() as i64
                        - me.structures.len() as i64);
                Results::win(clamp_points(campaign_score))
            }
            Om::Quest => Results::win(clamp_points(fd.quest.win_score as i64 + quest_score)),
            _ => Results::win(100),
        };
    }
    // stall
    debug!("stall after {} turns", fd.turn_limit);
    match fd.optimization_mode {
        Om::Defense => Results::draw(100),
        Om::Raid => Results::draw(clamp_points(raid_damage)),
        Om::Brawl => Results::draw(BRAWL_MIN_SCORE as u64),
        // A defense deck that stalls has done its job.
        Om::BrawlDefense => Results::win((BRAWL_MAX_SCORE - BRAWL_MIN_SCORE) as u64),
        Om::Quest => Results::draw(if fd.quest.must_win { 0 } else { clamp_points(quest_score) }),
        _ => Results::draw(0),
    }
}
