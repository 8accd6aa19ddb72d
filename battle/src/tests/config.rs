//! Battle configuration serialization.

use super::*;
use crate::types::Skill;

#[test]
fn test_default_config() {
    let config = BattleConfig::default();
    assert_eq!(config.mode, GameMode::Fight);
    assert_eq!(config.optimization, OptimizationMode::Winrate);
    assert_eq!(config.turn_limit, DEFAULT_TURN_LIMIT);
    assert!(config.bg_effects.is_empty());
    assert!(config.bg_skills[0].is_empty() && config.bg_skills[1].is_empty());
    assert!(config.quest.is_none());
}

#[test]
fn test_config_json_round_trip() {
    let mut config = BattleConfig {
        mode: GameMode::Surge,
        optimization: OptimizationMode::Raid,
        turn_limit: 30,
        ..Default::default()
    };
    config.bg_effects.insert(PassiveBge::Bloodlust, 2);
    config.bg_effects.insert(PassiveBge::Counterflux, 0);
    config.bg_skills[0].push(SkillSpec::new(Skill::Rally, 1).all());
    config.bg_skills[1].push(
        SkillSpec::new(Skill::Strike, 2).faction(Faction::Xeno).targets(2).cooldown(3),
    );
    config.quest = Some(Quest {
        quest_type: QuestType::SkillUse,
        key: Skill::Strike.index() as u32,
        value: 4,
        score: 20,
        win_score: 5,
        ..Default::default()
    });

    let json = serde_json::to_string(&config).unwrap();
    let back: BattleConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(back.mode, config.mode);
    assert_eq!(back.optimization, config.optimization);
    assert_eq!(back.turn_limit, config.turn_limit);
    assert_eq!(back.bg_effects, config.bg_effects);
    assert_eq!(back.bg_skills, config.bg_skills);
    assert_eq!(back.quest, config.quest);
}

#[test]
fn test_partial_json_falls_back_to_defaults() {
    let config: BattleConfig =
        serde_json::from_str(r#"{"mode":"surge","bgEffects":{"bloodlust":2}}"#).unwrap();
    assert_eq!(config.mode, GameMode::Surge);
    assert_eq!(config.bg_effects.get(&PassiveBge::Bloodlust), Some(&2));
    assert_eq!(config.turn_limit, DEFAULT_TURN_LIMIT);
    assert_eq!(config.optimization, OptimizationMode::Winrate);
    assert!(config.quest.is_none());
}

#[test]
fn test_terse_skill_spec_json() {
    let spec: SkillSpec = serde_json::from_str(r#"{"id":"strike","x":4}"#).unwrap();
    assert_eq!(spec, SkillSpec::new(Skill::Strike, 4));

    let spec: SkillSpec =
        serde_json::from_str(r#"{"id":"evolve","s":"strike","s2":"heal"}"#).unwrap();
    assert_eq!(spec.id, Skill::Evolve);
    assert_eq!(spec.s, Skill::Strike);
    assert_eq!(spec.s2, Skill::Heal);
    assert!(!spec.all);
}

#[test]
fn test_quest_json_round_trip() {
    let quest = Quest {
        quest_type: QuestType::CardSurvival,
        key: 42,
        value: 3,
        score: 30,
        must_fulfill: true,
        ..Default::default()
    };
    let json = serde_json::to_string(&quest).unwrap();
    assert_eq!(serde_json::from_str::<Quest>(&json).unwrap(), quest);
}

#[test]
fn test_results_serialize_in_camel_case() {
    let json = serde_json::to_string(&Results::win(100)).unwrap();
    assert_eq!(json, r#"{"wins":1,"draws":0,"losses":0,"points":100}"#);
}
