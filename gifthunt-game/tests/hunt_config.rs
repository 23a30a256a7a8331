use gifthunt_game::{ConfigError, GameKind, HuntConfig, Lineup, Orchestrator, RewardCatalog};

#[test]
fn embedded_hunt_is_the_gift_box() {
    let config = HuntConfig::load_from_static();
    assert_eq!(config.catalog, RewardCatalog::gift_box());
    assert_eq!(config.lineup, Lineup::gift_box());
    let names: Vec<&str> = config.catalog.rewards().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["Chocolate", "Lipstick", "Spiderman", "Ring", "Drawing Book", "Pencil"]
    );
}

#[test]
fn config_survives_a_json_round_trip() {
    let config = HuntConfig::default().with_lineup(Lineup::extended());
    let json = serde_json::to_string_pretty(&config).unwrap();
    assert_eq!(HuntConfig::from_json(&json).unwrap(), config);
}

#[test]
fn custom_catalog_and_tuning_load_from_json() {
    let json = r#"{
        "catalog": [
            {"name": "Teddy", "icon": "🧸", "caption": "Soft"},
            {"name": "Roses", "icon": "🌹", "caption": "Red"}
        ],
        "lineup": ["pop-reveal", "quiz"],
        "tuning": {"balloon": {"balloons": 3}, "quiz": {"advance_ms": 10}}
    }"#;
    let config = HuntConfig::from_json(json).unwrap();
    assert_eq!(config.catalog.len(), 2);
    assert_eq!(config.lineup.games(), &[GameKind::PopReveal, GameKind::Quiz]);
    assert_eq!(config.tuning.balloon.balloons, 3);
    assert_eq!(config.tuning.balloon.reveal_ms, 500);
    assert_eq!(config.tuning.quiz.advance_ms, 10);
    assert_eq!(config.tuning.quiz.questions.len(), 3);
    assert!(Orchestrator::new(config).is_ok());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(HuntConfig::from_json(r#"{"lineup": ["snake"]}"#).is_err());
    assert!(HuntConfig::from_json("[").is_err());
}

#[test]
fn duplicate_names_and_dry_pools_are_refused() {
    let json = r#"{
        "catalog": [
            {"name": "Ring", "icon": "💍", "caption": "a"},
            {"name": "Ring", "icon": "💍", "caption": "b"}
        ],
        "lineup": ["wheel-spin"]
    }"#;
    let config = HuntConfig::from_json(json).unwrap();
    assert_eq!(
        Orchestrator::new(config).err(),
        Some(ConfigError::DuplicateReward("Ring".to_string()))
    );

    let config = HuntConfig::default().with_lineup(Lineup::new(vec![GameKind::Quiz; 7]));
    assert_eq!(
        config.validate(),
        Err(ConfigError::LineupExceedsCatalog {
            games: 7,
            rewards: 6
        })
    );
}

#[test]
fn unwinnable_tuning_is_refused() {
    let mut config = HuntConfig::default().with_lineup(Lineup::arcade());
    config.tuning.tap.duration_s = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Unwinnable {
            game: GameKind::TimedTap,
            ..
        })
    ));

    let mut config = HuntConfig::default().with_lineup(Lineup::arcade());
    config.tuning.puzzle.size = 5;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("slide-puzzle"), "{err}");
}

#[test]
fn tap_target_must_fit_the_spawns_before_time_runs_out() {
    // Ten seconds at one heart a second: the tenth spawn ties the countdown.
    let mut config = HuntConfig::default().with_lineup(Lineup::arcade());
    assert_eq!(config.tuning.tap.reachable_score(), 9);
    config.tuning.tap.target = 9;
    assert!(config.validate().is_ok());

    config.tuning.tap.target = 10;
    let err = config.validate().unwrap_err();
    assert!(
        matches!(
            err,
            ConfigError::Unwinnable {
                game: GameKind::TimedTap,
                ..
            }
        ),
        "{err}"
    );

    config.tuning.tap.spawn_ms = 500;
    assert_eq!(config.tuning.tap.reachable_score(), 19);
    assert!(config.validate().is_ok());

    config.tuning.tap.target = 0;
    assert!(config.validate().is_ok());
}
