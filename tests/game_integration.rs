//! End-to-end scenarios on small hand-built maps and the classic map.

use risk_simulator::board::NationId;
use risk_simulator::error::SimError;
use risk_simulator::game::GameState;
use risk_simulator::game_config::{MapConfig, RulesConfig};
use risk_simulator::strategy::{Strategy, StrategyKind};
use serde_json::json;

/// Twelve territories in a line; `Big` (bonus 5) is t0..t3, `Rest` the others.
fn line_map(owners: &[&str]) -> MapConfig {
    let territories: Vec<_> = (0..12)
        .map(|i| {
            let mut adjacent = Vec::new();
            if i + 1 < 12 {
                adjacent.push(format!("t{}", i + 1));
            }
            json!({
                "name": format!("t{}", i),
                "continent": if i < 4 { "Big" } else { "Rest" },
                "adjacent_territories": adjacent,
                "nation": owners[i],
                "troops": 2,
            })
        })
        .collect();
    serde_json::from_value(json!({
        "nations": ["A", "B"],
        "continents": [
            { "name": "Big", "bonus_armies": 5 },
            { "name": "Rest", "bonus_armies": 0 },
        ],
        "territories": territories,
    }))
    .unwrap()
}

fn strategies(kinds: &[StrategyKind]) -> Vec<Box<dyn Strategy>> {
    kinds.iter().map(|kind| kind.build()).collect()
}

#[test]
fn deployment_entitlement_counts_continent_bonus() {
    let with_continent = line_map(&["A", "A", "A", "A", "A", "A", "A", "A", "A", "B", "B", "B"]);
    let game = GameState::new(&with_continent, None, RulesConfig::default()).unwrap();
    assert_eq!(game.board().territories(NationId(0)).len(), 9);
    assert_eq!(game.board().deploy_num(NationId(0)), 8);

    let without = line_map(&["B", "A", "A", "A", "A", "A", "A", "A", "A", "A", "B", "B"]);
    let game = GameState::new(&without, None, RulesConfig::default()).unwrap();
    assert_eq!(game.board().territories(NationId(0)).len(), 9);
    assert_eq!(game.board().deploy_num(NationId(0)), 3);
}

#[test]
fn unknown_adjacent_territory_is_rejected() {
    let mut map = line_map(&["A"; 12]);
    map.territories[0].adjacent_territories.push("Atlantis".to_string());
    assert!(matches!(
        GameState::new(&map, None, RulesConfig::default()),
        Err(SimError::UnknownTerritory(name)) if name == "Atlantis"
    ));
}

#[test]
fn path_search_finishes_last_enemy_territory() {
    let mut map = MapConfig::classic().unwrap();
    map.nations = vec!["A".to_string(), "B".to_string()];
    for territory in &mut map.territories {
        let last = territory.name == "Alaska";
        territory.nation = Some(if last { "B" } else { "A" }.to_string());
        territory.troops = Some(if last { 1 } else { 50 });
    }
    let mut game = GameState::new(&map, None, RulesConfig::default()).unwrap();
    let mut players = strategies(&[StrategyKind::PathSearch, StrategyKind::Random]);

    let winner = game.run(&mut players).unwrap();
    assert_eq!(winner, NationId(0));
    assert_eq!(game.ply, 1);
    assert_eq!(game.board().territories(winner).len(), 42);
    assert!(!game.is_alive(NationId(1)));
}

#[test]
fn classic_game_ends_with_winner_or_round_limit() {
    let rules = RulesConfig {
        seed: 7,
        max_rounds: Some(150),
        ..RulesConfig::default()
    };
    let mut game = GameState::new(&MapConfig::classic().unwrap(), None, rules).unwrap();
    let mut players = strategies(&[
        StrategyKind::PathSearch,
        StrategyKind::Ranked,
        StrategyKind::Continent,
        StrategyKind::ContinentRanked,
    ]);

    match game.run(&mut players) {
        Ok(winner) => {
            assert_eq!(game.board().territories(winner).len(), 42);
            assert_eq!(game.winner(), Some(winner));
        }
        Err(SimError::RoundLimit(150)) => assert_eq!(game.round_num, 150),
        Err(e) => panic!("unexpected error: {}", e),
    }
}

#[test]
fn same_seed_replays_same_game() {
    let play = || {
        let rules = RulesConfig {
            seed: 42,
            max_rounds: Some(20),
            ..RulesConfig::default()
        };
        let mut game = GameState::new(&MapConfig::classic().unwrap(), None, rules).unwrap();
        let mut players = strategies(&[
            StrategyKind::Random,
            StrategyKind::PathSearchBasic,
            StrategyKind::Ranked,
            StrategyKind::PathSearch,
        ]);
        let outcome = game.run(&mut players).ok();
        (outcome, game.ply, game.snapshot())
    };
    assert_eq!(play(), play());
}
