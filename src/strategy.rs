//! Decision policies: each plays one full turn (deploy, attack, fortify)
//! for its nation against the shared game state.

use crate::board::{Board, NationId};
use crate::continent::ContinentId;
use crate::game::GameState;
use crate::path_search::PathSearch;
use crate::scoring::Scoring;
use crate::territory::TerritoryId;
use rand::seq::{IteratorRandom, SliceRandom};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

pub trait Strategy: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Plays one turn. Implementations deploy first, then attack, then
    /// fortify.
    fn play_turn(&mut self, game: &mut GameState, nation: NationId);
}

/// Policies selectable at game setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum StrategyKind {
    Random,
    Ranked,
    Continent,
    ContinentRanked,
    PathSearch,
    PathSearchBasic,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Random => Box::new(RandomStrategy),
            StrategyKind::Ranked => Box::new(RankedBorder),
            StrategyKind::Continent => Box::new(ContinentAware),
            StrategyKind::ContinentRanked => Box::new(ContinentAwareRanked),
            StrategyKind::PathSearch => Box::new(PathSearch::new(Scoring::Positional, true)),
            StrategyKind::PathSearchBasic => Box::new(PathSearch::new(Scoring::Material, false)),
        }
    }
}

/// An attack candidate: strongest owned `source` next to enemy `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedTarget {
    pub source: TerritoryId,
    pub target: TerritoryId,
    pub score: f64,
}

/// Entitlement plus the bonus of one traded card set.
pub fn deployment(game: &mut GameState, nation: NationId) -> u32 {
    let entitled = game.board().deploy_num(nation);
    debug!(
        "{} gets {} troops from {} territories.",
        game.board().nation_name(nation),
        entitled,
        game.board().territories(nation).len()
    );
    entitled + game.trade_cards(nation)
}

/// First owned territory, used when a nation has nobody to attack.
pub(crate) fn any_territory(board: &Board, nation: NationId) -> Option<TerritoryId> {
    board.territories(nation).iter().next().copied()
}

/// Moves the largest stack not touching an enemy to the first of `targets`
/// it can reach through owned territory, leaving one troop behind.
pub fn fortify_land_locked(game: &mut GameState, nation: NationId, targets: &[TerritoryId]) {
    let board = game.board();
    let border = board.in_border(nation);
    let land_locked = board
        .territories(nation)
        .iter()
        .filter(|t| !border.contains_key(*t))
        .map(|&t| (t, board.troops(t)))
        .filter(|&(_, troops)| troops > 1)
        .min_by_key(|&(_, troops)| Reverse(troops));

    let Some((source, stack)) = land_locked else {
        return;
    };
    if let Some(&target) = targets.iter().find(|&&target| board.has_path(source, target)) {
        game.fortify(source, target, stack - 1);
    }
}

/// Owned border territories ordered weakest first.
pub fn weakest_border(board: &Board, nation: NationId) -> Vec<TerritoryId> {
    let mut border: Vec<TerritoryId> = board.in_border(nation).into_keys().collect();
    border.sort_by_key(|&t| board.troops(t));
    border
}

fn sort_ranking(ranking: &mut [RankedTarget]) {
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
}

fn strongest_source(board: &Board, sources: &[TerritoryId]) -> Option<(TerritoryId, u32)> {
    sources
        .iter()
        .map(|&s| (s, board.troops(s)))
        .min_by_key(|&(_, troops)| Reverse(troops))
}

fn troop_ratio(source_troops: u32, target_troops: u32) -> f64 {
    (source_troops as f64 - 3.0) / target_troops.max(1) as f64
}

/// `(source_troops - 3) / target_troops` for every enemy border territory,
/// best first.
pub fn ranked_targets(board: &Board, nation: NationId) -> Vec<RankedTarget> {
    let mut ranking: Vec<RankedTarget> = board
        .out_border(nation)
        .into_iter()
        .filter_map(|(target, sources)| {
            let (source, troops) = strongest_source(board, &sources)?;
            Some(RankedTarget {
                source,
                target,
                score: troop_ratio(troops, board.troops(target)),
            })
        })
        .collect();
    sort_ranking(&mut ranking);
    ranking
}

fn enemy_troops_by_continent(board: &Board, nation: NationId) -> Vec<u32> {
    let mut enemy_troops = vec![0; board.continents().len()];
    for territory in board.topology().territory_ids() {
        if board.owner(territory) != nation {
            enemy_troops[board.continent(territory).0] += board.troops(territory);
        }
    }
    enemy_troops
}

/// Troop ratio plus a pull towards continents held by few enemy troops.
/// Sources with fewer than three troops score zero.
pub fn continent_ranked_targets(board: &Board, nation: NationId) -> Vec<RankedTarget> {
    let attraction: Vec<f64> = enemy_troops_by_continent(board, nation)
        .iter()
        .enumerate()
        .map(|(c, &enemy_troops)| {
            if enemy_troops == 0 {
                0.0
            } else {
                board.continent_bonus(ContinentId(c)) as f64 * 4.0 / enemy_troops as f64
            }
        })
        .collect();

    let mut ranking: Vec<RankedTarget> = board
        .out_border(nation)
        .into_iter()
        .filter_map(|(target, sources)| {
            let (source, troops) = strongest_source(board, &sources)?;
            let score = if troops < 3 {
                0.0
            } else {
                troop_ratio(troops, board.troops(target)) + attraction[board.continent(target).0] * 0.2
            };
            Some(RankedTarget { source, target, score })
        })
        .collect();
    sort_ranking(&mut ranking);
    ranking
}

/// Source of the first target that is not an easy kill, or of the last
/// ranked target when every one is.
fn deploy_site(ranking: &[RankedTarget]) -> Option<TerritoryId> {
    ranking
        .iter()
        .find(|r| r.score < 1.0)
        .or(ranking.last())
        .map(|r| r.source)
}

#[derive(Debug, Clone, Copy)]
struct RankedParams {
    initial_stop: f64,
    leave_cap: u32,
}

/// Deploy behind the first target that is not an easy kill, pick off the
/// top-ranked targets while they score at least 1, then fortify the most
/// promising attack source.
fn play_ranked_turn(
    game: &mut GameState,
    nation: NationId,
    rank: fn(&Board, NationId) -> Vec<RankedTarget>,
    params: RankedParams,
) {
    let troops = deployment(game, nation);
    let ranking = rank(game.board(), nation);

    let deploy_at = deploy_site(&ranking).or_else(|| any_territory(game.board(), nation));
    let Some(deploy_at) = deploy_at else {
        return;
    };
    game.deploy(deploy_at, troops);

    if let Some(&first) = ranking.first() {
        if first.score >= params.initial_stop {
            let mut current = first;
            loop {
                game.battle(current.source, current.target, 3, 0.2, params.leave_cap);
                match rank(game.board(), nation).first() {
                    Some(&top) if top.score >= 1.0 => current = top,
                    _ => break,
                }
            }
        }
    }

    let targets: Vec<TerritoryId> = rank(game.board(), nation).iter().map(|r| r.source).collect();
    fortify_land_locked(game, nation, &targets);
}

/// Attacks a random border target once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl RandomStrategy {
    fn random_front(game: &mut GameState, nation: NationId) -> Option<(TerritoryId, TerritoryId)> {
        let targets = game.board().out_border(nation);
        let (target, sources) = targets.iter().choose(game.rng())?;
        let source = *sources.choose(game.rng())?;
        Some((source, *target))
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn play_turn(&mut self, game: &mut GameState, nation: NationId) {
        let troops = deployment(game, nation);
        let Some((source, target)) = Self::random_front(game, nation) else {
            if let Some(territory) = any_territory(game.board(), nation) {
                game.deploy(territory, troops);
            }
            return;
        };

        game.deploy(source, troops);
        game.battle(source, target, 4, 0.5, 1);

        // A defeated opponent may have handed over enough cards for a set.
        if game.player(nation).cards.len() >= 5 && !game.win_condition() {
            let bonus = game.trade_cards(nation);
            if let Some((source, _)) = Self::random_front(game, nation) {
                game.deploy(source, bonus);
            }
        }

        let targets = weakest_border(game.board(), nation);
        fortify_land_locked(game, nation, &targets);
    }
}

/// Picks off weakly defended neighbours by troop ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankedBorder;

impl Strategy for RankedBorder {
    fn name(&self) -> &'static str {
        "ranked"
    }

    fn play_turn(&mut self, game: &mut GameState, nation: NationId) {
        play_ranked_turn(
            game,
            nation,
            ranked_targets,
            RankedParams {
                initial_stop: 0.0,
                leave_cap: 5,
            },
        );
    }
}

/// Ranked border with a pull towards cheap continents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinentAwareRanked;

impl Strategy for ContinentAwareRanked {
    fn name(&self) -> &'static str {
        "continent-ranked"
    }

    fn play_turn(&mut self, game: &mut GameState, nation: NationId) {
        play_ranked_turn(
            game,
            nation,
            continent_ranked_targets,
            RankedParams {
                initial_stop: -0.38,
                leave_cap: 3,
            },
        );
    }
}

/// Builds continents, breaks enemy continents and defends its own bridges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinentAware;

struct ContinentData {
    enemy_troops: Vec<u32>,
    enemy_continents: BTreeSet<ContinentId>,
    my_continents: BTreeSet<ContinentId>,
}

impl ContinentAware {
    fn continent_data(board: &Board, nation: NationId) -> ContinentData {
        let mut enemy_continents = BTreeSet::new();
        let mut my_continents = BTreeSet::new();
        for c in (0..board.continents().len()).map(ContinentId) {
            match board.continent_owner(c) {
                Some(owner) if owner == nation => {
                    my_continents.insert(c);
                }
                Some(_) => {
                    enemy_continents.insert(c);
                }
                None => {}
            }
        }
        ContinentData {
            enemy_troops: enemy_troops_by_continent(board, nation),
            enemy_continents,
            my_continents,
        }
    }

    /// Best attack per enemy border territory, unsorted.
    pub fn fight_scores(board: &Board, nation: NationId) -> Vec<RankedTarget> {
        let data = Self::continent_data(board, nation);
        board
            .out_border(nation)
            .into_iter()
            .filter_map(|(target, sources)| {
                let continent = board.continent(target);
                let bonus = board.continent_bonus(continent) as f64;
                let target_troops = board.troops(target);
                let build = (bonus * 3.0 - data.enemy_troops[continent.0] as f64).max(0.0) / 10.0;
                let brk = if data.enemy_continents.contains(&continent) {
                    (bonus * 2.0 - target_troops as f64).max(0.0)
                } else {
                    0.0
                };

                sources
                    .iter()
                    .map(|&source| {
                        let base = troop_ratio(board.troops(source), target_troops);
                        let score = if base < 0.0 { base } else { base + build + brk };
                        RankedTarget { source, target, score }
                    })
                    .reduce(|best, next| if next.score > best.score { next } else { best })
            })
            .collect()
    }

    fn best_fight(board: &Board, nation: NationId) -> Option<RankedTarget> {
        let mut fights = Self::fight_scores(board, nation);
        sort_ranking(&mut fights);
        fights.first().copied()
    }

    /// Enemy troops around each owned territory. Bridges (territories next
    /// to an enemy and touching an owned continent) want all of them
    /// matched, everything else at most three.
    pub fn defense_scores(board: &Board, nation: NationId) -> Vec<(TerritoryId, i64)> {
        let data = Self::continent_data(board, nation);
        board
            .territories(nation)
            .iter()
            .map(|&territory| {
                let mut surrounding_enemies = 0i64;
                let mut touches_enemy = false;
                let mut touches_continent = false;
                for &n in std::iter::once(&territory).chain(board.neighbors(territory)) {
                    if board.owner(n) == nation {
                        touches_continent |= data.my_continents.contains(&board.continent(n));
                    } else {
                        surrounding_enemies += board.troops(n) as i64;
                        touches_enemy = true;
                    }
                }
                let score = if touches_enemy && touches_continent {
                    surrounding_enemies
                } else {
                    surrounding_enemies.min(3)
                };
                (territory, score)
            })
            .collect()
    }

    fn fortify(game: &mut GameState, nation: NationId) {
        let board = game.board();
        let mut deficits: Vec<(TerritoryId, i64)> = Self::defense_scores(board, nation)
            .into_iter()
            .map(|(t, score)| (t, score - board.troops(t) as i64))
            .collect();
        deficits.sort_by_key(|&(_, deficit)| Reverse(deficit));

        let mut best: Option<(TerritoryId, TerritoryId, i64)> = None;
        for &(source, source_deficit) in &deficits {
            for &(target, target_deficit) in &deficits {
                if source == target || !board.has_path(source, target) {
                    continue;
                }
                let request = target_deficit - source_deficit;
                if best.map_or(true, |(_, _, r)| request > r) {
                    best = Some((source, target, request));
                }
            }
        }

        if let Some((source, target, request)) = best {
            let troops = request.min(board.troops(source) as i64 - 1);
            if troops > 0 {
                game.fortify(source, target, troops as u32);
            }
        }
    }
}

impl Strategy for ContinentAware {
    fn name(&self) -> &'static str {
        "continent"
    }

    fn play_turn(&mut self, game: &mut GameState, nation: NationId) {
        let source = Self::best_fight(game.board(), nation)
            .map(|f| f.source)
            .or_else(|| any_territory(game.board(), nation));
        let troops = deployment(game, nation);
        let Some(source) = source else {
            return;
        };
        game.deploy(source, troops);

        while let Some(fight) = Self::best_fight(game.board(), nation) {
            if fight.score < 0.0 {
                break;
            }
            game.battle(fight.source, fight.target, 3, 0.2, 3);
        }

        Self::fortify(game, nation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::line_game;
    use crate::game_config::{MapConfig, RulesConfig};

    const A1: TerritoryId = TerritoryId(1);
    const B0: TerritoryId = TerritoryId(2);

    fn classic_game(seed: u64) -> GameState {
        let rules = RulesConfig {
            seed,
            ..RulesConfig::default()
        };
        GameState::new(&MapConfig::classic().unwrap(), None, rules).unwrap()
    }

    /// Nations A and B on one zero-bonus continent. `territories` lists
    /// name, owner and troops; `edges` the adjacencies.
    fn small_game(territories: &[(&str, &str, u32)], edges: &[(&str, &str)]) -> GameState {
        let territories: Vec<_> = territories
            .iter()
            .map(|&(name, nation, troops)| {
                let adjacent: Vec<&str> = edges
                    .iter()
                    .filter(|&&(from, _)| from == name)
                    .map(|&(_, to)| to)
                    .collect();
                serde_json::json!({
                    "name": name,
                    "continent": "All",
                    "adjacent_territories": adjacent,
                    "nation": nation,
                    "troops": troops,
                })
            })
            .collect();
        let map: MapConfig = serde_json::from_value(serde_json::json!({
            "nations": ["A", "B"],
            "continents": [{ "name": "All", "bonus_armies": 0 }],
            "territories": territories,
        }))
        .unwrap();
        GameState::new(&map, None, RulesConfig::default()).unwrap()
    }

    fn id(game: &GameState, name: &str) -> TerritoryId {
        game.board().territory_id(name).unwrap()
    }

    fn assert_partition(game: &GameState) {
        let board = game.board();
        let mut seen = BTreeSet::new();
        for nation in board.topology().nation_ids() {
            for &t in board.territories(nation) {
                assert_eq!(board.owner(t), nation);
                assert!(seen.insert(t));
            }
        }
        assert_eq!(seen.len(), board.territory_count());
    }

    #[test]
    fn test_ranked_targets_ratio() {
        let game = line_game();
        let ranking = ranked_targets(game.board(), NationId(0));
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].source, A1);
        assert_eq!(ranking[0].target, B0);
        assert_eq!(ranking[0].score, (5.0 - 3.0) / 2.0);
    }

    #[test]
    fn test_continent_ranked_weak_source_scores_zero() {
        let game = line_game();
        let ranking = continent_ranked_targets(game.board(), NationId(1));
        // b0 (2 troops) is the only source against a1
        assert_eq!(ranking[0].score, 0.0);

        let ranking = continent_ranked_targets(game.board(), NationId(0));
        // enemy troops in East: 6, bonus 3 -> attraction 2
        assert!((ranking[0].score - (1.0 + 2.0 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_fight_scores_continent_break() {
        let game = line_game();
        let fights = ContinentAware::fight_scores(game.board(), NationId(0));
        // base 1.0, build max(9 - 6, 0) / 10, break max(6 - 2, 0) since B owns East
        assert_eq!(fights.len(), 1);
        assert!((fights[0].score - (1.0 + 0.3 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_defense_scores() {
        let game = line_game();
        let scores = ContinentAware::defense_scores(game.board(), NationId(0));
        // a0 is interior: no enemies; a1 is a bridge of the owned West continent
        assert_eq!(scores, vec![(TerritoryId(0), 0), (A1, 2)]);
    }

    #[test]
    fn test_fortify_land_locked_moves_interior_stack() {
        let mut game = line_game();
        fortify_land_locked(&mut game, NationId(0), &[A1]);
        assert_eq!(game.board().troops(TerritoryId(0)), 1);
        assert_eq!(game.board().troops(A1), 7);
    }

    #[test]
    fn test_every_strategy_keeps_invariants() {
        let kinds = [
            StrategyKind::Random,
            StrategyKind::Ranked,
            StrategyKind::Continent,
            StrategyKind::ContinentRanked,
            StrategyKind::PathSearch,
            StrategyKind::PathSearchBasic,
        ];
        for (seed, kind) in kinds.into_iter().enumerate() {
            let mut game = classic_game(seed as u64);
            let mut strategy = kind.build();
            for _ in 0..3 {
                for nation in game.board().topology().nation_ids().collect::<Vec<_>>() {
                    if game.is_alive(nation) {
                        strategy.play_turn(&mut game, nation);
                        game.draw_card(nation);
                        assert_partition(&game);
                    }
                }
            }
        }
    }

    #[test]
    fn test_deployment_adds_card_bonus() {
        let mut game = line_game();
        game.player_mut(NationId(0)).cards = vec![crate::card::Card::Three; 3];
        assert_eq!(deployment(&mut game, NationId(0)), 5 + 5);
        assert!(game.player(NationId(0)).cards.is_empty());
    }

    #[test]
    fn test_deploy_site_first_weak_target_or_last() {
        let target = |source: usize, score: f64| RankedTarget {
            source: TerritoryId(source),
            target: TerritoryId(9),
            score,
        };
        let ranking = [target(0, 3.5), target(1, 0.2), target(2, -1.0)];
        assert_eq!(deploy_site(&ranking), Some(TerritoryId(1)));
        assert_eq!(deploy_site(&[target(0, 3.5), target(1, 2.0)]), Some(TerritoryId(1)));
        assert_eq!(deploy_site(&[]), None);
    }

    #[test]
    fn test_ranked_turn_deploys_behind_hard_target() {
        // p/x scores 3.5, q/y scores 0.2: troops go to q, p attacks x
        let mut game = small_game(
            &[("p", "A", 10), ("x", "B", 2), ("q", "A", 4), ("y", "B", 5)],
            &[("p", "x"), ("q", "y")],
        );
        RankedBorder.play_turn(&mut game, NationId(0));
        assert_eq!(game.board().troops(id(&game, "q")), 4 + 3);
        assert_eq!(game.board().troops(id(&game, "y")), 5);
        assert!(game.board().troops(id(&game, "p")) + game.board().troops(id(&game, "x")) < 12);
    }

    #[test]
    fn test_ranked_initial_stop_thresholds() {
        // (2 - 3) / 4 = -0.25: below the ranked stop, while the continent
        // ranking scores a two-troop source as 0, above its -0.38 stop
        let layout = [("p", "A", 2), ("x", "B", 4)];
        let edges = [("p", "x")];

        let mut game = small_game(&layout, &edges);
        RankedBorder.play_turn(&mut game, NationId(0));
        assert_eq!(game.board().troops(id(&game, "p")), 5);
        assert_eq!(game.board().troops(id(&game, "x")), 4);

        let mut game = small_game(&layout, &edges);
        ContinentAwareRanked.play_turn(&mut game, NationId(0));
        assert!(game.board().troops(id(&game, "p")) + game.board().troops(id(&game, "x")) < 9);
    }

    #[test]
    fn test_ranked_keeps_attacking_only_easy_targets() {
        // after taking x, the stack left in x scores (x - 3) / y against y
        let edges = [("p", "x"), ("p", "y"), ("x", "y")];

        let mut game = small_game(&[("p", "A", 30), ("x", "B", 1), ("y", "B", 40)], &edges);
        RankedBorder.play_turn(&mut game, NationId(0));
        assert_eq!(game.board().owner(id(&game, "x")), NationId(0));
        assert_eq!(game.board().owner(id(&game, "y")), NationId(1));
        assert_eq!(game.board().troops(id(&game, "y")), 40);

        let mut game = small_game(&[("p", "A", 30), ("x", "B", 1), ("y", "B", 10)], &edges);
        RankedBorder.play_turn(&mut game, NationId(0));
        assert_eq!(game.board().owner(id(&game, "x")), NationId(0));
        let y = id(&game, "y");
        assert!(game.board().owner(y) == NationId(0) || game.board().troops(y) < 10);
    }

    #[test]
    fn test_random_trades_again_with_five_cards() {
        use crate::card::Card;
        let mut board = crate::board::tests::line_board();
        board.set_troops(A1, 20);
        let mut game = GameState::from_board(board, RulesConfig::default());
        game.player_mut(NationId(0)).cards = vec![
            Card::One,
            Card::One,
            Card::One,
            Card::Two,
            Card::Two,
            Card::Two,
            Card::Three,
            Card::Three,
        ];
        RandomStrategy.play_turn(&mut game, NationId(0));
        // one set traded for the deployment, a second one after the attack
        assert_eq!(game.player(NationId(0)).cards, vec![Card::Three, Card::Three]);
    }

    #[test]
    fn test_random_keeps_cards_under_five() {
        use crate::card::Card;
        let mut game = line_game();
        game.player_mut(NationId(0)).cards =
            vec![Card::One, Card::One, Card::One, Card::Two, Card::Three, Card::Three];
        RandomStrategy.play_turn(&mut game, NationId(0));
        assert_eq!(game.player(NationId(0)).cards.len(), 3);
    }
}
