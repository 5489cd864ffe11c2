//! Lookahead over multi-hop conquest paths.
//!
//! Paths start at an owned border territory and walk outward through enemy
//! territory, paying each defender's current troop count out of the
//! attacking stack. Every path found is scored on a single scratch copy of
//! the board by temporarily applying its conquests and reverting them
//! afterwards; the best one is then played with real battles.

use crate::board::{Board, NationId};
use crate::game::GameState;
use crate::scoring::Scoring;
use crate::strategy::{self, Strategy};
use crate::territory::TerritoryId;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

/// Hard bound on the number of candidate paths per search.
pub const EXPLORATION_CAP: usize = 1000;

/// Troops a path must keep after each hypothetical kill.
pub const SAFETY_MARGIN: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Conquer every node and hold the terminal territory with the survivors.
    AttackChain,
    /// Conquer every node, then march the survivors back to the origin.
    ReturnHome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Origin first, then the enemy territories in attack order.
    pub nodes: Vec<TerritoryId>,
    /// Troops left at the end of the chain after paying for every kill.
    pub end_troops: i64,
    pub kind: PathKind,
    pub score: f64,
}

impl Path {
    pub fn new(origin: TerritoryId, troops: i64) -> Self {
        Self {
            nodes: vec![origin],
            end_troops: troops,
            kind: PathKind::AttackChain,
            score: f64::NEG_INFINITY,
        }
    }

    pub fn origin(&self) -> TerritoryId {
        self.nodes[0]
    }

    pub fn terminal(&self) -> TerritoryId {
        self.nodes[self.nodes.len() - 1]
    }

    /// The territory that ends up holding `end_troops`.
    pub fn holder(&self) -> TerritoryId {
        match self.kind {
            PathKind::AttackChain => self.terminal(),
            PathKind::ReturnHome => self.origin(),
        }
    }

    pub fn contains(&self, territory: TerritoryId) -> bool {
        self.nodes.contains(&territory)
    }

    /// A path that attacks nothing.
    pub fn is_degenerate(&self) -> bool {
        self.nodes.len() == 1
    }

    fn extend(&self, territory: TerritoryId, killed_troops: i64) -> Self {
        let mut path = self.clone();
        path.nodes.push(territory);
        path.end_troops -= killed_troops;
        path
    }

    fn returning_home(&self) -> Self {
        Self {
            kind: PathKind::ReturnHome,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathSearchEngine {
    pub scoring: Scoring,
    /// Also consider sending the survivors of each chain back home.
    pub return_home: bool,
    pub cap: usize,
}

impl PathSearchEngine {
    pub fn new(scoring: Scoring, return_home: bool) -> Self {
        Self {
            scoring,
            return_home,
            cap: EXPLORATION_CAP,
        }
    }

    /// Breadth-first expansion in waves from every owned border territory,
    /// assuming all `deploy` troops are placed at the origin. Returns every
    /// path produced by any wave, at most `cap` of them.
    pub fn explore(&self, board: &Board, nation: NationId, deploy: u32) -> Vec<Path> {
        let owned: &BTreeSet<TerritoryId> = board.territories(nation);
        let mut frontier: Vec<Path> = board
            .in_border(nation)
            .into_keys()
            .map(|t| Path::new(t, board.troops(t) as i64 + deploy as i64))
            .collect();
        let mut candidates = Vec::new();

        'waves: while !frontier.is_empty() && candidates.len() < self.cap {
            let mut next = Vec::new();
            for path in &frontier {
                for &neighbor in board.neighbors(path.terminal()) {
                    if owned.contains(&neighbor) || path.contains(neighbor) {
                        continue;
                    }
                    let enemy_troops = board.troops(neighbor) as i64;
                    if path.end_troops - enemy_troops < SAFETY_MARGIN {
                        continue;
                    }

                    let extended = path.extend(neighbor, enemy_troops);
                    candidates.push(extended.clone());
                    if self.return_home && candidates.len() < self.cap {
                        candidates.push(extended.returning_home());
                    }
                    next.push(extended);
                    if candidates.len() >= self.cap {
                        break 'waves;
                    }
                }
            }
            frontier = next;
        }

        candidates
    }

    /// Applies the path's conquests to `scratch`, scores the result and
    /// restores the overlay captured before the first mutation.
    pub fn score_path(&self, scratch: &mut Board, nation: NationId, path: &Path) -> f64 {
        let checkpoint = scratch.checkpoint();
        let holder = path.holder();
        for &territory in &path.nodes {
            scratch.set_owner(territory, nation);
            let troops = if territory == holder {
                path.end_troops.max(0) as u32
            } else {
                1
            };
            scratch.set_troops(territory, troops);
        }

        let score = self.scoring.score(scratch, nation);
        scratch.restore(&checkpoint);
        score
    }

    /// Scores every path against one private copy of `board`.
    pub fn evaluate(&self, board: &Board, nation: NationId, paths: &mut [Path]) {
        let mut scratch = board.clone();
        for path in paths.iter_mut() {
            path.score = self.score_path(&mut scratch, nation, path);
        }
    }

    /// The highest scoring path; the first one wins ties.
    pub fn select(paths: Vec<Path>) -> Option<Path> {
        paths.into_iter().reduce(|best, path| if path.score > best.score { path } else { best })
    }

    /// Searches the best path, or a deploy-only path at a border (or any)
    /// territory when no attack is affordable. `None` only for a nation
    /// without territories.
    pub fn plan(&self, board: &Board, nation: NationId, deploy: u32) -> Option<Path> {
        let start = Instant::now();
        let mut paths = self.explore(board, nation, deploy);
        debug!("Found {} paths in {} ms", paths.len(), start.elapsed().as_millis());

        let start = Instant::now();
        self.evaluate(board, nation, &mut paths);
        match Self::select(paths) {
            Some(best) => {
                debug!(
                    "Found best path, score: {:.2} in {} ms",
                    best.score,
                    start.elapsed().as_millis()
                );
                debug!(
                    "Best path ({:?}): {:?}",
                    best.kind,
                    best.nodes.iter().map(|&t| board.territory_name(t)).collect::<Vec<_>>()
                );
                Some(best)
            }
            None => {
                let origin = board
                    .in_border(nation)
                    .into_keys()
                    .next()
                    .or_else(|| strategy::any_territory(board, nation))?;
                Some(Path::new(origin, 0))
            }
        }
    }
}

/// Plays the best conquest path found by [`PathSearchEngine`].
#[derive(Debug, Clone)]
pub struct PathSearch {
    engine: PathSearchEngine,
}

impl PathSearch {
    pub fn new(scoring: Scoring, return_home: bool) -> Self {
        Self {
            engine: PathSearchEngine::new(scoring, return_home),
        }
    }

    /// Plays `path` hop by hop, stopping at the first failed capture.
    /// Returns whether every hop was captured.
    fn execute(game: &mut GameState, nation: NationId, path: &Path) -> bool {
        let mut source = path.origin();
        for &target in &path.nodes[1..] {
            game.battle(source, target, 3, 0.5, 1);
            if game.board().owner(target) != nation {
                debug!("Path stopped at {}", game.board().territory_name(target));
                return false;
            }
            source = target;
        }
        true
    }

    /// Deploys `troops` at the origin of `path`, plays it and fortifies.
    /// A completed return-home path uses the turn's fortify to march back.
    fn play_path(&self, game: &mut GameState, nation: NationId, troops: u32, path: &Path) {
        game.deploy(path.origin(), troops);
        if path.is_degenerate() {
            return;
        }

        let completed = Self::execute(game, nation, path);
        if completed && path.kind == PathKind::ReturnHome {
            let terminal = path.terminal();
            let troops_left = game.board().troops(terminal);
            if troops_left > 1 {
                game.fortify(terminal, path.origin(), troops_left - 1);
            }
            return;
        }

        let targets = self.fortify_targets(game.board(), nation);
        strategy::fortify_land_locked(game, nation, &targets);
    }

    fn fortify_targets(&self, board: &Board, nation: NationId) -> Vec<TerritoryId> {
        if self.engine.return_home {
            strategy::weakest_border(board, nation)
        } else {
            strategy::ranked_targets(board, nation).iter().map(|r| r.source).collect()
        }
    }
}

impl Strategy for PathSearch {
    fn name(&self) -> &'static str {
        if self.engine.return_home {
            "path-search"
        } else {
            "path-search-basic"
        }
    }

    fn play_turn(&mut self, game: &mut GameState, nation: NationId) {
        let troops = strategy::deployment(game, nation);
        let Some(path) = self.engine.plan(game.board(), nation, troops) else {
            return;
        };

        self.play_path(game, nation, troops, &path);
    }
}
