use crate::board::{Board, NationId};
use crate::combat::{self, BattleReport};
use crate::error::Result;
use crate::game_config::{MapConfig, RulesConfig};
use crate::player::Player;
use crate::territory::TerritoryId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::{debug, error, warn};

/// The full state of one game: board, players, counters and the dice.
///
/// The board is only reachable read-only from outside; every mutation goes
/// through the operations below.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    players: Vec<Player>,
    rules: RulesConfig,
    rng: ChaCha8Rng,
    pub round_num: u32,
    pub ply: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    /// Same-nation, non-adjacent or under-strength attack; nothing changed.
    Rejected,
    Repelled(BattleReport),
    Conquered(BattleReport),
}

impl BattleOutcome {
    pub fn is_conquest(&self) -> bool {
        matches!(self, BattleOutcome::Conquered(_))
    }
}

impl GameState {
    /// Builds a game from a map. `nations` overrides the map's nation labels
    /// (one player per nation); territories are dealt with the game's seed
    /// when the map does not assign them.
    pub fn new(map: &MapConfig, nations: Option<Vec<String>>, rules: RulesConfig) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(rules.seed);
        let board = map.build_board(nations, &mut rng)?;
        Ok(Self::with_rng(board, rules, rng))
    }

    pub fn from_board(board: Board, rules: RulesConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(rules.seed);
        Self::with_rng(board, rules, rng)
    }

    fn with_rng(board: Board, rules: RulesConfig, rng: ChaCha8Rng) -> Self {
        let players = board
            .topology()
            .nation_ids()
            .map(|nation| {
                let mut player = Player::new(nation, board.nation_name(nation));
                player.is_alive = board.is_active(nation);
                player
            })
            .collect();

        Self {
            board,
            players,
            rules,
            rng,
            round_num: 0,
            ply: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, nation: NationId) -> &Player {
        &self.players[nation.0]
    }

    pub(crate) fn player_mut(&mut self, nation: NationId) -> &mut Player {
        &mut self.players[nation.0]
    }

    pub fn is_alive(&self, nation: NationId) -> bool {
        self.player(nation).is_alive
    }

    pub fn deploy(&mut self, territory: TerritoryId, troops: u32) {
        debug!(
            "{} deploys {} on {}",
            self.board.nation_name(self.board.owner(territory)),
            troops,
            self.board.territory_name(territory)
        );
        self.board.add_troops(territory, troops);
    }

    /// Attacks `to` from `from` until the defender is wiped out or the
    /// attacker drops under `continue_threshold`.
    ///
    /// On conquest the attacking territory keeps
    /// `clamp(floor(remaining * leave_fraction), 1, leave_cap)` troops (and
    /// never all of them); the rest advance into the captured territory.
    pub fn battle(
        &mut self,
        from: TerritoryId,
        to: TerritoryId,
        continue_threshold: u32,
        leave_fraction: f64,
        leave_cap: u32,
    ) -> BattleOutcome {
        let attacker = self.board.owner(from);
        let defender = self.board.owner(to);
        if attacker == defender {
            warn!(
                "Cannot attack own territory: {} -> {}",
                self.board.territory_name(from),
                self.board.territory_name(to)
            );
            return BattleOutcome::Rejected;
        }
        if !self.board.territory(from).is_adjacent(to) {
            warn!(
                "{} is not adjacent to {}",
                self.board.territory_name(from),
                self.board.territory_name(to)
            );
            return BattleOutcome::Rejected;
        }
        let attacker_troops = self.board.troops(from);
        let defender_troops = self.board.troops(to);
        if attacker_troops < 2 {
            warn!("Not enough troops to attack from {}", self.board.territory_name(from));
            return BattleOutcome::Rejected;
        }

        let report = combat::resolve_until(&mut self.rng, attacker_troops, defender_troops, continue_threshold);
        debug!(
            "{} ({}) attacks {} ({}) of {}: (-{}, -{}).",
            self.board.territory_name(from),
            attacker_troops,
            self.board.territory_name(to),
            defender_troops,
            self.board.nation_name(defender),
            report.attacker_losses,
            report.defender_losses
        );

        if report.defender_troops > 0 {
            self.board.set_troops(from, report.attacker_troops);
            self.board.set_troops(to, report.defender_troops);
            return BattleOutcome::Repelled(report);
        }

        debug!(
            "{} takes {} from {}!",
            self.board.nation_name(attacker),
            self.board.territory_name(to),
            self.board.nation_name(defender)
        );
        self.players[attacker.0].gets_card = true;
        if self.board.territories(defender).len() == 1 {
            debug!("{} has been defeated!", self.board.nation_name(defender));
            let cards = std::mem::take(&mut self.players[defender.0].cards);
            self.players[defender.0].is_alive = false;
            self.players[attacker.0].cards.extend(cards);
        }
        self.board.set_owner(to, attacker);

        let remaining = report.attacker_troops;
        let leave = ((remaining as f64 * leave_fraction).floor() as u32)
            .min(leave_cap)
            .min(remaining.saturating_sub(1))
            .max(1);
        self.board.set_troops(from, leave);
        self.board.set_troops(to, remaining.saturating_sub(leave));

        BattleOutcome::Conquered(report)
    }

    /// Moves troops between two territories connected through their owner's
    /// territories. At least one troop must stay behind.
    pub fn fortify(&mut self, source: TerritoryId, target: TerritoryId, troops: u32) -> bool {
        if self.board.has_path(source, target) && self.board.troops(source) > troops {
            self.board.remove_troops(source, troops);
            self.board.add_troops(target, troops);
            debug!(
                "Fortified {} troops from {} to {}.",
                troops,
                self.board.territory_name(source),
                self.board.territory_name(target)
            );
            true
        } else {
            error!(
                "Cannot fortify {} troops from {} to {}.",
                troops,
                self.board.territory_name(source),
                self.board.territory_name(target)
            );
            false
        }
    }

    pub fn win_condition(&self) -> bool {
        self.players.iter().filter(|p| p.is_alive).count() == 1
    }

    pub fn winner(&self) -> Option<NationId> {
        if !self.win_condition() {
            return None;
        }
        self.players.iter().find(|p| p.is_alive).map(|p| p.nation)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for player in &self.players {
            let territories = self.board.territories(player.nation);
            writeln!(f, "----------")?;
            writeln!(
                f,
                "{}: {}, {}, {}",
                player.name,
                territories.len(),
                self.board.total_troops(player.nation),
                player.cards.len()
            )?;
            for &territory in territories {
                writeln!(
                    f,
                    "   {}: {}",
                    self.board.territory_name(territory),
                    self.board.troops(territory)
                )?;
            }
        }
        Ok(())
    }
}
