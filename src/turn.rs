use crate::board::NationId;
use crate::error::{Result, SimError};
use crate::game::GameState;
use crate::snapshot::{NullStore, SnapshotStore};
use crate::strategy::Strategy;
use tracing::debug;

impl GameState {
    /// Plays full rotations until one nation is left and returns it.
    /// `strategies[i]` plays for nation `i`.
    pub fn run(&mut self, strategies: &mut [Box<dyn Strategy>]) -> Result<NationId> {
        self.run_with_snapshots(strategies, &mut NullStore)
    }

    pub fn run_with_snapshots(
        &mut self,
        strategies: &mut [Box<dyn Strategy>],
        store: &mut dyn SnapshotStore,
    ) -> Result<NationId> {
        if strategies.len() != self.players().len() {
            return Err(SimError::StrategyCount {
                expected: self.players().len(),
                found: strategies.len(),
            });
        }
        if let Some(winner) = self.winner() {
            store.finish()?;
            return Ok(winner);
        }

        loop {
            if let Some(limit) = self.rules().max_rounds {
                if self.round_num >= limit {
                    store.finish()?;
                    return Err(SimError::RoundLimit(limit));
                }
            }
            debug!("-------------------------");
            debug!("Round {}", self.round_num);
            debug!("\n{}", self);

            for (i, strategy) in strategies.iter_mut().enumerate() {
                let nation = NationId(i);
                if !self.is_alive(nation) {
                    continue;
                }
                store.record(self.snapshot());
                debug!(
                    "{} ({}) starting turn. Ply: {}",
                    self.board().nation_name(nation),
                    strategy.name(),
                    self.ply
                );

                strategy.play_turn(self, nation);
                self.draw_card(nation);
                self.ply += 1;

                if let Some(winner) = self.winner() {
                    store.record(self.snapshot());
                    store.finish()?;
                    debug!(
                        "{} wins after {} plies",
                        self.board().nation_name(winner),
                        self.ply
                    );
                    return Ok(winner);
                }
            }
            self.round_num += 1;
        }
    }
}
