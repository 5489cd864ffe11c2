use crate::error::Result;
use crate::game::GameState;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerritorySnapshot {
    pub name: String,
    pub nation: String,
    pub troops: u32,
    pub position: Option<(f32, f32)>,
}

/// Owner and troops of every territory at the start of a turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardSnapshot {
    pub round: u32,
    pub ply: u32,
    pub territories: Vec<TerritorySnapshot>,
}

impl GameState {
    pub fn snapshot(&self) -> BoardSnapshot {
        let board = self.board();
        let territories = board
            .topology()
            .territory_ids()
            .map(|t| TerritorySnapshot {
                name: board.territory_name(t).to_string(),
                nation: board.nation_name(board.owner(t)).to_string(),
                troops: board.troops(t),
                position: board.territory(t).position,
            })
            .collect();
        BoardSnapshot {
            round: self.round_num,
            ply: self.ply,
            territories,
        }
    }
}

/// Sink for the snapshots taken while a game runs.
pub trait SnapshotStore {
    fn record(&mut self, snapshot: BoardSnapshot);

    /// Called once when the game ends.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SnapshotStore for NullStore {
    fn record(&mut self, _snapshot: BoardSnapshot) {}
}

#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    pub snapshots: Vec<BoardSnapshot>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn record(&mut self, snapshot: BoardSnapshot) {
        self.snapshots.push(snapshot);
    }
}

/// Collects snapshots and writes them as one bincode file when the game ends.
#[derive(Debug, Clone)]
pub struct BincodeSnapshotStore {
    path: PathBuf,
    snapshots: Vec<BoardSnapshot>,
}

impl BincodeSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshots: Vec::new(),
        }
    }
}

impl SnapshotStore for BincodeSnapshotStore {
    fn record(&mut self, snapshot: BoardSnapshot) {
        self.snapshots.push(snapshot);
    }

    fn finish(&mut self) -> Result<()> {
        let file = File::create(&self.path)?;
        bincode::serialize_into(BufWriter::new(file), &self.snapshots)?;
        Ok(())
    }
}

pub fn load_snapshots(path: &Path) -> Result<Vec<BoardSnapshot>> {
    let file = File::open(path)?;
    Ok(bincode::deserialize_from(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::line_game;

    #[test]
    fn test_snapshot_reflects_board() {
        let mut game = line_game();
        game.ply = 4;
        let snapshot = game.snapshot();
        assert_eq!(snapshot.ply, 4);
        assert_eq!(snapshot.territories.len(), 4);
        assert_eq!(snapshot.territories[2].name, "b0");
        assert_eq!(snapshot.territories[2].nation, "B");
        assert_eq!(snapshot.territories[2].troops, 2);
    }

    #[test]
    fn test_bincode_store_writes_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots.bin");
        let game = line_game();

        let mut store = BincodeSnapshotStore::new(&path);
        store.record(game.snapshot());
        store.record(game.snapshot());
        store.finish().unwrap();

        let loaded = load_snapshots(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], game.snapshot());
    }
}
