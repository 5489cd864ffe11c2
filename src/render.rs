use crate::error::Result;
use crate::snapshot::{load_snapshots, BoardSnapshot};
use itertools::Itertools;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE: &str = "snapshots.bin";

/// Turns a snapshot into a visual artifact. Never read back by the game.
pub trait Renderer {
    fn render(&mut self, snapshot: &BoardSnapshot, index: usize) -> Result<()>;
}

/// Writes one plain-text board listing per snapshot into a folder.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    folder: PathBuf,
}

impl TextRenderer {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    pub fn render_to_string(snapshot: &BoardSnapshot, index: usize) -> String {
        BoardListing { snapshot, index }.to_string()
    }
}

struct BoardListing<'a> {
    snapshot: &'a BoardSnapshot,
    index: usize,
}

impl fmt::Display for BoardListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ply: {} (round {})", self.index, self.snapshot.round)?;

        let by_nation = self
            .snapshot
            .territories
            .iter()
            .sorted_by(|a, b| a.nation.cmp(&b.nation))
            .group_by(|t| t.nation.clone());
        for (nation, territories) in &by_nation {
            let territories: Vec<_> = territories.collect();
            let troops: u32 = territories.iter().map(|t| t.troops).sum();
            writeln!(f, "{}: {}, {}", nation, territories.len(), troops)?;
            for territory in territories {
                writeln!(f, "   {}: {}", territory.name, territory.troops)?;
            }
        }
        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, snapshot: &BoardSnapshot, index: usize) -> Result<()> {
        let path = self.folder.join(format!("{}.txt", index));
        fs::write(path, Self::render_to_string(snapshot, index))?;
        Ok(())
    }
}

/// Renders every snapshot stored in `folder`. Returns how many were rendered.
pub fn render_folder(folder: &Path, renderer: &mut dyn Renderer) -> Result<usize> {
    let snapshots = load_snapshots(&folder.join(SNAPSHOT_FILE))?;
    for (i, snapshot) in snapshots.iter().enumerate() {
        renderer.render(snapshot, i)?;
    }
    Ok(snapshots.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::line_game;
    use crate::snapshot::{BincodeSnapshotStore, SnapshotStore};

    #[test]
    fn test_text_grouped_by_nation() {
        let text = TextRenderer::render_to_string(&line_game().snapshot(), 3);
        assert_eq!(
            text,
            "Ply: 3 (round 0)\nA: 2, 8\n   a0: 3\n   a1: 5\nB: 2, 6\n   b0: 2\n   b1: 4\n"
        );
    }

    #[test]
    fn test_render_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BincodeSnapshotStore::new(dir.path().join(SNAPSHOT_FILE));
        store.record(line_game().snapshot());
        store.finish().unwrap();

        let mut renderer = TextRenderer::new(dir.path());
        assert_eq!(render_folder(dir.path(), &mut renderer).unwrap(), 1);
        assert!(dir.path().join("0.txt").exists());
    }
}
