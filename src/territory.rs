use crate::board::Board;
use crate::continent::ContinentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable index of a territory in the board arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub name: String,
    pub continent: ContinentId,
    pub adjacent_territories: Vec<TerritoryId>,
    pub position: Option<(f32, f32)>,
}

impl Territory {
    pub fn new(name: &str, continent: ContinentId) -> Self {
        Self {
            name: name.to_string(),
            continent,
            adjacent_territories: Vec::new(),
            position: None,
        }
    }

    /// Adds a neighbour, keeping the list sorted and free of duplicates.
    pub fn add_adjacent(&mut self, adjacent: TerritoryId) {
        if let Err(index) = self.adjacent_territories.binary_search(&adjacent) {
            self.adjacent_territories.insert(index, adjacent);
        }
    }

    pub fn is_adjacent(&self, territory: TerritoryId) -> bool {
        self.adjacent_territories.binary_search(&territory).is_ok()
    }
}

impl Board {
    /// True when `to` can be reached from `from` walking only through
    /// territories owned by the nation that owns `from`.
    pub fn has_path(&self, from: TerritoryId, to: TerritoryId) -> bool {
        let nation = self.owner(from);
        if self.owner(to) != nation {
            return false;
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![from];

        while let Some(territory) = stack.pop() {
            if territory == to {
                return true;
            }
            if !visited.insert(territory) {
                continue;
            }
            for &adjacent in self.neighbors(territory) {
                if self.owner(adjacent) == nation && !visited.contains(&adjacent) {
                    stack.push(adjacent);
                }
            }
        }

        false
    }
}
