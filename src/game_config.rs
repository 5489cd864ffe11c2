use crate::board::{Board, Topology};
use crate::continent::{Continent, ContinentId};
use crate::error::{Result, SimError};
use crate::territory::{Territory, TerritoryId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Map description supplied by the map provider.
///
/// Territories either all carry an initial `nation` (and optionally
/// `troops`, default 1) or none do, in which case they are dealt randomly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub nations: Vec<String>,
    pub continents: Vec<ContinentConfig>,
    pub territories: Vec<TerritoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinentConfig {
    pub name: String,
    pub bonus_armies: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryConfig {
    pub name: String,
    pub continent: String,
    #[serde(default)]
    pub adjacent_territories: Vec<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub troops: Option<u32>,
}

/// Simulation rules passed into a game at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Troops granted for trading in a card set.
    pub card_bonus: u32,
    /// Seed of the dice and of every other random choice in the game.
    pub seed: u64,
    /// Abort a game that has no winner after this many rounds.
    pub max_rounds: Option<u32>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            card_bonus: 5,
            seed: 0,
            max_rounds: None,
        }
    }
}

impl MapConfig {
    /// The classic 42-territory world map with four nations.
    pub fn classic() -> Result<Self> {
        let config_data = include_str!("classic_map.json");
        Ok(serde_json::from_str(config_data)?)
    }

    pub fn load_from_file(filename: &str) -> Result<Self> {
        let data = std::fs::read_to_string(filename)?;
        let config: MapConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Builds the immutable topology for the given nation labels.
    /// Adjacency is made symmetric.
    pub fn to_topology(&self, nations: Vec<String>) -> Result<Topology> {
        if nations.is_empty() {
            return Err(SimError::InvalidMap("no nations".to_string()));
        }

        let mut continents: Vec<Continent> = self
            .continents
            .iter()
            .map(|c| Continent::new(&c.name, c.bonus_armies))
            .collect();

        let mut seen = HashSet::new();
        let mut territories = Vec::with_capacity(self.territories.len());
        for (i, territory_config) in self.territories.iter().enumerate() {
            if !seen.insert(territory_config.name.as_str()) {
                return Err(SimError::InvalidMap(format!(
                    "duplicate territory {}",
                    territory_config.name
                )));
            }
            let continent = self
                .continents
                .iter()
                .position(|c| c.name == territory_config.continent)
                .map(ContinentId)
                .ok_or_else(|| SimError::UnknownContinent(territory_config.continent.clone()))?;
            continents[continent.0].add_territory(TerritoryId(i));

            let mut territory = Territory::new(&territory_config.name, continent);
            territory.position = territory_config.x.zip(territory_config.y);
            territories.push(territory);
        }

        if let Some(empty) = continents.iter().find(|c| c.territories.is_empty()) {
            return Err(SimError::InvalidMap(format!("continent {} has no territories", empty.name)));
        }

        let topology = Topology::new(territories, continents, nations);
        let mut territories = topology.territories.clone();
        for (i, territory_config) in self.territories.iter().enumerate() {
            for adjacent in &territory_config.adjacent_territories {
                let other = topology.territory_id(adjacent)?;
                if other.0 == i {
                    continue;
                }
                territories[i].add_adjacent(other);
                territories[other.0].add_adjacent(TerritoryId(i));
            }
        }

        Ok(Topology::new(territories, topology.continents, topology.nations))
    }

    /// Builds the starting board. `nations` overrides the labels of the map.
    pub fn build_board<R: Rng + ?Sized>(&self, nations: Option<Vec<String>>, rng: &mut R) -> Result<Board> {
        let nations = nations.unwrap_or_else(|| self.nations.clone());
        let topology = Arc::new(self.to_topology(nations)?);

        let assigned = self.territories.iter().filter(|t| t.nation.is_some()).count();
        if assigned == 0 {
            return Board::deal(topology, rng);
        }
        if assigned != self.territories.len() {
            return Err(SimError::InvalidMap(format!(
                "{} of {} territories have an initial nation",
                assigned,
                self.territories.len()
            )));
        }

        let mut owners = Vec::with_capacity(self.territories.len());
        let mut troops = Vec::with_capacity(self.territories.len());
        for territory in &self.territories {
            let nation = territory.nation.as_deref().unwrap_or_default();
            owners.push(topology.nation_id(nation)?);
            troops.push(territory.troops.unwrap_or(1));
        }
        Board::new(topology, owners, troops)
    }

    /// Nation labels for a game of `players`: the map's own labels when the
    /// counts match, otherwise `A`, `B`, ... Maps that assign territories
    /// need exactly one player per listed nation.
    pub fn nations_for(&self, players: usize) -> Result<Option<Vec<String>>> {
        if self.nations.len() == players {
            return Ok(None);
        }
        if self.territories.iter().any(|t| t.nation.is_some()) {
            return Err(SimError::InvalidMap(format!(
                "map assigns territories to {} nations but {} players were given",
                self.nations.len(),
                players
            )));
        }
        Ok(Some(default_nation_names(players)))
    }
}

/// Nation labels `A`, `B`, `C`, ... for `count` players.
pub fn default_nation_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let letter = (b'A' + (i % 26) as u8) as char;
            if i < 26 {
                letter.to_string()
            } else {
                format!("{}{}", letter, i / 26)
            }
        })
        .collect()
}
