use crate::continent::{Continent, ContinentId};
use crate::error::{Result, SimError};
use crate::territory::{Territory, TerritoryId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NationId(pub usize);

/// The immutable part of the map: territories, adjacency, continents and
/// nation labels. Shared between every board of a game and its clones.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub territories: Vec<Territory>,
    pub continents: Vec<Continent>,
    pub nations: Vec<String>,
    index: HashMap<String, TerritoryId>,
}

impl Topology {
    pub fn new(territories: Vec<Territory>, continents: Vec<Continent>, nations: Vec<String>) -> Self {
        let index = territories
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), TerritoryId(i)))
            .collect();
        Self {
            territories,
            continents,
            nations,
            index,
        }
    }

    pub fn territory_id(&self, name: &str) -> Result<TerritoryId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownTerritory(name.to_string()))
    }

    pub fn nation_id(&self, name: &str) -> Result<NationId> {
        self.nations
            .iter()
            .position(|n| n == name)
            .map(NationId)
            .ok_or_else(|| SimError::UnknownNation(name.to_string()))
    }

    pub fn nation_ids(&self) -> impl Iterator<Item = NationId> {
        (0..self.nations.len()).map(NationId)
    }

    pub fn territory_ids(&self) -> impl Iterator<Item = TerritoryId> {
        (0..self.territories.len()).map(TerritoryId)
    }
}

/// Copy of the mutable attribute overlay of a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    owners: Vec<NationId>,
    troops: Vec<u32>,
}

/// The territory graph: shared topology plus per-territory owner and troop
/// counts. Cloning copies the overlay only.
#[derive(Debug, Clone)]
pub struct Board {
    topology: Arc<Topology>,
    owners: Vec<NationId>,
    troops: Vec<u32>,
    nation_territories: Vec<BTreeSet<TerritoryId>>,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.topology, &other.topology)
            && self.owners == other.owners
            && self.troops == other.troops
    }
}

impl Board {
    pub fn new(topology: Arc<Topology>, owners: Vec<NationId>, troops: Vec<u32>) -> Result<Self> {
        let count = topology.territories.len();
        if owners.len() != count || troops.len() != count {
            return Err(SimError::InvalidMap(format!(
                "expected {} territory records, got {} owners and {} troop counts",
                count,
                owners.len(),
                troops.len()
            )));
        }

        let mut nation_territories = vec![BTreeSet::new(); topology.nations.len()];
        for (i, nation) in owners.iter().enumerate() {
            let territories = nation_territories.get_mut(nation.0).ok_or_else(|| {
                SimError::UnknownNation(format!("nation index {}", nation.0))
            })?;
            territories.insert(TerritoryId(i));
        }

        Ok(Self {
            topology,
            owners,
            troops,
            nation_territories,
        })
    }

    /// Deals every territory to the nations and places their starting armies.
    ///
    /// Territories are dealt continent by continent in shuffled order, so no
    /// nation starts with a whole continent that has at least as many
    /// territories as there are nations.
    /// Each territory gets one troop, then every nation is topped up to its
    /// starting army count on randomly chosen territories of its own.
    pub fn deal<R: Rng + ?Sized>(topology: Arc<Topology>, rng: &mut R) -> Result<Self> {
        let nation_count = topology.nations.len();
        if nation_count == 0 {
            return Err(SimError::InvalidMap("no nations to deal territories to".to_string()));
        }

        let mut owners = vec![NationId(0); topology.territories.len()];
        let mut troops = vec![1; topology.territories.len()];

        let mut nation_index = 0;
        for continent in &topology.continents {
            let mut territories = continent.territories.clone();
            territories.shuffle(rng);
            for territory in territories {
                owners[territory.0] = NationId(nation_index);
                nation_index = (nation_index + 1) % nation_count;
            }
        }

        let initial_armies: u32 = match nation_count {
            3 => 35,
            4 => 30,
            5 => 25,
            _ => 20,
        };

        for nation in topology.nation_ids() {
            let owned: Vec<TerritoryId> = topology
                .territory_ids()
                .filter(|t| owners[t.0] == nation)
                .collect();
            let mut remaining = initial_armies.saturating_sub(owned.len() as u32);
            while remaining > 0 {
                if let Some(territory) = owned.choose(rng) {
                    troops[territory.0] += 1;
                }
                remaining -= 1;
            }
        }

        Self::new(topology, owners, troops)
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn territory(&self, territory: TerritoryId) -> &Territory {
        &self.topology.territories[territory.0]
    }

    pub fn territory_name(&self, territory: TerritoryId) -> &str {
        &self.territory(territory).name
    }

    pub fn territory_id(&self, name: &str) -> Result<TerritoryId> {
        self.topology.territory_id(name)
    }

    pub fn nation_name(&self, nation: NationId) -> &str {
        &self.topology.nations[nation.0]
    }

    pub fn territory_count(&self) -> usize {
        self.topology.territories.len()
    }

    pub fn continents(&self) -> &[Continent] {
        &self.topology.continents
    }

    pub fn territories(&self, nation: NationId) -> &BTreeSet<TerritoryId> {
        &self.nation_territories[nation.0]
    }

    /// A nation is active while it owns at least one territory.
    pub fn is_active(&self, nation: NationId) -> bool {
        !self.nation_territories[nation.0].is_empty()
    }

    pub fn neighbors(&self, territory: TerritoryId) -> &[TerritoryId] {
        &self.territory(territory).adjacent_territories
    }

    pub fn owner(&self, territory: TerritoryId) -> NationId {
        self.owners[territory.0]
    }

    pub fn troops(&self, territory: TerritoryId) -> u32 {
        self.troops[territory.0]
    }

    pub fn continent(&self, territory: TerritoryId) -> ContinentId {
        self.territory(territory).continent
    }

    pub fn continent_bonus(&self, continent: ContinentId) -> u32 {
        self.topology.continents[continent.0].bonus_armies
    }

    pub fn total_troops(&self, nation: NationId) -> u32 {
        self.territories(nation).iter().map(|&t| self.troops(t)).sum()
    }

    /// The nation holding every territory of `continent`, if any.
    pub fn continent_owner(&self, continent: ContinentId) -> Option<NationId> {
        let members = &self.topology.continents[continent.0].territories;
        let first = self.owner(*members.first()?);
        members
            .iter()
            .all(|&t| self.owner(t) == first)
            .then_some(first)
    }

    pub fn deploy_num(&self, nation: NationId) -> u32 {
        let base = (self.territories(nation).len() as u32 / 3).max(3);
        let continent_bonus: u32 = (0..self.topology.continents.len())
            .map(ContinentId)
            .filter(|&c| self.continent_owner(c) == Some(nation))
            .map(|c| self.continent_bonus(c))
            .sum();
        base + continent_bonus
    }

    /// Enemy territory adjacent to the nation -> owned territories that can
    /// attack it.
    pub fn out_border(&self, nation: NationId) -> BTreeMap<TerritoryId, Vec<TerritoryId>> {
        let mut targets: BTreeMap<TerritoryId, Vec<TerritoryId>> = BTreeMap::new();
        for &territory in self.territories(nation) {
            for &neighbor in self.neighbors(territory) {
                if self.owner(neighbor) != nation {
                    targets.entry(neighbor).or_default().push(territory);
                }
            }
        }
        targets
    }

    /// Owned territory touching an enemy -> its enemy neighbours.
    pub fn in_border(&self, nation: NationId) -> BTreeMap<TerritoryId, Vec<TerritoryId>> {
        let mut border: BTreeMap<TerritoryId, Vec<TerritoryId>> = BTreeMap::new();
        for &territory in self.territories(nation) {
            for &neighbor in self.neighbors(territory) {
                if self.owner(neighbor) != nation {
                    border.entry(territory).or_default().push(neighbor);
                }
            }
        }
        border
    }

    pub fn set_owner(&mut self, territory: TerritoryId, nation: NationId) {
        let previous = self.owners[territory.0];
        if previous == nation {
            return;
        }
        self.nation_territories[previous.0].remove(&territory);
        self.nation_territories[nation.0].insert(territory);
        self.owners[territory.0] = nation;
    }

    pub fn set_troops(&mut self, territory: TerritoryId, troops: u32) {
        self.troops[territory.0] = troops;
    }

    pub fn add_troops(&mut self, territory: TerritoryId, troops: u32) {
        self.troops[territory.0] += troops;
    }

    pub fn remove_troops(&mut self, territory: TerritoryId, troops: u32) {
        let current = &mut self.troops[territory.0];
        *current = current.saturating_sub(troops);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            owners: self.owners.clone(),
            troops: self.troops.clone(),
        }
    }

    /// Restores the overlay captured by [`Board::checkpoint`], keeping the
    /// per-nation territory sets in step with the owners.
    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        for (i, &nation) in checkpoint.owners.iter().enumerate() {
            self.set_owner(TerritoryId(i), nation);
        }
        self.troops.copy_from_slice(&checkpoint.troops);
    }
}
