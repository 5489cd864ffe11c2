use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContinentId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Continent {
    pub name: String,
    pub bonus_armies: u32,
    pub territories: Vec<TerritoryId>,
}

impl Continent {
    pub fn new(name: &str, bonus_armies: u32) -> Self {
        Self {
            name: name.to_string(),
            bonus_armies,
            territories: Vec::new(),
        }
    }

    pub fn add_territory(&mut self, territory: TerritoryId) {
        if !self.territories.contains(&territory) {
            self.territories.push(territory);
        }
    }
}
