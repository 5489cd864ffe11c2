use crate::board::NationId;
use crate::card::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub nation: NationId,
    pub name: String,
    pub cards: Vec<Card>,
    pub is_alive: bool,
    /// Set when the player conquers a territory; cleared by the end-of-turn draw.
    pub gets_card: bool,
}

impl Player {
    pub fn new(nation: NationId, name: &str) -> Self {
        Self {
            nation,
            name: name.to_string(),
            cards: Vec::new(),
            is_alive: true,
            gets_card: false,
        }
    }
}
