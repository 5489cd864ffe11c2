use crate::board::NationId;
use crate::game::GameState;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Card {
    One,
    Two,
    Three,
}

impl Card {
    pub const ALL: [Card; 3] = [Card::One, Card::Two, Card::Three];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Finds a tradable set in a hand: three of one value, otherwise one of
/// each value. A triple takes precedence when both are present.
pub fn find_set(cards: &[Card]) -> Option<[Card; 3]> {
    let triple = Card::ALL
        .into_iter()
        .find(|&kind| cards.iter().filter(|&&c| c == kind).count() >= 3);
    if let Some(kind) = triple {
        return Some([kind; 3]);
    }
    Card::ALL
        .iter()
        .all(|kind| cards.contains(kind))
        .then_some(Card::ALL)
}

/// Removes exactly the cards of one set from the hand.
pub fn pop_set(cards: &mut Vec<Card>) -> Option<[Card; 3]> {
    let set = find_set(cards)?;
    for card in set {
        if let Some(index) = cards.iter().position(|&c| c == card) {
            cards.remove(index);
        }
    }
    Some(set)
}

impl GameState {
    /// Trades one card set of the nation's player, if it holds one, and
    /// returns the bonus troops gained.
    pub fn trade_cards(&mut self, nation: NationId) -> u32 {
        let bonus = self.rules().card_bonus;
        let player = self.player_mut(nation);
        match pop_set(&mut player.cards) {
            Some(set) => {
                debug!("{} traded {:?} for {} troops.", player.name, set, bonus);
                bonus
            }
            None => 0,
        }
    }

    /// Grants the pending card of a player that conquered this turn.
    pub fn draw_card(&mut self, nation: NationId) {
        if !self.player(nation).gets_card {
            return;
        }
        let card = Card::random(self.rng());
        let player = self.player_mut(nation);
        player.cards.push(card);
        player.gets_card = false;
    }
}
