//! Position evaluation used by the path search.

use crate::board::{Board, NationId};
use crate::territory::TerritoryId;
use std::collections::BTreeSet;

/// Added when the nation owns every territory.
pub const DOMINATION_BONUS: f64 = 1000.0;

/// Border strength cap when the nation has no enemy neighbour.
const DEFAULT_BORDER_CAP: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoring {
    /// Troops plus twice the deployment entitlement.
    Material,
    /// Material plus border strength, minus half the opponents' entitlement,
    /// plus the domination bonus.
    #[default]
    Positional,
}

impl Scoring {
    pub fn score(&self, board: &Board, nation: NationId) -> f64 {
        match self {
            Scoring::Material => material(board, nation),
            Scoring::Positional => positional(board, nation),
        }
    }
}

pub fn material(board: &Board, nation: NationId) -> f64 {
    board.total_troops(nation) as f64 + 2.0 * board.deploy_num(nation) as f64
}

/// Geometric mean of the troops on the protective border (border
/// territories shielding an interior one), capped by the strongest enemy
/// neighbour.
pub fn border_strength(board: &Board, nation: NationId) -> f64 {
    let in_border = board.in_border(nation);
    let in_lands: BTreeSet<TerritoryId> = board
        .territories(nation)
        .iter()
        .copied()
        .filter(|t| !in_border.contains_key(t))
        .collect();

    let protective: Vec<u32> = in_border
        .keys()
        .filter(|&&t| board.neighbors(t).iter().any(|n| in_lands.contains(n)))
        .map(|&t| board.troops(t))
        .collect();

    let strength = if protective.is_empty() {
        0.0
    } else {
        let log_sum: f64 = protective.iter().map(|&troops| (troops as f64).ln()).sum();
        (log_sum / protective.len() as f64).exp()
    };

    let cap = board
        .out_border(nation)
        .keys()
        .map(|&t| board.troops(t))
        .max()
        .unwrap_or(DEFAULT_BORDER_CAP);

    strength.min(cap as f64)
}

pub fn positional(board: &Board, nation: NationId) -> f64 {
    let other_production: u32 = board
        .topology()
        .nation_ids()
        .filter(|&other| other != nation && board.is_active(other))
        .map(|other| board.deploy_num(other))
        .sum();
    let domination = if board.territories(nation).len() == board.territory_count() {
        DOMINATION_BONUS
    } else {
        0.0
    };

    material(board, nation) + border_strength(board, nation) - 0.5 * other_production as f64 + domination
}
