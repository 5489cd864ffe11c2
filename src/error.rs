use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown territory: {0}")]
    UnknownTerritory(String),

    #[error("Unknown nation: {0}")]
    UnknownNation(String),

    #[error("Unknown continent: {0}")]
    UnknownContinent(String),

    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Expected one strategy per nation ({expected}), got {found}")]
    StrategyCount { expected: usize, found: usize },

    #[error("No winner after {0} rounds")]
    RoundLimit(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
