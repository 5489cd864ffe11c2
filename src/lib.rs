// lib.rs
pub mod board;
pub mod card;
pub mod combat;
pub mod continent;
pub mod error;
pub mod game;
pub mod game_config;
pub mod path_search;
pub mod player;
pub mod render;
pub mod scoring;
pub mod snapshot;
pub mod strategy;
pub mod territory;
pub mod turn;
