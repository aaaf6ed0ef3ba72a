pub mod cli;
pub mod config;
pub mod entity;
pub mod persistence;
pub mod simulation;
pub mod units;
pub mod world;
