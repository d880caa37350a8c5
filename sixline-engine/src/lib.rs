pub mod aggregator;
pub mod backtest;
pub mod bankroll;
pub mod catalog;
pub mod config;
pub mod heuristics;
pub mod matcher;
pub mod parse;
pub mod session;
pub mod strategy;

pub use catalog::BetType;
pub use strategy::{analyze_strategy, StrategyConfig, StrategyEngine, StrategyResult};
