//! Core domain types and calculators.

pub mod aggregator;
pub mod asset_registry;
pub mod error;
pub mod journal;
pub mod outcome;
pub mod pnl;
pub mod reference;
pub mod reference_config;
pub mod risk_reward;
pub mod session;
pub mod timeframe;
pub mod trade;
