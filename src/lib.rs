//! tradejournal: trade journal analytics engine.
//!
//! Hexagonal architecture: calculators in [`domain`], port traits in [`ports`],
//! CSV and INI implementations in [`adapters`], the command line in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
