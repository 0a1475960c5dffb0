//! Crypto portfolio backend: trade ledger over a position store, price
//! sources, and the HTTP API.

pub mod api;
pub mod assistant;
pub mod ledger;
pub mod persistence;
pub mod prices;
pub mod types;
