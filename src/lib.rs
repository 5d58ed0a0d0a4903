//! Incremental harvester of property listings with occupant reconciliation:
//! listings are scraped from the portal into per-location stores, each
//! unsearched listing is cross-referenced against a person registry, and
//! qualifying occupant candidates are short-listed into location reports.

pub mod config;
pub mod domain;
pub mod export;
pub mod portal;
pub mod registry;
pub mod store;
pub mod worker;

#[cfg(test)]
mod tests;
