//! pharaoh-core: the numeric engine of an ancient estate simulation.
//!
//! The estate is a set of stocks (slaves, herds, land, wheat, gold) that
//! the monthly step advances through response tables. A symbol table
//! exposes every saved cell by name for the text save format.

pub mod advice;
pub mod clock;
pub mod command;
pub mod config;
pub mod economy_subsystem;
pub mod engine;
pub mod error;
pub mod event;
pub mod hazard_subsystem;
pub mod name_generator;
pub mod narration;
pub mod records;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod step;
pub mod store;
pub mod subsystem;
pub mod symbols;
pub mod table;
pub mod types;
pub mod words;
