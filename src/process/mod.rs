// src/process/mod.rs

pub mod county;
pub mod date_parser;
pub mod state;
pub mod utils;

pub use county::{load_county_snapshot, parse_county_report};
pub use state::{aggregate_states, build_state_table, load_state_snapshot, StateAggregate};
