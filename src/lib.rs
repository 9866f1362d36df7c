pub mod config;
pub mod error;
pub mod fetch;
pub mod interventions;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod projection;
pub mod reference;
pub mod shape;
pub mod table;
