//! SeaORM entities for the sample_app tables

pub mod author_clones;
pub mod authors;
pub mod choices;
pub mod questions;
