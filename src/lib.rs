pub mod advantage;
pub mod cards;
pub mod classifier;
pub mod cli;
pub mod display;
pub mod equity;
pub mod error;
pub mod evaluator;
pub mod hand;
pub mod narrator;
pub mod pipeline;
pub mod range;
pub mod report;
pub mod spr;
pub mod strategy;
pub mod texture;

pub use error::{CoachError, CoachResult};
pub use pipeline::analyze;
pub use report::Report;
