/*
    Context-free recognition with Earley's chart parser, plus the grammar
    file front end that feeds it
*/

pub mod earley;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod parser;

pub use earley::{recognize, Derivation, Engine, ParseOutcome, Step};
pub use grammar::{Grammar, Rule};
