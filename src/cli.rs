use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand)]
pub enum Command {
    /// Check whether INPUT is a sentence of the grammar and show its derivations
    Recognize {
        /// Text to recognize, one terminal per character
        input: String
    },

    /// Generate random sentences
    Sample {
        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Depth after which generation heads for the shortest sentence
        #[arg(short, long, value_name = "DEPTH", default_value_t = 8)]
        depth: usize
    }
}
