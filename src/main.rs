mod cli;

use std::process::ExitCode;

use chartparse::error_handling::{report, Location};
use chartparse::{generator, parser, Engine, Grammar, ParseOutcome};
use clap::Parser;
use itertools::Itertools;
use rand::prelude::*;

use cli::{Cli, Command};

const REJECTED: u8 = 1;
const BAD_GRAMMAR: u8 = 2;

fn recognize(grammar: &Grammar, start: &str, input: &str) -> ExitCode {
    let tokens = input.chars().map(String::from).collect_vec();
    let outcome = Engine::new(start).with_rules(grammar.productions()).parse(&tokens);

    match &outcome {
        ParseOutcome::Rejected => {
            println!("rejected");
            return ExitCode::from(REJECTED);
        }
        ParseOutcome::Single(derivation) => {
            println!("accepted");
            print!("{}", derivation);
        }
        ParseOutcome::Multiple(derivations) => {
            println!("accepted, {} derivations", derivations.len());
            for (num, derivation) in derivations.iter().enumerate() {
                println!("\n#{}", num + 1);
                print!("{}", derivation);
            }
        }
    }

    ExitCode::SUCCESS
}

fn sample(grammar: &Grammar, start: &str, amount: u32, seed: Option<u64>, depth: usize) -> ExitCode {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..amount {
        match generator::generate_from(grammar, start, &mut rng, depth) {
            Ok(sentence) => println!("{}", sentence.concat()),
            Err(error) => {
                eprintln!("{}", report(&vec![error]));
                return ExitCode::from(BAD_GRAMMAR);
            }
        }
    }

    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let grammar = match parser::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(errors) => {
            eprintln!("{}", report(&errors));
            return ExitCode::from(BAD_GRAMMAR);
        }
    };

    let start = cli.start.unwrap_or_else(|| grammar.start_symbol.clone());
    if let Err(errors) = parser::verify_start(&start, &grammar.rules, &Location::new(&cli.file)) {
        eprintln!("{}", report(&errors));
        return ExitCode::from(BAD_GRAMMAR);
    }

    match cli.command {
        Command::Recognize { input } => recognize(&grammar, &start, &input),
        Command::Sample { amount, seed, depth } => sample(&grammar, &start, amount, seed, depth),
    }
}
