/*
    This module generates random sentences from a grammar
*/

use rand::prelude::*;
use std::collections::HashMap;
use std::fmt::Display;

use crate::grammar::*;
use crate::error_handling::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // An undefined nonterminal was used
    UndefinedNonterminal(String),
    // A nonterminal has no finite derivation
    Unproductive(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateErrorType::Unproductive(nonterminal) => write!(f, "Nonterminal `{}` never derives a sentence", nonterminal),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult<T> = Result<T, GenerateError>;

// Smallest derivation height of every productive nonterminal
type Heights<'a> = HashMap<&'a str, usize>;

// Height of an alternative: one more than its tallest nonterminal, or None if
// some nonterminal in it has no height (yet)
fn alternative_height(alternative: &Alternative, heights: &Heights) -> Option<usize> {
    alternative.iter().try_fold(1, |height, symbol| match symbol {
        Symbol::Terminal(_) => Some(height),
        Symbol::Nonterminal(name) => heights.get(name.as_str()).map(|h| height.max(h + 1)),
    })
}

fn heights(grammar: &Grammar) -> Heights {
    let mut heights = Heights::new();
    loop {
        let mut changed = false;
        for (symbol, rewrite) in &grammar.rules {
            let best = rewrite.iter().filter_map(|a| alternative_height(a, &heights)).min();
            if let Some(best) = best {
                if heights.get(symbol.as_str()).map_or(true, |&current| best < current) {
                    heights.insert(symbol.as_str(), best);
                    changed = true;
                }
            }
        }
        if !changed {
            return heights;
        }
    }
}

struct Generator<'a, R: Rng + ?Sized> {
    grammar: &'a Grammar,
    heights: Heights<'a>,
    rng: &'a mut R,
    max_depth: usize,
    location: Location,
}

impl<'a, R: Rng + ?Sized> Generator<'a, R> {
    fn error(&self, error: GenerateErrorType) -> GenerateError {
        GenerateError::new(self.location.clone(), error)
    }

    fn generate_nonterminal(&mut self, nonterminal: &str, depth: usize, sentence: &mut Vec<String>) -> GenResult<()> {
        let grammar = self.grammar;
        let rewrite = grammar
            .rewrite(nonterminal)
            .ok_or_else(|| self.error(GenerateErrorType::UndefinedNonterminal(nonterminal.to_string())))?;

        let productive: Vec<(&Alternative, usize)> = rewrite.iter()
            .filter_map(|a| alternative_height(a, &self.heights).map(|h| (a, h)))
            .collect();

        // Past the depth limit only the shortest alternatives are used, and
        // each of those strictly lowers the remaining height
        let alternative = if depth < self.max_depth {
            productive.choose(&mut *self.rng).map(|&(a, _)| a)
        } else {
            productive.iter().min_by_key(|&&(_, h)| h).map(|&(a, _)| a)
        };
        let alternative = alternative
            .ok_or_else(|| self.error(GenerateErrorType::Unproductive(nonterminal.to_string())))?;

        for symbol in alternative {
            match symbol {
                Symbol::Nonterminal(name) => self.generate_nonterminal(name, depth + 1, sentence)?,
                Symbol::Terminal(text) => sentence.extend(text.chars().map(String::from)),
            }
        }

        Ok(())
    }
}

/// Generates a sentence from the grammar's start symbol, one token per
/// terminal character
pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, rng: &mut R, max_depth: usize) -> GenResult<Vec<String>> {
    generate_from(grammar, &grammar.start_symbol, rng, max_depth)
}

// Generates a sentence in the given grammar starting with the given symbol
pub fn generate_from<R: Rng + ?Sized>(grammar: &Grammar, start: &str, rng: &mut R, max_depth: usize) -> GenResult<Vec<String>> {
    let mut generator = Generator {
        grammar,
        heights: heights(grammar),
        rng,
        max_depth,
        location: Location::new(""),
    };

    let mut sentence = Vec::new();
    generator.generate_nonterminal(start, 0, &mut sentence)?;
    Ok(sentence)
}
