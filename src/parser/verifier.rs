use crate::grammar::Symbol::Nonterminal;
use super::CompileErrorType::UndefinedNonterminal;
use super::{Alternative, CompileError, CompileErrors, FileResult, Location, Rewrite};

// Definitions in file order, each with the line it was first seen on
pub type IntermediateRuleset = Vec<(String, (Rewrite, Location))>;

fn is_defined(symbol: &str, rules: &IntermediateRuleset) -> bool {
    rules.iter().any(|(name, _)| name == symbol)
}

fn get_alternative_undefined_symbols(alternative: &Alternative, location: &Location, rules: &IntermediateRuleset) -> CompileErrors {
    // Filter out everything but nonterminals and unwrap the text from the
    // nonterminals. Then filter out all the undefined nonterminals.
    alternative.iter()
        .filter_map(|symbol| match symbol {
            Nonterminal(symbol) => Some(symbol),
            _ => None
        })
        .filter(|symbol| !is_defined(symbol, rules))
        .map(|symbol_text| CompileError {
            location: location.to_owned(),
            error: UndefinedNonterminal(symbol_text.to_owned())
        })
        .collect()
}

fn get_rewrite_undefined_symbols(rewrite: &Rewrite, location: &Location, rules: &IntermediateRuleset) -> CompileErrors {
    rewrite.iter()
        .flat_map(|alternative| get_alternative_undefined_symbols(alternative, location, rules))
        .collect()
}

fn get_undefined_symbols(rules: &IntermediateRuleset) -> CompileErrors {
    rules.iter()
        .flat_map(|(_, (rewrite, location))| get_rewrite_undefined_symbols(rewrite, location, rules))
        .collect()
}

pub fn verify_rules(rules: &IntermediateRuleset) -> FileResult<()> {
    let errors = get_undefined_symbols(rules);

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}

/// Checks that an overridden start symbol has a definition
pub fn verify_start(start: &str, rules: &[(String, Rewrite)], origin: &Location) -> FileResult<()> {
    if rules.iter().any(|(name, _)| name == start) {
        Ok(())
    } else {
        Err(vec![CompileError {
            location: origin.clone(),
            error: UndefinedNonterminal(start.to_string())
        }])
    }
}
