/*
    This module parses BNF grammar files
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::path::Path;

use crate::grammar::*;
use crate::error_handling::*;
use itertools::Itertools;
use lexer::*;
use verifier::verify_rules;
use verifier::IntermediateRuleset;

pub use verifier::verify_start;

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a rule does not
    MissingEquals,
    // A rule has multiple equals signs
    UnexpectedEquals,
    // The user starts a rule line with something other than a nonterminal
    MissingNonterminal,
    // There is an unclosed quote
    UnmatchedQuote,
    // A backslash inside a terminal is followed by something we don't know
    UnknownEscape(char),
    // An undefined token was used
    UndefinedNonterminal(String),
    // Somehow a full rewrite was parsed as a base alternative
    // This is a problem with chartparse, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with chartparse, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::UnknownEscape(a), CompileErrorType::UnknownEscape(b)) => a == b,
            (CompileErrorType::UndefinedNonterminal(a), CompileErrorType::UndefinedNonterminal(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingEquals => write!(f, "Expected `=` after nonterminal"),
            CompileErrorType::UnexpectedEquals => write!(f, "Unexpected `=` encountered"),
            CompileErrorType::MissingNonterminal => write!(f, "Tried to define something other than a nonterminal"),
            CompileErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            CompileErrorType::UnknownEscape(c) => write!(f, "Unknown escape `\\{}` in terminal", c),
            CompileErrorType::UndefinedNonterminal(nonterminal) => write!(f, "Could not find definition for `{}`", nonterminal),
            CompileErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with chartparse, not the grammar)"),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with chartparse, not the grammar)"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    tokens.iter().map(|t| match t {
        Token::Equals => Err(CompileErrorType::UnexpectedEquals),
        Token::Or => Err(CompileErrorType::UnsplitRewrite),
        Token::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
        Token::Terminal(s) => Ok(Symbol::Terminal(s.clone()))
    }).collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let symbol = match tokens.get(0) {
        Some(Token::Nonterminal(s)) => Ok(s.clone()),
        Some(_) => Err(CompileErrorType::MissingNonterminal),
        None => Err(CompileErrorType::UnexpectedBlankLine)
    }?;

    if tokens.get(1) != Some(&Token::Equals) {
        return Err(CompileErrorType::MissingEquals)
    }

    let rewrite = parse_rewrite(&tokens[2..])?;

    return Ok(Rule {
        symbol,
        rewrite,
        location
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

fn is_rule_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Lines that hold rules, numbered from 1
fn rule_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| is_rule_line(line))
        .map(|(num, line)| (num + 1, line))
}

// Folds repeated definitions of a nonterminal into one, keeping the order
// in which names and alternatives first appear
fn ruleset_from_rules(rules: Vec<Rule>) -> FileResult<Vec<(String, Rewrite)>> {
    let mut ruleset = IntermediateRuleset::with_capacity(rules.len());
    for rule in rules {
        match ruleset.iter_mut().find(|(symbol, _)| *symbol == rule.symbol) {
            Some((_, (rewrite, _))) => rewrite.extend(rule.rewrite),
            None => ruleset.push((rule.symbol, (rule.rewrite, rule.location))),
        }
    }

    verify_rules(&ruleset)?;

    return Ok(ruleset.into_iter().map(|(symbol, (rewrite, _))| (symbol, rewrite)).collect());
}

fn grammar_from_rules(rule_list: Vec<Rule>) -> FileResult<Grammar> {
    let start_symbol = match rule_list.first() {
        Some(rule) => rule.symbol.clone(),
        None => String::new(),
    };

    let rules = ruleset_from_rules(rule_list)?;

    return Ok(Grammar {
        start_symbol,
        rules
    })
}

/// Parses grammar text. `origin` only labels error locations.
pub fn parse_str(text: &str, origin: &Location) -> FileResult<Grammar> {
    let parsed_lines = rule_lines(text)
        .map(|(num, line)| parse_lex_line(line, origin.at_line(num)));

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if errors.len() > 0 {
        return Err(errors);
    }

    return grammar_from_rules(rules);
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let origin = Location::new(path);
    let text = std::fs::read_to_string(path).map_err(|e| vec![CompileError {
        location: origin.clone(),
        error: CompileErrorType::FileError(e)
    }])?;

    parse_str(&text, &origin)
}
