use itertools::structs::PeekNth;
use itertools::{peek_nth, Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Equals,
    Or,
    Nonterminal(String),
    Terminal(String)
}

// Characters that end a bare nonterminal name
fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && c != '|' && c != '\"' && c != '='
}

pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    line.next(); // Consume open quote
    let mut token_text = String::new();

    loop {
        token_text.extend(line.peeking_take_while(|&c| c != '\"' && c != '\\'));
        match line.next() {
            Some('\"') => return Ok(Token::Terminal(token_text)),
            Some('\\') => token_text.push(lex_escape(&mut *line)?),
            _ => return Err(CompileErrorType::UnmatchedQuote),
        }
    }
}

fn lex_escape(line: &mut impl Iterator<Item = char>) -> Result<char> {
    match line.next() {
        Some('n') => Ok('\n'),
        Some('t') => Ok('\t'),
        Some(c @ ('\"' | '\\')) => Ok(c),
        Some(c) => Err(CompileErrorType::UnknownEscape(c)),
        None => Err(CompileErrorType::UnmatchedQuote),
    }
}

// `->` or `::=` written straight after a name still ends it
fn at_arrow<I: Iterator<Item = char>>(line: &mut PeekNth<I>) -> bool {
    match line.peek().copied() {
        Some('-') => line.peek_nth(1) == Some(&'>'),
        Some(':') => line.peek_nth(1) == Some(&':') && line.peek_nth(2) == Some(&'='),
        _ => false,
    }
}

fn take_name<I: Iterator<Item = char>>(line: &mut PeekNth<I>) -> String {
    let mut name = String::new();
    while !at_arrow(line) {
        match line.peeking_next(|&c| is_name_char(c)) {
            Some(c) => name.push(c),
            None => break,
        }
    }
    name
}

pub fn lex_nonterminal<I: Iterator<Item = char>>(line: &mut PeekNth<I>) -> Result<Token> {
    Ok(Token::Nonterminal(take_name(line)))
}

// `=`, `->` and `::=` all separate a rule's name from its rewrite
fn lex_arrow(line: &mut impl PeekingNext<Item = char>) -> Option<Token> {
    let arrow: String = line.peeking_take_while(|&c| c == ':' || c == '-' || c == '>' || c == '=').collect();
    match arrow.as_str() {
        "=" | "->" | "::=" => Some(Token::Equals),
        "" => None,
        other => Some(Token::Nonterminal(other.to_string())),
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = peek_nth(line.chars());

    while let Some(c) = line_chars.peek() {
        if *c == '=' || *c == ':' || *c == '-' {
            match lex_arrow(&mut line_chars) {
                Some(Token::Nonterminal(start)) => {
                    // Not an arrow after all, just a name that starts with punctuation
                    tokens.push(Token::Nonterminal(start + &take_name(&mut line_chars)));
                }
                Some(token) => tokens.push(token),
                None => {}
            }
        } else if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if *c == '\"' {
            tokens.push(lex_terminal(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_nonterminal(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    return Ok(tokens);
}
