/*
    This module is for storing and manipulating grammars
*/

use std::fmt::Display;

use itertools::Itertools;

// The base unit in a grammar file rule
#[derive(Debug, PartialEq, Clone)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

// The symbols in a single alternative
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

/// A grammar as written in a grammar file. Definitions keep file order,
/// since the order of alternatives decides tie-breaks between derivations.
#[derive(Debug, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    pub rules: Vec<(String, Rewrite)>,
}

impl Grammar {
    pub fn rewrite(&self, nonterminal: &str) -> Option<&Rewrite> {
        self.rules
            .iter()
            .find(|(symbol, _)| symbol == nonterminal)
            .map(|(_, rewrite)| rewrite)
    }

    pub fn defines(&self, nonterminal: &str) -> bool {
        self.rewrite(nonterminal).is_some()
    }

    /// Lowers the grammar into the flat production list the engine works on.
    ///
    /// Every alternative becomes one `Rule`, in file order. Terminals are
    /// split into one symbol per character, so `"ab"` occupies two input
    /// positions and `""` occupies none.
    pub fn productions(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .flat_map(|(symbol, rewrite)| {
                rewrite.iter().map(move |alternative| Rule {
                    lhs: symbol.clone(),
                    rhs: atomize(alternative),
                })
            })
            .collect()
    }
}

fn atomize(alternative: &Alternative) -> Vec<String> {
    alternative
        .iter()
        .flat_map(|symbol| match symbol {
            Symbol::Nonterminal(name) => vec![name.clone()],
            Symbol::Terminal(text) => text.chars().map(String::from).collect(),
        })
        .collect()
}

/// A single production over atomic symbols. Rules compare by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub lhs: String,
    pub rhs: Vec<String>,
}

impl Rule {
    pub fn new<S: Into<String>>(lhs: impl Into<String>, rhs: impl IntoIterator<Item = S>) -> Self {
        Rule {
            lhs: lhs.into(),
            rhs: rhs.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand where every character of `rhs` is one symbol
    pub fn chars(lhs: &str, rhs: &str) -> Self {
        Rule::new(lhs, rhs.chars().map(String::from))
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} → ε", self.lhs)
        } else {
            write!(f, "{} → {}", self.lhs, self.rhs.iter().join(""))
        }
    }
}
