/*
    This module recognizes input with Earley's chart parser and rebuilds
    derivations from the finished chart
*/

mod analysis;
mod chart;
mod derivation;
mod forest;
mod item;

use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use crate::grammar::{Grammar, Rule};
use analysis::{is_recursive, nullable_symbols, Nullable};
use chart::GrammarView;

pub use chart::Chart;
pub use derivation::{Derivation, Step};
pub use forest::{NodeId, Tree, TreeNode};
pub use item::{Action, Equality, Item, Link, State};

/// Ambiguous input reports at most this many derivations
pub const MAX_DERIVATIONS: usize = 4;

/// What a parse found
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Rejected,
    Single(Derivation),
    Multiple(Vec<Derivation>),
}

impl ParseOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, ParseOutcome::Rejected)
    }

    /// -1 when rejected, otherwise the number of derivations
    pub fn length(&self) -> isize {
        match self {
            ParseOutcome::Rejected => -1,
            ParseOutcome::Single(_) => 1,
            ParseOutcome::Multiple(derivations) => derivations.len() as isize,
        }
    }

    pub fn derivations(&self) -> &[Derivation] {
        match self {
            ParseOutcome::Rejected => &[],
            ParseOutcome::Single(derivation) => std::slice::from_ref(derivation),
            ParseOutcome::Multiple(derivations) => derivations,
        }
    }
}

/// Owns a grammar and the chart of the most recent parse
#[derive(Debug)]
pub struct Engine {
    start: String,
    rules: Vec<Rc<Rule>>,
    chart: Chart,
}

impl Engine {
    pub fn new(start: impl Into<String>) -> Self {
        Engine {
            start: start.into(),
            rules: Vec::new(),
            chart: Chart::new(Equality::Strict),
        }
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.set_rules(rules);
        self
    }

    /// An engine for the grammar's own start symbol
    pub fn for_grammar(grammar: &Grammar) -> Self {
        Engine::new(grammar.start_symbol.as_str()).with_rules(grammar.productions())
    }

    /// Replaces the grammar. Analysis waits until the next parse.
    pub fn set_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        self.rules = rules.into_iter().map(Rc::new).collect();
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn start_symbol(&self) -> &str {
        &self.start
    }

    /// The chart left behind by the last parse
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Drops the chart, keeping the grammar
    pub fn restart(&mut self) {
        self.chart = Chart::new(Equality::Strict);
    }

    /// Drops the grammar and the chart
    pub fn reset(&mut self) {
        self.rules.clear();
        self.restart();
    }

    /// Recognizes `input`, one terminal per element.
    ///
    /// Every call starts from a fresh chart, so parses never leak into each
    /// other. Rejection covers stalled scanning, a missing final item and a
    /// derivation that fails to replay back to the input.
    pub fn parse<T: AsRef<str>>(&mut self, input: &[T]) -> ParseOutcome {
        let tokens: Vec<&str> = input.iter().map(AsRef::as_ref).collect();

        let nullable = nullable_symbols(&self.rules);
        let equality = Equality::for_grammar(is_recursive(&self.rules, &nullable));
        debug!("{} rules, {} nullable, {:?} equality", self.rules.len(), nullable.len(), equality);

        let grammar = GrammarView::new(&self.rules, &nullable);
        self.chart = Chart::new(equality);
        self.chart.seed(&grammar, &self.start);
        self.chart.fill(&grammar, &tokens);

        if self.chart.len() < tokens.len() + 1 {
            debug!("scanning stalled at position {} of {}", self.chart.len() - 1, tokens.len());
            return ParseOutcome::Rejected;
        }

        let finals = self.chart.final_items(&self.start);
        debug!("{} final items", finals.len());

        match finals.as_slice() {
            [] => ParseOutcome::Rejected,
            [only] => match derive(&self.chart, &grammar, &nullable, *only, &tokens) {
                Some(derivation) => ParseOutcome::Single(derivation),
                None => ParseOutcome::Rejected,
            },
            _ => {
                let mut seen = HashSet::new();
                let mut unique: Vec<Derivation> = finals.iter()
                    .filter_map(|&link| derive(&self.chart, &grammar, &nullable, link, &tokens))
                    .filter(|derivation| seen.insert(derivation.clone()))
                    .take(MAX_DERIVATIONS)
                    .collect();
                debug!("{} distinct derivations", unique.len());

                match unique.len() {
                    0 => ParseOutcome::Rejected,
                    1 => ParseOutcome::Single(unique.remove(0)),
                    _ => ParseOutcome::Multiple(unique),
                }
            }
        }
    }
}

// Builds and replays the tree under `root`, keeping it only if it spells
// the input
fn derive(chart: &Chart, grammar: &GrammarView, nullable: &Nullable, root: Link, input: &[&str]) -> Option<Derivation> {
    let tree = forest::build(chart, grammar, root);
    let (derivation, form) = derivation::replay(&tree, chart, nullable);

    if form == input {
        Some(derivation)
    } else {
        debug!("derivation from {:?} replays to {:?}", root, form);
        None
    }
}

/// Parses `input` with a throwaway engine
pub fn recognize<T: AsRef<str>>(start: &str, rules: impl IntoIterator<Item = Rule>, input: &[T]) -> ParseOutcome {
    Engine::new(start).with_rules(rules).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(list: &[(&str, &str)]) -> Vec<Rule> {
        list.iter().map(|(lhs, rhs)| Rule::chars(lhs, rhs)).collect()
    }

    fn tokens(text: &str) -> Vec<String> {
        text.chars().map(String::from).collect()
    }

    fn pairs(derivation: &Derivation) -> Vec<(&str, &str)> {
        derivation.steps().iter().map(|step| (step.rule.as_str(), step.result.as_str())).collect()
    }

    #[test]
    fn balanced_strings() {
        let outcome = recognize("S", rules(&[("S", "aSb"), ("S", "")]), &tokens("aabb"));

        assert_eq!(outcome.length(), 1);
        let ParseOutcome::Single(derivation) = &outcome else {
            panic!("expected a single derivation, got {:?}", outcome);
        };
        assert_eq!(pairs(derivation), vec![
            ("Start → S", "S"),
            ("S → aSb", "aSb"),
            ("S → aSb", "aaSbb"),
            ("S → ε", "aabb"),
        ]);
    }

    #[test]
    fn foreign_terminal_is_rejected() {
        let outcome = recognize("S", rules(&[("S", "a"), ("S", "b")]), &tokens("c"));
        assert!(!outcome.accepted());
        assert_eq!(outcome.length(), -1);
        assert!(outcome.derivations().is_empty());
    }

    #[test]
    fn empty_input_with_nullable_start() {
        let outcome = recognize("S", rules(&[("S", "")]), &tokens(""));
        assert_eq!(outcome.length(), 1);
        assert_eq!(pairs(&outcome.derivations()[0]), vec![("Start → S", "S"), ("S → ε", "")]);
    }

    #[test]
    fn concatenation_grammar_accepts() {
        // S → SS is left-recursive, so items compare loosely and the single
        // surviving final item yields one derivation
        let outcome = recognize("S", rules(&[("S", "SS"), ("S", "a")]), &tokens("aa"));
        assert!(outcome.accepted());
        assert_eq!(outcome.length(), 1);
        assert_eq!(outcome.derivations()[0].result(), "aa");
    }

    #[test]
    fn right_recursion() {
        let outcome = recognize("S", rules(&[("S", "aS"), ("S", "a")]), &tokens("aaa"));
        assert_eq!(outcome.length(), 1);
        assert_eq!(pairs(&outcome.derivations()[0]), vec![
            ("Start → S", "S"),
            ("S → aS", "aS"),
            ("S → aS", "aaS"),
            ("S → a", "aaa"),
        ]);
    }

    #[test]
    fn left_recursion() {
        let outcome = recognize("S", rules(&[("S", "Sa"), ("S", "a")]), &tokens("aa"));
        assert_eq!(outcome.length(), 1);
        assert_eq!(pairs(&outcome.derivations()[0]), vec![
            ("Start → S", "S"),
            ("S → Sa", "Sa"),
            ("S → a", "aa"),
        ]);

        let long = "a".repeat(60);
        assert!(recognize("S", rules(&[("S", "Sa"), ("S", "a")]), &tokens(&long)).accepted());
    }

    #[test]
    fn ambiguity_yields_every_derivation() {
        let outcome = recognize("S", rules(&[("S", "aB"), ("S", "Ab"), ("A", "a"), ("B", "b")]), &tokens("ab"));
        assert_eq!(outcome.length(), 2);

        let mut found: Vec<Vec<(&str, &str)>> = outcome.derivations().iter().map(pairs).collect();
        found.sort();
        assert_eq!(found, vec![
            vec![("Start → S", "S"), ("S → Ab", "Ab"), ("A → a", "ab")],
            vec![("Start → S", "S"), ("S → aB", "aB"), ("B → b", "ab")],
        ]);
    }

    #[test]
    fn derivations_are_capped() {
        let grammar = rules(&[
            ("S", "A"), ("S", "B"), ("S", "C"), ("S", "D"), ("S", "E"), ("S", "F"),
            ("A", "a"), ("B", "a"), ("C", "a"), ("D", "a"), ("E", "a"), ("F", "a"),
        ]);
        let outcome = recognize("S", grammar, &tokens("a"));

        assert_eq!(outcome.length(), MAX_DERIVATIONS as isize);
        assert!(matches!(outcome, ParseOutcome::Multiple(_)));
        assert!(outcome.derivations().iter().all(|d| d.result() == "a"));
    }

    #[test]
    fn overlapping_alternatives_stay_polynomial() {
        let grammar = rules(&[("S", "aS"), ("S", "aaS"), ("S", "a"), ("S", "aa")]);
        let mut engine = Engine::new("S").with_rules(grammar);

        let outcome = engine.parse(&tokens(&"a".repeat(40)));
        assert!(outcome.accepted());
        assert!(outcome.length() <= MAX_DERIVATIONS as isize);
        assert!(outcome.derivations().iter().all(|d| d.result() == "a".repeat(40)));

        assert_eq!(engine.chart().equality(), Equality::Strict);
        let items: usize = engine.chart().states().iter().map(State::len).sum();
        // 12 dotted rules, one start per earlier position, a few copies each
        assert!(items <= 12 * MAX_DERIVATIONS * 41 * 42 / 2, "{} items for 40 tokens", items);
    }

    #[test]
    fn unit_cycles_terminate() {
        let outcome = recognize("S", rules(&[("S", "S"), ("S", "a")]), &tokens("a"));
        assert_eq!(outcome.length(), 2);

        let mut found: Vec<Vec<(&str, &str)>> = outcome.derivations().iter().map(pairs).collect();
        found.sort();
        assert_eq!(found, vec![
            vec![("Start → S", "S"), ("S → S", "S"), ("S → a", "a")],
            vec![("Start → S", "S"), ("S → a", "a")],
        ]);
    }

    #[test]
    fn missing_start_rules_reject_everything() {
        assert!(!recognize("S", Vec::<Rule>::new(), &tokens("")).accepted());
        assert!(!recognize("S", Vec::<Rule>::new(), &tokens("a")).accepted());
        assert!(!recognize("T", rules(&[("S", "")]), &tokens("")).accepted());
    }

    #[test]
    fn input_longer_than_any_sentence() {
        let outcome = recognize("S", rules(&[("S", "ab")]), &tokens("abb"));
        assert_eq!(outcome, ParseOutcome::Rejected);
    }

    #[test]
    fn multi_character_symbols() {
        let grammar = vec![
            Rule::new("expr", ["expr", "+", "term"]),
            Rule::new("expr", ["term"]),
            Rule::new("term", ["x"]),
        ];
        let outcome = recognize("expr", grammar, &["x", "+", "x"]);

        assert_eq!(outcome.length(), 1);
        assert_eq!(pairs(&outcome.derivations()[0]), vec![
            ("Start → expr", "expr"),
            ("expr → expr+term", "expr+term"),
            ("expr → term", "term+term"),
            ("term → x", "x+term"),
            ("term → x", "x+x"),
        ]);
    }

    #[test]
    fn restart_keeps_grammar() {
        let mut engine = Engine::new("S").with_rules(rules(&[("S", "aSb"), ("S", "")]));
        let first = engine.parse(&tokens("ab"));
        engine.restart();
        let second = engine.parse(&tokens("ab"));

        assert_eq!(first, second);
        assert_eq!(first, Engine::new("S").with_rules(rules(&[("S", "aSb"), ("S", "")])).parse(&tokens("ab")));
        assert_eq!(engine.rules().count(), 2);
    }

    #[test]
    fn back_to_back_parses_do_not_mix() {
        let mut engine = Engine::new("S").with_rules(rules(&[("S", "aS"), ("S", "a")]));
        assert!(engine.parse(&tokens("aaaa")).accepted());
        assert!(!engine.parse(&tokens("ab")).accepted());
        assert!(engine.parse(&tokens("a")).accepted());
        assert_eq!(engine.chart().len(), 2);
    }

    #[test]
    fn reset_forgets_grammar() {
        let mut engine = Engine::new("S").with_rules(rules(&[("S", "a")]));
        assert!(engine.parse(&tokens("a")).accepted());

        engine.reset();
        assert_eq!(engine.rules().count(), 0);
        assert_eq!(engine.chart().len(), 1);
        assert!(!engine.parse(&tokens("a")).accepted());

        engine.set_rules(rules(&[("S", "b")]));
        assert!(engine.parse(&tokens("b")).accepted());
        assert_eq!(engine.start_symbol(), "S");
    }

    #[test]
    fn grammar_files_drive_the_engine() {
        let grammar = crate::parser::parse_str(
            "expr = expr \"+\" term | term\nterm = term \"*\" factor | factor\nfactor = \"(\" expr \")\" | \"a\"",
            &crate::error_handling::Location::new(""),
        ).unwrap();
        let mut engine = Engine::for_grammar(&grammar);

        assert!(engine.parse(&tokens("a+a*(a+a)")).accepted());
        assert!(engine.parse(&tokens("((a))")).accepted());
        assert!(!engine.parse(&tokens("a+")).accepted());
        assert!(!engine.parse(&tokens("(a")).accepted());
        assert!(!engine.parse(&tokens("")).accepted());
    }
}
