/*
    The chart: one state per input position, filled with predict, scan and
    complete until nothing grows
*/

use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use super::analysis::Nullable;
use super::item::{Action, Equality, Item, Link, State};
use crate::grammar::Rule;

pub(crate) struct GrammarView<'a> {
    by_lhs: HashMap<&'a str, Vec<&'a Rc<Rule>>>,
    pub nullable: &'a Nullable,
}

impl<'a> GrammarView<'a> {
    pub fn new(rules: &'a [Rc<Rule>], nullable: &'a Nullable) -> Self {
        let mut by_lhs: HashMap<&str, Vec<&Rc<Rule>>> = HashMap::new();
        for rule in rules {
            by_lhs.entry(rule.lhs.as_str()).or_default().push(rule);
        }
        GrammarView { by_lhs, nullable }
    }

    // Exactly the symbols some rule defines
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.by_lhs.contains_key(symbol)
    }

    pub fn rules_for(&self, symbol: &str) -> &[&'a Rc<Rule>] {
        self.by_lhs.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug)]
pub struct Chart {
    states: Vec<State>,
    equality: Equality,
}

impl Chart {
    pub fn new(equality: Equality) -> Self {
        Chart {
            states: vec![State::new(equality)],
            equality,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn equality(&self) -> Equality {
        self.equality
    }

    pub fn state(&self, position: usize) -> Option<&State> {
        self.states.get(position)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn item(&self, link: Link) -> Option<&Item> {
        self.states.get(link.position)?.get(link.index)
    }

    pub(crate) fn seed(&mut self, grammar: &GrammarView, start: &str) {
        for rule in grammar.rules_for(start) {
            self.states[0].insert(Item::predicted(Rc::clone(rule), 0));
        }
    }

    // Both bounds move: scanning appends state i + 1 while prediction and
    // completion append to state i as it is walked
    pub(crate) fn fill(&mut self, grammar: &GrammarView, input: &[&str]) {
        let mut i = 0;
        while i < self.states.len() {
            let mut j = 0;
            while let Some(item) = self.states[i].get(j).cloned() {
                match item.next_symbol() {
                    None => self.complete(i, j, &item),
                    Some(symbol) if grammar.is_nonterminal(symbol) => self.predict(grammar, i, &item, symbol),
                    Some(symbol) => self.scan(input, i, &item, symbol),
                }
                j += 1;
            }
            trace!("state {} holds {} items", i, self.states[i].len());
            i += 1;
        }
    }

    fn complete(&mut self, i: usize, j: usize, item: &Item) {
        let lhs = item.lhs();
        let parents: Vec<Item> = self.states[item.start]
            .iter()
            .filter(|parent| parent.next_symbol() == Some(lhs))
            .cloned()
            .collect();

        for parent in parents {
            let mut advanced = parent.advance(Action::Complete);
            advanced.provenance.push(Link::new(i, j));
            self.states[i].insert(advanced);
        }
    }

    fn predict(&mut self, grammar: &GrammarView, i: usize, item: &Item, symbol: &str) {
        let state = &mut self.states[i];
        for rule in grammar.rules_for(symbol) {
            state.push(Item::predicted(Rc::clone(rule), i));
        }

        // A nullable symbol can be stepped over right away; no empty
        // derivation gets recorded for it.
        if grammar.nullable.contains(symbol) {
            state.push(item.advance(Action::Complete));
        }

        state.dedup();
    }

    fn scan(&mut self, input: &[&str], i: usize, item: &Item, symbol: &str) {
        if input.get(i) != Some(&symbol) {
            return;
        }

        if self.states.len() == i + 1 {
            self.states.push(State::new(self.equality));
        }
        self.states[i + 1].insert(item.advance(Action::Scan));
    }

    // Completed items for `start` spanning the whole input
    pub fn final_items(&self, start: &str) -> Vec<Link> {
        let Some(position) = self.states.len().checked_sub(1) else {
            return Vec::new();
        };

        self.states[position]
            .iter()
            .enumerate()
            .filter(|(_, item)| item.lhs() == start && item.start == 0 && item.is_complete())
            .map(|(index, _)| Link::new(position, index))
            .collect()
    }
}
