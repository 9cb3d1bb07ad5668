use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::debug;

use crate::grammar::Rule;

/// Nonterminals that derive the empty string.
///
/// Besides membership this remembers, per symbol, the rule that first proved
/// it nullable. Every symbol on that rule's right side became nullable
/// earlier, so erasing with these rules always bottoms out.
#[derive(Debug, Default)]
pub struct Nullable {
    symbols: HashSet<String>,
    erasers: HashMap<String, Rc<Rule>>,
}

impl Nullable {
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The rule used to erase `symbol` from a sentential form
    pub fn eraser(&self, symbol: &str) -> Option<&Rc<Rule>> {
        self.erasers.get(symbol)
    }

    fn add(&mut self, rule: &Rc<Rule>) {
        if self.symbols.insert(rule.lhs.clone()) {
            self.erasers.insert(rule.lhs.clone(), Rc::clone(rule));
        }
    }
}

/// Least fixpoint: seed with the left sides of empty rules, then keep adding
/// left sides whose right side is entirely nullable until nothing changes.
pub fn nullable_symbols(rules: &[Rc<Rule>]) -> Nullable {
    let mut nullable = Nullable::default();

    for rule in rules.iter().filter(|rule| rule.is_empty()) {
        nullable.add(rule);
    }

    loop {
        let before = nullable.len();
        for rule in rules {
            if !nullable.contains(&rule.lhs) && rule.rhs.iter().all(|symbol| nullable.contains(symbol)) {
                nullable.add(rule);
            }
        }
        if nullable.len() == before {
            break;
        }
    }

    nullable
}

/// Whether some nonterminal can derive a sentential form that starts with
/// itself.
///
/// The direct case (`A → A…`) is checked first. Otherwise nonterminals are
/// numbered in order of first definition and a left-corner graph is built:
/// `A → B` whenever `B` can open a right side of `A`, looking past leading
/// nullable symbols. Any cycle in that graph is indirect (or hidden) left
/// recursion.
pub fn is_recursive(rules: &[Rc<Rule>], nullable: &Nullable) -> bool {
    if rules.iter().any(|rule| rule.rhs.first() == Some(&rule.lhs)) {
        debug!("grammar is directly left-recursive");
        return true;
    }

    let mut numbering: HashMap<&str, usize> = HashMap::new();
    for rule in rules {
        let next = numbering.len();
        numbering.entry(rule.lhs.as_str()).or_insert(next);
    }

    let mut corners: Vec<HashSet<usize>> = vec![HashSet::new(); numbering.len()];
    for rule in rules {
        let from = numbering[rule.lhs.as_str()];
        for symbol in &rule.rhs {
            if let Some(&to) = numbering.get(symbol.as_str()) {
                corners[from].insert(to);
            }
            if !nullable.contains(symbol) {
                break;
            }
        }
    }

    let recursive = (0..corners.len()).any(|origin| reaches(&corners, origin, origin));
    if recursive {
        debug!("grammar is indirectly left-recursive");
    }
    recursive
}

// Whether `target` can be reached from `origin` in one or more steps
fn reaches(corners: &[HashSet<usize>], origin: usize, target: usize) -> bool {
    let mut visited = vec![false; corners.len()];
    let mut stack: Vec<usize> = corners[origin].iter().copied().collect();

    while let Some(node) = stack.pop() {
        if node == target {
            return true;
        }
        if !visited[node] {
            visited[node] = true;
            stack.extend(corners[node].iter().copied());
        }
    }

    false
}
