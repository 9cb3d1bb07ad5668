/*
    Chart items and the states that hold them. An item's provenance has one
    link per nonterminal of its rule recognized so far, left to right, each
    pointing at the completed item that justified it. Nonterminals stepped
    over because they are nullable leave no entry.
*/

use std::collections::HashMap;
use std::rc::Rc;

use super::MAX_DERIVATIONS;
use crate::grammar::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Predict,
    Scan,
    Complete,
}

// Points at chart[position][index]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub position: usize,
    pub index: usize,
}

impl Link {
    pub fn new(position: usize, index: usize) -> Self {
        Link { position, index }
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    pub rule: Rc<Rule>,
    pub dot: usize,
    pub start: usize,
    pub action: Action,
    pub provenance: Vec<Link>,
}

impl Item {
    pub fn predicted(rule: Rc<Rule>, start: usize) -> Self {
        Item {
            rule,
            dot: 0,
            start,
            action: Action::Predict,
            provenance: Vec::new(),
        }
    }

    pub fn advance(&self, action: Action) -> Self {
        Item {
            rule: Rc::clone(&self.rule),
            dot: self.dot + 1,
            start: self.start,
            action,
            provenance: self.provenance.clone(),
        }
    }

    pub fn next_symbol(&self) -> Option<&str> {
        self.rule.rhs.get(self.dot).map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.dot >= self.rule.rhs.len()
    }

    pub fn lhs(&self) -> &str {
        &self.rule.lhs
    }
}

// Strict keeps up to MAX_DERIVATIONS copies of a (rule, dot, start) triple
// that differ in provenance; Loose keeps one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    Strict,
    Loose,
}

impl Equality {
    pub fn for_grammar(recursive: bool) -> Self {
        if recursive {
            Equality::Loose
        } else {
            Equality::Strict
        }
    }

    fn copies(self) -> usize {
        match self {
            Equality::Strict => MAX_DERIVATIONS,
            Equality::Loose => 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ItemKey {
    rule: Rc<Rule>,
    dot: usize,
    start: usize,
}

impl ItemKey {
    fn of(item: &Item) -> Self {
        ItemKey {
            rule: Rc::clone(&item.rule),
            dot: item.dot,
            start: item.start,
        }
    }
}

// Provenances already admitted under each key
type Seen = HashMap<ItemKey, Vec<Vec<Link>>>;

fn admit(seen: &mut Seen, item: &Item, equality: Equality) -> bool {
    let copies = seen.entry(ItemKey::of(item)).or_default();
    if copies.len() >= equality.copies() || copies.contains(&item.provenance) {
        return false;
    }
    copies.push(item.provenance.clone());
    true
}

// Items are only ever appended and de-duplication keeps the first copy, so a
// `Link` stays valid once the item it names exists
#[derive(Debug)]
pub struct State {
    items: Vec<Item>,
    seen: Seen,
    equality: Equality,
}

impl State {
    pub fn new(equality: Equality) -> Self {
        State {
            items: Vec::new(),
            seen: Seen::new(),
            equality,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.seen.get(&ItemKey::of(item)).map_or(false, |copies| {
            self.equality == Equality::Loose || copies.contains(&item.provenance)
        })
    }

    pub fn insert(&mut self, item: Item) -> bool {
        if admit(&mut self.seen, &item, self.equality) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    // Unchecked; `dedup` has to run before the state is read again
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn dedup(&mut self) {
        let equality = self.equality;
        let mut seen = Seen::with_capacity(self.items.len());
        self.items.retain(|item| admit(&mut seen, item, equality));
        self.seen = seen;
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
