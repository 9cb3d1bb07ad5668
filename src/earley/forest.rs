/*
    Parse trees unfolded from the provenance of a completed item. Provenance
    slots are consumed by nonterminal positions only, and a nonterminal with
    no slot left becomes a bare leaf.
*/

use super::chart::{Chart, GrammarView};
use super::item::Link;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub value: String,
    pub item: Option<Link>,
    pub children: Vec<NodeId>,
}

// Arena of nodes, root first
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    // Leaf values, left to right
    pub fn frontier(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.children.is_empty() {
                leaves.push(node.value.as_str());
            }
            stack.extend(node.children.iter().rev());
        }
        leaves
    }

    fn add(&mut self, value: &str, item: Option<Link>) -> NodeId {
        self.nodes.push(TreeNode {
            value: value.to_string(),
            item,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: NodeId, value: &str, item: Option<Link>) -> NodeId {
        let child = self.add(value, item);
        self.nodes[parent].children.push(child);
        child
    }
}

pub(crate) fn build(chart: &Chart, grammar: &GrammarView, root: Link) -> Tree {
    let mut tree = Tree::default();
    let symbol = chart.item(root).map(|item| item.lhs()).unwrap_or_default();
    let mut stack = vec![tree.add(symbol, Some(root))];

    while let Some(id) = stack.pop() {
        let Some(item) = tree.node(id).item.and_then(|link| chart.item(link)) else {
            continue;
        };

        if item.rule.is_empty() {
            tree.attach(id, "", None);
            continue;
        }

        let mut slot = 0;
        for symbol in &item.rule.rhs {
            if !grammar.is_nonterminal(symbol) {
                tree.attach(id, symbol, None);
                continue;
            }

            match item.provenance.get(slot) {
                Some(&link) => {
                    let child = tree.attach(id, symbol, Some(link));
                    stack.push(child);
                    slot += 1;
                }
                None => {
                    tree.attach(id, symbol, None);
                }
            }
        }
    }

    tree
}
