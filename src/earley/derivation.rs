use std::collections::HashSet;
use std::fmt::Display;

use super::analysis::Nullable;
use super::chart::Chart;
use super::forest::{NodeId, Tree};
use crate::grammar::Rule;

/// One rewrite: the rule applied and the sentential form it produced
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub rule: String,
    pub result: String,
}

impl Step {
    fn new(rule: impl Into<String>, form: &[String]) -> Self {
        Step {
            rule: rule.into(),
            result: form.concat(),
        }
    }
}

/// Steps from the start symbol down to a sentence, first step always
/// `Start → <start symbol>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Derivation {
    steps: Vec<Step>,
}

impl Derivation {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The sentence the derivation ends in
    pub fn result(&self) -> &str {
        self.steps.last().map(|step| step.result.as_str()).unwrap_or_default()
    }
}

impl Display for Derivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in &self.steps {
            let result = if step.result.is_empty() { "ε" } else { &step.result };
            writeln!(f, "{}  =>  {}", step.rule, result)?;
        }
        Ok(())
    }
}

// Replaces the first occurrence of the rule's left side in `form`
fn rewrite(form: &mut Vec<String>, rule: &Rule) {
    if let Some(position) = form.iter().position(|symbol| *symbol == rule.lhs) {
        form.splice(position..=position, rule.rhs.iter().cloned());
    }
}

/// Replays a tree as a leftmost derivation.
///
/// Returns the derivation along with the final sentential form, one symbol
/// per element, so it can be compared against the input token by token.
/// Nullable symbols that magical completion left in the form are erased at
/// the end, leftmost first.
pub(crate) fn replay(tree: &Tree, chart: &Chart, nullable: &Nullable) -> (Derivation, Vec<String>) {
    let root = tree.node(tree.root());
    let mut form = vec![root.value.clone()];
    let mut steps = vec![Step::new(format!("Start → {}", root.value), &form)];

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }

        let node = tree.node(id);
        if let Some(item) = node.item.and_then(|link| chart.item(link)) {
            rewrite(&mut form, &item.rule);
            steps.push(Step::new(item.rule.to_string(), &form));
        }
        stack.extend(node.children.iter().rev());
    }

    while let Some(rule) = form.iter().find_map(|symbol| nullable.eraser(symbol)) {
        rewrite(&mut form, rule);
        steps.push(Step::new(rule.to_string(), &form));
    }

    (Derivation { steps }, form)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::earley::analysis::{is_recursive, nullable_symbols};
    use crate::earley::chart::GrammarView;
    use crate::earley::forest::build;
    use crate::earley::item::Equality;

    fn replays(list: &[(&str, &str)], input: &str) -> Vec<(Derivation, Vec<String>)> {
        let rules: Vec<Rc<Rule>> = list.iter().map(|(lhs, rhs)| Rc::new(Rule::chars(lhs, rhs))).collect();
        let nullable = nullable_symbols(&rules);
        let view = GrammarView::new(&rules, &nullable);
        let tokens: Vec<String> = input.chars().map(String::from).collect();
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

        let mut chart = Chart::new(Equality::for_grammar(is_recursive(&rules, &nullable)));
        chart.seed(&view, "S");
        chart.fill(&view, &tokens);
        chart.final_items("S")
            .into_iter()
            .map(|link| replay(&build(&chart, &view, link), &chart, &nullable))
            .collect()
    }

    fn pairs(derivation: &Derivation) -> Vec<(&str, &str)> {
        derivation.steps().iter().map(|step| (step.rule.as_str(), step.result.as_str())).collect()
    }

    #[test]
    fn replay_is_leftmost() {
        let found = replays(&[("S", "AB"), ("A", "a"), ("B", "b")], "ab");
        assert_eq!(found.len(), 1);

        let (derivation, form) = &found[0];
        assert_eq!(pairs(derivation), vec![
            ("Start → S", "S"),
            ("S → AB", "AB"),
            ("A → a", "aB"),
            ("B → b", "ab"),
        ]);
        assert_eq!(form, &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(derivation.result(), "ab");
    }

    #[test]
    fn skipped_nullables_are_erased_at_the_end() {
        let found = replays(&[("S", "Ab"), ("A", "")], "b");

        for (derivation, form) in &found {
            assert_eq!(pairs(derivation), vec![
                ("Start → S", "S"),
                ("S → Ab", "Ab"),
                ("A → ε", "b"),
            ]);
            assert_eq!(form, &vec!["b".to_string()]);
        }
    }

    #[test]
    fn erasure_follows_the_first_proving_rule() {
        let found = replays(&[("S", "Ab"), ("A", "BC"), ("B", ""), ("C", "B")], "b");
        assert!(found.iter().all(|(_, form)| form == &vec!["b".to_string()]));

        let derivations: Vec<Vec<(&str, &str)>> = found.iter().map(|(d, _)| pairs(d)).collect();
        assert!(derivations.contains(&vec![
            ("Start → S", "S"),
            ("S → Ab", "Ab"),
            ("A → BC", "BCb"),
            ("B → ε", "Cb"),
            ("C → B", "Bb"),
            ("B → ε", "b"),
        ]));
    }

    #[test]
    fn display_marks_the_empty_sentence() {
        let found = replays(&[("S", "")], "");
        assert_eq!(found[0].0.to_string(), "Start → S  =>  S\nS → ε  =>  ε\n");
    }
}
