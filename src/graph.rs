//! Derives a state diagram from a transition table, for visualization collaborators.
//!
//! One edge is produced per `(from, to)` pair. Symbols whose instructions are identical are
//! folded into a single label such as `0,1→R`.

use crate::types::{Direction, Instruction, Specification};
use std::fmt;

/// Shown in labels in place of a space, which would otherwise be invisible.
pub const VISIBLE_SPACE: char = '␣';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    pub name: String,
    pub start: bool,
    /// Declared with no transitions.
    pub halting: bool,
}

/// The symbols that share one instruction along an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub symbols: Vec<char>,
    pub write: Option<char>,
    pub direction: Direction,
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<String> = self.symbols.iter().map(|&s| visible(s).to_string()).collect();
        write!(f, "{}→", symbols.join(","))?;
        if let Some(write) = self.write {
            write!(f, "{},", visible(write))?;
        }
        write!(f, "{}", self.direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub labels: Vec<EdgeLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateGraph {
    pub nodes: Vec<StateNode>,
    pub edges: Vec<Edge>,
}

impl StateGraph {
    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }
}

/// Builds the state diagram of `spec`. The start state comes first, then the remaining
/// states by name.
pub fn derive_graph(spec: &Specification) -> StateGraph {
    let mut names: Vec<&String> = spec.table.keys().collect();
    names.sort_by_key(|name| **name != spec.start_state);

    let mut graph = StateGraph::default();

    for name in names {
        let transitions = spec.table.get(name).and_then(|t| t.as_ref());
        graph.nodes.push(StateNode {
            name: name.clone(),
            start: *name == spec.start_state,
            halting: transitions.is_none(),
        });

        // (target, instruction, symbols) in first-seen order
        let mut groups: Vec<(&str, &Instruction, Vec<char>)> = Vec::new();
        for (&symbol, instruction) in transitions.into_iter().flatten() {
            let to = instruction.next_state().unwrap_or(name);
            match groups
                .iter_mut()
                .find(|(target, existing, _)| *target == to && *existing == instruction)
            {
                Some((_, _, symbols)) => symbols.push(symbol),
                None => groups.push((to, instruction, vec![symbol])),
            }
        }

        for (to, instruction, symbols) in groups {
            let label = EdgeLabel {
                symbols,
                write: instruction.write(),
                direction: instruction.direction(),
            };

            match graph
                .edges
                .iter_mut()
                .find(|edge| edge.from == *name && edge.to == to)
            {
                Some(edge) => edge.labels.push(label),
                None => graph.edges.push(Edge {
                    from: name.clone(),
                    to: to.to_string(),
                    labels: vec![label],
                }),
            }
        }
    }

    graph
}

fn visible(symbol: char) -> char {
    if symbol == ' ' {
        VISIBLE_SPACE
    } else {
        symbol
    }
}
