//! This module provides the whole-table checks that run once a document has been parsed:
//! every instruction target must be a declared state, the start state must be declared, and
//! (as a diagnostic only) states unreachable from the start state are reported.

use crate::types::{SpecError, SpecErrorKind, Specification};
use std::collections::HashSet;

/// Analyzes a parsed [`Specification`] for structural errors.
///
/// Target states are checked before the start state, so a document with both problems
/// reports the undeclared target.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(SpecError)` describing the first violation.
pub fn analyze(spec: &Specification) -> Result<(), SpecError> {
    [check_target_states, check_start_state]
        .iter()
        .try_for_each(|check| check(spec))
}

/// Checks that every `next_state` referenced in the table is one of its keys.
///
/// The error is located at the source state and symbol; its problem value is the target.
fn check_target_states(spec: &Specification) -> Result<(), SpecError> {
    for (state, transitions) in &spec.table {
        for (symbol, instruction) in transitions.iter().flatten() {
            let Some(target) = instruction.next_state() else {
                continue;
            };

            if !spec.table.contains_key(target) {
                return Err(SpecError::from(SpecErrorKind::UndeclaredState(
                    target.to_string(),
                ))
                .in_state(state)
                .at_symbol(&symbol.to_string()));
            }
        }
    }

    Ok(())
}

/// Checks that the start state is declared in the table.
fn check_start_state(spec: &Specification) -> Result<(), SpecError> {
    if !spec.table.contains_key(&spec.start_state) {
        return Err(SpecErrorKind::UndeclaredStartState(spec.start_state.clone()).into());
    }

    Ok(())
}

/// Returns the declared states that no sequence of transitions reaches from the start state,
/// sorted by name.
pub fn unreachable_states(spec: &Specification) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut queue = vec![spec.start_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        if let Some(Some(transitions)) = spec.table.get(state) {
            for instruction in transitions.values() {
                let target = instruction.next_state().unwrap_or(state);
                if !visited.contains(target) {
                    queue.push(target);
                }
            }
        }
    }

    // The table is a BTreeMap, so this is already sorted.
    spec.table
        .keys()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect()
}
