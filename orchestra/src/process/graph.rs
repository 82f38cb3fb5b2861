//! Graph utilities for process definition analysis
//!
//! Cycle detection runs over state names rather than state identities: the
//! adjacency list is built from the start state and every registered state,
//! so a state shadowed by an earlier one of the same name contributes no
//! edges of its own.

use super::{ProcessDefinition, StateName, StateRef};
use std::collections::{HashMap, HashSet, VecDeque};

/// Analyzes process graph structure
pub struct ProcessGraphAnalyzer<'a> {
    definition: &'a ProcessDefinition,
}

impl<'a> ProcessGraphAnalyzer<'a> {
    /// Creates a new graph analyzer for the given definition
    pub fn new(definition: &'a ProcessDefinition) -> Self {
        Self { definition }
    }

    /// Finds all states reachable from the given state, following every transition with a destination
    pub fn find_reachable_states(&self, from: StateRef) -> HashSet<StateRef> {
        let mut reachable = HashSet::new();
        let mut to_visit = VecDeque::new();
        to_visit.push_back(from);

        while let Some(state) = to_visit.pop_front() {
            if !reachable.insert(state) {
                continue;
            }
            for transition in self.definition.next_transitions(state) {
                if let Some(to) = transition.to_state() {
                    to_visit.push_back(to);
                }
            }
        }

        reachable
    }

    /// States created while building the definition that the start state never reaches
    pub fn find_unreachable_states(&self) -> Vec<StateRef> {
        let reachable = self.find_reachable_states(self.definition.start_state());

        self.definition
            .all_states()
            .iter()
            .map(|state| state.key())
            .filter(|state| !reachable.contains(state))
            .collect()
    }

    /// Builds the name-keyed adjacency list, in registration order
    pub fn build_adjacency_list(&self) -> Vec<(StateName, Vec<StateName>)> {
        self.definition
            .registered_states()
            .map(|state| {
                let targets = self
                    .definition
                    .next_transitions(state.key())
                    .filter_map(|transition| transition.to_state())
                    .map(|to| self.definition.state(to).name().clone())
                    .collect();
                (state.name().clone(), targets)
            })
            .collect()
    }

    /// Returns the first cycle found, closed by repeating its entry state
    pub fn find_cycle(&self) -> Option<Vec<StateName>> {
        let adjacency = self.build_adjacency_list();
        let edges: HashMap<&StateName, &Vec<StateName>> =
            adjacency.iter().map(|(name, targets)| (name, targets)).collect();

        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for (name, _) in &adjacency {
            if !visited.contains(name) {
                if let Some(cycle) =
                    Self::dfs(name, &edges, &mut visited, &mut rec_stack, &mut path)
                {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn dfs<'n>(
        name: &'n StateName,
        edges: &HashMap<&'n StateName, &'n Vec<StateName>>,
        visited: &mut HashSet<&'n StateName>,
        rec_stack: &mut HashSet<&'n StateName>,
        path: &mut Vec<&'n StateName>,
    ) -> Option<Vec<StateName>> {
        visited.insert(name);
        rec_stack.insert(name);
        path.push(name);

        let targets = edges.get(name).copied().map(Vec::as_slice).unwrap_or(&[]);
        for next in targets {
            if !visited.contains(next) {
                if let Some(cycle) = Self::dfs(next, edges, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(next) {
                if let Some(start) = path.iter().position(|n| *n == next) {
                    let mut cycle: Vec<StateName> =
                        path[start..].iter().map(|n| (*n).clone()).collect();
                    cycle.push(next.clone());
                    return Some(cycle);
                }
            }
        }

        rec_stack.remove(name);
        path.pop();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{AlwaysInvalid, Condition};
    use std::sync::Arc;

    fn diamond() -> ProcessDefinition {
        ProcessDefinition::build("diamond", |p| {
            let a = p.state("A")?;
            let b = p.state("B")?;
            let c = p.state("C")?;
            let d = p.state("D")?;
            let start = p.start_state();
            p.then(start, a);
            p.then(a, b);
            p.then(a, c);
            p.then(b, d);
            p.then(c, d);
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn test_diamond_has_no_cycle() {
        let definition = diamond();
        let analyzer = ProcessGraphAnalyzer::new(&definition);
        assert!(analyzer.find_cycle().is_none());
    }

    #[test]
    fn test_adjacency_list_follows_registration_order() {
        let definition = diamond();
        let analyzer = ProcessGraphAnalyzer::new(&definition);
        let adjacency = analyzer.build_adjacency_list();

        let rendered: Vec<(String, Vec<String>)> = adjacency
            .into_iter()
            .map(|(name, targets)| {
                (
                    name.to_string(),
                    targets.into_iter().map(String::from).collect(),
                )
            })
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("startState".to_string(), vec!["A".to_string()]),
                ("A".to_string(), vec!["B".to_string(), "C".to_string()]),
                ("B".to_string(), vec!["D".to_string()]),
                ("D".to_string(), vec![]),
                ("C".to_string(), vec!["D".to_string()]),
            ]
        );
    }

    #[test]
    fn test_reachability_ignores_conditions_but_skips_dead_ends() {
        let definition = ProcessDefinition::build("guarded", |p| {
            let a = p.state("A")?;
            let island = p.state("island")?;
            let never: Arc<dyn Condition> = Arc::new(AlwaysInvalid);
            let start = p.start_state();
            p.when(start, vec![never.clone()]).then(a);
            p.when(a, vec![never]);
            p.then(island, a);
            Ok(())
        })
        .unwrap();

        let analyzer = ProcessGraphAnalyzer::new(&definition);
        let reachable = analyzer.find_reachable_states(definition.start_state());
        assert_eq!(reachable.len(), 2);

        let unreachable = analyzer.find_unreachable_states();
        assert_eq!(unreachable.len(), 1);
        assert_eq!(definition.state(unreachable[0]).name().as_str(), "island");
    }

    #[test]
    fn test_shadowed_state_edges_are_invisible_to_cycle_check() {
        // "a" is registered through the first branch, so the second "a" adds no edges
        let definition = ProcessDefinition::build("shadowed", |p| {
            let a1 = p.state("a")?;
            let b = p.state("b")?;
            let a2 = p.state("a")?;
            let start = p.start_state();
            p.then(start, a1);
            p.then(start, b);
            p.then(b, a2);
            p.then(a2, b);
            Ok(())
        })
        .unwrap();

        let analyzer = ProcessGraphAnalyzer::new(&definition);
        assert!(analyzer.find_cycle().is_none());
        assert_eq!(
            analyzer.find_reachable_states(definition.start_state()).len(),
            4
        );
    }
}
