use orchestra::process::{
    ContextFinder, DefinitionError, DefinitionResult, Engine, MemoryContextStore, Parameters,
    ProcessDefinition, ProcessGraphAnalyzer, ProcessStatus,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Build a definition with `states` uniquely named states; index 0 of an edge is the start state
fn build(states: usize, edges: &[(usize, usize)]) -> DefinitionResult<ProcessDefinition> {
    ProcessDefinition::build("generated", |p| {
        let mut refs = vec![p.start_state()];
        for i in 1..=states {
            refs.push(p.state(format!("s{i}"))?);
        }
        for &(from, to) in edges {
            p.then(refs[from], refs[to]);
        }
        Ok(())
    })
}

fn name(index: usize) -> String {
    if index == 0 {
        "startState".to_string()
    } else {
        format!("s{index}")
    }
}

fn graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..8).prop_flat_map(|states| {
        (
            Just(states),
            prop::collection::vec((0..=states, 1..=states), 0..16),
        )
    })
}

proptest! {
    #[test]
    fn test_built_definitions_are_acyclic((states, edges) in graph()) {
        if let Ok(definition) = build(states, &edges) {
            prop_assert!(ProcessGraphAnalyzer::new(&definition).find_cycle().is_none());
        }
    }

    #[test]
    fn test_reported_cycles_follow_edges((states, edges) in graph()) {
        if let Err(DefinitionError::CycleDetected { path }) = build(states, &edges) {
            let named: HashSet<(String, String)> = edges
                .iter()
                .map(|&(from, to)| (name(from), name(to)))
                .collect();

            prop_assert!(path.len() >= 2);
            prop_assert_eq!(path.first(), path.last());
            for pair in path.windows(2) {
                let edge = (pair[0].to_string(), pair[1].to_string());
                prop_assert!(named.contains(&edge), "no edge {:?}", edge);
            }
        }
    }

    #[test]
    fn test_forward_edges_always_build((states, edges) in graph()) {
        let forward: Vec<(usize, usize)> = edges
            .into_iter()
            .filter(|&(from, to)| from < to)
            .collect();
        prop_assert!(build(states, &forward).is_ok());
    }

    #[test]
    fn test_acyclic_definitions_run_to_completion((states, edges) in graph()) {
        if let Ok(definition) = build(states, &edges) {
            let store = Arc::new(MemoryContextStore::new());
            let engine = Engine::with_store(store.clone());

            let process_id = engine.launch(&definition, Parameters::new()).unwrap();
            let row = store.find_by_process_id(&process_id).unwrap().unwrap();

            prop_assert_eq!(row.status, ProcessStatus::Finished);
            prop_assert!(row.executed_transitions.len() <= states);

            let mut seen = HashSet::new();
            for executed in &row.executed_transitions {
                prop_assert!(seen.insert(executed.to_state().to_string()));
            }
        }
    }
}
