//! Selection of the next transition to take

use crate::process::{ExecutionContext, ProcessDefinition, ProcessStatus, StateRef, Transition};

/// Picks the single transition a running context takes out of a state
pub trait NextTransitionFinder: Send + Sync {
    /// The transition to take next, or `None` when the run cannot advance
    fn find<'d>(
        &self,
        definition: &'d ProcessDefinition,
        context: &ExecutionContext,
        state: Option<StateRef>,
    ) -> Option<&'d Transition>;
}

/// First-eligible-in-declaration-order finder
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstEligibleTransitionFinder;

impl NextTransitionFinder for FirstEligibleTransitionFinder {
    fn find<'d>(
        &self,
        definition: &'d ProcessDefinition,
        context: &ExecutionContext,
        state: Option<StateRef>,
    ) -> Option<&'d Transition> {
        let state = state?;
        if context.status() != ProcessStatus::Running {
            return None;
        }

        definition.next_transitions(state).find(|transition| {
            transition.to_state().is_some()
                && transition
                    .conditions()
                    .iter()
                    .all(|condition| condition.is_valid(context))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::test_helpers::running_context;
    use crate::process::{AlwaysInvalid, AlwaysValid, Condition};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn target_name<'d>(definition: &'d ProcessDefinition, transition: &Transition) -> &'d str {
        transition
            .to_state()
            .map(|s| definition.state(s).name().as_str())
            .unwrap_or_default()
    }

    #[test]
    fn test_first_eligible_transition_wins() {
        let definition = ProcessDefinition::build("fan-out", |p| {
            let start = p.start_state();
            for name in ["B", "C", "D"] {
                let state = p.state(name)?;
                p.then(start, state);
            }
            Ok(())
        })
        .unwrap();

        let transition = FirstEligibleTransitionFinder
            .find(&definition, &running_context(), Some(definition.start_state()))
            .unwrap();
        assert_eq!(target_name(&definition, transition), "B");
    }

    #[test]
    fn test_dead_end_is_never_selected() {
        let definition = ProcessDefinition::build("dead-end", |p| {
            let start = p.start_state();
            let fallback = p.state("fallback")?;
            let always: Arc<dyn Condition> = Arc::new(AlwaysValid);
            p.when(start, vec![always]);
            p.then(start, fallback);
            Ok(())
        })
        .unwrap();

        let transition = FirstEligibleTransitionFinder
            .find(&definition, &running_context(), Some(definition.start_state()))
            .unwrap();
        assert_eq!(target_name(&definition, transition), "fallback");
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let definition = ProcessDefinition::build("mixed", |p| {
            let start = p.start_state();
            let blocked = p.state("blocked")?;
            let open = p.state("open")?;
            let mixed: Vec<Arc<dyn Condition>> = vec![Arc::new(AlwaysValid), Arc::new(AlwaysInvalid)];
            p.when(start, mixed).then(blocked);
            p.then(start, open);
            Ok(())
        })
        .unwrap();

        let transition = FirstEligibleTransitionFinder
            .find(&definition, &running_context(), Some(definition.start_state()))
            .unwrap();
        assert_eq!(target_name(&definition, transition), "open");
    }

    #[test]
    fn test_conditions_short_circuit() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let counter = evaluated.clone();
        let definition = ProcessDefinition::build("short-circuit", move |p| {
            let start = p.start_state();
            let target = p.state("target")?;
            let counting = move |_: &ExecutionContext| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            };
            let conditions: Vec<Arc<dyn Condition>> =
                vec![Arc::new(AlwaysInvalid), Arc::new(counting)];
            p.when(start, conditions).then(target);
            Ok(())
        })
        .unwrap();

        let found =
            FirstEligibleTransitionFinder.find(&definition, &running_context(), Some(definition.start_state()));
        assert!(found.is_none());
        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_transition_for_absent_state() {
        let definition = ProcessDefinition::build("empty", |_| Ok(())).unwrap();
        assert!(FirstEligibleTransitionFinder
            .find(&definition, &running_context(), None)
            .is_none());
    }

    #[test]
    fn test_no_transition_unless_running() {
        let definition = ProcessDefinition::build("single", |p| {
            let a = p.state("A")?;
            p.then(p.start_state(), a);
            Ok(())
        })
        .unwrap();

        for status in [ProcessStatus::Paused, ProcessStatus::Failed, ProcessStatus::Finished] {
            let mut context = running_context();
            context.set_status(status);
            assert!(FirstEligibleTransitionFinder
                .find(&definition, &context, Some(definition.start_state()))
                .is_none());
        }
    }
}
