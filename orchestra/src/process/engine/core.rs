//! Core launch, resume and transition loop

use super::{EngineError, EngineResult, LoggingPostActionsExecutor, PostActionsExecutor};
use crate::process::{
    ContextBuilder, ContextFactory, ContextFinder, ContextWriter, ExecutedTransition,
    ExecutionContext, FirstEligibleTransitionFinder, NextTransitionFinder, Parameters,
    ProcessDefinition, ProcessId, ProcessStatus, StateRef,
};
use std::collections::HashSet;
use std::sync::Arc;

/// What a call to [`Engine::resume`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The run continued and was persisted with this status
    Resumed(ProcessStatus),
    /// The persisted last state is unknown to the definition; nothing ran and nothing was saved
    UnknownState(String),
}

/// Process execution engine
pub struct Engine {
    context_factory: ContextFactory,
    finder: Arc<dyn NextTransitionFinder>,
    post_actions: Arc<dyn PostActionsExecutor>,
    writer: Arc<dyn ContextWriter>,
    contexts: Arc<dyn ContextFinder>,
}

impl Engine {
    /// Engine persisting through `writer` and resuming from `contexts`
    pub fn new(writer: Arc<dyn ContextWriter>, contexts: Arc<dyn ContextFinder>) -> Self {
        Self {
            context_factory: ContextFactory::default(),
            finder: Arc::new(FirstEligibleTransitionFinder),
            post_actions: Arc::new(LoggingPostActionsExecutor),
            writer,
            contexts,
        }
    }

    /// Engine reading and writing the same store
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: ContextWriter + ContextFinder + 'static,
    {
        Self::new(store.clone(), store)
    }

    /// Replace the context factory
    pub fn with_context_factory(mut self, context_factory: ContextFactory) -> Self {
        self.context_factory = context_factory;
        self
    }

    /// Replace the next-transition finder
    pub fn with_finder(mut self, finder: Arc<dyn NextTransitionFinder>) -> Self {
        self.finder = finder;
        self
    }

    /// Replace the post-actions executor
    pub fn with_post_actions_executor(mut self, executor: Arc<dyn PostActionsExecutor>) -> Self {
        self.post_actions = executor;
        self
    }

    /// Start a new run from the definition's start state and persist it
    ///
    /// Action failures are recorded on the persisted context, not returned.
    pub fn launch(
        &self,
        definition: &ProcessDefinition,
        parameters: Parameters,
    ) -> EngineResult<ProcessId> {
        let start = definition.start_state();
        let mut context = self
            .context_factory
            .create(definition.state(start), parameters);

        tracing::info!(
            process = definition.name(),
            process_id = %context.process_id(),
            "Launching process"
        );

        self.execute_transitions(definition, start, &mut context)?;
        self.finish_and_save(definition, &mut context)?;
        Ok(context.process_id().clone())
    }

    /// Continue a paused run from its persisted last state
    pub fn resume(
        &self,
        definition: &ProcessDefinition,
        process_id: &ProcessId,
    ) -> EngineResult<ResumeOutcome> {
        let read_model = self
            .contexts
            .find_by_process_id(process_id)?
            .ok_or_else(|| EngineError::NotFound(process_id.clone()))?;

        if read_model.status != ProcessStatus::Paused {
            return Err(EngineError::ResumeForbidden {
                process_id: process_id.clone(),
                status: read_model.status,
            });
        }

        let Some(last_state) = definition.state_by_name(&read_model.last_state_name) else {
            tracing::warn!(
                process = definition.name(),
                process_id = %process_id,
                last_state = %read_model.last_state_name,
                "Last state is unknown to the process definition, nothing resumed"
            );
            return Ok(ResumeOutcome::UnknownState(read_model.last_state_name));
        };

        let mut context = ContextBuilder::from_read_model(&read_model)
            .with_last_state(definition.state(last_state))
            .with_status(ProcessStatus::Running)
            .build();

        tracing::info!(
            process = definition.name(),
            process_id = %process_id,
            last_state = %read_model.last_state_name,
            "Resuming process"
        );

        self.execute_transitions(definition, last_state, &mut context)?;
        self.finish_and_save(definition, &mut context)?;
        Ok(ResumeOutcome::Resumed(context.status()))
    }

    /// Take transitions from `from` until the context stops running or none is eligible
    ///
    /// Each state may be entered once per call; reaching one twice is an
    /// [`EngineError::CircularTransition`]. An action failure marks the
    /// context failed and ends the loop without an error.
    pub fn execute_transitions(
        &self,
        definition: &ProcessDefinition,
        from: StateRef,
        context: &mut ExecutionContext,
    ) -> EngineResult<()> {
        let mut visited: HashSet<StateRef> = HashSet::new();
        let mut next = self.finder.find(definition, context, Some(from));

        while context.status() == ProcessStatus::Running {
            let Some(transition) = next else {
                break;
            };
            let from_state = definition.state(transition.from_state());
            let to = transition
                .to_state()
                .ok_or_else(|| EngineError::DeadEndSelected {
                    from: from_state.name().clone(),
                })?;
            let to_state = definition.state(to);

            if !visited.insert(to) {
                return Err(EngineError::CircularTransition {
                    state: to_state.name().clone(),
                });
            }

            context.set_current_transition(transition.key());
            tracing::debug!(
                process_id = %context.process_id(),
                from = %from_state.name(),
                to = %to_state.name(),
                "Taking transition"
            );

            if let Some(action) = transition.action() {
                if let Err(error) = action.run(context.parameters()) {
                    tracing::error!(
                        process_id = %context.process_id(),
                        action = action.name(),
                        from = %from_state.name(),
                        to = %to_state.name(),
                        error = %error,
                        "Action failed"
                    );
                    context.set_status(ProcessStatus::Failed);
                    context.set_failure(error);
                    break;
                }
            }

            self.post_actions
                .execute(transition.post_actions(), context.parameters());

            context.set_last_state(to_state);
            context.add_executed_transition(ExecutedTransition::now(
                from_state.name().clone(),
                to_state.name().clone(),
            ));

            if transition.is_paused() {
                context.set_status(ProcessStatus::Paused);
                break;
            }

            next = self.finder.find(definition, context, Some(to));
        }

        Ok(())
    }

    fn finish_and_save(
        &self,
        definition: &ProcessDefinition,
        context: &mut ExecutionContext,
    ) -> EngineResult<()> {
        if context.status() == ProcessStatus::Running {
            context.set_status(ProcessStatus::Finished);
        }

        tracing::info!(
            process = definition.name(),
            process_id = %context.process_id(),
            status = %context.status(),
            transitions = context.executed_transitions().len(),
            "Process run ended"
        );

        self.writer.save(context)?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("context_factory", &self.context_factory)
            .finish_non_exhaustive()
    }
}
