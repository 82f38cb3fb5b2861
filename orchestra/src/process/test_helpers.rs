//! Test helper functions for the process module

#![cfg(test)]

use crate::process::{
    Action, ActionError, ActionResult, ContextBuilder, ContextFactory, ContextReadModel,
    ExecutedTransition, ExecutionContext, Parameters, PostAction, ProcessId, ProcessStatus, State,
    StateName, StateRef, UlidGenerator, ProcessIdGenerator, START_STATE_NAME,
};
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// A detached start state
pub fn start_state() -> State {
    State::new(StateRef(0), StateName::new(START_STATE_NAME))
}

/// Fresh running context positioned on the start state
pub fn running_context() -> ExecutionContext {
    running_context_with(Parameters::new())
}

/// Fresh running context with the given parameters
pub fn running_context_with(parameters: Parameters) -> ExecutionContext {
    ContextFactory::default().create(&start_state(), parameters)
}

/// Read model of a process paused on `last_state`
pub fn paused_read_model(last_state: &str) -> ContextReadModel {
    let mut parameters = Parameters::new();
    parameters.insert("order_id".to_string(), json!(1234));

    ContextReadModel {
        process_id: UlidGenerator.generate(),
        status: ProcessStatus::Paused,
        last_state_name: last_state.to_string(),
        executed_transitions: vec![ExecutedTransition::now(
            StateName::new(START_STATE_NAME),
            StateName::new(last_state),
        )],
        created_at: Utc::now(),
        parameters,
        failure: None,
    }
}

/// Context for `process_id` that took the given transitions during this run
pub fn context_for(
    process_id: &ProcessId,
    transitions: &[(&str, &str)],
    status: ProcessStatus,
) -> ExecutionContext {
    let read_model = ContextReadModel {
        process_id: process_id.clone(),
        status,
        last_state_name: START_STATE_NAME.to_string(),
        executed_transitions: Vec::new(),
        created_at: Utc::now(),
        parameters: Parameters::new(),
        failure: None,
    };
    let mut context = ContextBuilder::from_read_model(&read_model)
        .with_last_state(&start_state())
        .build();

    for (index, (from, to)) in transitions.iter().enumerate() {
        context.add_executed_transition(ExecutedTransition::now(
            StateName::new(*from),
            StateName::new(*to),
        ));
        context.set_last_state(&State::new(StateRef(index + 1), StateName::new(*to)));
    }
    context
}

/// Context with a fresh id that took the given transitions during this run
pub fn context_after(transitions: &[(&str, &str)], status: ProcessStatus) -> ExecutionContext {
    context_for(&UlidGenerator.generate(), transitions, status)
}

/// Action recording its name into a shared list
pub struct RecordingAction {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingAction {
    pub fn new(name: &str, calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            calls,
        }
    }
}

impl Action for RecordingAction {
    fn run(&self, _parameters: &Parameters) -> ActionResult<()> {
        self.calls.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Post-action recording its name into a shared list
pub struct RecordingPostAction {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingPostAction {
    pub fn new(name: &str, calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            calls,
        }
    }
}

impl PostAction for RecordingPostAction {
    fn run(&self, _parameters: &Parameters) -> ActionResult<()> {
        self.calls.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Action that always fails
pub struct FailingAction {
    message: String,
}

impl FailingAction {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Action for FailingAction {
    fn run(&self, _parameters: &Parameters) -> ActionResult<()> {
        Err(ActionError::ExecutionError(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Post-action that always fails
pub struct FailingPostAction {
    name: String,
}

impl FailingPostAction {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl PostAction for FailingPostAction {
    fn run(&self, _parameters: &Parameters) -> ActionResult<()> {
        Err(ActionError::ExecutionError(format!("{} exploded", self.name)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Counts error events carrying a `post_action` field
struct PostActionFailureCounter {
    count: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for PostActionFailureCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() == tracing::Level::ERROR
            && metadata.fields().field("post_action").is_some()
        {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` and return how many post-action failures it logged
pub fn capture_post_action_failures<F: FnOnce()>(f: F) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(PostActionFailureCounter {
        count: count.clone(),
    });
    tracing::subscriber::with_default(subscriber, f);
    count.load(Ordering::SeqCst)
}
