// shopdesk/src/flow/definition.rs

//! The `Flow<TData, Err>` struct and its handler registration methods.

use super::context_data::ContextData;
use super::control::FlowControl;
use super::error::FlowError;
use super::step::{SkipCondition, StepDef};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{event, Level};

/// An asynchronous step handler.
///
/// Handlers receive a clone of the flow's `ContextData<TData>` handle. They must
/// release every lock guard before awaiting.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<FlowControl, Err>> + Send>> + Send + Sync,
>;

/// Synchronous finalizer run after every flow execution.
pub type Finalizer<TData> = Box<dyn Fn(&ContextData<TData>) + Send + Sync>;

/// An ordered set of named steps driving one panel action
/// (cancel an order, submit a review, approve a review, ...).
///
/// `Err` is the error type handlers return. It must absorb `FlowError` so the
/// engine can report its own failures through the same channel.
pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: &'static str,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) guards: HashMap<&'static str, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<&'static str, Vec<Handler<TData, Err>>>,
  pub(crate) always: Vec<Finalizer<TData>>,
  /// Step names handlers were registered for but that the flow does not define.
  pub(crate) unknown_steps: Vec<&'static str>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a flow from `(step name, optional, skip_if)` triples.
  pub fn new(name: &'static str, step_defs: &[(&'static str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional, skip_if)| StepDef {
        name: step_name,
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      name,
      steps,
      guards: HashMap::new(),
      on: HashMap::new(),
      always: Vec::new(),
      unknown_steps: Vec::new(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn step_names(&self) -> Vec<&'static str> {
    self.steps.iter().map(|s| s.name).collect()
  }

  fn knows_step(&mut self, step_name: &'static str) -> bool {
    if self.steps.iter().any(|s| s.name == step_name) {
      return true;
    }
    event!(Level::ERROR, flow = self.name, step_name, "Handler registered for an undefined step.");
    self.unknown_steps.push(step_name);
    false
  }

  /// Registers a guard for `step_name`. Guards run before the step's `on`
  /// handlers and usually validate or claim an in-flight marker.
  pub fn guard<F>(&mut self, step_name: &'static str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<FlowControl, Err>> + Send + 'static,
  {
    if self.knows_step(step_name) {
      let handler: Handler<TData, Err> = Box::new(move |ctx_data| Box::pin(handler_fn(ctx_data)));
      self.guards.entry(step_name).or_default().push(handler);
    }
  }

  /// Registers the main handler for `step_name`.
  pub fn on<F>(&mut self, step_name: &'static str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<FlowControl, Err>> + Send + 'static,
  {
    if self.knows_step(step_name) {
      let handler: Handler<TData, Err> = Box::new(move |ctx_data| Box::pin(handler_fn(ctx_data)));
      self.on.entry(step_name).or_default().push(handler);
    }
  }

  /// Registers a finalizer that runs once the flow is done, whether it
  /// completed, stopped or failed.
  pub fn always(&mut self, finalizer: impl Fn(&ContextData<TData>) + Send + Sync + 'static) {
    self.always.push(Box::new(finalizer));
  }
}
