// shopdesk/src/flow/execution.rs

//! `Flow::run()`: executes the steps against a shared context.

use super::context_data::ContextData;
use super::control::{FlowControl, FlowOutcome};
use super::definition::{Flow, Handler};
use super::error::FlowError;
use tracing::{event, instrument, span, Instrument, Level};

enum Phase {
  Guard,
  On,
}

impl Phase {
  fn label(&self) -> &'static str {
    match self {
      Phase::Guard => "guard",
      Phase::On => "on",
    }
  }
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs the flow. `always` finalizers run whatever the result.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    let result = self.run_steps(&ctx_data).await;
    for finalizer in &self.always {
      finalizer(&ctx_data);
    }
    result
  }

  async fn run_steps(&self, ctx_data: &ContextData<TData>) -> Result<FlowOutcome, Err> {
    if let Some(step_name) = self.unknown_steps.first() {
      return Err(Err::from(FlowError::StepNotFound {
        step_name: (*step_name).to_string(),
      }));
    }

    event!(Level::DEBUG, "Flow execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "flow_step",
        step_name = step_def.name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by its skip condition.");
          continue;
        }
      }

      let guards = self.guards.get(step_def.name).map(Vec::as_slice).unwrap_or_default();
      let on = self.on.get(step_def.name).map(Vec::as_slice).unwrap_or_default();

      if guards.is_empty() && on.is_empty() {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.to_string(),
        }));
      }

      for (phase, handlers) in [(Phase::Guard, guards), (Phase::On, on)] {
        let control = self
          .run_phase(ctx_data, &phase, handlers)
          .instrument(step_span.clone())
          .await?;
        if control == FlowControl::Stop {
          event!(parent: &step_span, Level::INFO, phase = phase.label(), "Flow stopped by a handler.");
          return Ok(FlowOutcome::Stopped);
        }
      }
    }

    event!(Level::DEBUG, "Flow execution completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_phase(
    &self,
    ctx_data: &ContextData<TData>,
    phase: &Phase,
    handlers: &[Handler<TData, Err>],
  ) -> Result<FlowControl, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(FlowControl::Continue) => {}
        Ok(FlowControl::Stop) => return Ok(FlowControl::Stop),
        Err(e) => {
          event!(Level::WARN, phase = phase.label(), handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(FlowControl::Continue)
  }
}
