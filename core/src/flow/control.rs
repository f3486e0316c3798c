// shopdesk/src/flow/control.rs

//! Signals for controlling flow execution and the outcome of a run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
  /// Keep going with the current step and the ones after it.
  Continue,
  /// Halt the flow. Remaining handlers and steps are not executed,
  /// but `always` finalizers still run.
  Stop,
}

/// Outcome of a full flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every non-skipped step ran to completion.
  Completed,
  /// A handler returned `FlowControl::Stop`.
  Stopped,
}
