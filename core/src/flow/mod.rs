// shopdesk/src/flow/mod.rs

//! A small step-pipeline engine. Every mutating panel action (cancel an
//! order, submit a review, moderate a review) is a `Flow` run against the
//! panel's `ContextData`.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod error;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{FlowControl, FlowOutcome};
pub use definition::{Finalizer, Flow, Handler};
pub use error::{FlowError, FlowResult};
pub use step::{SkipCondition, StepDef};
