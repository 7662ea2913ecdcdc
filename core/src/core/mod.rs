// merchforge/src/core/mod.rs

//! Building blocks shared by every pipeline: the lockable run context,
//! handler signatures, step definitions and flow-control signals.

pub mod context;
pub mod context_data;
pub mod control;
pub mod step;

pub use context::Handler;
pub use context_data::ContextData;
pub use control::{FlowOutcome, StepControl};
pub use step::{SkipCondition, StepDef};
