// merchforge/src/lib.rs

//! merchforge: the orchestration core of a demo merchandise pipeline.
//!
//! One run asks a language model for listing copy, parses it into a
//! [`ProductDraft`], checks the record store so a title is never published
//! twice, renders artwork, has it composited onto a product mockup, captions
//! the mockup, publishes to a demo sink, records the result locally and
//! finally pushes the listing to a commerce platform.
//!
//! The run itself is a [`Pipeline`] of named steps; each remote service sits
//! behind a small async trait in [`adapters`] so the workflow can be driven
//! against fakes.

pub mod adapters;
pub mod core;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod pipeline;
pub mod store;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::definition::Pipeline;

pub use crate::adapters::{AdapterError, FailureKind};
pub use crate::models::{CommerceReceipt, CommerceStatus, EnrichedProduct, ProductDraft, PublishedRecord};
pub use crate::orchestrator::{Orchestrator, OrchestratorSettings, RunError, RunOutcome, RunReport, RunState, Services};
pub use crate::parser::parse_draft;
pub use crate::store::{RecordStore, StoreError};
