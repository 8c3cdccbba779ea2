//! Step orchestration over remote flows.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  PipelineEngine (single-step / streaming / batch)        │
//! │    ├─ resolver:  registry → execution order              │
//! │    └─ StepExecutor                                       │
//! │         ├─ binder:  context + prior outputs → payload    │
//! │         ├─ FlowInvoker::execute_flow (with timeout)      │
//! │         └─ StepOutput::from_envelope                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`FlowRegistry`] is built once and shared. Contexts and outputs live
//! for a single run.

pub mod binder;
pub mod context;
pub mod driver;
pub mod error;
pub mod executor;
pub mod output;
pub mod registry;
pub mod report;
pub mod resolver;

pub use binder::{BindingNames, bind_inputs};
pub use context::{ChatTurn, ExecutionContext, Role, StepResults};
pub use driver::{PipelineEngine, StepStream};
pub use error::{PipelineError, Result};
pub use executor::StepExecutor;
pub use output::{StepOutput, WELL_KNOWN_FIELDS};
pub use registry::{FlowRegistry, SharedRegistry};
pub use report::{BatchReport, PipelineAnswer, StepReport};
pub use resolver::{dependency_edges, resolve_order};
